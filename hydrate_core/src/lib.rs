#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Hydration telemetry reconciliation and consumption analytics.
//!
//! The crate polls a smart bottle's HTTP API and keeps one consistent view
//! of it. All I/O goes through `hydrate_traits::HttpClient` and all output
//! through `hydrate_traits::AnimationPlayer`.
//!
//! ## Architecture
//!
//! - **Transformer**: absolute readings → signed hourly deltas (`transform`)
//! - **Reconciler**: merges presence and level polls with stale-retain rules (`reconciler`)
//! - **Store**: the view model behind a `tokio::sync::watch` channel (`store`)
//! - **Presentation**: fill-animation frames and light mode (`presentation`)
//! - **Engine**: free-running pollers plus the presenter task (`engine`, `scheduler`)
//!
//! Failures never tear down the view: a failed poll keeps the last known
//! value and is reported through `tracing` and `PollStats`.

pub mod advice;
pub mod chart;
pub mod config;
pub mod conversions;
pub mod engine;
pub mod error;
pub mod mocks;
pub mod poll;
pub mod presentation;
pub mod reconciler;
pub mod scheduler;
pub mod source;
pub mod store;
pub mod transform;
pub mod transport_error;
pub mod types;

pub use chart::{BarKind, ChartBar, chart_bars};
pub use config::{BottleCfg, PollingCfg, PresentationCfg, SourceCfg};
pub use engine::{Engine, EngineBuilder, EngineHandle, apply_transition};
pub use error::{BuildError, HydrateError, Report, Result};
pub use poll::Poll;
pub use presentation::{PresentationMachine, Transition, frame_for, percent_of_goal};
pub use reconciler::{Reconciled, Reconciler};
pub use scheduler::PollTask;
pub use source::{Endpoint, HttpSource, HydrationSource, parse_timestamp};
pub use store::{PollStats, RefreshReport, SourceKind, SourceStats, ViewModelStore};
pub use transform::transform;
pub use types::{
    BottleState, ConsumptionPoint, FrameRange, HydrationViewModel, PresentationState,
    ProfileDetails, Reading, UserProfile,
};
