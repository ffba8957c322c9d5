#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `HttpClient` implementations: a reqwest-backed client for the real
//! bottle API and an in-process simulated device.

pub mod error;
pub mod reqwest_http;
pub mod sim;

pub use error::TransportError;
pub use reqwest_http::ReqwestHttpClient;
pub use sim::{SimConfig, SimulatedDevice};
