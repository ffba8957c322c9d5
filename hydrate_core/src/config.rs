//! Runtime configuration for the engine.
//!
//! These are the typed structs the core works with. They are separate from
//! the TOML-deserialized config in `hydrate_config`; see `conversions`.

use chrono::{FixedOffset, Offset, Utc};
use std::time::Duration;

/// Where and how to reach the telemetry API.
#[derive(Debug, Clone)]
pub struct SourceCfg {
    /// Base URL including the `/api` prefix, without trailing slash.
    pub base_url: String,
    pub user_id: u64,
    /// Offset applied to timestamps that carry none.
    pub utc_offset: FixedOffset,
    pub request_timeout: Duration,
}

impl Default for SourceCfg {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            user_id: 1,
            utc_offset: Utc.fix(),
            request_timeout: Duration::from_millis(800),
        }
    }
}

/// Free-running poll cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingCfg {
    /// Dock presence + bottle level.
    pub presence: Duration,
    /// Profile + total intake (+ bottle).
    pub refresh: Duration,
    /// Today's consumption series.
    pub chart: Duration,
}

impl Default for PollingCfg {
    fn default() -> Self {
        Self {
            presence: Duration::from_millis(1000),
            refresh: Duration::from_millis(2000),
            chart: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottleCfg {
    /// Millilitres; level polls above this are rejected.
    pub capacity_ml: f64,
}

impl Default for BottleCfg {
    fn default() -> Self {
        Self {
            capacity_ml: 1000.0,
        }
    }
}

/// Animation asset and light colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationCfg {
    /// Frame count of the fill animation; 100% maps to this frame.
    pub total_frames: u32,
    pub placed_color: String,
    pub lifted_color: String,
    /// Chart bar colour for positive deltas.
    pub consumption_color: String,
    /// Chart bar colour for zero/negative deltas.
    pub refill_color: String,
}

impl Default for PresentationCfg {
    fn default() -> Self {
        Self {
            total_frames: 110,
            placed_color: "#008000".to_string(),
            lifted_color: "yellow".to_string(),
            consumption_color: "#FF0000".to_string(),
            refill_color: "#177AD5".to_string(),
        }
    }
}
