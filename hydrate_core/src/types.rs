//! Data model shared by the transformer, reconciler, store and presentation.

use chrono::{DateTime, FixedOffset, Timelike};
use hydrate_traits::LightMode;
use serde::Serialize;
use std::time::Instant;

/// One timestamped absolute or aggregate observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub timestamp: DateTime<FixedOffset>,
}

impl Reading {
    pub fn new(value: f64, timestamp: DateTime<FixedOffset>) -> Self {
        Self { value, timestamp }
    }

    /// Negative (or non-finite) values are sensor errors.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }

    /// Hour-of-day bucket ("0".."23") in the timestamp's own offset.
    pub fn bucket_label(&self) -> String {
        self.timestamp.hour().to_string()
    }
}

/// Signed per-bucket change for charting. Positive = consumed, negative = refilled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionPoint {
    pub bucket_label: String,
    pub delta: f64,
}

/// Reconciled bottle presence and fill level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BottleState {
    pub placed: bool,
    /// Millilitres currently in the bottle, within `[0, capacity]`.
    pub level: f64,
    /// When a presence or level poll was last accepted.
    #[serde(skip)]
    pub last_valid_poll: Option<Instant>,
}

impl Default for BottleState {
    fn default() -> Self {
        Self {
            placed: true,
            level: 0.0,
            last_valid_poll: None,
        }
    }
}

impl BottleState {
    pub fn mode(&self) -> LightMode {
        if self.placed {
            LightMode::Solid
        } else {
            LightMode::Breath
        }
    }

    /// Fraction of the bottle that is full, in `[0, 1]`.
    pub fn fill_ratio(&self, capacity: f64) -> f64 {
        if capacity.is_nan() || capacity <= 0.0 {
            return 0.0;
        }
        (self.level / capacity).clamp(0.0, 1.0)
    }

    /// Presence and level only; ignores poll bookkeeping.
    pub fn same_reading(&self, other: &BottleState) -> bool {
        self.placed == other.placed && self.level == other.level
    }
}

/// Profile fields beyond name and goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileDetails {
    pub bottle_weight: f64,
    pub wakeup_time: String,
    pub sleep_time: String,
    pub sensor_id: String,
}

/// One successful profile poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub daily_goal: f64,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

/// The converged state the presentation layer renders from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HydrationViewModel {
    pub user_name: String,
    pub daily_goal: f64,
    pub today_intake: f64,
    pub bottle: BottleState,
    pub details: ProfileDetails,
}

/// Inclusive start/end frames of one animation instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameRange {
    pub start: u32,
    pub end: u32,
}

impl FrameRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentationState {
    pub mode: LightMode,
    pub color: String,
    pub animation_range: FrameRange,
}
