//! Presence/level reconciliation.
//!
//! Two coupled axes, `placed` and `level`, each keep their last accepted
//! value until a poll produces a definite, valid replacement. A failed or
//! null poll never changes state.

use crate::poll::Poll;
use crate::types::BottleState;
use hydrate_traits::clock::{Clock, MonotonicClock};

/// What one reconciliation pass did to each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciled {
    /// `Fresh` when adopted from this poll, `Stale` when retained.
    pub placed: Poll<bool>,
    pub level: Poll<f64>,
    /// Presence or level differs from before this pass.
    pub changed: bool,
}

pub struct Reconciler<C: Clock = MonotonicClock> {
    state: BottleState,
    capacity: f64,
    clock: C,
}

impl Reconciler<MonotonicClock> {
    pub fn new(capacity: f64) -> Self {
        Self::with_clock(capacity, MonotonicClock::new())
    }
}

impl<C: Clock> Reconciler<C> {
    pub fn with_clock(capacity: f64, clock: C) -> Self {
        Self {
            state: BottleState::default(),
            capacity,
            clock,
        }
    }

    pub fn state(&self) -> BottleState {
        self.state
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Milliseconds since the last accepted poll, if any.
    pub fn poll_age_ms(&self) -> Option<u64> {
        self.state
            .last_valid_poll
            .map(|at| self.clock.ms_since(at))
    }

    /// A level is usable when finite and within `[0, capacity]`.
    #[inline]
    pub fn is_valid_level(&self, level: f64) -> bool {
        level.is_finite() && level >= 0.0 && level <= self.capacity
    }

    /// Merge one presence poll and one level poll into the bottle state.
    pub fn apply(&mut self, presence: Poll<bool>, level: Poll<f64>) -> Reconciled {
        let before = self.state;
        let level = level.filter(|v| self.is_valid_level(*v));

        let placed = match presence {
            Poll::Fresh(p) => {
                self.state.placed = p;
                Poll::Fresh(p)
            }
            other => other.or_retain(self.state.placed),
        };
        let level = match level {
            Poll::Fresh(v) => {
                self.state.level = v;
                Poll::Fresh(v)
            }
            other => other.or_retain(self.state.level),
        };

        if placed.is_fresh() || level.is_fresh() {
            self.state.last_valid_poll = Some(self.clock.now());
        }

        let changed = !before.same_reading(&self.state);
        if changed {
            tracing::debug!(
                placed = self.state.placed,
                level = self.state.level,
                "bottle state changed"
            );
        }

        Reconciled {
            placed,
            level,
            changed,
        }
    }
}
