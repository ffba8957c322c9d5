//! Hydration view-model store.
//!
//! Holds the single process-wide `HydrationViewModel` and the latest
//! consumption series. Each refresh path replaces only its own field(s) in
//! one step, so readers see either the old or the new value, never a mix.
//! Failed polls leave fields untouched and are counted in `PollStats`.

use crate::error::HydrateError;
use crate::poll::Poll;
use crate::reconciler::{Reconciled, Reconciler};
use crate::source::HydrationSource;
use crate::transform::transform;
use crate::types::{ConsumptionPoint, HydrationViewModel, UserProfile};
use hydrate_traits::clock::{Clock, MonotonicClock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

/// Polled sources, for statistics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Profile,
    Intake,
    Presence,
    Level,
    Chart,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Profile,
        SourceKind::Intake,
        SourceKind::Presence,
        SourceKind::Level,
        SourceKind::Chart,
    ];

    #[inline]
    fn idx(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Profile => "profile",
            SourceKind::Intake => "intake",
            SourceKind::Presence => "presence",
            SourceKind::Level => "level",
            SourceKind::Chart => "chart",
        }
    }
}

/// Lock-free per-source success/failure counters.
#[derive(Debug, Default)]
pub struct PollStats {
    ok: [AtomicU64; 5],
    failed: [AtomicU64; 5],
    consecutive_failures: [AtomicU64; 5],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub source: SourceKind,
    pub ok: u64,
    pub failed: u64,
    pub consecutive_failures: u64,
}

impl PollStats {
    /// Record one success; returns the failure streak it ended.
    fn record_ok(&self, kind: SourceKind) -> u64 {
        self.ok[kind.idx()].fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures[kind.idx()].swap(0, Ordering::Relaxed)
    }

    /// Record one failure; returns the streak length including this one.
    fn record_failure(&self, kind: SourceKind) -> u64 {
        self.failed[kind.idx()].fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures[kind.idx()].fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self, kind: SourceKind) -> SourceStats {
        SourceStats {
            source: kind,
            ok: self.ok[kind.idx()].load(Ordering::Relaxed),
            failed: self.failed[kind.idx()].load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures[kind.idx()].load(Ordering::Relaxed),
        }
    }

    pub fn snapshot(&self) -> Vec<SourceStats> {
        SourceKind::ALL.iter().map(|k| self.get(*k)).collect()
    }
}

/// Which fields one `refresh()` managed to update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshReport {
    pub profile: bool,
    pub intake: bool,
    pub bottle: Reconciled,
}

pub struct ViewModelStore<S, C: Clock = MonotonicClock> {
    source: S,
    view: watch::Sender<HydrationViewModel>,
    consumption: watch::Sender<Vec<ConsumptionPoint>>,
    reconciler: Mutex<Reconciler<C>>,
    stats: PollStats,
}

impl<S: HydrationSource> ViewModelStore<S, MonotonicClock> {
    pub fn new(source: S, capacity_ml: f64) -> Self {
        Self::with_clock(source, capacity_ml, MonotonicClock::new())
    }
}

impl<S: HydrationSource, C: Clock> ViewModelStore<S, C> {
    pub fn with_clock(source: S, capacity_ml: f64, clock: C) -> Self {
        let (view, _) = watch::channel(HydrationViewModel::default());
        let (consumption, _) = watch::channel(Vec::new());
        Self {
            source,
            view,
            consumption,
            reconciler: Mutex::new(Reconciler::with_clock(capacity_ml, clock)),
            stats: PollStats::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current view-model (a complete, possibly stale, copy).
    pub fn snapshot(&self) -> HydrationViewModel {
        self.view.borrow().clone()
    }

    /// Receiver notified whenever a visible field changes.
    pub fn subscribe(&self) -> watch::Receiver<HydrationViewModel> {
        self.view.subscribe()
    }

    pub fn consumption(&self) -> Vec<ConsumptionPoint> {
        self.consumption.borrow().clone()
    }

    pub fn subscribe_consumption(&self) -> watch::Receiver<Vec<ConsumptionPoint>> {
        self.consumption.subscribe()
    }

    /// Milliseconds since a presence or level poll was last accepted.
    pub fn bottle_age_ms(&self) -> Option<u64> {
        self.reconciler().poll_age_ms()
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    fn reconciler(&self) -> MutexGuard<'_, Reconciler<C>> {
        match self.reconciler.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn note_ok(&self, kind: SourceKind) {
        let streak = self.stats.record_ok(kind);
        if streak > 0 {
            tracing::info!(source = kind.name(), failed_polls = streak, "source recovered");
        }
    }

    fn note_failure(&self, kind: SourceKind, err: &HydrateError) {
        let streak = self.stats.record_failure(kind);
        if streak == 1 {
            tracing::warn!(source = kind.name(), error = %err, "poll failed; keeping last known value");
        } else {
            tracing::debug!(source = kind.name(), error = %err, streak, "poll still failing");
        }
    }

    /// Poll profile, total intake and bottle concurrently.
    pub async fn refresh(&self) -> RefreshReport {
        let (profile, intake, bottle) =
            tokio::join!(self.refresh_profile(), self.refresh_intake(), self.poll_bottle());
        RefreshReport {
            profile,
            intake,
            bottle,
        }
    }

    /// Replace name, goal and profile details in one step. Returns false on failure.
    pub async fn refresh_profile(&self) -> bool {
        match self.source.fetch_profile().await {
            Ok(profile) => {
                self.note_ok(SourceKind::Profile);
                self.apply_profile(profile);
                true
            }
            Err(e) => {
                self.note_failure(SourceKind::Profile, &e);
                false
            }
        }
    }

    fn apply_profile(&self, profile: UserProfile) {
        if profile.daily_goal == 0.0 {
            tracing::debug!("daily goal is 0; progress will read as 0%");
        }
        self.view.send_if_modified(|vm| {
            let changed = vm.user_name != profile.name
                || vm.daily_goal != profile.daily_goal
                || vm.details != profile.details;
            vm.user_name = profile.name;
            vm.daily_goal = profile.daily_goal;
            vm.details = profile.details;
            changed
        });
    }

    /// Replace today's total intake. Returns false on failure.
    pub async fn refresh_intake(&self) -> bool {
        match self.source.fetch_total_intake().await {
            Ok(total) => {
                self.note_ok(SourceKind::Intake);
                self.view.send_if_modified(|vm| {
                    let changed = vm.today_intake != total;
                    vm.today_intake = total;
                    changed
                });
                true
            }
            Err(e) => {
                self.note_failure(SourceKind::Intake, &e);
                false
            }
        }
    }

    /// Poll dock presence and level concurrently and reconcile them.
    pub async fn poll_bottle(&self) -> Reconciled {
        let (presence, level) = tokio::join!(
            self.source.fetch_dock_presence(),
            self.source.fetch_level()
        );
        let presence = self.to_poll(SourceKind::Presence, presence);
        let level = self.to_poll(SourceKind::Level, level);

        let (outcome, state) = {
            let mut r = self.reconciler();
            let outcome = r.apply(presence, level);
            (outcome, r.state())
        };
        self.view.send_if_modified(|vm| {
            let changed = !vm.bottle.same_reading(&state);
            vm.bottle = state;
            changed
        });
        outcome
    }

    fn to_poll<T>(&self, kind: SourceKind, r: Result<T, HydrateError>) -> Poll<T> {
        match r {
            Ok(v) => {
                self.note_ok(kind);
                Poll::Fresh(v)
            }
            Err(e) => {
                self.note_failure(kind, &e);
                Poll::Unknown
            }
        }
    }

    /// Fetch today's series, transform it and replace the stored series.
    ///
    /// Unlike the other paths this also returns the error so the caller can
    /// abort its chart refresh. The stored series is untouched.
    pub async fn refresh_chart(&self) -> Result<Vec<ConsumptionPoint>, HydrateError> {
        match self.source.fetch_today_series().await {
            Ok(readings) => {
                self.note_ok(SourceKind::Chart);
                let points = transform(&readings);
                self.consumption.send_if_modified(|current| {
                    let changed = *current != points;
                    if changed {
                        current.clone_from(&points);
                    }
                    changed
                });
                Ok(points)
            }
            Err(e) => {
                self.note_failure(SourceKind::Chart, &e);
                Err(e)
            }
        }
    }
}
