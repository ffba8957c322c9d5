//! Engine wiring: poll timers → store → presentation machine → player.

use crate::config::{BottleCfg, PollingCfg, PresentationCfg};
use crate::error::{BuildError, HydrateError, Result};
use crate::presentation::{PresentationMachine, Transition};
use crate::scheduler::PollTask;
use crate::source::HydrationSource;
use crate::store::ViewModelStore;
use hydrate_traits::AnimationPlayer;
use hydrate_traits::clock::{Clock, MonotonicClock};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Forward one transition to the player. Player failures are logged, not raised.
pub fn apply_transition<P: AnimationPlayer + ?Sized>(player: &mut P, t: &Transition) {
    if t.light_changed
        && let Err(e) = player.set_light(t.state.mode, &t.state.color)
    {
        tracing::warn!(error = %e, mode = %t.state.mode, "player rejected light change");
    }
    if let Some(range) = t.play
        && let Err(e) = player.play(range.start, range.end)
    {
        tracing::warn!(error = %e, start = range.start, end = range.end, "player rejected frame range");
    }
}

/// Builder for `Engine`. All fields are validated on `build()`.
pub struct EngineBuilder<S> {
    source: Option<S>,
    polling: PollingCfg,
    presentation: PresentationCfg,
    bottle: BottleCfg,
}

impl<S> Default for EngineBuilder<S> {
    fn default() -> Self {
        Self {
            source: None,
            polling: PollingCfg::default(),
            presentation: PresentationCfg::default(),
            bottle: BottleCfg::default(),
        }
    }
}

impl<S: HydrationSource + 'static> EngineBuilder<S> {
    pub fn with_source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_polling(mut self, polling: PollingCfg) -> Self {
        self.polling = polling;
        self
    }

    pub fn with_presentation(mut self, presentation: PresentationCfg) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn with_bottle(mut self, bottle: BottleCfg) -> Self {
        self.bottle = bottle;
        self
    }

    pub fn build(self) -> Result<Engine<S, MonotonicClock>> {
        self.build_with_clock(MonotonicClock::new())
    }

    pub fn build_with_clock<C: Clock + Send + 'static>(self, clock: C) -> Result<Engine<S, C>> {
        let source = self
            .source
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSource))?;
        if !(self.bottle.capacity_ml.is_finite() && self.bottle.capacity_ml > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "bottle capacity must be > 0",
            )));
        }
        if self.presentation.total_frames == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "total_frames must be >= 1",
            )));
        }
        let p = &self.polling;
        if p.presence.is_zero() || p.refresh.is_zero() || p.chart.is_zero() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "poll periods must be non-zero",
            )));
        }
        Ok(Engine {
            store: Arc::new(ViewModelStore::with_clock(
                source,
                self.bottle.capacity_ml,
                clock,
            )),
            polling: self.polling,
            machine: PresentationMachine::new(self.presentation),
        })
    }
}

pub struct Engine<S, C: Clock = MonotonicClock> {
    store: Arc<ViewModelStore<S, C>>,
    polling: PollingCfg,
    machine: PresentationMachine,
}

impl<S: HydrationSource + 'static> Engine<S, MonotonicClock> {
    pub fn builder() -> EngineBuilder<S> {
        EngineBuilder::default()
    }
}

impl<S, C> Engine<S, C>
where
    S: HydrationSource + 'static,
    C: Clock + Send + 'static,
{
    pub fn store(&self) -> &Arc<ViewModelStore<S, C>> {
        &self.store
    }

    pub fn machine(&self) -> &PresentationMachine {
        &self.machine
    }

    /// Spawn the three poll timers and the presenter. Requires a tokio runtime.
    pub fn start<P: AnimationPlayer + Send + 'static>(self, player: P) -> EngineHandle<P, S, C> {
        let cancel = CancellationToken::new();
        let store = self.store;

        let presence = {
            let store = Arc::clone(&store);
            PollTask::spawn_with_token("presence", self.polling.presence, cancel.clone(), move || {
                let store = Arc::clone(&store);
                async move {
                    store.poll_bottle().await;
                }
            })
        };

        let refresh = {
            let store = Arc::clone(&store);
            PollTask::spawn_with_token("refresh", self.polling.refresh, cancel.clone(), move || {
                let store = Arc::clone(&store);
                async move {
                    store.refresh().await;
                }
            })
        };

        let chart = {
            let store = Arc::clone(&store);
            PollTask::spawn_with_token("chart", self.polling.chart, cancel.clone(), move || {
                let store = Arc::clone(&store);
                async move {
                    // Failures are logged and counted by the store.
                    let _ = store.refresh_chart().await;
                }
            })
        };

        let presenter = tokio::spawn(present(
            Arc::clone(&store),
            self.machine,
            player,
            cancel.clone(),
        ));

        tracing::info!(
            presence_ms = self.polling.presence.as_millis() as u64,
            refresh_ms = self.polling.refresh.as_millis() as u64,
            chart_ms = self.polling.chart.as_millis() as u64,
            "engine started"
        );

        EngineHandle {
            _guard: cancel.clone().drop_guard(),
            cancel,
            tasks: vec![presence, refresh, chart],
            presenter,
            store,
        }
    }
}

async fn present<S, C, P>(
    store: Arc<ViewModelStore<S, C>>,
    mut machine: PresentationMachine,
    mut player: P,
    cancel: CancellationToken,
) -> P
where
    S: HydrationSource,
    C: Clock,
    P: AnimationPlayer,
{
    let mut rx = store.subscribe();
    loop {
        let vm = rx.borrow_and_update().clone();
        let t = machine.advance(&vm);
        apply_transition(&mut player, &t);

        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    tracing::trace!("presenter exiting cleanly");
    player
}

/// Running engine. Dropping it cancels every timer; `shutdown` also
/// returns the player.
pub struct EngineHandle<P, S, C: Clock = MonotonicClock> {
    _guard: DropGuard,
    cancel: CancellationToken,
    tasks: Vec<PollTask>,
    presenter: JoinHandle<P>,
    store: Arc<ViewModelStore<S, C>>,
}

impl<P, S, C> EngineHandle<P, S, C>
where
    P: Send + 'static,
    S: HydrationSource,
    C: Clock,
{
    pub fn store(&self) -> &Arc<ViewModelStore<S, C>> {
        &self.store
    }

    pub async fn shutdown(self) -> Result<P> {
        self.cancel.cancel();
        for task in self.tasks {
            task.stop().await;
        }
        let player = self
            .presenter
            .await
            .map_err(|e| HydrateError::State(format!("presenter task failed: {e}")))?;
        tracing::info!("engine stopped");
        Ok(player)
    }
}
