//! Test and helper doubles for hydrate_core.

use crate::error::HydrateError;
use crate::source::HydrationSource;
use crate::types::{Reading, UserProfile};
use async_trait::async_trait;
use hydrate_traits::{AnimationPlayer, Headers, HttpClient, HttpError, LightMode, Response};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Queue of outcomes for one endpoint. Once the queue drains, the sticky
/// outcome (if any) repeats forever; otherwise calls fail as transport errors.
#[derive(Debug)]
struct Script<T> {
    queue: VecDeque<Result<T, HydrateError>>,
    sticky: Option<Result<T, HydrateError>>,
    calls: usize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            sticky: None,
            calls: 0,
        }
    }
}

impl<T: Clone> Script<T> {
    fn next(&mut self, endpoint: &str) -> Result<T, HydrateError> {
        self.calls += 1;
        if let Some(r) = self.queue.pop_front() {
            return r;
        }
        self.sticky.clone().unwrap_or_else(|| {
            Err(HydrateError::Transport(format!(
                "{endpoint}: no scripted response"
            )))
        })
    }
}

/// `HydrationSource` that replays scripted outcomes per endpoint.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    series: Mutex<Script<Vec<Reading>>>,
    profile: Mutex<Script<UserProfile>>,
    dock: Mutex<Script<bool>>,
    level: Mutex<Script<f64>>,
    intake: Mutex<Script<f64>>,
}

macro_rules! script_accessors {
    ($field:ident, $ty:ty, $push:ident, $always:ident, $calls:ident) => {
        pub fn $push(&self, r: Result<$ty, HydrateError>) -> &Self {
            lock(&self.$field).queue.push_back(r);
            self
        }

        pub fn $always(&self, r: Result<$ty, HydrateError>) -> &Self {
            lock(&self.$field).sticky = Some(r);
            self
        }

        pub fn $calls(&self) -> usize {
            lock(&self.$field).calls
        }
    };
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    script_accessors!(series, Vec<Reading>, push_series, always_series, series_calls);
    script_accessors!(profile, UserProfile, push_profile, always_profile, profile_calls);
    script_accessors!(dock, bool, push_dock, always_dock, dock_calls);
    script_accessors!(level, f64, push_level, always_level, level_calls);
    script_accessors!(intake, f64, push_intake, always_intake, intake_calls);
}

#[async_trait]
impl HydrationSource for ScriptedSource {
    async fn fetch_today_series(&self) -> Result<Vec<Reading>, HydrateError> {
        lock(&self.series).next("today-water-intake")
    }
    async fn fetch_profile(&self) -> Result<UserProfile, HydrateError> {
        lock(&self.profile).next("profile")
    }
    async fn fetch_dock_presence(&self) -> Result<bool, HydrateError> {
        lock(&self.dock).next("is-bottle-on-dock")
    }
    async fn fetch_level(&self) -> Result<f64, HydrateError> {
        lock(&self.level).next("current-water-level")
    }
    async fn fetch_total_intake(&self) -> Result<f64, HydrateError> {
        lock(&self.intake).next("total-water-intake")
    }
}

/// A recorded GET for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Headers,
}

/// `HttpClient` answering from a URL → reply map; unknown URLs get 404.
#[derive(Debug, Clone, Default)]
pub struct StaticHttpClient {
    replies: Arc<Mutex<HashMap<String, Result<Response, HttpError>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StaticHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, url: impl Into<String>, reply: Result<Response, HttpError>) {
        lock(&self.replies).insert(url.into(), reply);
    }

    pub fn set_json(&self, url: impl Into<String>, body: serde_json::Value) {
        self.set(url, Ok(Response::ok_json(&body)));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl HttpClient for StaticHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        lock(&self.requests).push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
        });
        lock(&self.replies)
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(Response::new(404, "not found")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Play { start: u32, end: u32 },
    Light { mode: LightMode, color: String },
}

/// `AnimationPlayer` that records every instruction. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    events: Arc<Mutex<Vec<PlayerEvent>>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        lock(&self.events).clone()
    }

    pub fn plays(&self) -> Vec<(u32, u32)> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                PlayerEvent::Play { start, end } => Some((*start, *end)),
                PlayerEvent::Light { .. } => None,
            })
            .collect()
    }
}

impl AnimationPlayer for RecordingPlayer {
    fn play(
        &mut self,
        start_frame: u32,
        end_frame: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        lock(&self.events).push(PlayerEvent::Play {
            start: start_frame,
            end: end_frame,
        });
        Ok(())
    }

    fn set_light(
        &mut self,
        mode: LightMode,
        color: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        lock(&self.events).push(PlayerEvent::Light {
            mode,
            color: color.to_string(),
        });
        Ok(())
    }
}
