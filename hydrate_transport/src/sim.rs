//! Simulated smart bottle speaking the telemetry API.
//!
//! The model is driven by requests, not wall time, so runs are repeatable:
//! every dock-presence request advances one step. Each step is one minute of
//! simulated time. Within every cycle of `cycle_steps` the bottle is lifted
//! for the last `lift_steps`; when it comes back the user has sipped
//! `sip_ml`. Once the level drops below one sip the bottle is refilled.

use crate::error::{Result, TransportError};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use hydrate_traits::{Headers, HttpClient, HttpError, Response};
use serde_json::json;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub user_id: u64,
    pub user_name: String,
    pub daily_goal: f64,
    pub capacity_ml: f64,
    pub sip_ml: f64,
    pub cycle_steps: u64,
    pub lift_steps: u64,
    /// Fail every Nth request with a connection error; `None` never fails.
    pub fail_every: Option<u64>,
    /// Simulated wall-clock time of step 0.
    pub start: NaiveDateTime,
}

impl Default for SimConfig {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(7, 0, 0))
            .unwrap_or_default();
        Self {
            user_id: 1,
            user_name: "Simulated User".to_string(),
            daily_goal: 2000.0,
            capacity_ml: 1000.0,
            sip_ml: 120.0,
            cycle_steps: 6,
            lift_steps: 2,
            fail_every: Some(7),
            start,
        }
    }
}

#[derive(Debug)]
struct DeviceState {
    step: u64,
    requests: u64,
    placed: bool,
    level: f64,
    intake: f64,
    series: Vec<(f64, NaiveDateTime)>,
}

#[derive(Debug)]
pub struct SimulatedDevice {
    cfg: SimConfig,
    state: Mutex<DeviceState>,
}

impl SimulatedDevice {
    pub fn new(cfg: SimConfig) -> Result<Self> {
        if !(cfg.capacity_ml.is_finite() && cfg.capacity_ml > 0.0) {
            return Err(TransportError::Simulator("capacity_ml must be > 0"));
        }
        if !(cfg.sip_ml.is_finite() && cfg.sip_ml > 0.0 && cfg.sip_ml <= cfg.capacity_ml) {
            return Err(TransportError::Simulator("sip_ml must be in (0, capacity_ml]"));
        }
        if cfg.cycle_steps == 0 || cfg.lift_steps >= cfg.cycle_steps {
            return Err(TransportError::Simulator(
                "lift_steps must be smaller than a non-zero cycle_steps",
            ));
        }
        if cfg.fail_every == Some(0) {
            return Err(TransportError::Simulator("fail_every must be >= 1"));
        }
        let state = DeviceState {
            step: 0,
            requests: 0,
            placed: true,
            level: cfg.capacity_ml,
            intake: 0.0,
            series: vec![(cfg.capacity_ml, cfg.start)],
        };
        Ok(Self {
            cfg,
            state: Mutex::new(state),
        })
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Requests served so far, including injected failures.
    pub fn requests(&self) -> u64 {
        self.state().requests
    }

    pub fn level(&self) -> f64 {
        self.state().level
    }

    pub fn intake(&self) -> f64 {
        self.state().intake
    }

    pub fn is_placed(&self) -> bool {
        self.state().placed
    }

    fn advance(&self, s: &mut DeviceState) {
        s.step += 1;
        let now = self.cfg.start + Duration::minutes(i64::try_from(s.step).unwrap_or(i64::MAX));
        let phase = s.step % self.cfg.cycle_steps;
        let lifted = phase >= self.cfg.cycle_steps - self.cfg.lift_steps;

        if s.placed && lifted {
            tracing::trace!(step = s.step, "sim: bottle lifted");
        }
        if !s.placed && !lifted {
            let sip = self.cfg.sip_ml.min(s.level);
            s.level -= sip;
            s.intake += sip;
            s.series.push((s.level, now));
            tracing::trace!(step = s.step, sip, level = s.level, "sim: sip");
            if s.level < self.cfg.sip_ml {
                s.level = self.cfg.capacity_ml;
                s.series.push((s.level, now));
                tracing::trace!(step = s.step, "sim: refill");
            }
        }
        s.placed = !lifted;
    }

    fn route(&self, s: &mut DeviceState, path: &str) -> Response {
        let prefix = format!("/v1/user/{}", self.cfg.user_id);
        let Some(rest) = path.strip_prefix(&prefix) else {
            return Response::new(404, "not found");
        };
        match rest {
            "" => Response::ok_json(&json!({
                "name": self.cfg.user_name,
                "daily_goal": self.cfg.daily_goal,
                "bottle_weight": 320.0,
                "wakeup_time": "07:00",
                "sleep_time": "23:00",
                "sensor_id": format!("sim-{}", self.cfg.user_id),
            })),
            "/is-bottle-on-dock" => {
                self.advance(s);
                Response::ok_json(&json!({ "is_bottle_on_dock": s.placed }))
            }
            "/current-water-level" => {
                Response::ok_json(&json!({ "current_water_level": s.level }))
            }
            "/total-water-intake" => {
                Response::ok_json(&json!({ "total_water_intake": s.intake }))
            }
            "/today-water-intake" => {
                let points: Vec<serde_json::Value> = s
                    .series
                    .iter()
                    .map(|(level, ts)| {
                        json!({
                            "data": level,
                            "timestamp": ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
                        })
                    })
                    .collect();
                Response::ok_json(&serde_json::Value::Array(points))
            }
            _ => Response::new(404, "not found"),
        }
    }
}

/// Path component of an absolute URL, without query string.
fn url_path(url: &str) -> Option<&str> {
    let after_scheme = url.split_once("://")?.1;
    let path = after_scheme.find('/').map_or("/", |i| &after_scheme[i..]);
    Some(path.split('?').next().unwrap_or(path))
}

#[async_trait]
impl HttpClient for SimulatedDevice {
    async fn get(&self, url: &str, _headers: &Headers) -> std::result::Result<Response, HttpError> {
        let path = url_path(url).ok_or_else(|| HttpError::InvalidUrl(url.to_string()))?;
        let mut s = self.state();
        s.requests += 1;
        if let Some(n) = self.cfg.fail_every
            && s.requests % n == 0
        {
            tracing::trace!(request = s.requests, "sim: injected failure");
            return Err(HttpError::ConnectionFailed("simulated outage".to_string()));
        }
        // Base URLs carry an "/api" style prefix; route on the part from "/v1/".
        let api_path = path.find("/v1/").map_or(path, |i| &path[i..]);
        Ok(self.route(&mut s, api_path))
    }
}
