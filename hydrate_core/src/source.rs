//! Reading source adapter.
//!
//! Every endpoint sits behind a uniform `fetch_*() -> Result<T, HydrateError>`
//! call. Transport failures, non-2xx answers and bad payloads all come back
//! as typed errors; nothing here panics or retries.

use crate::error::HydrateError;
use crate::transport_error::map_http_error;
use crate::types::{ProfileDetails, Reading, UserProfile};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use hydrate_traits::{Headers, HttpClient};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    TodaySeries,
    Profile,
    DockPresence,
    Level,
    TotalIntake,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::TodaySeries,
        Endpoint::Profile,
        Endpoint::DockPresence,
        Endpoint::Level,
        Endpoint::TotalIntake,
    ];

    pub fn path(self, user_id: u64) -> String {
        match self {
            Endpoint::TodaySeries => format!("/v1/user/{user_id}/today-water-intake"),
            Endpoint::Profile => format!("/v1/user/{user_id}"),
            Endpoint::DockPresence => format!("/v1/user/{user_id}/is-bottle-on-dock"),
            Endpoint::Level => format!("/v1/user/{user_id}/current-water-level"),
            Endpoint::TotalIntake => format!("/v1/user/{user_id}/total-water-intake"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::TodaySeries => "today-water-intake",
            Endpoint::Profile => "profile",
            Endpoint::DockPresence => "is-bottle-on-dock",
            Endpoint::Level => "current-water-level",
            Endpoint::TotalIntake => "total-water-intake",
        }
    }
}

/// The five telemetry reads the engine depends on.
#[async_trait]
pub trait HydrationSource: Send + Sync {
    /// Today's absolute readings, in server order. Malformed points are dropped.
    async fn fetch_today_series(&self) -> Result<Vec<Reading>, HydrateError>;
    async fn fetch_profile(&self) -> Result<UserProfile, HydrateError>;
    async fn fetch_dock_presence(&self) -> Result<bool, HydrateError>;
    async fn fetch_level(&self) -> Result<f64, HydrateError>;
    async fn fetch_total_intake(&self) -> Result<f64, HydrateError>;
}

#[async_trait]
impl<T: HydrationSource + ?Sized> HydrationSource for Arc<T> {
    async fn fetch_today_series(&self) -> Result<Vec<Reading>, HydrateError> {
        (**self).fetch_today_series().await
    }
    async fn fetch_profile(&self) -> Result<UserProfile, HydrateError> {
        (**self).fetch_profile().await
    }
    async fn fetch_dock_presence(&self) -> Result<bool, HydrateError> {
        (**self).fetch_dock_presence().await
    }
    async fn fetch_level(&self) -> Result<f64, HydrateError> {
        (**self).fetch_level().await
    }
    async fn fetch_total_intake(&self) -> Result<f64, HydrateError> {
        (**self).fetch_total_intake().await
    }
}

// ── Wire payloads ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawReading {
    data: Option<f64>,
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfilePayload {
    name: Option<String>,
    daily_goal: Option<f64>,
    #[serde(default)]
    bottle_weight: Option<f64>,
    #[serde(default)]
    wakeup_time: Option<String>,
    #[serde(default)]
    sleep_time: Option<String>,
    #[serde(default)]
    sensor_id: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct DockPayload {
    is_bottle_on_dock: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct LevelPayload {
    current_water_level: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TotalIntakePayload {
    total_water_intake: Option<f64>,
}

/// Parse an API timestamp. RFC 3339 strings keep their own offset; naive
/// ISO strings are placed in `offset`.
pub fn parse_timestamp(s: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
}

fn sensor_id_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn non_negative(endpoint: Endpoint, field: &str, v: Option<f64>) -> Result<f64, HydrateError> {
    match v {
        Some(x) if x.is_finite() && x >= 0.0 => Ok(x),
        Some(x) => Err(HydrateError::Validation(format!(
            "{}: {field} = {x} is not a non-negative number",
            endpoint.name()
        ))),
        None => Err(HydrateError::Validation(format!(
            "{}: {field} is null",
            endpoint.name()
        ))),
    }
}

// ── HTTP-backed source ───────────────────────────────────────────────────────

/// `HydrationSource` over any `HttpClient`.
#[derive(Debug, Clone)]
pub struct HttpSource<C> {
    client: C,
    base_url: String,
    user_id: u64,
    utc_offset: FixedOffset,
    headers: Headers,
}

impl<C: HttpClient> HttpSource<C> {
    pub fn new(client: C, base_url: impl Into<String>, user_id: u64, utc_offset: FixedOffset) -> Self {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
            utc_offset,
            headers,
        }
    }

    pub fn from_cfg(client: C, cfg: &crate::config::SourceCfg) -> Self {
        Self::new(client, cfg.base_url.clone(), cfg.user_id, cfg.utc_offset)
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path(self.user_id))
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, HydrateError> {
        let url = self.url(endpoint);
        let resp = self
            .client
            .get(&url, &self.headers)
            .await
            .map_err(|e| map_http_error(endpoint.name(), &e))?;
        if !resp.is_success() {
            return Err(HydrateError::Status {
                endpoint: endpoint.name(),
                status: resp.status,
            });
        }
        resp.json::<T>()
            .map_err(|e| HydrateError::Validation(format!("{}: {e}", endpoint.name())))
    }
}

#[async_trait]
impl<C: HttpClient> HydrationSource for HttpSource<C> {
    async fn fetch_today_series(&self) -> Result<Vec<Reading>, HydrateError> {
        let raw: Vec<RawReading> = self.get_json(Endpoint::TodaySeries).await?;
        let total = raw.len();
        let readings: Vec<Reading> = raw
            .into_iter()
            .filter_map(|r| {
                let value = r.data?;
                let ts = parse_timestamp(r.timestamp.as_deref()?, self.utc_offset)?;
                Some(Reading::new(value, ts))
            })
            .collect();
        if readings.len() < total {
            tracing::debug!(
                dropped = total - readings.len(),
                total,
                "dropped malformed series points"
            );
        }
        Ok(readings)
    }

    async fn fetch_profile(&self) -> Result<UserProfile, HydrateError> {
        let p: ProfilePayload = self.get_json(Endpoint::Profile).await?;
        let name = p.name.ok_or_else(|| {
            HydrateError::Validation(format!("{}: name is null", Endpoint::Profile.name()))
        })?;
        let daily_goal = non_negative(Endpoint::Profile, "daily_goal", p.daily_goal)?;
        Ok(UserProfile {
            name,
            daily_goal,
            details: ProfileDetails {
                bottle_weight: p.bottle_weight.unwrap_or(0.0),
                wakeup_time: p.wakeup_time.unwrap_or_default(),
                sleep_time: p.sleep_time.unwrap_or_default(),
                sensor_id: sensor_id_string(&p.sensor_id),
            },
        })
    }

    async fn fetch_dock_presence(&self) -> Result<bool, HydrateError> {
        let p: DockPayload = self.get_json(Endpoint::DockPresence).await?;
        p.is_bottle_on_dock.ok_or_else(|| {
            HydrateError::Validation(format!(
                "{}: is_bottle_on_dock is null",
                Endpoint::DockPresence.name()
            ))
        })
    }

    async fn fetch_level(&self) -> Result<f64, HydrateError> {
        let p: LevelPayload = self.get_json(Endpoint::Level).await?;
        non_negative(Endpoint::Level, "current_water_level", p.current_water_level)
    }

    async fn fetch_total_intake(&self) -> Result<f64, HydrateError> {
        let p: TotalIntakePayload = self.get_json(Endpoint::TotalIntake).await?;
        non_negative(Endpoint::TotalIntake, "total_water_intake", p.total_water_intake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn endpoint_paths_follow_api_layout() {
        assert_eq!(Endpoint::Profile.path(1), "/v1/user/1");
        assert_eq!(
            Endpoint::TodaySeries.path(7),
            "/v1/user/7/today-water-intake"
        );
        assert_eq!(
            Endpoint::DockPresence.path(1),
            "/v1/user/1/is-bottle-on-dock"
        );
        assert_eq!(Endpoint::Level.path(1), "/v1/user/1/current-water-level");
        assert_eq!(
            Endpoint::TotalIntake.path(1),
            "/v1/user/1/total-water-intake"
        );
    }

    #[test]
    fn timestamps_rfc3339_and_naive() {
        let ist = FixedOffset::east_opt(19800).unwrap();
        let dt = parse_timestamp("2024-10-01T09:15:00+00:00", ist).unwrap();
        assert_eq!(dt.hour(), 9);
        let dt = parse_timestamp("2024-10-01T09:15:00.123456", ist).unwrap();
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.offset(), &ist);
        let dt = parse_timestamp("2024-10-01 21:00:00", ist).unwrap();
        assert_eq!(dt.hour(), 21);
        assert!(parse_timestamp("yesterday", ist).is_none());
    }

    #[test]
    fn sensor_id_accepts_numbers_and_strings() {
        assert_eq!(sensor_id_string(&serde_json::json!("abc")), "abc");
        assert_eq!(sensor_id_string(&serde_json::json!(42)), "42");
        assert_eq!(sensor_id_string(&serde_json::Value::Null), "");
    }
}
