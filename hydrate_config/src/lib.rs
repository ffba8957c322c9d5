#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and readings CSV parsing for the hydration engine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The readings CSV loader enforces headers so offline series can be fed
//!   through the same transformer as the live API.
use serde::Deserialize;

/// Raw reading row as exported by the bottle backend.
///
/// Expected headers:
/// data,timestamp
///
/// Example:
/// data,timestamp
/// 1000,2024-05-01T08:05:00
/// 800,2024-05-01T08:40:00+02:00
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ReadingRow {
    pub data: f64,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Api {
    /// Base URL including the `/api` prefix.
    pub base_url: String,
    pub user_id: u64,
    /// "+HH:MM" / "-HH:MM", applied to timestamps without an offset
    pub utc_offset: String,
    pub request_timeout_ms: u64,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            user_id: 1,
            utc_offset: "+00:00".to_string(),
            request_timeout_ms: 800,
        }
    }
}

impl Api {
    /// Parse `utc_offset` into seconds east of UTC.
    pub fn utc_offset_seconds(&self) -> eyre::Result<i32> {
        parse_utc_offset(&self.utc_offset)
    }
}

/// Parse "±HH:MM" into seconds east of UTC.
pub fn parse_utc_offset(s: &str) -> eyre::Result<i32> {
    let s = s.trim();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => eyre::bail!("api.utc_offset must look like +HH:MM, got {s:?}"),
    };
    let Some((hh, mm)) = rest.split_once(':') else {
        eyre::bail!("api.utc_offset must look like +HH:MM, got {s:?}");
    };
    if hh.len() != 2 || mm.len() != 2 {
        eyre::bail!("api.utc_offset must look like +HH:MM, got {s:?}");
    }
    let h: i32 = hh
        .parse()
        .map_err(|_| eyre::eyre!("api.utc_offset hours not numeric: {s:?}"))?;
    let m: i32 = mm
        .parse()
        .map_err(|_| eyre::eyre!("api.utc_offset minutes not numeric: {s:?}"))?;
    if h > 23 || m > 59 {
        eyre::bail!("api.utc_offset out of range: {s:?}");
    }
    Ok(sign * (h * 3600 + m * 60))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Polling {
    /// Dock presence + level cadence
    pub presence_ms: u64,
    /// Profile + total intake cadence
    pub refresh_ms: u64,
    /// Consumption chart cadence
    pub chart_ms: u64,
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            presence_ms: 1000,
            refresh_ms: 2000,
            chart_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Bottle {
    pub capacity_ml: f64,
}

impl Default for Bottle {
    fn default() -> Self {
        Self {
            capacity_ml: 1000.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Presentation {
    pub total_frames: u32,
    pub placed_color: String,
    pub lifted_color: String,
    pub consumption_color: String,
    pub refill_color: String,
}

impl Default for Presentation {
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

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub polling: Polling,
    #[serde(default)]
    pub bottle: Bottle,
    #[serde(default)]
    pub presentation: Presentation,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_readings_csv(path: &std::path::Path) -> eyre::Result<Vec<ReadingRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open readings CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["data", "timestamp"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "readings CSV must have headers 'data,timestamp', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ReadingRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(rows)
}

const MIN_CADENCE_MS: u64 = 100;
const MAX_CADENCE_MS: u64 = 60 * 60 * 1000;

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Api
        let url = self.api.base_url.trim();
        if url.is_empty() {
            eyre::bail!("api.base_url must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            eyre::bail!("api.base_url must start with http:// or https://");
        }
        if self.api.request_timeout_ms == 0 {
            eyre::bail!("api.request_timeout_ms must be >= 1");
        }
        self.api.utc_offset_seconds()?;

        // Polling
        for (name, ms) in [
            ("polling.presence_ms", self.polling.presence_ms),
            ("polling.refresh_ms", self.polling.refresh_ms),
            ("polling.chart_ms", self.polling.chart_ms),
        ] {
            if ms < MIN_CADENCE_MS {
                eyre::bail!("{name} must be >= {MIN_CADENCE_MS}");
            }
            if ms > MAX_CADENCE_MS {
                eyre::bail!("{name} is unreasonably large (>1h)");
            }
        }

        // Bottle
        if !self.bottle.capacity_ml.is_finite() || self.bottle.capacity_ml <= 0.0 {
            eyre::bail!("bottle.capacity_ml must be > 0");
        }

        // Presentation
        if self.presentation.total_frames == 0 {
            eyre::bail!("presentation.total_frames must be >= 1");
        }
        for (name, color) in [
            ("presentation.placed_color", &self.presentation.placed_color),
            ("presentation.lifted_color", &self.presentation.lifted_color),
            (
                "presentation.consumption_color",
                &self.presentation.consumption_color,
            ),
            ("presentation.refill_color", &self.presentation.refill_color),
        ] {
            if color.trim().is_empty() {
                eyre::bail!("{name} must not be empty");
            }
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = load_toml("").expect("parse");
        assert_eq!(cfg.api.user_id, 1);
        assert_eq!(cfg.polling.refresh_ms, 2000);
        assert_eq!(cfg.presentation.total_frames, 110);
        cfg.validate().expect("defaults validate");
    }

    #[test]
    fn offset_parses_both_signs() {
        assert_eq!(parse_utc_offset("+02:00").unwrap(), 7200);
        assert_eq!(parse_utc_offset("-05:30").unwrap(), -(5 * 3600 + 30 * 60));
        assert_eq!(parse_utc_offset("+00:00").unwrap(), 0);
    }

    #[test]
    fn offset_rejects_garbage() {
        for bad in ["", "02:00", "+2:00", "+24:00", "+01:60", "+ab:cd", "UTC"] {
            assert!(parse_utc_offset(bad).is_err(), "{bad:?} should fail");
        }
    }
}
