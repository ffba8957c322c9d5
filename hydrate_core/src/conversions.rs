//! Conversions bridging `hydrate_config` types to `hydrate_core` types.

use crate::config::{BottleCfg, PollingCfg, PresentationCfg, SourceCfg};
use crate::error::HydrateError;
use crate::source::parse_timestamp;
use crate::types::Reading;
use chrono::FixedOffset;
use std::time::Duration;

// ── SourceCfg ────────────────────────────────────────────────────────────────

impl TryFrom<&hydrate_config::Api> for SourceCfg {
    type Error = HydrateError;

    fn try_from(c: &hydrate_config::Api) -> Result<Self, Self::Error> {
        let secs = c
            .utc_offset_seconds()
            .map_err(|e| HydrateError::Configuration(e.to_string()))?;
        let utc_offset = FixedOffset::east_opt(secs).ok_or_else(|| {
            HydrateError::Configuration(format!("api.utc_offset out of range: {}", c.utc_offset))
        })?;
        Ok(Self {
            base_url: c.base_url.trim().trim_end_matches('/').to_string(),
            user_id: c.user_id,
            utc_offset,
            request_timeout: Duration::from_millis(c.request_timeout_ms),
        })
    }
}

// ── PollingCfg ───────────────────────────────────────────────────────────────

impl From<&hydrate_config::Polling> for PollingCfg {
    fn from(c: &hydrate_config::Polling) -> Self {
        Self {
            presence: Duration::from_millis(c.presence_ms),
            refresh: Duration::from_millis(c.refresh_ms),
            chart: Duration::from_millis(c.chart_ms),
        }
    }
}

// ── BottleCfg ────────────────────────────────────────────────────────────────

impl From<&hydrate_config::Bottle> for BottleCfg {
    fn from(c: &hydrate_config::Bottle) -> Self {
        Self {
            capacity_ml: c.capacity_ml,
        }
    }
}

// ── PresentationCfg ──────────────────────────────────────────────────────────

impl From<&hydrate_config::Presentation> for PresentationCfg {
    fn from(c: &hydrate_config::Presentation) -> Self {
        Self {
            total_frames: c.total_frames,
            placed_color: c.placed_color.clone(),
            lifted_color: c.lifted_color.clone(),
            consumption_color: c.consumption_color.clone(),
            refill_color: c.refill_color.clone(),
        }
    }
}

// ── Readings ─────────────────────────────────────────────────────────────────

/// Turn CSV rows into readings, in file order.
///
/// Rows whose timestamp does not parse are rejected rather than skipped:
/// a hand-edited file with a typo should fail loudly.
pub fn readings_from_rows(
    rows: &[hydrate_config::ReadingRow],
    offset: FixedOffset,
) -> Result<Vec<Reading>, HydrateError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            parse_timestamp(&row.timestamp, offset)
                .map(|ts| Reading::new(row.data, ts))
                .ok_or_else(|| {
                    HydrateError::Validation(format!(
                        "row {}: unparseable timestamp {:?}",
                        idx + 2,
                        row.timestamp
                    ))
                })
        })
        .collect()
}
