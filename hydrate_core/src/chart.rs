//! Chart bar styling for consumption points.

use crate::config::PresentationCfg;
use crate::types::ConsumptionPoint;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarKind {
    /// Level went down: the user drank.
    Consumption,
    /// Level went up or stayed put.
    Refill,
}

impl BarKind {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            BarKind::Consumption
        } else {
            BarKind::Refill
        }
    }

    pub fn color<'a>(&self, cfg: &'a PresentationCfg) -> &'a str {
        match self {
            BarKind::Consumption => &cfg.consumption_color,
            BarKind::Refill => &cfg.refill_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    /// Always non-negative; sign lives in `kind`.
    pub height: f64,
    pub kind: BarKind,
}

pub fn chart_bars(points: &[ConsumptionPoint]) -> Vec<ChartBar> {
    points
        .iter()
        .map(|p| ChartBar {
            label: p.bucket_label.clone(),
            height: p.delta.abs(),
            kind: BarKind::of(p.delta),
        })
        .collect()
}
