//! Absolute readings → signed per-bucket deltas.
//!
//! The series from the device is a run of absolute bottle levels. Charting
//! wants what changed between consecutive samples, labelled by hour of day.

use crate::types::{ConsumptionPoint, Reading};

/// Convert an ordered run of absolute readings into consumption deltas.
///
/// - The first reading sets the baseline, whatever its value.
/// - Each later valid reading emits `baseline - value` and becomes the new baseline.
/// - Later invalid readings (`value < 0`) emit nothing and leave the baseline alone.
///
/// Negative deltas (refills) are kept as-is.
pub fn transform(readings: &[Reading]) -> Vec<ConsumptionPoint> {
    let Some((first, rest)) = readings.split_first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(rest.len());
    let mut baseline = first.value;

    for reading in rest {
        if !reading.is_valid() {
            tracing::trace!(value = reading.value, ts = %reading.timestamp, "dropping invalid reading");
            continue;
        }
        out.push(ConsumptionPoint {
            bucket_label: reading.bucket_label(),
            delta: baseline - reading.value,
        });
        baseline = reading.value;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn at(hour: u32, value: f64) -> Reading {
        let tz = FixedOffset::east_opt(0).unwrap();
        Reading::new(value, tz.with_ymd_and_hms(2024, 10, 1, hour, 0, 0).unwrap())
    }

    #[test]
    fn empty_and_single() {
        assert!(transform(&[]).is_empty());
        assert!(transform(&[at(8, 400.0)]).is_empty());
    }

    #[test]
    fn invalid_reading_does_not_move_baseline() {
        let out = transform(&[at(8, 500.0), at(9, -1.0), at(10, 300.0)]);
        assert_eq!(
            out,
            vec![ConsumptionPoint {
                bucket_label: "10".into(),
                delta: 200.0
            }]
        );
    }

    #[test]
    fn first_reading_is_baseline_even_when_negative() {
        let out = transform(&[at(7, -5.0), at(8, 500.0), at(9, 450.0)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].delta, -505.0);
        assert_eq!(out[1].delta, 50.0);
    }
}
