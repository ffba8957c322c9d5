#![no_main]
use chrono::{FixedOffset, TimeZone};
use hydrate_core::{Reading, parse_timestamp, transform};
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    stamp: &'a str,
    points: Vec<(f64, u16)>,
}

fuzz_target!(|input: Input<'_>| {
    let utc = FixedOffset::east_opt(0).unwrap();
    let _ = parse_timestamp(input.stamp, utc);

    let base = utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let readings: Vec<Reading> = input
        .points
        .iter()
        .map(|(v, min)| Reading::new(*v, base + chrono::Duration::minutes(i64::from(*min))))
        .collect();
    let out = transform(&readings);

    let invalid_after_first = readings.iter().skip(1).filter(|r| !r.is_valid()).count();
    assert_eq!(
        out.len(),
        readings.len().saturating_sub(1) - invalid_after_first
    );
    assert!(out.iter().all(|p| p.bucket_label.parse::<u32>().is_ok_and(|h| h < 24)));
});
