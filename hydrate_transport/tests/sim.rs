use chrono::{FixedOffset, Offset, Utc};
use hydrate_core::{HttpSource, HydrateError, HydrationSource, transform};
use hydrate_traits::{Headers, HttpClient};
use hydrate_transport::{SimConfig, SimulatedDevice};
use rstest::rstest;
use std::sync::Arc;

fn device(fail_every: Option<u64>) -> Arc<SimulatedDevice> {
    Arc::new(
        SimulatedDevice::new(SimConfig {
            fail_every,
            ..SimConfig::default()
        })
        .unwrap(),
    )
}

fn source(dev: &Arc<SimulatedDevice>) -> HttpSource<Arc<SimulatedDevice>> {
    let utc: FixedOffset = Utc.fix();
    HttpSource::new(Arc::clone(dev), "http://sim.local/api", 1, utc)
}

#[tokio::test]
async fn profile_is_served() {
    let dev = device(None);
    let p = source(&dev).fetch_profile().await.unwrap();
    assert_eq!(p.name, "Simulated User");
    assert_eq!(p.daily_goal, 2000.0);
    assert_eq!(p.details.sensor_id, "sim-1");
}

#[tokio::test]
async fn bottle_is_lifted_then_sipped_from() {
    let dev = device(None);
    let src = source(&dev);
    let mut docks = Vec::new();
    for _ in 0..6 {
        docks.push(src.fetch_dock_presence().await.unwrap());
    }
    assert_eq!(docks, vec![true, true, true, false, false, true]);
    assert_eq!(src.fetch_level().await.unwrap(), 880.0);
    assert_eq!(src.fetch_total_intake().await.unwrap(), 120.0);
}

#[tokio::test]
async fn series_transforms_into_sips_and_refills() {
    let dev = device(None);
    let src = source(&dev);
    // 9 cycles of 6 steps: 9 sips of 120 ml, refill after the 8th.
    for _ in 0..54 {
        src.fetch_dock_presence().await.unwrap();
    }
    let readings = src.fetch_today_series().await.unwrap();
    let points = transform(&readings);
    let sips = points.iter().filter(|p| p.delta > 0.0).count();
    let refills = points.iter().filter(|p| p.delta < 0.0).count();
    assert_eq!(sips, 9);
    assert_eq!(refills, 1);
    assert!(points.iter().all(|p| p.delta.abs() > 0.0));
}

#[rstest]
#[case(3)]
#[case(7)]
#[tokio::test]
async fn every_nth_request_fails(#[case] n: u64) {
    let dev = device(Some(n));
    let src = source(&dev);
    let mut failures = 0;
    for _ in 0..(n * 4) {
        if let Err(e) = src.fetch_level().await {
            assert!(matches!(e, HydrateError::Transport(_)));
            failures += 1;
        }
    }
    assert_eq!(failures, 4);
    assert_eq!(dev.requests(), n * 4);
}

#[tokio::test]
async fn unknown_user_and_path_are_404() {
    let dev = device(None);
    let r = dev
        .get("http://sim.local/api/v1/user/2", &Headers::new())
        .await
        .unwrap();
    assert_eq!(r.status, 404);
    let r = dev
        .get("http://sim.local/api/v1/user/1/nope", &Headers::new())
        .await
        .unwrap();
    assert_eq!(r.status, 404);
}
