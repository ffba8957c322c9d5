use chrono::{FixedOffset, TimeZone};
use hydrate_core::mocks::ScriptedSource;
use hydrate_core::{
    HydrateError, Poll, ProfileDetails, Reading, SourceKind, UserProfile, ViewModelStore,
};
use hydrate_traits::ManualClock;
use std::sync::Arc;

fn profile(name: &str, goal: f64) -> UserProfile {
    UserProfile {
        name: name.to_string(),
        daily_goal: goal,
        details: ProfileDetails {
            wakeup_time: "07:00".into(),
            ..ProfileDetails::default()
        },
    }
}

fn down() -> HydrateError {
    HydrateError::Transport("connection refused".into())
}

fn store(src: &Arc<ScriptedSource>) -> ViewModelStore<Arc<ScriptedSource>, ManualClock> {
    ViewModelStore::with_clock(Arc::clone(src), 1000.0, ManualClock::new())
}

#[tokio::test]
async fn refresh_updates_every_field_on_success() {
    let src = Arc::new(ScriptedSource::new());
    src.always_profile(Ok(profile("Asha", 2000.0)))
        .always_intake(Ok(750.0))
        .always_dock(Ok(false))
        .always_level(Ok(430.0));
    let store = store(&src);

    let report = store.refresh().await;
    assert!(report.profile);
    assert!(report.intake);
    assert_eq!(report.bottle.placed, Poll::Fresh(false));

    let vm = store.snapshot();
    assert_eq!(vm.user_name, "Asha");
    assert_eq!(vm.daily_goal, 2000.0);
    assert_eq!(vm.today_intake, 750.0);
    assert!(!vm.bottle.placed);
    assert_eq!(vm.bottle.level, 430.0);
    assert_eq!(vm.details.wakeup_time, "07:00");
    assert_eq!(store.bottle_age_ms(), Some(0));
}

#[tokio::test]
async fn failed_fields_keep_previous_values() {
    let src = Arc::new(ScriptedSource::new());
    src.push_profile(Ok(profile("Asha", 2000.0)))
        .push_intake(Ok(500.0))
        .push_dock(Ok(true))
        .push_level(Ok(600.0));
    let store = store(&src);
    store.refresh().await;

    // Script drained: every further poll fails.
    let report = store.refresh().await;
    assert!(!report.profile);
    assert!(!report.intake);
    assert_eq!(report.bottle.placed, Poll::Stale(true));
    assert_eq!(report.bottle.level, Poll::Stale(600.0));

    let vm = store.snapshot();
    assert_eq!(vm.user_name, "Asha");
    assert_eq!(vm.today_intake, 500.0);
    assert_eq!(vm.bottle.level, 600.0);
}

#[tokio::test]
async fn one_failure_does_not_block_other_fields() {
    let src = Arc::new(ScriptedSource::new());
    src.always_profile(Err(down()))
        .always_intake(Ok(1200.0))
        .always_dock(Err(down()))
        .always_level(Ok(90.0));
    let store = store(&src);

    let report = store.refresh().await;
    assert!(!report.profile);
    assert!(report.intake);

    let vm = store.snapshot();
    assert_eq!(vm.user_name, "");
    assert_eq!(vm.today_intake, 1200.0);
    assert!(vm.bottle.placed, "default placed survives a failed dock poll");
    assert_eq!(vm.bottle.level, 90.0);
}

#[tokio::test]
async fn stats_count_failures_and_recovery() {
    let src = Arc::new(ScriptedSource::new());
    src.push_intake(Err(down()))
        .push_intake(Err(down()))
        .always_intake(Ok(10.0));
    let store = store(&src);

    store.refresh_intake().await;
    store.refresh_intake().await;
    let s = store.stats().get(SourceKind::Intake);
    assert_eq!((s.ok, s.failed, s.consecutive_failures), (0, 2, 2));

    store.refresh_intake().await;
    let s = store.stats().get(SourceKind::Intake);
    assert_eq!((s.ok, s.failed, s.consecutive_failures), (1, 2, 0));
    assert_eq!(store.stats().snapshot().len(), 5);
}

#[tokio::test]
async fn subscribers_see_only_real_changes() {
    let src = Arc::new(ScriptedSource::new());
    src.always_intake(Ok(300.0));
    let store = store(&src);
    let mut rx = store.subscribe();
    rx.borrow_and_update();

    store.refresh_intake().await;
    assert!(rx.has_changed().unwrap());
    rx.borrow_and_update();

    store.refresh_intake().await;
    assert!(!rx.has_changed().unwrap(), "same value must not notify");
}

#[tokio::test]
async fn chart_refresh_transforms_and_keeps_series_on_failure() {
    let off = FixedOffset::east_opt(0).unwrap();
    let at = |h| off.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap();
    let src = Arc::new(ScriptedSource::new());
    src.push_series(Ok(vec![
        Reading::new(1000.0, at(8)),
        Reading::new(800.0, at(9)),
        Reading::new(950.0, at(10)),
    ]))
    .push_series(Err(HydrateError::Status {
        endpoint: "today-water-intake",
        status: 500,
    }));
    let store = store(&src);

    let points = store.refresh_chart().await.unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].delta, 200.0);
    assert_eq!(points[1].delta, -150.0);

    let err = store.refresh_chart().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(store.consumption(), points);
    assert_eq!(store.stats().get(SourceKind::Chart).failed, 1);
}

#[tokio::test]
async fn overlapping_refreshes_last_write_wins() {
    let src = Arc::new(ScriptedSource::new());
    src.push_intake(Ok(100.0)).push_intake(Ok(200.0));
    let store = store(&src);
    tokio::join!(store.refresh_intake(), store.refresh_intake());
    assert_eq!(store.snapshot().today_intake, 200.0);
}
