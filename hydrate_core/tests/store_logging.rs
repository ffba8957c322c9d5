//! Failure and recovery logging is the same for every polled source.

use chrono::{FixedOffset, TimeZone};
use hydrate_core::mocks::ScriptedSource;
use hydrate_core::{HydrateError, Reading, SourceKind, ViewModelStore};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct LogBuf(Arc<Mutex<Vec<u8>>>);

impl LogBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for LogBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuf {
    type Writer = LogBuf;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture() -> (LogBuf, tracing::subscriber::DefaultGuard) {
    let buf = LogBuf::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buf.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buf, guard)
}

fn down() -> HydrateError {
    HydrateError::Status {
        endpoint: "today-water-intake",
        status: 503,
    }
}

#[tokio::test]
async fn chart_failures_warn_once_then_report_recovery() {
    let (logs, _guard) = capture();
    let off = FixedOffset::east_opt(0).unwrap();
    let at = |h| off.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap();

    let src = Arc::new(ScriptedSource::new());
    src.push_series(Err(down()))
        .push_series(Err(down()))
        .always_series(Ok(vec![
            Reading::new(900.0, at(8)),
            Reading::new(700.0, at(9)),
        ]));
    let store = ViewModelStore::new(Arc::clone(&src), 1000.0);

    assert!(store.refresh_chart().await.is_err());
    assert!(store.refresh_chart().await.is_err());
    let s = store.stats().get(SourceKind::Chart);
    assert_eq!((s.failed, s.consecutive_failures), (2, 2));

    assert_eq!(store.refresh_chart().await.unwrap().len(), 1);
    let s = store.stats().get(SourceKind::Chart);
    assert_eq!((s.ok, s.consecutive_failures), (1, 0));

    let text = logs.text();
    let warns: Vec<&str> = text
        .lines()
        .filter(|l| l.contains("WARN") && l.contains("source=\"chart\""))
        .collect();
    assert_eq!(warns.len(), 1, "logs:\n{text}");
    assert!(warns[0].contains("poll failed"));
    assert!(text.contains("poll still failing"), "logs:\n{text}");
    assert!(
        text.lines()
            .any(|l| l.contains("source recovered") && l.contains("source=\"chart\"")),
        "logs:\n{text}"
    );
}

#[tokio::test]
async fn intake_and_chart_share_the_failure_message() {
    let (logs, _guard) = capture();
    let src = Arc::new(ScriptedSource::new());
    src.always_intake(Err(HydrateError::Transport("refused".into())))
        .always_series(Err(down()));
    let store = ViewModelStore::new(Arc::clone(&src), 1000.0);

    store.refresh_intake().await;
    let _ = store.refresh_chart().await;

    let text = logs.text();
    for source in ["intake", "chart"] {
        assert!(
            text.lines().any(|l| l.contains("poll failed")
                && l.contains(&format!("source=\"{source}\""))),
            "no failure line for {source}:\n{text}"
        );
    }
}
