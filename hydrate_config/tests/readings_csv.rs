use std::fs::File;
use std::io::Write;

use hydrate_config::{ReadingRow, load_readings_csv};
use rstest::rstest;
use tempfile::tempdir;

fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("readings.csv");
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

#[rstest]
fn loads_rows_in_file_order() {
    let (_dir, path) = write_csv(
        "data,timestamp\n1000,2024-05-01T08:05:00\n800,2024-05-01T08:40:00+02:00\n",
    );
    let rows = load_readings_csv(&path).unwrap();
    assert_eq!(
        rows,
        vec![
            ReadingRow {
                data: 1000.0,
                timestamp: "2024-05-01T08:05:00".into()
            },
            ReadingRow {
                data: 800.0,
                timestamp: "2024-05-01T08:40:00+02:00".into()
            },
        ]
    );
}

#[rstest]
fn empty_body_is_empty_series() {
    let (_dir, path) = write_csv("data,timestamp\n");
    assert!(load_readings_csv(&path).unwrap().is_empty());
}

#[rstest]
#[case("value,timestamp\n1,2024-05-01T08:05:00\n")]
#[case("timestamp,data\n2024-05-01T08:05:00,1\n")]
fn rejects_wrong_headers(#[case] body: &str) {
    let (_dir, path) = write_csv(body);
    let err = load_readings_csv(&path).expect_err("wrong headers");
    assert!(format!("{err}").contains("data,timestamp"));
}

#[rstest]
fn reports_bad_row_with_line_number() {
    let (_dir, path) = write_csv("data,timestamp\n1000,2024-05-01T08:05:00\nabc,2024-05-01T09:00:00\n");
    let err = load_readings_csv(&path).expect_err("non-numeric data");
    assert!(format!("{err}").contains("row 3"));
}

#[rstest]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_readings_csv(&dir.path().join("nope.csv")).expect_err("missing");
    assert!(format!("{err}").contains("open readings CSV"));
}
