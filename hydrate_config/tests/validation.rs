use hydrate_config::load_toml;
use rstest::rstest;

const BASE: &str = r##"
[api]
base_url = "http://192.168.43.120:8000/api"
user_id = 1
utc_offset = "+00:00"
request_timeout_ms = 800

[polling]
presence_ms = 1000
refresh_ms = 2000
chart_ms = 1000

[bottle]
capacity_ml = 1000.0

[presentation]
total_frames = 110
placed_color = "#008000"
lifted_color = "yellow"

[logging]
level = "info"
rotation = "daily"
"##;

#[test]
fn accepts_full_config() {
    let cfg = load_toml(BASE).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.api.base_url, "http://192.168.43.120:8000/api");
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[rstest]
#[case("base_url = \"http://192.168.43.120:8000/api\"", "base_url = \"\"", "base_url must not be empty")]
#[case("base_url = \"http://192.168.43.120:8000/api\"", "base_url = \"ftp://host/api\"", "http:// or https://")]
#[case("presence_ms = 1000", "presence_ms = 50", "presence_ms must be >= 100")]
#[case("refresh_ms = 2000", "refresh_ms = 7200000", "refresh_ms is unreasonably large")]
#[case("capacity_ml = 1000.0", "capacity_ml = 0.0", "capacity_ml must be > 0")]
#[case("total_frames = 110", "total_frames = 0", "total_frames must be >= 1")]
#[case("lifted_color = \"yellow\"", "lifted_color = \" \"", "lifted_color must not be empty")]
#[case("utc_offset = \"+00:00\"", "utc_offset = \"UTC\"", "utc_offset")]
#[case("rotation = \"daily\"", "rotation = \"weekly\"", "rotation must be one of")]
fn rejects_invalid_field(#[case] from: &str, #[case] to: &str, #[case] needle: &str) {
    let toml = BASE.replacen(from, to, 1);
    assert_ne!(toml, BASE, "replacement must apply");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "error {err} should mention {needle}"
    );
}

#[test]
fn mistyped_field_is_parse_error() {
    let err = load_toml("[polling]\npresence_ms = \"fast\"\n").expect_err("type mismatch");
    assert!(format!("{err}").contains("presence_ms"));
}
