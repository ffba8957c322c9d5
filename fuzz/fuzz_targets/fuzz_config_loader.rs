#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validate arbitrary TOML; errors are fine, panics are not.
    if let Ok(cfg) = toml::from_str::<hydrate_config::Config>(data) {
        let _ = cfg.validate();
        let _ = cfg.api.utc_offset_seconds();
    }
    let _ = hydrate_config::parse_utc_offset(data);
});
