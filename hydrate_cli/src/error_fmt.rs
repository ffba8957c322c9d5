//! Human-readable error descriptions, exit codes and structured JSON errors.

use hydrate_core::error::{BuildError, HydrateError};

pub const EXIT_GENERIC: i32 = 1;
pub const EXIT_TRANSPORT: i32 = 3;
pub const EXIT_CONFIG: i32 = 4;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSource => {
                "What happened: No telemetry source was provided to the engine.\nLikely causes: The HTTP client failed to initialize or was not wired into the builder.\nHow to fix: Check [api] in the config, or try --sim.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/hydrate.toml for a sample."
            ),
        };
    }

    if let Some(he) = err.downcast_ref::<HydrateError>() {
        return match he {
            HydrateError::Transport(msg) => format!(
                "What happened: The bottle API could not be reached ({msg}).\nLikely causes: Device offline, wrong api.base_url, or a network outage.\nHow to fix: Check that the device is powered and on the same network, verify --base-url, or raise api.request_timeout_ms."
            ),
            HydrateError::Status { endpoint, status } => format!(
                "What happened: The {endpoint} endpoint answered HTTP {status}.\nLikely causes: Unknown user id, or the server is failing.\nHow to fix: Verify api.user_id / --user-id and check the server logs."
            ),
            HydrateError::Validation(msg) => format!(
                "What happened: The API returned data that could not be used ({msg}).\nLikely causes: Sensor error or an incompatible server version.\nHow to fix: Re-run with --log-level=debug to see the payload."
            ),
            HydrateError::Configuration(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: A missing file, a typo, or an out-of-range value in the TOML.\nHow to fix: Edit the config file and try again. See etc/hydrate.toml for a sample."
            ),
            HydrateError::State(msg) => format!(
                "What happened: Internal error ({msg}).\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("readings csv must have headers") {
        return "Invalid headers in readings CSV. Expected 'data,timestamp'.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 transport, 4 configuration, 1 anything else.
/// Usage errors exit with 2 from clap before this is reached.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return EXIT_CONFIG;
    }
    match err.downcast_ref::<HydrateError>() {
        Some(e) if e.is_transport() => EXIT_TRANSPORT,
        Some(HydrateError::Configuration(_)) => EXIT_CONFIG,
        _ => EXIT_GENERIC,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Configuration";
    }
    match err.downcast_ref::<HydrateError>() {
        Some(HydrateError::Transport(_)) => "Transport",
        Some(HydrateError::Status { .. }) => "Status",
        Some(HydrateError::Validation(_)) => "Validation",
        Some(HydrateError::Configuration(_)) => "Configuration",
        Some(HydrateError::State(_)) => "State",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    });
    if let Some(HydrateError::Status { endpoint, status }) = err.downcast_ref::<HydrateError>() {
        obj["details"] = json!({ "endpoint": endpoint, "status": status });
    }
    obj.to_string()
}
