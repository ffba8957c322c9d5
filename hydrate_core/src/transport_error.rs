//! Maps transport-seam errors to typed `HydrateError`.
//!
//! Network failures become `HydrateError::Transport` with the endpoint name
//! attached. An unusable URL is a configuration problem, not a flaky link.

use crate::error::HydrateError;
use hydrate_traits::HttpError;

/// Map an `HttpError` raised while calling `endpoint` to a `HydrateError`.
pub fn map_http_error(endpoint: &str, e: &HttpError) -> HydrateError {
    match e {
        HttpError::Timeout(msg) => HydrateError::Transport(format!("{endpoint}: timeout ({msg})")),
        HttpError::InvalidUrl(msg) => {
            HydrateError::Configuration(format!("{endpoint}: invalid url ({msg})"))
        }
        other => HydrateError::Transport(format!("{endpoint}: {other}")),
    }
}
