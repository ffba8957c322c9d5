use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HydrateError {
    /// Network failure before any HTTP status was received.
    #[error("transport error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-2xx status.
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: &'static str, status: u16 },
    /// Payload was malformed, null, negative or out of range.
    #[error("invalid payload: {0}")]
    Validation(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid state: {0}")]
    State(String),
}

impl HydrateError {
    /// Transport-class failures: network errors and non-2xx answers.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing reading source")]
    MissingSource,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
