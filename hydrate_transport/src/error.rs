use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http client setup failed: {0}")]
    Setup(String),
    #[error("invalid simulator setting: {0}")]
    Simulator(&'static str),
}

pub type Result<T> = std::result::Result<T, TransportError>;
