use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ShadeError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("transmission failed: {0}")]
    Transmission(String),
    #[error("state persistence failed: {0}")]
    Persistence(String),
    #[error("timed out waiting for the covering to settle")]
    Timeout,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing transmitter")]
    MissingTransmitter,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
