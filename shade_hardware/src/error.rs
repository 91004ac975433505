use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("transport unreachable: {0}")]
    Unreachable(String),
    #[error("transmit timeout")]
    Timeout,
    #[error("state file: {0}")]
    State(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
