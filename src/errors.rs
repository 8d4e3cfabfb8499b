use thiserror::Error;

/// Failures raised while reading or writing the durable expense slot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid amount: {0} is not a finite number")]
    InvalidAmount(f64),
}

pub type StoreResult<T> = Result<T, StoreError>;
