use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("task title must not be empty")]
    InvalidTitle,
    #[error("duration must be a positive number of minutes, got '{0}'")]
    InvalidDuration(String),
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(String),
}
