use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlerterError {
    #[error("Failed to serialize the alert board: {0}")]
    Serialization(#[from] serde_json::Error),
}
