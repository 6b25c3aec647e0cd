use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Observation for '{item_id}' at {got} is older than the latest recorded one at {latest}")]
    OutOfOrder {
        item_id: String,
        latest: DateTime<Utc>,
        got: DateTime<Utc>,
    },

    #[error("Observation belongs to '{got}' but was recorded under '{expected}'")]
    ItemMismatch { expected: String, got: String },

    #[error("Tracking parameters from configuration are invalid: {0}")]
    InvalidParameters(String),
}
