use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeverityError {
    #[error("Severity thresholds from configuration are invalid: {0}")]
    InvalidParameters(String),
}
