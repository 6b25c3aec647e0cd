use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown severity level '{0}'")]
    UnknownSeverity(String),
}
