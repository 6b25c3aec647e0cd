use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] configuration::error::ConfigError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] tracking::TrackingError),

    #[error("Severity error: {0}")]
    Severity(#[from] severity::SeverityError),

    #[error("Snapshot for item '{got}' was submitted as item '{expected}'.")]
    ItemMismatch { expected: String, got: String },
}
