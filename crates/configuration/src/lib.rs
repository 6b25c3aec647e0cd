use crate::error::ConfigError;
use rust_decimal::Decimal;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{
    HistoryParams, LogFormat, LoggingConfig, MonitorConfig, SeverityParams, StabilityParams,
    TargetParams, TrendParams,
};
pub use telemetry::init_tracing;

/// Prefix for environment overrides, e.g. `LISTING_WATCH__SEVERITY__LOW_PRIORITY_RANK`.
pub const ENV_PREFIX: &str = "LISTING_WATCH";

/// Loads the application configuration.
///
/// Reads `path` when given (it must exist), otherwise an optional `config.toml`
/// in the working directory, then layers `LISTING_WATCH__*` environment
/// variables on top. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<MonitorConfig>()?;
    validate(&config)?;

    Ok(config)
}

/// Parses and validates configuration held in a TOML string.
pub fn from_toml_str(toml: &str) -> Result<MonitorConfig, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<MonitorConfig>()?;
    validate(&config)?;
    Ok(config)
}

/// Rejects configurations that would make the engine's rules meaningless.
pub fn validate(config: &MonitorConfig) -> Result<(), ConfigError> {
    if config.seller_id.trim().is_empty() {
        return invalid("seller_id must be set");
    }
    if config.targets.floor_ratio <= Decimal::ZERO || config.targets.floor_ratio > Decimal::ONE {
        return invalid("targets.floor_ratio must be in (0, 1]");
    }
    if config.history.retention.is_zero() {
        return invalid("history.retention must be greater than zero");
    }
    if config.stability.required.is_zero() {
        return invalid("stability.required must be greater than zero");
    }
    if config.trend.window < 2 {
        return invalid("trend.window must hold at least two observations");
    }
    if config.trend.signal_ttl.is_zero() {
        return invalid("trend.signal_ttl must be greater than zero");
    }
    if config.trend.competitor_surge == 0 {
        return invalid("trend.competitor_surge must be at least one");
    }
    if config.trend.position_decline == 0 {
        return invalid("trend.position_decline must be at least one");
    }
    if config.trend.price_war_drop <= Decimal::ZERO {
        return invalid("trend.price_war_drop must be positive");
    }

    let s = &config.severity;
    for (name, value) in [
        ("critical_gap_pct", s.critical_gap_pct),
        ("extreme_gap_pct", s.extreme_gap_pct),
        ("high_gap_pct", s.high_gap_pct),
        ("warning_gap_pct", s.warning_gap_pct),
        ("min_margin_pct", s.min_margin_pct),
    ] {
        if value.is_sign_negative() {
            return invalid(&format!("severity.{name} must not be negative"));
        }
    }
    if s.top_tier_fraction <= Decimal::ZERO || s.top_tier_fraction > Decimal::ONE {
        return invalid("severity.top_tier_fraction must be in (0, 1]");
    }

    Ok(())
}

fn invalid(msg: &str) -> Result<(), ConfigError> {
    Err(ConfigError::ValidationError(msg.to_string()))
}
