use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty file (or no file at all) yields the
/// standard monitoring thresholds. Only `seller_id` must be supplied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Your own seller identifier, used to find "your" offer in each snapshot.
    pub seller_id: String,
    pub targets: TargetParams,
    pub history: HistoryParams,
    pub stability: StabilityParams,
    pub trend: TrendParams,
    pub severity: SeverityParams,
    pub logging: LoggingConfig,
}

/// Parameters for the competitive target calculation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetParams {
    /// Fraction of the market low used as the competitive floor (0.8 = 80%).
    pub floor_ratio: Decimal,
}

impl Default for TargetParams {
    fn default() -> Self {
        Self {
            floor_ratio: dec!(0.8),
        }
    }
}

/// Parameters for the rolling per-item history.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryParams {
    /// Observations older than this (relative to the newest one) are evicted.
    #[serde(with = "humantime_serde")]
    pub retention: Duration,
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl HistoryParams {
    pub fn retention_window(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.retention).unwrap_or(chrono::Duration::MAX)
    }
}

/// Parameters for the "locked-in" stability streaks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StabilityParams {
    /// How long both streaks must run before an item counts as stable.
    #[serde(with = "humantime_serde")]
    pub required: Duration,
    /// Positions at or above this rank keep the top-positions streak alive.
    pub top_positions: u32,
}

impl Default for StabilityParams {
    fn default() -> Self {
        Self {
            required: Duration::from_secs(24 * 60 * 60),
            top_positions: 3,
        }
    }
}

impl StabilityParams {
    pub fn required_streak(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.required).unwrap_or(chrono::Duration::MAX)
    }
}

/// Parameters for short-term trend detection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendParams {
    /// Size of the recent sub-window compared oldest-to-newest.
    pub window: usize,
    /// A stored signal older than this is treated as absent.
    #[serde(with = "humantime_serde")]
    pub signal_ttl: Duration,
    /// Minimum rise in competitor count that counts as a surge.
    pub competitor_surge: u32,
    /// Minimum drop in rank (larger number) that counts as a decline.
    pub position_decline: u32,
    /// Relative fall in market low that counts as a price war (0.10 = 10%).
    pub price_war_drop: Decimal,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            window: 6,
            signal_ttl: Duration::from_secs(60 * 60),
            competitor_surge: 3,
            position_decline: 5,
            price_war_drop: dec!(0.10),
        }
    }
}

impl TrendParams {
    pub fn signal_lifetime(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.signal_ttl).unwrap_or(chrono::Duration::MAX)
    }
}

/// Thresholds for the severity rules. Gap and margin values are percentages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeverityParams {
    /// Items whose best sales rank is numerically above this are low priority
    /// and never escalate to critical on price gap alone.
    pub low_priority_rank: u32,
    pub critical_gap_pct: Decimal,
    pub extreme_gap_pct: Decimal,
    pub high_gap_pct: Decimal,
    pub warning_gap_pct: Decimal,
    /// Margin below which holding the featured offer is not sustainable.
    pub min_margin_pct: Decimal,
    /// Share of all offers that counts as the "top tier" of positions.
    pub top_tier_fraction: Decimal,
    /// Offer count that must be exceeded for a near-miss to be recoverable.
    pub near_miss_min_offers: usize,
    /// Offer count that must be exceeded before falling outside the top
    /// positions is worth a warning.
    pub crowded_min_offers: usize,
    /// Positions at or above this rank count as "top" for the warning rule.
    pub top_positions: u32,
}

impl Default for SeverityParams {
    fn default() -> Self {
        Self {
            low_priority_rank: 200_000,
            critical_gap_pct: dec!(50),
            extreme_gap_pct: dec!(75),
            high_gap_pct: dec!(20),
            warning_gap_pct: dec!(5),
            min_margin_pct: dec!(10),
            top_tier_fraction: dec!(0.20),
            near_miss_min_offers: 5,
            crowded_min_offers: 3,
            top_positions: 3,
        }
    }
}

/// How log lines are laid out on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set (e.g. "info,engine=debug").
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            directory: None,
            file_prefix: "listing-watch.log".to_string(),
        }
    }
}
