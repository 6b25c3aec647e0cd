use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who ships the order once an offer is bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentChannel {
    /// The seller packs and ships the order themselves.
    SelfFulfilled,
    /// The marketplace's own fulfillment network ships the order.
    NetworkFulfilled,
}

impl FulfillmentChannel {
    pub fn is_network(&self) -> bool {
        matches!(self, FulfillmentChannel::NetworkFulfilled)
    }
}

/// The ordered severity ladder used to prioritise human attention.
///
/// Variants are declared from least to most urgent so the derived `Ord`
/// gives `Critical > High > Warning > Stable > Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Good,
    Stable,
    Warning,
    High,
    Critical,
}

impl SeverityLevel {
    /// Every level, most urgent first. This is the presentation order.
    pub const BY_PRIORITY: [SeverityLevel; 5] = [
        SeverityLevel::Critical,
        SeverityLevel::High,
        SeverityLevel::Warning,
        SeverityLevel::Stable,
        SeverityLevel::Good,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Critical => "critical",
            SeverityLevel::High => "high",
            SeverityLevel::Warning => "warning",
            SeverityLevel::Stable => "stable",
            SeverityLevel::Good => "good",
        }
    }

    /// True for the levels that call for someone to look at the listing.
    pub fn needs_attention(&self) -> bool {
        *self >= SeverityLevel::Warning
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(SeverityLevel::Critical),
            "high" => Ok(SeverityLevel::High),
            "warning" => Ok(SeverityLevel::Warning),
            "stable" => Ok(SeverityLevel::Stable),
            "good" => Ok(SeverityLevel::Good),
            other => Err(CoreError::UnknownSeverity(other.to_string())),
        }
    }
}

/// The classifier rule that decided an item's base severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityReason {
    /// Large gap, no featured offer and a rank outside the top tier.
    GapOutsideTopTier,
    /// Gap so large it is critical whoever holds the featured offer.
    ExtremeGap,
    /// Holding the featured offer at an unsustainable margin.
    ThinMargin,
    /// Meaningful gap and no featured offer.
    GapWithoutFeaturedOffer,
    /// No featured offer despite a top-tier rank in a busy listing.
    RecoverableNearMiss,
    /// Small gap, or pushed out of the top positions on a crowded listing.
    DriftingFromTop,
    /// Nothing worth flagging.
    Competitive,
}

impl SeverityReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SeverityReason::GapOutsideTopTier => {
                "priced well above market low without the featured offer, outside the top tier"
            }
            SeverityReason::ExtremeGap => "priced far above market low",
            SeverityReason::ThinMargin => "holding the featured offer below the sustainable margin",
            SeverityReason::GapWithoutFeaturedOffer => {
                "priced above market low without the featured offer"
            }
            SeverityReason::RecoverableNearMiss => {
                "top-tier position but the featured offer is held elsewhere"
            }
            SeverityReason::DriftingFromTop => "slightly above market low or outside the top positions",
            SeverityReason::Competitive => "competitive",
        }
    }
}

/// A post-classification adjustment applied on top of the base rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityOverride {
    /// `good` promoted to `stable` by a long enough stability streak.
    LockedIn,
    /// `warning` raised to `high` by a live negative trend.
    TrendEscalation,
}

/// The kind of short-term shift picked up by the trend detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendKind {
    CompetitorSurge,
    PositionDecline,
    PriceWar,
}

impl fmt::Display for TrendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendKind::CompetitorSurge => "competitor_surge",
            TrendKind::PositionDecline => "position_decline",
            TrendKind::PriceWar => "price_war",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_total_order_matches_urgency() {
        assert!(SeverityLevel::Critical > SeverityLevel::High);
        assert!(SeverityLevel::High > SeverityLevel::Warning);
        assert!(SeverityLevel::Warning > SeverityLevel::Stable);
        assert!(SeverityLevel::Stable > SeverityLevel::Good);

        let mut sorted = SeverityLevel::BY_PRIORITY.to_vec();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sorted, SeverityLevel::BY_PRIORITY.to_vec());
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<SeverityLevel>().unwrap(), SeverityLevel::High);
        assert!("urgent".parse::<SeverityLevel>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&TrendKind::CompetitorSurge).unwrap();
        assert_eq!(json, "\"competitor_surge\"");
        let level: SeverityLevel = serde_json::from_str("\"stable\"").unwrap();
        assert_eq!(level, SeverityLevel::Stable);
    }
}
