use crate::enums::TrendKind;
use crate::structs::ItemId;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price targets derived from a single snapshot. No field is persisted.
///
/// Every field is `None` when the snapshot carried no usable offers; callers
/// must treat that as missing data, never as a price of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitiveTargets {
    pub market_low: Option<Decimal>,
    pub lowest_comparable_fulfillment: Option<Decimal>,
    pub second_lowest: Option<Decimal>,
    pub competitive_floor: Option<Decimal>,
}

impl CompetitiveTargets {
    pub fn is_empty(&self) -> bool {
        self.market_low.is_none()
    }

    /// How far `your_price` sits above the market low, in percent.
    ///
    /// `None` when either side is missing or the market low is not positive.
    pub fn gap_percentage(&self, your_price: Option<Decimal>) -> Option<Decimal> {
        let low = self.market_low.filter(|low| *low > Decimal::ZERO)?;
        let yours = your_price?;
        Some((yours - low) / low * Decimal::ONE_HUNDRED)
    }
}

/// One row of the rolling per-item history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalObservation {
    pub item_id: ItemId,
    pub timestamp: DateTime<Utc>,
    pub offer_count: usize,
    /// 1-based rank by landed price. `None` means you had no offer.
    pub your_position: Option<u32>,
    pub has_featured_offer: bool,
    pub your_price: Option<Decimal>,
    pub market_low: Option<Decimal>,
    pub competitor_count: usize,
}

/// Accumulated "locked-in" streaks for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityState {
    pub item_id: ItemId,
    #[serde(with = "duration_millis")]
    pub featured_offer_streak: Duration,
    #[serde(with = "duration_millis")]
    pub top_three_streak: Duration,
    pub last_observed_at: Option<DateTime<Utc>>,
    pub is_stable: bool,
}

impl StabilityState {
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            featured_offer_streak: Duration::zero(),
            top_three_streak: Duration::zero(),
            last_observed_at: None,
            is_stable: false,
        }
    }

    pub fn featured_offer_streak_hours(&self) -> Decimal {
        duration_hours(self.featured_offer_streak)
    }

    pub fn top_three_streak_hours(&self) -> Decimal {
        duration_hours(self.top_three_streak)
    }
}

fn duration_hours(d: Duration) -> Decimal {
    Decimal::from(d.num_milliseconds()) / Decimal::from(3_600_000)
}

/// Streaks travel as whole milliseconds; chrono durations carry no serde impl.
mod duration_millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(d.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(Duration::milliseconds)
    }
}

/// The single live trend signal kept for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSignal {
    pub item_id: ItemId,
    pub kind: TrendKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl TrendSignal {
    /// A signal more than `ttl` old at `now` counts as absent.
    pub fn is_live(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.timestamp <= ttl
    }
}
