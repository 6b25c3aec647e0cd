use crate::error::EventsError;
use chrono::{DateTime, Utc};
use core_types::{
    CompetitiveTargets, ItemId, SeverityLevel, SeverityOverride, SeverityReason, StabilityState,
    TrendSignal,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The complete result of one monitoring cycle for one item.
///
/// This is what display collaborators group, sort and render. `event_time`
/// comes from the snapshot and drives ordering within a severity group;
/// `assessed_at` is the engine clock reading for the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAssessment {
    pub item_id: ItemId,
    pub event_time: DateTime<Utc>,
    pub assessed_at: DateTime<Utc>,
    pub severity: SeverityLevel,
    /// The severity this item held after the previous cycle, if any.
    pub previous_severity: Option<SeverityLevel>,
    pub reason: SeverityReason,
    pub applied_override: Option<SeverityOverride>,
    pub targets: CompetitiveTargets,
    pub your_price: Option<Decimal>,
    pub your_position: Option<u32>,
    pub offer_count: usize,
    pub has_featured_offer: bool,
    pub best_sales_rank: Option<u32>,
    pub gap_percentage: Decimal,
    pub stability: StabilityState,
    /// The trend signal live at assessment time.
    pub trend: Option<TrendSignal>,
    /// True when the trend was detected during this very cycle.
    pub trend_is_new: bool,
}

impl ItemAssessment {
    /// True on the first assessment of an item and whenever the level moves.
    pub fn severity_changed(&self) -> bool {
        self.previous_severity != Some(self.severity)
    }
}

/// A notification-worthy change for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub item_id: ItemId,
    pub severity: SeverityLevel,
    pub previous_severity: Option<SeverityLevel>,
    pub reason: SeverityReason,
    pub message: String,
    pub event_time: DateTime<Utc>,
    pub raised_at: DateTime<Utc>,
}

/// The envelope broadcast by the monitor to every subscriber.
///
/// Serialized with an adjacent tag, e.g.
/// `{ "type": "Alert", "payload": { "item_id": "...", ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum MonitorMessage {
    /// The result of a completed cycle.
    Assessment(Box<ItemAssessment>),
    /// An alert raised by that cycle.
    Alert(AlertRecord),
    /// All state for the item was dropped.
    ItemForgotten { item_id: ItemId },
}

impl MonitorMessage {
    pub fn item_id(&self) -> &str {
        match self {
            MonitorMessage::Assessment(a) => &a.item_id,
            MonitorMessage::Alert(a) => &a.item_id,
            MonitorMessage::ItemForgotten { item_id } => item_id,
        }
    }

    pub fn to_json(&self) -> Result<String, EventsError> {
        Ok(serde_json::to_string(self)?)
    }
}
