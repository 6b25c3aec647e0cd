use crate::enums::FulfillmentChannel;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The stable catalog identifier of a monitored listing.
pub type ItemId = String;

/// One competing offer on a listing, as delivered by the upstream snapshot source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub seller_id: String,
    pub listing_price: Decimal,
    /// `None` when the source omitted shipping; treated as free shipping.
    #[serde(default)]
    pub shipping_price: Option<Decimal>,
    pub fulfillment: FulfillmentChannel,
    /// Eligible for the marketplace's expedited delivery programme.
    #[serde(default)]
    pub expedited_eligible: bool,
    /// The marketplace currently shows this offer as the default purchase option.
    #[serde(default)]
    pub is_featured_offer: bool,
    /// Positive-feedback percentage of the seller, if known.
    #[serde(default)]
    pub feedback_rating: Option<Decimal>,
    #[serde(default)]
    pub min_ship_hours: Option<u32>,
    #[serde(default)]
    pub max_ship_hours: Option<u32>,
}

impl Offer {
    /// Listing price plus shipping.
    pub fn landed_price(&self) -> Decimal {
        self.listing_price + self.shipping_price.unwrap_or(Decimal::ZERO)
    }

    /// Whether this offer competes on delivery terms comparable to network fulfillment.
    pub fn has_comparable_fulfillment(&self) -> bool {
        self.fulfillment.is_network() || self.expedited_eligible
    }
}

/// A sales-rank entry for one catalog category. Lower is better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRank {
    pub category: String,
    pub rank: u32,
}

/// An immutable picture of every offer on a listing at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub item_id: ItemId,
    pub event_time: DateTime<Utc>,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub sales_ranks: Option<Vec<SalesRank>>,
}

impl Snapshot {
    /// The numerically lowest rank across all categories, if any rank was reported.
    pub fn best_sales_rank(&self) -> Option<u32> {
        self.sales_ranks
            .as_ref()
            .and_then(|ranks| ranks.iter().map(|r| r.rank).min())
    }
}
