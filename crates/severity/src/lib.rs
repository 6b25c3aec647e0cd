//! # Listing Watch Severity
//!
//! Maps the current competitive picture of one item onto the severity ladder.
//!
//! The classifier holds no state of its own: it is re-evaluated every cycle
//! from the outputs of the normalizer, the target calculator, the stability
//! tracker and the trend detector.

pub mod error;
pub mod rule_based;

pub use error::SeverityError;
pub use rule_based::RuleBasedClassifier;

use core_types::{
    CompetitiveTargets, SeverityLevel, SeverityOverride, SeverityReason, StabilityState,
    TrendSignal,
};
use rust_decimal::Decimal;

/// Everything the classifier looks at for one item in one cycle.
#[derive(Debug, Clone, Copy)]
pub struct SeverityInputs<'a> {
    pub your_landed_price: Option<Decimal>,
    pub targets: &'a CompetitiveTargets,
    /// 1-based rank by landed price; `None` when you have no offer.
    pub your_position: Option<u32>,
    pub offer_count: usize,
    pub has_featured_offer: bool,
    /// Supplied by the snapshot or an external collaborator; optional.
    pub best_sales_rank: Option<u32>,
    /// Estimated margin percentage at the current price; optional.
    pub margin_pct: Option<Decimal>,
    pub stability: Option<&'a StabilityState>,
    /// A trend signal that is still live at classification time.
    pub live_trend: Option<&'a TrendSignal>,
}

/// The classifier's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub level: SeverityLevel,
    /// The level the ordered rules produced before any override.
    pub base_level: SeverityLevel,
    pub reason: SeverityReason,
    pub applied_override: Option<SeverityOverride>,
    /// Gap above market low in percent; zero when it cannot be computed.
    pub gap_percentage: Decimal,
}

/// The seam the engine classifies through.
///
/// `Send + Sync` lets one classifier be shared by every per-item worker.
pub trait SeverityPolicy: Send + Sync {
    fn classify(&self, inputs: &SeverityInputs<'_>) -> Classification;
}
