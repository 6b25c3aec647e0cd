//! # Listing Watch Core Types
//!
//! The shared vocabulary of the monitoring workspace: offers, snapshots, the
//! per-cycle records derived from them, the severity ladder and the clock
//! abstraction every time-based component reads.
//!
//! As a Layer 0 crate it has no knowledge of the engine, configuration or any
//! external system.

pub mod clock;
pub mod enums;
pub mod error;
pub mod records;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use clock::{Clock, ManualClock, SystemClock};
pub use enums::{FulfillmentChannel, SeverityLevel, SeverityOverride, SeverityReason, TrendKind};
pub use error::CoreError;
pub use records::{CompetitiveTargets, HistoricalObservation, StabilityState, TrendSignal};
pub use structs::{ItemId, Offer, SalesRank, Snapshot};
