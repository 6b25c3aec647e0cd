//! # Listing Watch Tracking
//!
//! The only part of the engine with memory. Everything here is keyed by item id
//! and owned by one monitoring scope; nothing is global.
//!
//! - `HistoricalStore`: bounded rolling window of observations per item.
//! - `StabilityTracker`: elapsed-time streaks for holding the featured offer and
//!   staying in the top positions.
//! - `TrendDetector`: oldest-versus-newest comparison over a short recent
//!   sub-window, keeping at most one live signal per item.
//!
//! Time is always passed in. No component reads the wall clock.

pub mod error;
pub mod history;
pub mod stability;
pub mod trend;

pub use error::TrackingError;
pub use history::HistoricalStore;
pub use stability::StabilityTracker;
pub use trend::TrendDetector;
