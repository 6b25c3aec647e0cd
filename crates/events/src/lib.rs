//! # Listing Watch Events
//!
//! This crate defines what the engine hands to the outside world each cycle:
//! the per-item assessment, the alert raised when something changes, and the
//! broadcast envelope both travel in.
//!
//! As a Layer 0 crate, it depends only on `core-types` and provides the
//! definitive language between the engine and its display and alert-routing
//! collaborators.

// Declare the modules that make up this crate.
pub mod error;
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use messages::{AlertRecord, ItemAssessment, MonitorMessage};
