//! # Listing Watch Alerter
//!
//! Turns per-item assessments into something a human can act on.
//!
//! ## Public API
//!
//! - [`group_by_severity`] and [`SeveritySummary`]: stateless grouping of
//!   assessments, critical first and newest first within a group.
//! - [`alert_for`]: decides whether an assessment is worth an [`AlertRecord`].
//! - [`AlertBoard`] and [`run_alert_board`]: a broadcast listener that keeps
//!   the latest assessment per item and the alerts raised so far.
//!
//! Delivery (email, webhooks) and rendering are left to collaborators.

pub mod alerts;
pub mod board;
pub mod error;
pub mod grouping;

pub use alerts::alert_for;
pub use board::{AlertBoard, run_alert_board};
pub use error::AlerterError;
pub use events::AlertRecord;
pub use grouping::{SeverityGroup, SeveritySummary, group_by_severity};
