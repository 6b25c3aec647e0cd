//! # Listing Watch Competitive Analytics
//!
//! Turns a raw offer snapshot into the competitive picture the rest of the
//! engine reasons about.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate with no state across cycles. It
//!   depends only on `core-types` and `configuration`.
//! - **No data is not zero:** An empty snapshot produces an empty `OfferBook`
//!   and all-`None` targets. Nothing here divides by a missing market low.
//!
//! ## Public API
//!
//! - `OfferNormalizer` / `OfferBook`: landed prices, your offer, your position.
//! - `TargetCalculator`: market low, comparable-fulfillment low, second lowest
//!   and competitive floor.

pub mod error;
pub mod normalizer;
pub mod targets;

pub use error::AnalyticsError;
pub use normalizer::{NormalizedOffer, OfferBook, OfferNormalizer};
pub use targets::TargetCalculator;
