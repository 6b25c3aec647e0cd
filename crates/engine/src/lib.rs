//! # Listing Watch Engine
//!
//! The orchestrator that wires every monitoring stage into one cycle and runs
//! those cycles for many items at once.
//!
//! ## Architectural Principles
//!
//! - **Fixed stage order:** normalize, compute targets, record history, update
//!   stability, detect trends, classify. Every stage reads what the previous
//!   ones produced during the same cycle.
//! - **Per-item isolation:** state for one item never influences another. The
//!   async [`Monitor`] serializes cycles per item and runs items in parallel.
//! - **Injected time:** the engine never reads the wall clock itself. Callers
//!   pass `now`, or the `Monitor` reads its injected [`core_types::Clock`].
//!
//! ## Public API
//!
//! - [`MonitorEngine`]: the synchronous pipeline, `ingest` and `forget`.
//! - [`Monitor`]: the concurrent wrapper that broadcasts results.
//! - [`IngestInputs`]: optional margin and sales-rank inputs per cycle.

pub mod error;
pub mod monitor;
pub mod pipeline;

pub use error::EngineError;
pub use monitor::Monitor;
pub use pipeline::{IngestInputs, MonitorEngine};
