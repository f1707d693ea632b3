//! Height tracking and transfer ingestion.
//!
//! Each monitored chain gets its own poll loop that checks the chain height
//! on a fixed interval and only issues the heavy log query when the height
//! moves, so the number of log queries is bounded by the number of new
//! blocks rather than by the poll rate.
//!
//! # Architecture
//!
//! The module separates pure processing logic from async I/O:
//!
//! - [`ChainTracker`] - Pure, synchronous cursor, deduplication and
//!   in-flight bookkeeping of a single chain
//! - [`SeenSet`] - Bounded set of processed transaction IDs
//! - [`start`] - Async entry point that spawns the per-chain poll loop
//!
//! Chains share nothing but the [`crate::feed::FeedStore`], where each loop
//! writes only to its own chain entry.

mod listener;
mod seen;
mod tracker;
mod types;

pub use listener::{run_listener, start};
pub use seen::{DEFAULT_SEEN_CAPACITY, SeenSet};
pub use tracker::ChainTracker;
pub use types::{
    CursorState, DEFAULT_POLL_INTERVAL, DEFAULT_RANGE_LIMIT, DEFAULT_START_MARGIN, FetchPlan,
    HeightSignal, IngestConfig, IngestOutcome,
};
