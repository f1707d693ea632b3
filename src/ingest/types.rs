//! Ingest data structures.

use std::time::Duration;

use crate::{
    error::RadarError,
    types::{Transfer, TxId},
};

use super::seen::DEFAULT_SEEN_CAPACITY;

/// Default interval between height checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default maximum number of blocks requested by a single log query.
pub const DEFAULT_RANGE_LIMIT: u64 = 10_000;

/// Default number of blocks behind the head the first query starts at.
pub const DEFAULT_START_MARGIN: u64 = 10;

/// Per-chain ingest parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngestConfig {
    /// Interval between height checks.
    pub poll_interval: Duration,

    /// Maximum width of a log query, in blocks.
    pub range_limit: u64,

    /// How far behind the head the first query of a chain starts.
    pub start_margin: u64,

    /// Ceiling of the deduplication set.
    pub seen_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            range_limit: DEFAULT_RANGE_LIMIT,
            start_margin: DEFAULT_START_MARGIN,
            seen_capacity: DEFAULT_SEEN_CAPACITY,
        }
    }
}

/// Per-chain query bookmark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorState {
    /// First block the next query starts at, `None` before the first successful query.
    pub last_queried_block: Option<u64>,

    /// Highest height reported by a successful height check.
    pub last_known_height: Option<u64>,
}

/// Outcome of feeding a height check result into the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeightSignal {
    /// Height did not move.
    Unchanged,

    /// Height moved, or a deferred advance is due, a fetch should be started.
    Advanced { height: u64 },

    /// Height moved while a fetch is still in flight, nothing to start yet.
    Busy { height: u64 },
}

/// Block range of a single log query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchPlan {
    pub from_block: u64,
    pub to_block: u64,
}

/// Result of processing a successful log query.
#[derive(Clone, Debug, Default)]
pub struct IngestOutcome {
    /// Newly accepted transfers, in log order.
    pub transfers: Vec<Transfer>,

    /// Logs skipped because their transaction was already processed.
    pub duplicates: usize,

    /// Logs that could not be decoded, with the reason.
    pub decode_failures: Vec<(TxId, RadarError)>,

    /// Cursor after the query.
    pub next_block: u64,

    /// Head of the provider at query time.
    pub archive_height: u64,
}

impl HeightSignal {
    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

impl IngestOutcome {
    /// Number of logs accepted as new transfers.
    pub fn accepted(&self) -> usize {
        self.transfers.len()
    }
}
