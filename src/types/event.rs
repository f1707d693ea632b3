use alloy::primitives::{Log, TxHash};

/// Log returned by a [`crate::source::LogSource`], along with
/// block and transaction context.
#[derive(Clone, Debug, PartialEq)]
pub struct RawLog {
    pub(crate) tx_hash: TxHash,
    pub(crate) block_number: u64,
    pub(crate) log_index: u64,
    pub(crate) block_timestamp: Option<u64>,
    pub(crate) log: Log,
}

/// Result of a single log query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogsResponse {
    /// Logs matching the query, in chain order.
    pub logs: Vec<RawLog>,

    /// First block not covered by this response, the query continuation cursor.
    pub next_block: u64,

    /// Highest block the provider had available when answering.
    pub archive_height: u64,
}

impl RawLog {
    pub fn new(
        tx_hash: TxHash,
        block_number: u64,
        log_index: u64,
        block_timestamp: Option<u64>,
        log: Log,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            log_index,
            block_timestamp,
            log,
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn log_index(&self) -> u64 {
        self.log_index
    }

    /// Timestamp of the block, if the provider reported one.
    pub fn block_timestamp(&self) -> Option<u64> {
        self.block_timestamp
    }

    /// Topics and data of the log.
    pub fn log(&self) -> &Log {
        &self.log
    }
}

impl LogsResponse {
    pub fn new(logs: Vec<RawLog>, next_block: u64, archive_height: u64) -> Self {
        Self {
            logs,
            next_block,
            archive_height,
        }
    }

    /// Empty response that covers nothing past `next_block`.
    pub fn empty(next_block: u64, archive_height: u64) -> Self {
        Self::new(Vec::new(), next_block, archive_height)
    }
}
