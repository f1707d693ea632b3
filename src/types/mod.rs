mod event;
mod transfer;

pub use event::{LogsResponse, RawLog};
pub use transfer::Transfer;

use std::time::{SystemTime, UNIX_EPOCH};

/// EIP-155 chain ID.
pub type ChainId = u64;

/// Identifier of a processed transaction, used for deduplication.
pub type TxId = alloy::primitives::TxHash;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
