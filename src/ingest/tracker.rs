//! Per-chain ingest state machine.

use crate::{
    Chain, abi,
    types::{LogsResponse, Transfer},
};

use super::{
    seen::SeenSet,
    types::{CursorState, FetchPlan, HeightSignal, IngestConfig, IngestOutcome},
};

/// Height tracking, cursor and deduplication state of a single chain.
///
/// Pure logic, no async, no I/O. The poll loop feeds it height check and
/// log query results and performs whatever it asks for.
///
/// At most one fetch is in flight at a time. A height advance seen while a
/// fetch is pending does not start another one; it is remembered and turns
/// into a fetch on the first height check after the pending fetch ends, so
/// blocks past the pending fetch's range are never dropped.
#[derive(Clone, Debug)]
pub struct ChainTracker {
    chain: Chain,
    config: IngestConfig,
    cursor: CursorState,
    seen: SeenSet,
    fetch_in_flight: bool,
    pending_advance: bool,
}

impl ChainTracker {
    pub fn new(chain: Chain, config: IngestConfig) -> Self {
        Self {
            chain,
            config,
            cursor: CursorState::default(),
            seen: SeenSet::new(config.seen_capacity),
            fetch_in_flight: false,
            pending_advance: false,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Records a successful height check.
    ///
    /// The first observed height, or any height strictly above the last
    /// known one, counts as progress. An advance deferred by an in-flight
    /// fetch, or a failed fetch, is reported as [`HeightSignal::Advanced`]
    /// on the first check once no fetch is in flight, even if the height
    /// did not move since.
    pub fn observe_height(&mut self, height: u64) -> HeightSignal {
        let advanced = self
            .cursor
            .last_known_height
            .is_none_or(|known| height > known);
        if advanced {
            self.cursor.last_known_height = Some(height);
        } else if !self.pending_advance || self.fetch_in_flight {
            return HeightSignal::Unchanged;
        }

        let height = self.cursor.last_known_height.unwrap_or(height);
        if self.fetch_in_flight {
            self.pending_advance = true;
            HeightSignal::Busy { height }
        } else {
            self.pending_advance = false;
            HeightSignal::Advanced { height }
        }
    }

    /// Whether an advance is waiting for the in-flight fetch to end.
    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance
    }

    /// Marks a fetch as started and returns the block range to query.
    ///
    /// Returns `None` if a fetch is already in flight or no height has
    /// been observed yet.
    pub fn begin_fetch(&mut self) -> Option<FetchPlan> {
        if self.fetch_in_flight {
            return None;
        }
        let height = self.cursor.last_known_height?;

        let from_block = match self.cursor.last_queried_block {
            Some(block) => block,
            // Live monitoring, no backfill
            None => height.saturating_sub(self.config.start_margin),
        };
        let to_block = from_block.saturating_add(self.config.range_limit);

        self.fetch_in_flight = true;
        Some(FetchPlan {
            from_block,
            to_block,
        })
    }

    /// Processes a successful log query started by [`Self::begin_fetch`].
    ///
    /// Undecodable logs are skipped and reported, already seen transactions
    /// are dropped, and the cursor moves to the response continuation.
    pub fn complete_fetch(
        &mut self,
        plan: FetchPlan,
        response: LogsResponse,
        observed_at_millis: u64,
    ) -> IngestOutcome {
        self.fetch_in_flight = false;

        let mut outcome = IngestOutcome {
            next_block: response.next_block,
            archive_height: response.archive_height,
            ..Default::default()
        };

        for raw in response.logs {
            let event = match abi::decode_transfer(raw.log()) {
                Ok(event) => event,
                Err(err) => {
                    outcome.decode_failures.push((raw.tx_hash(), err));
                    continue;
                }
            };

            if !self.seen.insert(raw.tx_hash()) {
                outcome.duplicates += 1;
                continue;
            }

            outcome.transfers.push(Transfer::new(
                self.chain.chain_id(),
                raw.tx_hash(),
                raw.block_number(),
                raw.block_timestamp(),
                event.from,
                event.to,
                event.value,
                observed_at_millis,
            ));
        }

        // Never move backwards, even if the provider reports a stale cursor
        let next_block = response
            .next_block
            .max(self.cursor.last_queried_block.unwrap_or(plan.from_block));
        self.cursor.last_queried_block = Some(next_block);
        outcome.next_block = next_block;

        outcome
    }

    /// Processes a failed log query, leaving the cursor untouched so the
    /// next fetch resumes from the same block. The retry starts on the next
    /// height check, whether or not the height moved.
    pub fn fail_fetch(&mut self) {
        self.fetch_in_flight = false;
        self.pending_advance = true;
    }
}
