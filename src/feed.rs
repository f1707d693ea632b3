//! Process-wide feed of recent transfers, per chain.
//!
//! Written by the per-chain ingest loops, read by the presentation layer.
//! Each chain entry holds a bounded window of the most recent transfers, the
//! all-time count of distinct transfers, the latest height and at most one
//! (the most recent) error.

use std::{collections::VecDeque, sync::Arc};

use dashmap::DashMap;
use tokio::sync::watch;

use crate::{
    error::RadarError,
    types::{ChainId, Transfer},
};

/// Default number of recent transfers kept per chain.
pub const DEFAULT_FEED_CAPACITY: usize = 100;

/// Shared handle to the feed store, cheap to clone.
#[derive(Clone, Debug)]
pub struct FeedStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    capacity: usize,
    entries: DashMap<ChainId, FeedEntry>,
    heights: DashMap<ChainId, watch::Sender<Option<u64>>>,
}

/// State of a single chain in the feed store.
#[derive(Clone, Debug, Default)]
pub struct FeedEntry {
    recent: VecDeque<Transfer>,
    total_observed: u64,
    last_error: Option<RadarError>,
    height: Option<u64>,
}

/// Point-in-time copy of a chain's feed.
#[derive(Clone, Debug, Default)]
pub struct FeedSnapshot {
    /// Most recent transfers, oldest first.
    pub recent: Vec<Transfer>,

    /// Number of distinct transfers observed since start.
    pub total_observed: u64,

    /// Most recent unresolved error of the chain.
    pub last_error: Option<RadarError>,

    /// Latest known chain height.
    pub height: Option<u64>,
}

impl FeedStore {
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "feed capacity must be positive");
        Self {
            inner: Arc::new(Inner {
                capacity,
                entries: DashMap::new(),
                heights: DashMap::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Creates an empty entry for the chain, if missing.
    pub fn register(&self, chain_id: ChainId) {
        self.inner.entries.entry(chain_id).or_default();
        self.height_sender(chain_id);
    }

    /// Chains with an entry, in ascending ID order.
    pub fn chains(&self) -> Vec<ChainId> {
        let mut ids: Vec<_> = self.inner.entries.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Appends newly accepted transfers, evicting the oldest ones over capacity.
    ///
    /// Callers pass only transfers that passed deduplication, each of them
    /// counts towards the all-time total.
    pub fn push(&self, chain_id: ChainId, transfers: Vec<Transfer>) {
        let capacity = self.inner.capacity;
        let mut entry = self.inner.entries.entry(chain_id).or_default();
        entry.total_observed += transfers.len() as u64;
        entry.recent.extend(transfers);
        let excess = entry.recent.len().saturating_sub(capacity);
        entry.recent.drain(..excess);
    }

    /// Stores the error as the chain's latest one, replacing any previous error.
    pub fn record_error(&self, chain_id: ChainId, error: RadarError) {
        self.inner.entries.entry(chain_id).or_default().last_error = Some(error);
    }

    pub fn clear_error(&self, chain_id: ChainId) {
        if let Some(mut entry) = self.inner.entries.get_mut(&chain_id) {
            entry.last_error = None;
        }
    }

    /// Clears the chain's latest error if it matches the predicate.
    pub fn clear_error_if(&self, chain_id: ChainId, predicate: impl FnOnce(&RadarError) -> bool) {
        if let Some(mut entry) = self.inner.entries.get_mut(&chain_id) {
            if entry.last_error.as_ref().is_some_and(predicate) {
                entry.last_error = None;
            }
        }
    }

    /// Records a new chain height and notifies height subscribers.
    pub fn record_height(&self, chain_id: ChainId, height: u64) {
        self.inner.entries.entry(chain_id).or_default().height = Some(height);
        self.height_sender(chain_id).send_replace(Some(height));
    }

    /// Subscribes to height updates of the chain.
    ///
    /// The receiver holds the latest height, `None` until the first one arrives.
    pub fn subscribe_heights(&self, chain_id: ChainId) -> watch::Receiver<Option<u64>> {
        self.height_sender(chain_id).subscribe()
    }

    /// Copy of the chain's feed, empty if the chain is unknown.
    pub fn get_feed(&self, chain_id: ChainId) -> FeedSnapshot {
        self.inner
            .entries
            .get(&chain_id)
            .map(|entry| FeedSnapshot {
                recent: entry.recent.iter().cloned().collect(),
                total_observed: entry.total_observed,
                last_error: entry.last_error.clone(),
                height: entry.height,
            })
            .unwrap_or_default()
    }

    fn height_sender(
        &self,
        chain_id: ChainId,
    ) -> dashmap::mapref::one::Ref<'_, ChainId, watch::Sender<Option<u64>>> {
        self.inner
            .heights
            .entry(chain_id)
            .or_insert_with(|| watch::channel(None).0)
            .downgrade()
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl FeedEntry {
    pub fn recent(&self) -> &VecDeque<Transfer> {
        &self.recent
    }

    pub fn total_observed(&self) -> u64 {
        self.total_observed
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256, U256};

    use super::*;

    fn transfer(n: u64) -> Transfer {
        Transfer::new(
            8453,
            B256::from(U256::from(n)),
            n,
            None,
            Address::ZERO,
            Address::ZERO,
            U256::from(n),
            0,
        )
    }

    #[test]
    fn test_push_keeps_most_recent() {
        let feed = FeedStore::new(100);
        feed.push(8453, (0..150).map(transfer).collect());

        let snapshot = feed.get_feed(8453);
        assert_eq!(snapshot.total_observed, 150);
        assert_eq!(snapshot.recent.len(), 100);
        assert_eq!(snapshot.recent.first().unwrap().block_number(), 50);
        assert_eq!(snapshot.recent.last().unwrap().block_number(), 149);
    }

    #[test]
    fn test_push_across_batches() {
        let feed = FeedStore::new(3);
        feed.push(1, vec![transfer(1), transfer(2)]);
        feed.push(1, vec![transfer(3), transfer(4)]);
        feed.push(1, vec![]);

        let snapshot = feed.get_feed(1);
        assert_eq!(snapshot.total_observed, 4);
        let blocks: Vec<_> = snapshot.recent.iter().map(|t| t.block_number()).collect();
        assert_eq!(blocks, vec![2, 3, 4]);
    }

    #[test]
    fn test_chains_are_isolated() {
        let feed = FeedStore::new(10);
        feed.push(1, vec![transfer(1)]);
        feed.record_error(10, RadarError::NullResp);

        assert_eq!(feed.get_feed(1).total_observed, 1);
        assert_eq!(feed.get_feed(1).last_error, None);
        assert_eq!(feed.get_feed(10).total_observed, 0);
        assert_eq!(feed.get_feed(10).last_error, Some(RadarError::NullResp));
        assert_eq!(feed.chains(), vec![1, 10]);
    }

    #[test]
    fn test_unknown_chain_is_empty() {
        let feed = FeedStore::default();
        let snapshot = feed.get_feed(42);
        assert!(snapshot.recent.is_empty());
        assert_eq!(snapshot.total_observed, 0);
        assert_eq!(snapshot.height, None);
    }

    #[test]
    fn test_error_is_overwritten() {
        let feed = FeedStore::default();
        feed.record_error(1, RadarError::HeightCheckFailed("timeout".into()));
        feed.record_error(1, RadarError::QueryFailed("500".into()));
        assert_eq!(
            feed.get_feed(1).last_error,
            Some(RadarError::QueryFailed("500".into()))
        );

        feed.clear_error_if(1, |e| e.is_height_check());
        assert!(feed.get_feed(1).last_error.is_some());

        feed.clear_error(1);
        assert_eq!(feed.get_feed(1).last_error, None);
    }

    #[test]
    fn test_height_subscription() {
        let feed = FeedStore::default();
        let mut rx = feed.subscribe_heights(1);
        assert_eq!(*rx.borrow(), None);

        feed.record_height(1, 100);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(100));
        assert_eq!(feed.get_feed(1).height, Some(100));

        // Late subscribers see the latest value
        let late = feed.subscribe_heights(1);
        assert_eq!(*late.borrow(), Some(100));
    }
}
