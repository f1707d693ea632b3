//! Per-chain poll loop.

use futures::future::{Fuse, FusedFuture, FutureExt};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{
    tracker::ChainTracker,
    types::{FetchPlan, HeightSignal, IngestConfig},
};
use crate::{Chain, feed::FeedStore, source::LogSource, types};

/// Start the ingest loop for a single chain.
///
/// Returns a handle to the background task. The loop runs until the task
/// is aborted; all errors are chain-local, reported to the feed store and
/// retried on the next tick.
///
/// # Example
///
/// ```ignore
/// let feed = FeedStore::default();
/// let handle = ingest::start(Chain::base(), RpcSource::new(provider), feed.clone(), IngestConfig::default());
///
/// let mut heights = feed.subscribe_heights(Chain::base().chain_id());
/// while heights.changed().await.is_ok() {
///     let snapshot = feed.get_feed(Chain::base().chain_id());
///     println!("{} transfers seen", snapshot.total_observed);
/// }
///
/// handle.abort();
/// ```
pub fn start<S>(
    chain: Chain,
    source: S,
    feed: FeedStore,
    config: IngestConfig,
) -> tokio::task::JoinHandle<()>
where
    S: LogSource + 'static,
{
    tokio::spawn(async move { run_listener(chain, source, feed, config).await })
}

/// Drives a [`ChainTracker`] with height checks on a fixed interval and log
/// queries on height advances.
///
/// The log query runs alongside subsequent height checks, which keep
/// updating the known height but never start a second query.
pub async fn run_listener<S: LogSource>(
    chain: Chain,
    source: S,
    feed: FeedStore,
    config: IngestConfig,
) {
    let chain_id = chain.chain_id();
    let mut tracker = ChainTracker::new(chain.clone(), config);
    feed.register(chain_id);

    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let fetch = Fuse::terminated();
    tokio::pin!(fetch);
    let mut pending: Option<FetchPlan> = None;

    info!(chain = %chain.name(), token = %chain.token(), "Starting ingest loop");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let height = match source.get_height(&chain).await {
                    Ok(height) => height,
                    Err(e) => {
                        let e = e.into_height_check();
                        warn!(chain = %chain.name(), %e, "Height check failed, retrying next tick");
                        feed.record_error(chain_id, e);
                        continue;
                    }
                };
                feed.clear_error_if(chain_id, |e| e.is_height_check());

                match tracker.observe_height(height) {
                    HeightSignal::Unchanged => continue,
                    HeightSignal::Busy { height } => {
                        feed.record_height(chain_id, height);
                        debug!(chain = %chain.name(), height, "Fetch in flight, deferring");
                    }
                    HeightSignal::Advanced { height } => {
                        feed.record_height(chain_id, height);
                        if let Some(plan) = tracker.begin_fetch() {
                            debug!(
                                chain = %chain.name(),
                                height,
                                from_block = plan.from_block,
                                to_block = plan.to_block,
                                "Querying transfer logs"
                            );
                            fetch.set(source.query_logs(&chain, plan.from_block, plan.to_block).fuse());
                            pending = Some(plan);
                        }
                    }
                }
            }
            result = &mut fetch, if !fetch.is_terminated() => {
                let Some(plan) = pending.take() else {
                    continue;
                };

                let response = match result {
                    Ok(response) => response,
                    Err(e) => {
                        tracker.fail_fetch();
                        let e = e.into_query();
                        warn!(
                            chain = %chain.name(),
                            from_block = plan.from_block,
                            to_block = plan.to_block,
                            %e,
                            "Log query failed, cursor unchanged"
                        );
                        feed.record_error(chain_id, e);
                        continue;
                    }
                };

                let outcome = tracker.complete_fetch(plan, response, types::unix_millis());
                for (tx_hash, e) in &outcome.decode_failures {
                    warn!(chain = %chain.name(), %tx_hash, %e, "Skipping undecodable log");
                }
                debug!(
                    chain = %chain.name(),
                    accepted = outcome.accepted(),
                    duplicates = outcome.duplicates,
                    next_block = outcome.next_block,
                    archive_height = outcome.archive_height,
                    "Log query processed"
                );
                if outcome.accepted() > 0 {
                    info!(chain = %chain.name(), accepted = outcome.accepted(), "New transfers");
                }

                feed.clear_error(chain_id);
                feed.push(chain_id, outcome.transfers);
            }
        }
    }
}
