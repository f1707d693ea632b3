//! Radar orchestration: ingest actors and the animation loop.

use std::time::Duration;

use alloy::{
    primitives::U256,
    providers::{DynProvider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::layers::RetryBackoffLayer,
};
use rand::{SeedableRng, rngs::StdRng};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, error, info};
use transfer_radar::{
    Chain, feed::FeedStore, ingest, radar::RadarEngine, source::RpcSource, types::Transfer,
};
use url::Url;

use crate::{config::RadarSettings, display, error::Result};

/// Running radar over a set of chains.
#[derive(Debug)]
pub struct RadarApp {
    feed: FeedStore,
    engines: Vec<RadarEngine>,
    /// Per-engine display threshold, in the chain's smallest units.
    thresholds: Vec<Option<U256>>,
    handles: Vec<JoinHandle<()>>,
    frame: Duration,
    report_interval: Duration,
    rng: StdRng,
}

impl RadarApp {
    /// Spawns an ingest actor per chain.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start(settings: RadarSettings, endpoints: Vec<(Chain, Url)>, seed: Option<u64>) -> Self {
        let feed = FeedStore::new(settings.feed_capacity);
        let mut engines = Vec::with_capacity(endpoints.len());
        let mut thresholds = Vec::with_capacity(endpoints.len());
        let mut handles = Vec::with_capacity(endpoints.len());

        for (chain, url) in endpoints {
            info!(
                chain = %chain.name(),
                chain_id = chain.chain_id(),
                rpc_url = %url,
                "Starting chain"
            );

            let client = RpcClient::builder()
                .layer(RetryBackoffLayer::new(10, 100, 200))
                .http(url);
            let provider = DynProvider::new(ProviderBuilder::new().connect_client(client));

            engines.push(RadarEngine::with_config(&chain, settings.radar));
            thresholds.push(
                settings
                    .min_amount
                    .map(|amount| chain.amount_converter().to_unsigned(amount)),
            );
            handles.push(ingest::start(
                chain,
                RpcSource::new(provider),
                feed.clone(),
                settings.ingest,
            ));
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            feed,
            engines,
            thresholds,
            handles,
            frame: settings.frame,
            report_interval: settings.report_interval,
            rng,
        }
    }

    /// Runs the animation loop until Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        let started = Instant::now();

        let mut frame = tokio::time::interval(self.frame);
        frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut report = tokio::time::interval(self.report_interval);
        report.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = frame.tick() => self.animate(started.elapsed()),
                _ = report.tick() => self.report(),
                result = &mut shutdown => {
                    result?;
                    info!("Interrupted, shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Aborts all ingest actors.
    pub fn shutdown(self) {
        for handle in &self.handles {
            handle.abort();
        }
    }

    fn animate(&mut self, now: Duration) {
        for (engine, threshold) in self.engines.iter_mut().zip(&self.thresholds) {
            let mut recent = self.feed.get_feed(engine.chain().chain_id()).recent;
            retain_displayable(&mut recent, *threshold);
            let placed = engine.ingest(&recent, &mut self.rng);
            let tick = engine.tick(now);
            if placed > 0 || tick.discovered > 0 || tick.removed > 0 {
                debug!(
                    chain = %engine.chain().name(),
                    placed,
                    discovered = tick.discovered,
                    removed = tick.removed,
                    "Radar updated"
                );
            }
        }
    }

    fn report(&self) {
        for (engine, handle) in self.engines.iter().zip(&self.handles) {
            if handle.is_finished() {
                error!(chain = %engine.chain().name(), "Ingest loop stopped");
            }
            let snapshot = self.feed.get_feed(engine.chain().chain_id());
            println!("{}", display::chain_report(engine.chain(), &snapshot, engine));
        }
        println!();
    }
}

/// Drops transfers below the display threshold.
fn retain_displayable(transfers: &mut Vec<Transfer>, min_amount: Option<U256>) {
    if let Some(min) = min_amount {
        transfers.retain(|transfer| transfer.meets_threshold(min));
    }
}
