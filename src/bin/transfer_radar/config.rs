//! Configuration for the transfer radar.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): RPC endpoints, seed
//! - CLI arguments: chains and tuning parameters

use std::time::Duration;

use clap::Parser;
use fastnum::{UD256, decimal::Context};
use itertools::Itertools;
use transfer_radar::{
    Chain,
    ingest::{DEFAULT_SEEN_CAPACITY, DEFAULT_START_MARGIN, IngestConfig},
    radar::RadarConfig,
};
use url::Url;

/// Environment configuration (RPC endpoint overrides).
#[derive(Debug, Default, serde::Deserialize)]
pub struct EnvConfig {
    /// Ethereum mainnet RPC URL
    pub ethereum_rpc_url: Option<String>,

    /// Optimism RPC URL
    pub optimism_rpc_url: Option<String>,

    /// Polygon PoS RPC URL
    pub polygon_rpc_url: Option<String>,

    /// Base RPC URL
    pub base_rpc_url: Option<String>,

    /// Arbitrum One RPC URL
    pub arbitrum_rpc_url: Option<String>,

    /// Seed of the blip placement RNG, random if not set
    pub radar_seed: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// RPC URL override for a built-in chain.
    pub fn rpc_url(&self, chain_id: u64) -> Option<&str> {
        match chain_id {
            1 => self.ethereum_rpc_url.as_deref(),
            10 => self.optimism_rpc_url.as_deref(),
            137 => self.polygon_rpc_url.as_deref(),
            8453 => self.base_rpc_url.as_deref(),
            42161 => self.arbitrum_rpc_url.as_deref(),
            _ => None,
        }
    }

    /// Applies RPC overrides and validates the resulting endpoints.
    pub fn endpoints(&self, chains: Vec<Chain>) -> Result<Vec<(Chain, Url)>, ConfigError> {
        chains
            .into_iter()
            .map(|chain| {
                let chain = match self.rpc_url(chain.chain_id()) {
                    Some(url) => chain.with_rpc_url(url),
                    None => chain,
                };
                let url = Url::parse(chain.rpc_url()).map_err(|source| {
                    ConfigError::InvalidRpcUrl {
                        chain: chain.name().to_string(),
                        source,
                    }
                })?;
                Ok((chain, url))
            })
            .collect()
    }
}

/// CLI arguments of the radar.
#[derive(Debug, Parser)]
#[command(name = "transfer_radar")]
#[command(about = "Live radar of USDC transfers across EVM chains")]
pub struct CliConfig {
    /// Chains to watch (comma-separated names, e.g. "base,arbitrum")
    /// If not specified, watches all built-in chains
    #[arg(long, value_delimiter = ',')]
    pub chains: Vec<String>,

    /// Interval between height checks, in milliseconds
    #[arg(long, default_value = "500")]
    pub poll_interval_ms: u64,

    /// Maximum number of blocks per log query
    #[arg(long, default_value = "10000")]
    pub range_limit: u64,

    /// Number of recent transfers kept per chain
    #[arg(long, default_value = "100")]
    pub feed_capacity: usize,

    /// Animation frame interval, in milliseconds
    #[arg(long, default_value = "50")]
    pub frame_ms: u64,

    /// Interval between terminal reports, in milliseconds
    #[arg(long, default_value = "1000")]
    pub report_interval_ms: u64,

    /// Hide transfers below this amount, in whole tokens (e.g. "1000.5")
    #[arg(long)]
    pub min_amount: Option<String>,
}

/// Validated radar settings.
#[derive(Clone, Debug)]
pub struct RadarSettings {
    pub chains: Vec<Chain>,
    pub ingest: IngestConfig,
    pub radar: RadarConfig,
    pub feed_capacity: usize,
    /// Transfers below this amount, in whole tokens, are kept off the radar.
    pub min_amount: Option<UD256>,
    pub frame: Duration,
    pub report_interval: Duration,
}

impl CliConfig {
    /// Convert CLI config to the settings used by the radar.
    pub fn to_radar_settings(&self) -> Result<RadarSettings, ConfigError> {
        let chains = if self.chains.is_empty() {
            Chain::all()
        } else {
            self.chains
                .iter()
                .map(|name| {
                    Chain::by_name(name).ok_or_else(|| ConfigError::UnknownChain(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        if !chains.iter().map(Chain::chain_id).all_unique() {
            return Err(ConfigError::DuplicateChain);
        }

        let positive = |value: u64, name: &'static str| {
            if value == 0 {
                Err(ConfigError::ZeroValue(name))
            } else {
                Ok(value)
            }
        };
        let poll_interval_ms = positive(self.poll_interval_ms, "poll_interval_ms")?;
        let range_limit = positive(self.range_limit, "range_limit")?;
        let frame_ms = positive(self.frame_ms, "frame_ms")?;
        let report_interval_ms = positive(self.report_interval_ms, "report_interval_ms")?;
        if self.feed_capacity == 0 {
            return Err(ConfigError::ZeroValue("feed_capacity"));
        }

        let min_amount = self
            .min_amount
            .as_deref()
            .map(|amount| {
                UD256::from_str(amount, Context::default())
                    .map_err(|_| ConfigError::InvalidMinAmount(amount.to_string()))
            })
            .transpose()?;

        Ok(RadarSettings {
            chains,
            ingest: IngestConfig {
                poll_interval: Duration::from_millis(poll_interval_ms),
                range_limit,
                start_margin: DEFAULT_START_MARGIN,
                seen_capacity: DEFAULT_SEEN_CAPACITY,
            },
            radar: RadarConfig {
                // Engines see the whole feed window every frame, their
                // displayed IDs must outlive it
                displayed_capacity: DEFAULT_SEEN_CAPACITY.max(self.feed_capacity.saturating_mul(2)),
                ..Default::default()
            },
            feed_capacity: self.feed_capacity,
            min_amount,
            frame: Duration::from_millis(frame_ms),
            report_interval: Duration::from_millis(report_interval_ms),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown chain {0:?}")]
    UnknownChain(String),

    #[error("Chain selected more than once")]
    DuplicateChain,

    #[error("{0} must be positive")]
    ZeroValue(&'static str),

    #[error("Invalid minimum amount {0:?}")]
    InvalidMinAmount(String),

    #[error("Invalid RPC URL for {chain}: {source}")]
    InvalidRpcUrl {
        chain: String,
        source: url::ParseError,
    },
}
