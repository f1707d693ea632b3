//! Multi-chain ERC-20 transfer radar.
//!
//! # Overview
//!
//! Live, bounded-memory feed of token transfers across several chains,
//! plus the animation state behind a radar-style display of that feed.
//!
//! Use [`ingest::start`] to spawn a per-chain poll loop that watches the
//! chain head through a [`source::LogSource`] and pulls new `Transfer`
//! logs only when a new block shows up. Accepted transfers land in a
//! shared [`feed::FeedStore`], which [`radar::RadarEngine`] reads from to
//! place, reveal and fade blips over time.
//!
//! The state machines are plain structs ([`ingest::ChainTracker`],
//! [`radar::RadarEngine`]) with no I/O, the async layer only drives them.
//!
//! # Limitations/follow-ups
//!
//! * Chain reorganizations are not handled, the per-chain cursor never
//!   moves backwards.
//!
//! * All state lives in memory and resets on restart.
//!
//! * Deduplication is per transaction hash, so a transaction emitting
//!   several `Transfer` logs for the same token is represented once.
//!
//! # Testing
//!
//! [`testing`] module provides a scripted in-memory [`source::LogSource`]
//! and builders for encoded `Transfer` logs.

pub mod abi;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod num;
pub mod radar;
pub mod source;
pub mod testing;
pub mod types;

use std::{borrow::Cow, time::Duration};

use alloy::primitives::{Address, address};

/// Monitored chain along with the token contract watched on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chain {
    chain_id: types::ChainId,
    name: Cow<'static, str>,
    color: Cow<'static, str>,
    token: Address,
    token_decimals: u8,
    rpc_url: Cow<'static, str>,
    block_interval: Duration,
}

impl Chain {
    pub fn ethereum() -> Self {
        Self::builtin(
            1,
            "Ethereum",
            "#627EEA",
            address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            "https://ethereum-rpc.publicnode.com",
            Duration::from_secs(12),
        )
    }

    pub fn optimism() -> Self {
        Self::builtin(
            10,
            "Optimism",
            "#FF0420",
            address!("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"),
            "https://mainnet.optimism.io",
            Duration::from_secs(2),
        )
    }

    pub fn polygon() -> Self {
        Self::builtin(
            137,
            "Polygon",
            "#8247E5",
            address!("0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359"),
            "https://polygon-rpc.com",
            Duration::from_secs(2),
        )
    }

    pub fn base() -> Self {
        Self::builtin(
            8453,
            "Base",
            "#0052FF",
            address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
            "https://mainnet.base.org",
            Duration::from_secs(2),
        )
    }

    pub fn arbitrum() -> Self {
        Self::builtin(
            42161,
            "Arbitrum",
            "#28A0F0",
            address!("0xaf88d065e77c8cC2239327C5EDb3A432268e5831"),
            "https://arb1.arbitrum.io/rpc",
            Duration::from_millis(250),
        )
    }

    /// All built-in chains, each watching native USDC.
    pub fn all() -> Vec<Self> {
        vec![
            Self::ethereum(),
            Self::optimism(),
            Self::polygon(),
            Self::base(),
            Self::arbitrum(),
        ]
    }

    /// Looks up a built-in chain by its EIP-155 chain ID.
    pub fn by_id(chain_id: types::ChainId) -> Option<Self> {
        Self::all().into_iter().find(|c| c.chain_id == chain_id)
    }

    /// Looks up a built-in chain by name, ignoring case.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn custom(
        chain_id: types::ChainId,
        name: impl Into<String>,
        color: impl Into<String>,
        token: Address,
        token_decimals: u8,
        rpc_url: impl Into<String>,
        block_interval: Duration,
    ) -> Self {
        Self {
            chain_id,
            name: Cow::Owned(name.into()),
            color: Cow::Owned(color.into()),
            token,
            token_decimals,
            rpc_url: Cow::Owned(rpc_url.into()),
            block_interval,
        }
    }

    /// Returns the same chain with a different RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = Cow::Owned(rpc_url.into());
        self
    }

    fn builtin(
        chain_id: types::ChainId,
        name: &'static str,
        color: &'static str,
        token: Address,
        rpc_url: &'static str,
        block_interval: Duration,
    ) -> Self {
        Self {
            chain_id,
            name: Cow::Borrowed(name),
            color: Cow::Borrowed(color),
            token,
            token_decimals: 6,
            rpc_url: Cow::Borrowed(rpc_url),
            block_interval,
        }
    }

    pub fn chain_id(&self) -> types::ChainId {
        self.chain_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display color as a CSS hex string.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Address of the monitored ERC-20 contract.
    pub fn token(&self) -> Address {
        self.token
    }

    pub fn token_decimals(&self) -> u8 {
        self.token_decimals
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Nominal time between blocks.
    pub fn block_interval(&self) -> Duration {
        self.block_interval
    }

    /// Converter of raw token amounts into decimal token units.
    pub fn amount_converter(&self) -> num::Converter {
        num::Converter::new(self.token_decimals)
    }
}
