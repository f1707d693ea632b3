use std::time::Duration;

use alloy::primitives::{TxHash, U256};

/// Token amount, in whole units, mapped to the smallest blip.
const SIZE_LOG_FLOOR: f64 = 0.0;

/// Token amount, in whole units, mapped to the largest blip.
const SIZE_LOG_CEIL: f64 = 7.0;

/// Radar representation of a single transfer.
///
/// Placed undiscovered, revealed once by the sweep, then fades out and is
/// dropped when fully faded.
#[derive(Clone, derive_more::Debug, PartialEq)]
pub struct RadarBlip {
    pub(crate) tx_hash: TxHash,
    pub(crate) angle: f64,
    pub(crate) radius: f64,
    pub(crate) size: f64,
    pub(crate) created_at: Duration,
    pub(crate) fade: f64,
    pub(crate) discovered: bool,
    #[debug("{amount}")]
    pub(crate) amount: U256,
}

impl RadarBlip {
    pub fn new(
        tx_hash: TxHash,
        angle: f64,
        radius: f64,
        size: f64,
        created_at: Duration,
        amount: U256,
    ) -> Self {
        Self {
            tx_hash,
            angle,
            radius,
            size,
            created_at,
            fade: 0.0,
            discovered: false,
            amount,
        }
    }

    /// Transaction the blip represents.
    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Angular position in radians, `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Distance from the center, relative to the radar radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Engine clock time the blip was placed at.
    pub fn created_at(&self) -> Duration {
        self.created_at
    }

    /// Fade progress, `0` just discovered, `1` gone.
    pub fn fade(&self) -> f64 {
        self.fade
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// Current opacity of the blip.
    pub fn opacity(&self) -> f64 {
        (1.0 - self.fade).clamp(0.0, 1.0)
    }
}

/// Blip size for a raw token amount.
///
/// Logarithmic in the whole-unit amount, 1 token and below map to
/// `min_size`, 10M tokens and above map to `max_size`.
pub fn visual_size(amount: U256, decimals: u8, min_size: f64, max_size: f64) -> f64 {
    // Zero maps to -inf, clamped below
    let log = amount.approx_log10() - decimals as f64;
    let t = ((log - SIZE_LOG_FLOOR) / (SIZE_LOG_CEIL - SIZE_LOG_FLOOR)).clamp(0.0, 1.0);
    min_size + t * (max_size - min_size)
}
