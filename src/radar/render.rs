//! Drawing contract of the radar.
//!
//! The engine emits a flat list of primitives in normalized coordinates,
//! with the radar centered at the origin and a radius of `1`. A canvas
//! backend scales them to pixels, a headless consumer can inspect them.

use alloy::primitives::TxHash;

/// Single drawing primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Sweep line from the center to the rim.
    Sweep { angle: f64, color: String },

    /// Halo drawn under a blip, twice its radius at half its opacity.
    Glow {
        tx_hash: TxHash,
        x: f64,
        y: f64,
        radius: f64,
        opacity: f64,
        color: String,
    },

    /// The blip itself.
    Blip {
        tx_hash: TxHash,
        x: f64,
        y: f64,
        radius: f64,
        opacity: f64,
        color: String,
    },
}

impl DrawCommand {
    pub fn opacity(&self) -> f64 {
        match self {
            Self::Sweep { .. } => 1.0,
            Self::Glow { opacity, .. } | Self::Blip { opacity, .. } => *opacity,
        }
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Sweep { .. } => None,
            Self::Glow { tx_hash, .. } | Self::Blip { tx_hash, .. } => Some(*tx_hash),
        }
    }
}

/// Polar to cartesian, angle in radians.
pub fn to_cartesian(angle: f64, radius: f64) -> (f64, f64) {
    (radius * angle.cos(), radius * angle.sin())
}
