//! Terminal rendering of the radar state.

use std::{f64::consts::TAU, fmt::Display};

use itertools::Itertools;
use transfer_radar::{Chain, feed::FeedSnapshot, num::Converter, radar::RadarEngine, types::Transfer};

/// Number of newest transfers listed per chain.
pub const NEWEST_TRANSFERS: usize = 3;

/// Multi-line summary of a single chain.
pub fn chain_report(chain: &Chain, snapshot: &FeedSnapshot, engine: &RadarEngine) -> String {
    let height = snapshot
        .height
        .map_or_else(|| "-".to_string(), |h| h.to_string());
    let sweep_degrees = engine.sweep().current() / TAU * 360.0;

    let mut lines = vec![format!(
        "{:<9} height {:>10}  transfers {:>6}  blips {:>3}/{:<3}  sweep {:>3.0}°",
        chain.name(),
        height,
        snapshot.total_observed,
        engine.visible(),
        engine.blips().len(),
        sweep_degrees,
    )];
    if let Some(e) = &snapshot.last_error {
        lines.push(format!("  ! {e}"));
    }

    let converter = chain.amount_converter();
    lines.extend(
        snapshot
            .recent
            .iter()
            .rev()
            .take(NEWEST_TRANSFERS)
            .map(|t| transfer_line(t, converter)),
    );
    lines.into_iter().join("\n")
}

/// Single transfer, newest first in the report.
pub fn transfer_line(transfer: &Transfer, converter: Converter) -> String {
    format!(
        "  {} {} -> {} {:>16} @{}",
        shorten(transfer.tx_hash()),
        shorten(transfer.from()),
        shorten(transfer.to()),
        transfer.display_amount(converter),
        transfer.block_number(),
    )
}

/// `0x1234…abcd` form of a hex value.
pub fn shorten(value: impl Display) -> String {
    let full = value.to_string();
    if full.len() <= 12 {
        return full;
    }
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
