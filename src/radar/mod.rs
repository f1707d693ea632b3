//! Radar presentation engine.
//!
//! Per-chain animation state over the transfer feed. Driven by timestamped
//! ticks, so the animation speed does not depend on the frame rate.
//!
//! Blip lifecycle:
//! 1. A transfer not seen before is placed at a random angle and distance,
//!    undiscovered and invisible.
//! 2. The rotating sweep discovers it the first time it passes over its angle.
//! 3. A discovered blip fades over one sweep period (paused while hovered)
//!    and is dropped once fully faded.
//!
//! One sweep period is the chain's block interval, but never less than
//! [`DEFAULT_MIN_PERIOD`] so fast chains stay readable.

mod blip;
mod render;
mod sweep;

pub use blip::{RadarBlip, visual_size};
pub use render::{DrawCommand, to_cartesian};
pub use sweep::SweepState;

use std::{f64::consts::TAU, time::Duration};

use alloy::primitives::TxHash;
use rand::Rng;

use crate::{Chain, ingest::SeenSet, types::Transfer};

/// Shortest allowed sweep period.
pub const DEFAULT_MIN_PERIOD: Duration = Duration::from_secs(2);

/// Radar engine parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadarConfig {
    /// Lower bound of the sweep period.
    pub min_period: Duration,

    /// Size of the blip for the smallest amounts.
    pub min_size: f64,

    /// Size of the blip for the largest amounts.
    pub max_size: f64,

    /// Closest blip distance from the center, relative to radar radius.
    pub min_radius: f64,

    /// Farthest blip distance from the center, relative to radar radius.
    pub max_radius: f64,

    /// Ceiling of remembered displayed transfer IDs.
    pub displayed_capacity: usize,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            min_period: DEFAULT_MIN_PERIOD,
            min_size: 2.0,
            max_size: 12.0,
            min_radius: 0.3,
            max_radius: 0.9,
            displayed_capacity: crate::ingest::DEFAULT_SEEN_CAPACITY,
        }
    }
}

/// Changes made by a single [`RadarEngine::advance`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Blips revealed by the sweep.
    pub discovered: usize,

    /// Fully faded blips dropped.
    pub removed: usize,
}

/// Radar animation state of a single chain.
#[derive(Clone, Debug)]
pub struct RadarEngine {
    chain: Chain,
    config: RadarConfig,
    period: Duration,
    sweep: SweepState,
    blips: Vec<RadarBlip>,
    displayed: SeenSet,
    hovered: Option<TxHash>,
    last_tick: Option<Duration>,
}

impl RadarEngine {
    pub fn new(chain: &Chain) -> Self {
        Self::with_config(chain, RadarConfig::default())
    }

    pub fn with_config(chain: &Chain, config: RadarConfig) -> Self {
        Self {
            chain: chain.clone(),
            config,
            period: chain.block_interval().max(config.min_period),
            sweep: SweepState::default(),
            blips: Vec::new(),
            displayed: SeenSet::new(config.displayed_capacity),
            hovered: None,
            last_tick: None,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    /// Time of one full sweep revolution, also the fade duration.
    pub fn effective_period(&self) -> Duration {
        self.period
    }

    pub fn sweep(&self) -> &SweepState {
        &self.sweep
    }

    /// Live blips, discovered or not.
    pub fn blips(&self) -> &[RadarBlip] {
        &self.blips
    }

    pub fn blip(&self, tx_hash: TxHash) -> Option<&RadarBlip> {
        self.blips.iter().find(|b| b.tx_hash == tx_hash)
    }

    /// Number of blips currently drawn.
    pub fn visible(&self) -> usize {
        self.blips.iter().filter(|b| b.discovered).count()
    }

    pub fn hovered(&self) -> Option<TxHash> {
        self.hovered
    }

    /// Pins the fade of the given blip, or releases the pin with `None`.
    pub fn set_hovered(&mut self, tx_hash: Option<TxHash>) {
        self.hovered = tx_hash;
    }

    /// Places blips for transfers not displayed before.
    ///
    /// Transfers of other chains are ignored. Safe to call repeatedly with
    /// overlapping feed snapshots as long as the displayed-ID capacity is at
    /// least twice the feed window. Returns the number of placed blips.
    ///
    /// Every given transfer is displayed; callers drop the ones they do
    /// not want shown, see [`Transfer::meets_threshold`].
    pub fn ingest<R: Rng + ?Sized>(&mut self, transfers: &[Transfer], rng: &mut R) -> usize {
        let mut placed = 0;
        for transfer in transfers {
            if transfer.chain_id() != self.chain.chain_id() {
                continue;
            }
            if !self.displayed.insert(transfer.tx_hash()) {
                continue;
            }

            let angle = rng.gen_range(0.0..TAU);
            let radius = rng.gen_range(self.config.min_radius..=self.config.max_radius);
            self.place(RadarBlip::new(
                transfer.tx_hash(),
                angle,
                radius,
                visual_size(
                    transfer.amount(),
                    self.chain.token_decimals(),
                    self.config.min_size,
                    self.config.max_size,
                ),
                self.now(),
                transfer.amount(),
            ));
            placed += 1;
        }
        placed
    }

    /// Adds an already positioned blip.
    pub fn place(&mut self, blip: RadarBlip) {
        self.blips.push(blip);
    }

    /// Advances the animation to the engine clock time `now`.
    ///
    /// The first tick only anchors the clock. A `now` earlier than the
    /// previous tick counts as no time passing.
    pub fn tick(&mut self, now: Duration) -> TickReport {
        let elapsed = match self.last_tick {
            Some(prev) => now.saturating_sub(prev),
            None => Duration::ZERO,
        };
        self.last_tick = Some(self.last_tick.map_or(now, |prev| prev.max(now)));
        self.advance(elapsed.as_secs_f64())
    }

    /// Advances the animation by `elapsed` seconds.
    pub fn advance(&mut self, elapsed: f64) -> TickReport {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        let period = self.period.as_secs_f64();
        let mut report = TickReport::default();

        self.sweep.advance(TAU / period * elapsed);

        let fade_step = elapsed / period;
        for blip in &mut self.blips {
            if !blip.discovered {
                if self.sweep.crossed(blip.angle) {
                    blip.discovered = true;
                    report.discovered += 1;
                }
                // Fading starts on the tick after discovery
                continue;
            }
            if self.hovered == Some(blip.tx_hash) {
                continue;
            }
            blip.fade += fade_step;
        }

        let before = self.blips.len();
        self.blips.retain(|b| b.fade < 1.0);
        report.removed = before - self.blips.len();

        report
    }

    /// Drawing primitives for the current state: the sweep line, then a
    /// glow and a blip for every discovered blip.
    pub fn render(&self) -> Vec<DrawCommand> {
        let color = self.chain.color().to_string();
        let mut commands = Vec::with_capacity(1 + 2 * self.blips.len());
        commands.push(DrawCommand::Sweep {
            angle: self.sweep.current(),
            color: color.clone(),
        });

        for blip in self.blips.iter().filter(|b| b.discovered) {
            let (x, y) = to_cartesian(blip.angle, blip.radius);
            let opacity = blip.opacity();
            commands.push(DrawCommand::Glow {
                tx_hash: blip.tx_hash,
                x,
                y,
                radius: blip.size * 2.0,
                opacity: opacity / 2.0,
                color: color.clone(),
            });
            commands.push(DrawCommand::Blip {
                tx_hash: blip.tx_hash,
                x,
                y,
                radius: blip.size,
                opacity,
                color: color.clone(),
            });
        }
        commands
    }

    fn now(&self) -> Duration {
        self.last_tick.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256, U256};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn id(n: u64) -> TxHash {
        B256::from(U256::from(n))
    }

    fn transfer(chain: &Chain, n: u64, tokens: u64) -> Transfer {
        Transfer::new(
            chain.chain_id(),
            id(n),
            n,
            None,
            Address::ZERO,
            Address::ZERO,
            U256::from(tokens) * U256::from(1_000_000),
            0,
        )
    }

    fn engine_with_blip_at(angle: f64) -> RadarEngine {
        let mut engine = RadarEngine::new(&Chain::base());
        engine.place(RadarBlip::new(id(1), angle, 0.5, 4.0, Duration::ZERO, U256::from(1)));
        engine
    }

    #[test]
    fn test_effective_period() {
        assert_eq!(
            RadarEngine::new(&Chain::ethereum()).effective_period(),
            Duration::from_secs(12)
        );
        assert_eq!(
            RadarEngine::new(&Chain::arbitrum()).effective_period(),
            Duration::from_secs(2)
        );
        assert_eq!(
            RadarEngine::new(&Chain::base()).effective_period(),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_ingest_places_within_bounds() {
        let chain = Chain::base();
        let mut engine = RadarEngine::new(&chain);
        let mut rng = StdRng::seed_from_u64(7);

        let transfers: Vec<_> = (0..200).map(|n| transfer(&chain, n, n)).collect();
        assert_eq!(engine.ingest(&transfers, &mut rng), 200);

        for blip in engine.blips() {
            assert!((0.0..TAU).contains(&blip.angle()));
            assert!((0.3..=0.9).contains(&blip.radius()));
            assert!((2.0..=12.0).contains(&blip.size()));
            assert_eq!(blip.fade(), 0.0);
            assert!(!blip.is_discovered());
        }
    }

    #[test]
    fn test_ingest_skips_displayed_and_foreign() {
        let chain = Chain::base();
        let mut engine = RadarEngine::new(&chain);
        let mut rng = StdRng::seed_from_u64(7);

        let snapshot = vec![transfer(&chain, 1, 10), transfer(&chain, 2, 10)];
        assert_eq!(engine.ingest(&snapshot, &mut rng), 2);
        // Same feed window on the next frame
        assert_eq!(engine.ingest(&snapshot, &mut rng), 0);
        assert_eq!(engine.ingest(&[transfer(&Chain::ethereum(), 3, 10)], &mut rng), 0);
        assert_eq!(engine.blips().len(), 2);
    }

    #[test]
    fn test_discovery_on_crossing() {
        let mut engine = engine_with_blip_at(1.0);
        engine.sweep = SweepState::at(0.9);

        let report = engine.advance(0.2 / TAU * 2.0);
        assert_eq!(report.discovered, 1);
        assert!(engine.blip(id(1)).unwrap().is_discovered());
        assert_eq!(engine.blip(id(1)).unwrap().fade(), 0.0);

        // 1.1 -> 1.3 does not touch the already discovered blip
        let report = engine.advance(0.2 / TAU * 2.0);
        assert_eq!(report.discovered, 0);
        assert!(engine.blip(id(1)).unwrap().is_discovered());
    }

    #[test]
    fn test_no_discovery_before_crossing() {
        let mut engine = engine_with_blip_at(1.0);
        engine.sweep = SweepState::at(1.2);

        engine.advance(0.2 / TAU * 2.0);
        assert!(!engine.blip(id(1)).unwrap().is_discovered());
        assert_eq!(engine.blip(id(1)).unwrap().fade(), 0.0);
    }

    #[test]
    fn test_discovery_across_wraparound() {
        let mut engine = engine_with_blip_at(0.05);
        engine.sweep = SweepState::at(6.2);

        engine.advance((TAU - 6.2 + 0.1) / TAU * 2.0);
        assert!((engine.sweep().current() - 0.1).abs() < 1e-9);
        assert!(engine.blip(id(1)).unwrap().is_discovered());
    }

    #[test]
    fn test_fade_and_removal_within_period() {
        let mut engine = engine_with_blip_at(0.1);
        let tick = 0.05;
        let period = engine.effective_period().as_secs_f64();

        let mut discovered_at = None;
        let mut removed_at = None;
        let mut t = 0.0;
        while t < 10.0 {
            let report = engine.advance(tick);
            t += tick;
            if report.discovered == 1 {
                discovered_at = Some(t);
            }
            if report.removed == 1 {
                removed_at = Some(t);
                break;
            }
            if let Some(blip) = engine.blip(id(1)) {
                if blip.is_discovered() {
                    assert!(blip.fade() < 1.0);
                }
            }
        }

        let lifetime = removed_at.unwrap() - discovered_at.unwrap();
        assert!((lifetime - period).abs() <= tick + 1e-9, "{lifetime}");
        assert!(engine.blips().is_empty());
    }

    #[test]
    fn test_discovered_flag_never_resets() {
        let mut engine = engine_with_blip_at(3.0);
        let mut was_discovered = false;
        for _ in 0..30 {
            engine.advance(0.05);
            let Some(blip) = engine.blip(id(1)) else {
                break;
            };
            assert!(!was_discovered || blip.is_discovered());
            was_discovered = blip.is_discovered();
        }
        assert!(was_discovered);
    }

    #[test]
    fn test_hover_pins_fade() {
        let mut engine = engine_with_blip_at(0.1);
        engine.advance(0.1);
        assert!(engine.blip(id(1)).unwrap().is_discovered());
        engine.advance(0.5);
        let pinned = engine.blip(id(1)).unwrap().fade();
        assert!(pinned > 0.0);

        engine.set_hovered(Some(id(1)));
        for _ in 0..100 {
            engine.advance(0.5);
        }
        assert_eq!(engine.blip(id(1)).unwrap().fade(), pinned);

        engine.set_hovered(None);
        engine.advance(2.0);
        assert!(engine.blip(id(1)).is_none());
    }

    #[test]
    fn test_tick_uses_elapsed_time() {
        let mut engine = engine_with_blip_at(1.0);

        // First tick anchors the clock
        assert_eq!(engine.tick(Duration::from_secs(100)), TickReport::default());
        assert_eq!(engine.sweep().current(), 0.0);

        engine.tick(Duration::from_millis(100_500));
        assert!((engine.sweep().current() - TAU / 4.0).abs() < 1e-9);

        // Clock going backwards is no time passing
        engine.tick(Duration::from_secs(99));
        assert!((engine.sweep().current() - TAU / 4.0).abs() < 1e-9);

        // Same elapsed time in many small ticks or one large one
        let mut fine = engine_with_blip_at(1.0);
        let mut coarse = engine_with_blip_at(1.0);
        fine.tick(Duration::ZERO);
        coarse.tick(Duration::ZERO);
        for ms in (16..=1600).step_by(16) {
            fine.tick(Duration::from_millis(ms));
        }
        coarse.tick(Duration::from_millis(1600));
        assert!((fine.sweep().current() - coarse.sweep().current()).abs() < 1e-9);
    }

    #[test]
    fn test_render_only_discovered() {
        let mut engine = engine_with_blip_at(1.0);
        engine.place(RadarBlip::new(id(2), 4.0, 0.5, 6.0, Duration::ZERO, U256::from(1)));
        engine.sweep = SweepState::at(0.9);
        engine.advance(0.2 / TAU * 2.0);
        engine.advance(0.5);

        let commands = engine.render();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], DrawCommand::Sweep { .. }));

        let DrawCommand::Glow { radius: glow_radius, opacity: glow_opacity, tx_hash, .. } = commands[1]
        else {
            panic!("expected glow, got {:?}", commands[1]);
        };
        let DrawCommand::Blip { radius, opacity, x, y, ref color, .. } = commands[2] else {
            panic!("expected blip, got {:?}", commands[2]);
        };
        assert_eq!(tx_hash, id(1));
        assert_eq!(color, "#0052FF");
        assert_eq!(glow_radius, radius * 2.0);
        assert_eq!(glow_opacity, opacity / 2.0);
        assert!((opacity - 0.75).abs() < 1e-9);
        assert!((x - 0.5 * 1.0f64.cos()).abs() < 1e-12);
        assert!((y - 0.5 * 1.0f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn test_displayed_set_is_bounded() {
        let chain = Chain::base();
        let config = RadarConfig {
            displayed_capacity: 64,
            ..Default::default()
        };
        let mut engine = RadarEngine::with_config(&chain, config);
        let mut rng = StdRng::seed_from_u64(1);

        for batch in 0..50u64 {
            let transfers: Vec<_> = (0..10).map(|i| transfer(&chain, batch * 10 + i, 1)).collect();
            engine.ingest(&transfers, &mut rng);
            engine.advance(0.5);
            assert!(engine.displayed.len() <= 64);
        }
    }

    #[test]
    fn test_sliding_feed_window_placed_once() {
        let chain = Chain::base();
        let window = 10u64;
        let placements = |displayed_capacity: usize| {
            let config = RadarConfig {
                displayed_capacity,
                ..Default::default()
            };
            let mut engine = RadarEngine::with_config(&chain, config);
            let mut rng = StdRng::seed_from_u64(3);
            let mut placed = 0;
            for head in window..200 {
                let snapshot: Vec<_> = (head - window..head).map(|n| transfer(&chain, n, 1)).collect();
                placed += engine.ingest(&snapshot, &mut rng);
            }
            placed
        };

        // Distinct IDs across all windows
        assert_eq!(placements(2 * window as usize), 199);
        assert!(placements(window as usize) > 199);
    }
}
