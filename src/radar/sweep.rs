use std::f64::consts::TAU;

/// Rotating sweep line, angles in radians within `[0, 2π)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SweepState {
    current: f64,
    previous: f64,
    swept: f64,
}

impl SweepState {
    /// Sweep resting at `angle`.
    pub fn at(angle: f64) -> Self {
        let angle = angle.rem_euclid(TAU);
        Self {
            current: angle,
            previous: angle,
            swept: 0.0,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn previous(&self) -> f64 {
        self.previous
    }

    /// Rotates the sweep by `delta` radians.
    pub fn advance(&mut self, delta: f64) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.previous = self.current;
        self.swept = delta;
        self.current = (self.current + delta).rem_euclid(TAU);
    }

    /// Whether the arc covered by the last advance, `(previous, current]`,
    /// contains `angle`.
    pub fn crossed(&self, angle: f64) -> bool {
        if self.swept >= TAU {
            return true;
        }
        if self.swept <= 0.0 {
            return false;
        }

        let angle = angle.rem_euclid(TAU);
        if self.previous <= self.current {
            angle > self.previous && angle <= self.current
        } else {
            // Wrapped through 2π -> 0
            angle > self.previous || angle <= self.current
        }
    }
}
