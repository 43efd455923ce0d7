//! Simulated flywheel shooter.
//!
//! Becomes ready once the published range has been steady for the spin-up
//! time. `fire` feeds the held note for the current cycle only.

use core::time::Duration;

use notebot_common::subsystem::Shooter;
use tracing::trace;

use super::SimConfig;

/// Range change that forces the flywheels to re-settle [m].
pub const RANGE_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct SimShooter {
    spin_up_time: Duration,
    range: Option<f64>,
    settled_for: Duration,
    feeding: bool,
}

impl SimShooter {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            spin_up_time: config.spin_up_time(),
            range: None,
            settled_for: Duration::ZERO,
            feeding: false,
        }
    }

    #[inline]
    pub fn range(&self) -> Option<f64> {
        self.range
    }

    /// Advance one cycle. Returns `true` if the feed ran this cycle.
    pub fn update(&mut self, dt: Duration) -> bool {
        if self.range.is_some() {
            self.settled_for = (self.settled_for + dt).min(self.spin_up_time);
        }
        trace!(
            range = self.range,
            ready = self.is_ready(),
            feeding = self.feeding,
            "shooter"
        );
        core::mem::take(&mut self.feeding)
    }
}

impl Shooter for SimShooter {
    fn set_range(&mut self, range: f64) {
        let moved = self
            .range
            .is_none_or(|previous| (previous - range).abs() > RANGE_TOLERANCE);
        if moved {
            self.range = Some(range);
            self.settled_for = Duration::ZERO;
        }
    }

    fn is_ready(&self) -> bool {
        self.range.is_some() && self.settled_for >= self.spin_up_time
    }

    fn fire(&mut self) {
        self.feeding = true;
    }
}
