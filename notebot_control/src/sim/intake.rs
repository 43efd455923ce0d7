//! Simulated ground intake.
//!
//! The arm travels between retracted and deployed over `deploy_time`. A note
//! is captured once the intake has been running, fully deployed, with a note
//! in reach for `capture_time`.

use core::time::Duration;

use notebot_common::subsystem::Intake;
use tracing::trace;

use super::SimConfig;

#[derive(Debug, Clone)]
pub struct SimIntake {
    deploy_time: Duration,
    capture_time: Duration,
    /// Arm travel from retracted, `0..=deploy_time`.
    travel: Duration,
    deploy_commanded: bool,
    running: bool,
    running_for: Duration,
    note: bool,
}

impl SimIntake {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            deploy_time: config.deploy_time(),
            capture_time: config.capture_time(),
            travel: Duration::ZERO,
            deploy_commanded: false,
            running: false,
            running_for: Duration::ZERO,
            note: false,
        }
    }

    /// Seat a note, as at the start of a match.
    pub fn load(&mut self) {
        self.note = true;
    }

    /// Push the held note out. Returns whether there was one.
    pub fn eject(&mut self) -> bool {
        core::mem::take(&mut self.note)
    }

    /// Advance one cycle. Returns `true` when a note was captured.
    pub fn update(&mut self, dt: Duration, note_in_reach: bool) -> bool {
        self.travel = if self.deploy_commanded {
            (self.travel + dt).min(self.deploy_time)
        } else {
            self.travel.saturating_sub(dt)
        };

        let mut captured = false;
        if self.running && self.is_fully_deployed() && note_in_reach && !self.note {
            self.running_for += dt;
            if self.running_for >= self.capture_time {
                self.note = true;
                captured = true;
            }
        } else {
            self.running_for = Duration::ZERO;
        }
        if captured {
            self.running_for = Duration::ZERO;
        }

        trace!(
            travel_ms = self.travel.as_millis() as u64,
            running = self.running,
            note = self.note,
            "intake"
        );
        self.running = false;
        captured
    }
}

impl Intake for SimIntake {
    fn deploy(&mut self) {
        self.deploy_commanded = true;
    }

    fn retract(&mut self) {
        self.deploy_commanded = false;
    }

    fn run_intake(&mut self) {
        self.running = true;
    }

    fn is_fully_deployed(&self) -> bool {
        self.travel >= self.deploy_time
    }

    fn has_note(&self) -> bool {
        self.note
    }
}
