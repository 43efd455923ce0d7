//! Aim-and-fire sub-controller.
//!
//! Two states: `aiming` turns the robot to the goal and waits for the
//! shooter, `firing` holds the feed for a fixed pulse and then stops the
//! machine. Usable standalone (quick shot) or nested inside the note
//! manager, which engages it every tick it wants a shot.

use core::time::Duration;

use notebot_common::subsystem::RobotIo;

use super::aim::aim_at_goal;
use crate::error::FsmError;
use crate::fsm::{Controller, Exit, Fsm, StateId, StateDecl, StateTable, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotState {
    Aiming,
    Firing,
}

impl StateId for ShotState {
    const ALL: &'static [Self] = &[Self::Aiming, Self::Firing];

    fn name(self) -> &'static str {
        match self {
            Self::Aiming => "aiming",
            Self::Firing => "firing",
        }
    }
}

/// Turn to the goal, wait until ready, fire for `fire_duration`.
#[derive(Debug, Clone)]
pub struct AimAndFire {
    fsm: Fsm<ShotState>,
}

impl AimAndFire {
    pub const MACHINE: &'static str = "aim_and_fire";

    pub fn new(fire_duration: Duration) -> Result<Self, FsmError> {
        let table = StateTable::new(
            Self::MACHINE,
            &[
                StateDecl::new(ShotState::Aiming).first(),
                StateDecl::new(ShotState::Firing)
                    .must_finish()
                    .timed(fire_duration, Exit::Done),
            ],
        )?;
        Ok(Self {
            fsm: Fsm::new(table),
        })
    }

    /// Request a shot for the next tick. Must be repeated every tick while
    /// aiming; once firing the pulse always completes.
    #[inline]
    pub fn engage(&mut self) {
        self.fsm.engage();
    }

    #[inline]
    pub fn done(&mut self) {
        self.fsm.done();
    }

    #[inline]
    pub fn current_state(&self) -> Option<ShotState> {
        self.fsm.current_state()
    }

    #[inline]
    pub fn is_executing(&self) -> bool {
        self.fsm.is_executing()
    }

    #[inline]
    pub fn is_firing(&self) -> bool {
        self.fsm.current_state() == Some(ShotState::Firing)
    }

    /// The firing pulse ended on the most recent tick.
    pub fn has_just_fired(&self) -> bool {
        self.fsm.last_state() == Some(ShotState::Firing) && !self.fsm.is_executing()
    }

    /// Was running at the start of the most recent tick and is not now.
    pub fn just_stopped(&self) -> bool {
        self.fsm.last_state().is_some() && !self.fsm.is_executing()
    }
}

impl<R: RobotIo + ?Sized> Controller<R> for AimAndFire {
    type State = ShotState;

    fn fsm_mut(&mut self) -> &mut Fsm<ShotState> {
        &mut self.fsm
    }

    fn run_state(&mut self, step: Step<ShotState>, io: &mut R) {
        match step.state {
            ShotState::Aiming => {
                aim_at_goal(io);
                if io.chassis().at_desired_heading() && io.shooter().is_ready() {
                    self.fsm.next_state(ShotState::Firing);
                }
            }
            ShotState::Firing => io.shooter().fire(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
