//! Autonomous sequencer.
//!
//! Drives the chassis through a [`Routine`] leg by leg and feeds intents to
//! the note manager. A leg only advances once the note manager reports the
//! end of a firing pulse, so leg `i + 1` never starts before the shot of
//! leg `i`.

use notebot_common::subsystem::RobotIo;
use tracing::info;

use super::routine::Routine;
use crate::controller::NoteManager;
use crate::error::FsmError;
use crate::fsm::{Controller, Fsm, StateId, StateDecl, StateTable, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoState {
    Localising,
    DrivingToNote,
    DrivingToShoot,
    Shooting,
    Finished,
}

impl StateId for AutoState {
    const ALL: &'static [Self] = &[
        Self::Localising,
        Self::DrivingToNote,
        Self::DrivingToShoot,
        Self::Shooting,
        Self::Finished,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Localising => "localising",
            Self::DrivingToNote => "driving_to_note",
            Self::DrivingToShoot => "driving_to_shoot",
            Self::Shooting => "shooting",
            Self::Finished => "finished",
        }
    }
}

/// Collaborators the sequencer touches during one tick.
pub struct AutoIo<'a, R: ?Sized> {
    pub robot: &'a mut R,
    pub notes: &'a mut NoteManager,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    fsm: Fsm<AutoState>,
    routine: Routine,
    leg: usize,
    shooting_preload: bool,
    legs_completed: usize,
}

impl Sequencer {
    pub const MACHINE: &'static str = "autonomous";

    pub fn new(routine: Routine) -> Result<Self, FsmError> {
        let table = StateTable::new(
            Self::MACHINE,
            &[
                StateDecl::new(AutoState::Localising).first().must_finish(),
                StateDecl::new(AutoState::DrivingToNote).must_finish(),
                StateDecl::new(AutoState::DrivingToShoot).must_finish(),
                StateDecl::new(AutoState::Shooting).must_finish(),
                StateDecl::new(AutoState::Finished).must_finish(),
            ],
        )?;
        Ok(Self {
            fsm: Fsm::new(table),
            routine,
            leg: 0,
            shooting_preload: false,
            legs_completed: 0,
        })
    }

    /// Restart the routine from the beginning.
    pub fn start(&mut self) {
        self.fsm.done();
        self.leg = 0;
        self.shooting_preload = false;
        self.legs_completed = 0;
        info!(routine = self.routine.name(), legs = self.routine.len(), "autonomous start");
        self.fsm.engage();
    }

    pub fn stop(&mut self) {
        self.fsm.done();
    }

    #[inline]
    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    #[inline]
    pub fn current_state(&self) -> Option<AutoState> {
        self.fsm.current_state()
    }

    /// Index of the leg being driven.
    #[inline]
    pub fn leg(&self) -> usize {
        self.leg
    }

    #[inline]
    pub fn legs_completed(&self) -> usize {
        self.legs_completed
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.fsm.current_state() == Some(AutoState::Finished)
    }

    fn begin_leg(&mut self) {
        if self.leg < self.routine.len() {
            info!(routine = self.routine.name(), leg = self.leg, "leg start");
            self.fsm.next_state(AutoState::DrivingToNote);
        } else {
            info!(
                routine = self.routine.name(),
                legs = self.legs_completed,
                "routine complete"
            );
            self.fsm.next_state(AutoState::Finished);
        }
    }
}

impl<'a, R: RobotIo + ?Sized> Controller<AutoIo<'a, R>> for Sequencer {
    type State = AutoState;

    fn fsm_mut(&mut self) -> &mut Fsm<AutoState> {
        &mut self.fsm
    }

    fn run_state(&mut self, step: Step<AutoState>, io: &mut AutoIo<'a, R>) {
        match step.state {
            AutoState::Localising => {
                if let Some(pose) = self.routine.start_pose() {
                    io.robot.chassis().set_pose(pose);
                }
                if io.notes.is_holding_note() {
                    info!(routine = self.routine.name(), "shooting preload");
                    self.shooting_preload = true;
                    self.fsm.next_state(AutoState::Shooting);
                } else {
                    self.begin_leg();
                }
            }
            AutoState::DrivingToNote => {
                let Some(leg) = self.routine.leg(self.leg) else {
                    self.fsm.next_state(AutoState::Finished);
                    return;
                };
                io.robot.chassis().follow_path(leg.note_path);
                io.notes.try_intake();
                if io.notes.is_holding_note() {
                    self.fsm.next_state(AutoState::DrivingToShoot);
                }
            }
            AutoState::DrivingToShoot => {
                let Some(leg) = self.routine.leg(self.leg) else {
                    self.fsm.next_state(AutoState::Finished);
                    return;
                };
                if io.robot.chassis().follow_path(leg.shoot_path) {
                    self.fsm.next_state(AutoState::Shooting);
                }
            }
            AutoState::Shooting => {
                if step.initial_call {
                    io.robot.chassis().drive(0.0, 0.0, 0.0);
                }
                io.notes.try_shoot();
                if io.notes.has_just_fired() {
                    if self.shooting_preload {
                        self.shooting_preload = false;
                    } else {
                        info!(routine = self.routine.name(), leg = self.leg, "leg complete");
                        self.legs_completed += 1;
                        self.leg += 1;
                    }
                    self.begin_leg();
                }
            }
            AutoState::Finished => {
                if step.initial_call {
                    io.robot.chassis().drive(0.0, 0.0, 0.0);
                }
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
