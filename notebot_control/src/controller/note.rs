//! Note manager: the full intake-to-shot lifecycle.
//!
//! ```text
//!            INTAKE              fully deployed          seen + settle
//!  Idling ──────────► Dropping ────────────────► Intaking ─────────────► HoldingNote
//!    ▲  ◄──── CANCEL ────┘  ◄──────── CANCEL ────────┘                      │  ▲
//!    │                                                              SHOOT  │  │ no SHOOT
//!    │                    timed (fire duration)                            ▼  │
//!    └─────────────────────────────────────────────── Firing ◄──ready──── Aiming
//! ```
//!
//! `idling` and `holding_note` follow the capture sensor both ways, so a
//! one-tick dropout while holding costs a single tick.
//!
//! Every state is `must_finish`: once engaged by [`NoteManager::on_enable`]
//! the machine always has a known state. `aiming` and `firing` delegate to
//! an owned [`AimAndFire`], engaged each tick it should keep running.

use core::time::Duration;

use bitflags::bitflags;
use notebot_common::consts::{FIRE_DURATION, NOTE_SETTLE_DELAY};
use notebot_common::subsystem::RobotIo;

use super::aim::publish_range;
use super::shooter::AimAndFire;
use crate::error::FsmError;
use crate::fsm::{Controller, Exit, Fsm, ResetField, StateId, StateDecl, StateTable, Step};

bitflags! {
    /// One-tick requests to the note manager.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intent: u8 {
        const INTAKE = 0x01;
        const SHOOT  = 0x02;
        const CANCEL = 0x04;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Idling,
    DroppingIntake,
    Intaking,
    HoldingNote,
    Aiming,
    Firing,
}

impl StateId for NoteState {
    const ALL: &'static [Self] = &[
        Self::Idling,
        Self::DroppingIntake,
        Self::Intaking,
        Self::HoldingNote,
        Self::Aiming,
        Self::Firing,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Idling => "idling",
            Self::DroppingIntake => "dropping_intake",
            Self::Intaking => "intaking",
            Self::HoldingNote => "holding_note",
            Self::Aiming => "aiming",
            Self::Firing => "firing",
        }
    }
}

/// Durations of the note lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteTimings {
    /// Wait after the capture sensor first sees a note.
    pub settle_delay: Duration,
    /// Length of the firing pulse.
    pub fire_duration: Duration,
}

impl Default for NoteTimings {
    fn default() -> Self {
        Self {
            settle_delay: NOTE_SETTLE_DELAY,
            fire_duration: FIRE_DURATION,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteManager {
    fsm: Fsm<NoteState>,
    shooter: AimAndFire,
    intents: ResetField<Intent>,
    settle_delay: Duration,
    note_seen_at: Option<Duration>,
}

impl NoteManager {
    pub const MACHINE: &'static str = "note_manager";

    pub fn new(timings: NoteTimings) -> Result<Self, FsmError> {
        let table = StateTable::new(
            Self::MACHINE,
            &[
                StateDecl::new(NoteState::Idling).first().must_finish(),
                StateDecl::new(NoteState::DroppingIntake).must_finish(),
                StateDecl::new(NoteState::Intaking).must_finish(),
                StateDecl::new(NoteState::HoldingNote).must_finish(),
                StateDecl::new(NoteState::Aiming).must_finish(),
                StateDecl::new(NoteState::Firing)
                    .must_finish()
                    .timed(timings.fire_duration, Exit::To(NoteState::Idling)),
            ],
        )?;
        Ok(Self {
            fsm: Fsm::new(table),
            shooter: AimAndFire::new(timings.fire_duration)?,
            intents: ResetField::new(Intent::empty()),
            settle_delay: timings.settle_delay,
            note_seen_at: None,
        })
    }

    // ─── Requests (valid for the next tick only) ────────────────────

    #[inline]
    pub fn try_intake(&mut self) {
        self.intents.update(|i| i | Intent::INTAKE);
    }

    #[inline]
    pub fn cancel_intake(&mut self) {
        self.intents.update(|i| i | Intent::CANCEL);
    }

    #[inline]
    pub fn try_shoot(&mut self) {
        self.intents.update(|i| i | Intent::SHOOT);
    }

    #[inline]
    pub fn intents(&self) -> Intent {
        self.intents.get()
    }

    // ─── Queries ────────────────────────────────────────────────────

    #[inline]
    pub fn current_state(&self) -> Option<NoteState> {
        self.fsm.current_state()
    }

    #[inline]
    pub fn last_state(&self) -> Option<NoteState> {
        self.fsm.last_state()
    }

    #[inline]
    pub fn is_holding_note(&self) -> bool {
        self.fsm.current_state() == Some(NoteState::HoldingNote)
    }

    /// The most recent tick ended a firing pulse. True for exactly one tick.
    #[inline]
    pub fn has_just_fired(&self) -> bool {
        self.fsm
            .just_transitioned(NoteState::Firing, NoteState::Idling)
    }

    #[inline]
    pub fn shooter(&self) -> &AimAndFire {
        &self.shooter
    }

    // ─── Lifecycle ──────────────────────────────────────────────────

    /// Enter `holding_note` if a note is already seated, `idling` otherwise.
    pub fn on_enable<R: RobotIo + ?Sized>(&mut self, io: &mut R) {
        self.shooter.done();
        let entry = if io.intake().has_note() {
            NoteState::HoldingNote
        } else {
            NoteState::Idling
        };
        self.fsm.engage_at(entry);
    }

    pub fn on_disable(&mut self) {
        self.shooter.done();
        self.fsm.done();
        self.intents.reset();
        self.note_seen_at = None;
    }
}

impl<R: RobotIo + ?Sized> Controller<R> for NoteManager {
    type State = NoteState;

    fn fsm_mut(&mut self) -> &mut Fsm<NoteState> {
        &mut self.fsm
    }

    fn run_state(&mut self, step: Step<NoteState>, io: &mut R) {
        let intents = self.intents.get();
        match step.state {
            NoteState::Idling => {
                if step.initial_call {
                    self.shooter.done();
                    io.chassis().stop_snapping();
                }
                publish_range(io);
                io.intake().retract();
                if io.intake().has_note() {
                    self.fsm.next_state(NoteState::HoldingNote);
                } else if intents.contains(Intent::INTAKE) {
                    self.fsm.next_state(NoteState::DroppingIntake);
                }
            }
            NoteState::DroppingIntake => {
                io.intake().deploy();
                publish_range(io);
                if intents.contains(Intent::CANCEL) {
                    self.fsm.next_state(NoteState::Idling);
                } else if io.intake().is_fully_deployed() {
                    self.fsm.next_state(NoteState::Intaking);
                }
            }
            NoteState::Intaking => {
                if step.initial_call {
                    self.note_seen_at = None;
                }
                if intents.contains(Intent::CANCEL) {
                    self.fsm.next_state(NoteState::Idling);
                    return;
                }
                io.intake().deploy();
                io.intake().run_intake();
                if io.intake().has_note() && self.note_seen_at.is_none() {
                    self.note_seen_at = Some(step.now);
                }
                let settled = self.note_seen_at.is_some_and(|seen| {
                    seen.checked_add(self.settle_delay)
                        .is_some_and(|ready| step.now >= ready)
                });
                if settled {
                    self.fsm.next_state(NoteState::HoldingNote);
                }
            }
            NoteState::HoldingNote => {
                if step.initial_call {
                    io.chassis().stop_snapping();
                }
                io.intake().retract();
                publish_range(io);
                if !io.intake().has_note() {
                    self.fsm.next_state(NoteState::Idling);
                } else if intents.contains(Intent::SHOOT) {
                    self.fsm.next_state(NoteState::Aiming);
                }
            }
            NoteState::Aiming => {
                if step.initial_call {
                    self.shooter.done();
                }
                if !intents.contains(Intent::SHOOT) {
                    self.shooter.done();
                    self.fsm.next_state(NoteState::HoldingNote);
                    return;
                }
                self.shooter.engage();
                self.shooter.execute(io, step.now);
                if self.shooter.is_firing() {
                    self.fsm.next_state(NoteState::Firing);
                }
            }
            NoteState::Firing => {
                self.shooter.engage();
                self.shooter.execute(io, step.now);
            }
        }
    }

    fn reset_intents(&mut self) {
        self.intents.reset();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::doubles::FakeRobot;
    use crate::controller::shooter::ShotState;
    use notebot_common::consts::DEFAULT_CYCLE_TIME;
    use notebot_common::geometry::Translation2d;

    fn at(tick: u32) -> Duration {
        DEFAULT_CYCLE_TIME * tick
    }

    fn setup(note: bool) -> (NoteManager, FakeRobot) {
        let mut notes = NoteManager::new(NoteTimings::default()).unwrap();
        let mut io = FakeRobot::new(Translation2d::new(5.0, 0.0));
        io.note = note;
        notes.on_enable(&mut io);
        (notes, io)
    }

    #[test]
    fn on_enable_selects_entry_state() {
        let (mut notes, mut io) = setup(false);
        notes.execute(&mut io, at(0));
        assert_eq!(notes.current_state(), Some(NoteState::Idling));

        let (mut notes, mut io) = setup(true);
        notes.execute(&mut io, at(0));
        assert_eq!(notes.current_state(), Some(NoteState::HoldingNote));
    }

    #[test]
    fn keeps_running_without_engage() {
        let (mut notes, mut io) = setup(false);
        for tick in 0..10 {
            notes.execute(&mut io, at(tick));
        }
        assert_eq!(notes.current_state(), Some(NoteState::Idling));
        assert!(io.range.is_some());
        assert!(!io.deploy_commanded);
    }

    #[test]
    fn intake_waits_for_settle_delay() {
        let (mut notes, mut io) = setup(false);
        notes.try_intake();
        notes.execute(&mut io, at(0));
        assert_eq!(notes.current_state(), Some(NoteState::DroppingIntake));

        notes.execute(&mut io, at(1));
        assert!(io.deploy_commanded);
        assert_eq!(notes.current_state(), Some(NoteState::DroppingIntake));

        io.fully_deployed = true;
        notes.execute(&mut io, at(2));
        assert_eq!(notes.current_state(), Some(NoteState::Intaking));
        notes.execute(&mut io, at(3));
        assert!(io.intake_running);

        io.note = true;
        let seen = 4;
        for tick in seen..seen + 50 {
            notes.execute(&mut io, at(tick));
            assert_eq!(notes.current_state(), Some(NoteState::Intaking), "tick {tick}");
        }
        notes.execute(&mut io, at(seen + 50));
        assert!(notes.is_holding_note());
    }

    #[test]
    fn sensor_flicker_does_not_restart_settle() {
        let (mut notes, mut io) = setup(false);
        io.fully_deployed = true;
        notes.try_intake();
        notes.execute(&mut io, at(0));
        notes.execute(&mut io, at(1));
        assert_eq!(notes.current_state(), Some(NoteState::Intaking));

        io.note = true;
        notes.execute(&mut io, at(2));
        io.note = false;
        notes.execute(&mut io, at(3));
        io.note = true;
        for tick in 4..52 {
            notes.execute(&mut io, at(tick));
        }
        assert_eq!(notes.current_state(), Some(NoteState::Intaking));
        notes.execute(&mut io, at(52));
        assert!(notes.is_holding_note());
    }

    #[test]
    fn cancel_returns_to_idling() {
        let (mut notes, mut io) = setup(false);
        notes.try_intake();
        notes.execute(&mut io, at(0));
        notes.cancel_intake();
        notes.execute(&mut io, at(1));
        assert_eq!(notes.current_state(), Some(NoteState::Idling));

        io.fully_deployed = true;
        notes.try_intake();
        notes.execute(&mut io, at(2));
        notes.execute(&mut io, at(3));
        assert_eq!(notes.current_state(), Some(NoteState::Intaking));
        notes.cancel_intake();
        notes.execute(&mut io, at(4));
        assert_eq!(notes.current_state(), Some(NoteState::Idling));
        notes.execute(&mut io, at(5));
        assert!(!io.deploy_commanded);
    }

    #[test]
    fn intents_reset_after_each_tick() {
        let (mut notes, mut io) = setup(false);
        notes.try_shoot();
        notes.try_intake();
        assert_eq!(notes.intents(), Intent::SHOOT | Intent::INTAKE);
        notes.execute(&mut io, at(0));
        assert!(notes.intents().is_empty());
    }

    #[test]
    fn withdrawn_shot_falls_back_to_holding() {
        let (mut notes, mut io) = setup(true);
        notes.try_shoot();
        notes.execute(&mut io, at(0));
        assert_eq!(notes.current_state(), Some(NoteState::Aiming));

        notes.try_shoot();
        notes.execute(&mut io, at(1));
        assert_eq!(notes.shooter().current_state(), Some(ShotState::Aiming));
        assert!(io.snap_target.is_some());

        notes.execute(&mut io, at(2));
        assert!(notes.is_holding_note());
        assert!(!notes.shooter().is_executing());
    }

    #[test]
    fn fires_for_full_duration_then_idles() {
        let (mut notes, mut io) = setup(true);
        notes.try_shoot();
        notes.execute(&mut io, at(0));

        io.at_heading = true;
        io.ready = true;
        notes.try_shoot();
        notes.execute(&mut io, at(1));
        assert_eq!(notes.current_state(), Some(NoteState::Firing));

        for tick in 2..52 {
            notes.execute(&mut io, at(tick));
            assert_eq!(notes.current_state(), Some(NoteState::Firing), "tick {tick}");
            assert!(!notes.has_just_fired());
        }
        assert_eq!(io.fire_calls, 50);

        notes.execute(&mut io, at(52));
        assert_eq!(notes.current_state(), Some(NoteState::Idling));
        assert!(notes.has_just_fired());

        notes.execute(&mut io, at(53));
        assert!(!notes.has_just_fired());
        assert!(!notes.shooter().is_executing());
        assert_eq!(io.snap_target, None);
    }

    #[test]
    fn losing_the_note_while_holding_returns_to_idling() {
        let (mut notes, mut io) = setup(true);
        notes.execute(&mut io, at(0));
        io.note = false;
        notes.execute(&mut io, at(1));
        assert_eq!(notes.current_state(), Some(NoteState::Idling));
    }

    #[test]
    fn sensor_dropout_while_holding_recovers_the_note() {
        let (mut notes, mut io) = setup(true);
        notes.execute(&mut io, at(0));
        io.note = false;
        notes.execute(&mut io, at(1));
        assert_eq!(notes.current_state(), Some(NoteState::Idling));

        io.note = true;
        notes.execute(&mut io, at(2));
        assert!(notes.is_holding_note());

        io.at_heading = true;
        io.ready = true;
        notes.try_shoot();
        notes.execute(&mut io, at(3));
        assert_eq!(notes.current_state(), Some(NoteState::Aiming));
    }

    #[test]
    fn huge_settle_delay_never_settles() {
        let timings = NoteTimings {
            settle_delay: Duration::MAX,
            ..NoteTimings::default()
        };
        let mut notes = NoteManager::new(timings).unwrap();
        let mut io = FakeRobot::new(Translation2d::new(5.0, 0.0));
        io.fully_deployed = true;
        notes.on_enable(&mut io);
        notes.try_intake();
        notes.execute(&mut io, at(0));
        notes.execute(&mut io, at(1));
        io.note = true;
        for tick in 2..100 {
            notes.execute(&mut io, at(tick));
        }
        assert_eq!(notes.current_state(), Some(NoteState::Intaking));
    }

    #[test]
    fn disable_stops_everything() {
        let (mut notes, mut io) = setup(true);
        notes.try_shoot();
        notes.execute(&mut io, at(0));
        notes.on_disable();
        notes.execute(&mut io, at(1));
        assert_eq!(notes.current_state(), None);
    }
}
