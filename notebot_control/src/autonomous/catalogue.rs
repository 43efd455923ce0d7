//! Built-in routine catalogue.
//!
//! All positions are red-alliance field coordinates; selection for the blue
//! alliance goes through [`Routine::for_alliance`]. "internal" in a routine
//! name is the preloaded note, shot before the first leg.

use heapless::Vec;
use notebot_common::consts::MAX_ROUTINES;
use notebot_common::field::{
    NotePositions, PathPositions, ShootingPositions, rotation_to_red_speaker,
};
use notebot_common::geometry::{Pose2d, Translation2d};
use notebot_common::path::Path;

use super::routine::Routine;
use crate::error::RoutineError;

pub const PODIUM_SPEAKER_AMP_TOP_CENTRE: &str =
    "5 notes: internal, podium, speaker, amp, top centre";
pub const PODIUM_SPEAKER_AMP: &str = "4 notes: internal, podium, speaker, amp";
pub const AMP_CENTRE_1: &str = "3 notes: internal, amp, centre 1";
pub const SPEAKER_CENTRE_3: &str = "3 notes: internal, speaker, centre 3";
pub const CENTRE_3_CENTRE_5: &str = "3 notes: internal, center 3, center 5";

static_assertions::const_assert!(MAX_ROUTINES >= 5);

/// Every routine known to the robot, in selection-menu order.
#[derive(Debug, Clone)]
pub struct RoutineCatalogue {
    routines: Vec<Routine, MAX_ROUTINES>,
}

impl RoutineCatalogue {
    pub fn new() -> Self {
        Self {
            routines: Vec::new(),
        }
    }

    pub fn builtin() -> Result<Self, RoutineError> {
        let mut catalogue = Self::new();
        catalogue.add(podium_speaker_amp_top_centre()?)?;
        catalogue.add(podium_speaker_amp()?)?;
        catalogue.add(amp_centre_1()?)?;
        catalogue.add(speaker_centre_3()?)?;
        catalogue.add(centre_3_centre_5()?)?;
        Ok(catalogue)
    }

    pub fn add(&mut self, routine: Routine) -> Result<(), RoutineError> {
        self.routines
            .push(routine)
            .map_err(|_| RoutineError::CatalogueFull)
    }

    /// Look up an enabled routine by exact name.
    pub fn select(&self, name: &str) -> Result<&Routine, RoutineError> {
        let routine = self
            .routines
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| RoutineError::Unknown(name.to_owned()))?;
        if routine.is_disabled() {
            return Err(RoutineError::Disabled(name.to_owned()));
        }
        Ok(routine)
    }

    /// Routines offered for selection.
    pub fn enabled(&self) -> impl Iterator<Item = &Routine> {
        self.routines.iter().filter(|r| !r.is_disabled())
    }

    /// First enabled routine.
    pub fn default_routine(&self) -> Option<&Routine> {
        self.enabled().next()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}

impl Default for RoutineCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Routines ───────────────────────────────────────────────────────

fn to(waypoints: &[Translation2d]) -> Result<Path, RoutineError> {
    Ok(Path::new(waypoints)?)
}

/// Start pose facing the shooter at the red speaker. Only needs to be on
/// the correct half of the field.
fn facing_speaker(position: Translation2d) -> Pose2d {
    Pose2d::new(position, rotation_to_red_speaker(position))
}

fn podium_speaker_amp_top_centre() -> Result<Routine, RoutineError> {
    Routine::new(
        PODIUM_SPEAKER_AMP_TOP_CENTRE,
        &[
            to(&[NotePositions::PODIUM_NW])?,
            to(&[NotePositions::SPEAKER])?,
            to(&[NotePositions::AMP])?,
            to(&[PathPositions::AVOID_WALL, NotePositions::CENTRE_1])?,
        ],
        &[
            to(&[ShootingPositions::CLOSE_STRAIGHT])?,
            to(&[ShootingPositions::AMP_SPEAKER_BOUNCE])?,
            to(&[NotePositions::AMP])?,
            to(&[PathPositions::AVOID_WALL, NotePositions::AMP])?,
        ],
        None,
    )
}

fn podium_speaker_amp() -> Result<Routine, RoutineError> {
    Routine::new(
        PODIUM_SPEAKER_AMP,
        &[
            to(&[NotePositions::PODIUM_NW])?,
            to(&[NotePositions::SPEAKER])?,
            to(&[NotePositions::AMP])?,
        ],
        &[
            to(&[ShootingPositions::CLOSE_STRAIGHT])?,
            to(&[ShootingPositions::AMP_SPEAKER_BOUNCE])?,
            to(&[NotePositions::AMP])?,
        ],
        Some(facing_speaker(NotePositions::PODIUM)),
    )
}

fn amp_centre_1() -> Result<Routine, RoutineError> {
    Routine::new(
        AMP_CENTRE_1,
        &[
            to(&[NotePositions::AMP])?,
            to(&[PathPositions::AVOID_WALL, NotePositions::CENTRE_1])?,
        ],
        &[
            to(&[NotePositions::AMP])?,
            to(&[PathPositions::AVOID_WALL, NotePositions::AMP])?,
        ],
        Some(facing_speaker(NotePositions::AMP)),
    )
}

fn speaker_centre_3() -> Result<Routine, RoutineError> {
    Routine::new(
        SPEAKER_CENTRE_3,
        &[
            to(&[NotePositions::SPEAKER])?,
            to(&[PathPositions::STAGE_TRANSITION_N, NotePositions::CENTRE_3])?,
        ],
        &[
            to(&[NotePositions::SPEAKER])?,
            to(&[PathPositions::STAGE_TRANSITION_N, NotePositions::SPEAKER])?,
        ],
        Some(facing_speaker(NotePositions::SPEAKER)),
    )
}

/// Keeps to the south of the field, clear of allies on the close notes.
fn centre_3_centre_5() -> Result<Routine, RoutineError> {
    Ok(Routine::new(
        CENTRE_3_CENTRE_5,
        &[
            to(&[
                PathPositions::STAGE_TRANSITION_S_ENTRY,
                PathPositions::STAGE_TRANSITION_S,
                NotePositions::CENTRE_3,
            ])?,
            to(&[NotePositions::CENTRE_5])?,
        ],
        &[
            to(&[
                PathPositions::STAGE_TRANSITION_S,
                PathPositions::STAGE_TRANSITION_S_ENTRY,
                ShootingPositions::SOURCE_SIDE,
            ])?,
            to(&[ShootingPositions::SOURCE_SIDE])?,
        ],
        Some(facing_speaker(Translation2d::new(15.4, 2.94))),
    )?
    // Not yet run on the field.
    .disabled())
}

// ─── Tests ──────────────────────────────────────────────────────────
