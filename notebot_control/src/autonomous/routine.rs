//! Autonomous routines: ordered (pickup path, shoot path) legs.

use heapless::Vec;
use notebot_common::consts::MAX_LEGS;
use notebot_common::field::Alliance;
use notebot_common::geometry::Pose2d;
use notebot_common::path::Path;

use crate::error::RoutineError;

/// One leg: drive to a note, then drive to where it is shot from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg<'a> {
    pub note_path: &'a Path,
    pub shoot_path: &'a Path,
}

/// A named autonomous routine.
///
/// `note_paths[i]` and `shoot_paths[i]` always describe the same leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    name: &'static str,
    disabled: bool,
    note_paths: Vec<Path, MAX_LEGS>,
    shoot_paths: Vec<Path, MAX_LEGS>,
    start_pose: Option<Pose2d>,
}

impl Routine {
    /// Build a routine from parallel path lists, in red field coordinates.
    pub fn new(
        name: &'static str,
        note_paths: &[Path],
        shoot_paths: &[Path],
        start_pose: Option<Pose2d>,
    ) -> Result<Self, RoutineError> {
        if note_paths.len() != shoot_paths.len() {
            return Err(RoutineError::MismatchedLegs {
                routine: name,
                notes: note_paths.len(),
                shots: shoot_paths.len(),
            });
        }
        if note_paths.is_empty() {
            return Err(RoutineError::NoLegs { routine: name });
        }
        if note_paths.len() > MAX_LEGS {
            return Err(RoutineError::TooManyLegs {
                routine: name,
                count: note_paths.len(),
            });
        }

        let mut notes = Vec::new();
        let mut shots = Vec::new();
        for (note, shot) in note_paths.iter().zip(shoot_paths) {
            let pushed = notes.push(note.clone()).is_ok() && shots.push(shot.clone()).is_ok();
            debug_assert!(pushed, "lengths checked above");
        }
        Ok(Self {
            name,
            disabled: false,
            note_paths: notes,
            shoot_paths: shots,
            start_pose,
        })
    }

    /// Exclude from selection until validated on the field.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[inline]
    pub fn start_pose(&self) -> Option<Pose2d> {
        self.start_pose
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.note_paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.note_paths.is_empty()
    }

    pub fn leg(&self, index: usize) -> Option<Leg<'_>> {
        Some(Leg {
            note_path: self.note_paths.get(index)?,
            shoot_path: self.shoot_paths.get(index)?,
        })
    }

    pub fn legs(&self) -> impl Iterator<Item = Leg<'_>> {
        self.note_paths
            .iter()
            .zip(&self.shoot_paths)
            .map(|(note_path, shoot_path)| Leg {
                note_path,
                shoot_path,
            })
    }

    /// Copy of this routine for `alliance`'s half of the field.
    pub fn for_alliance(&self, alliance: Alliance) -> Self {
        let mut mirrored = self.clone();
        for path in mirrored
            .note_paths
            .iter_mut()
            .chain(mirrored.shoot_paths.iter_mut())
        {
            *path = path.mirrored(alliance);
        }
        mirrored.start_pose = self.start_pose.map(|pose| alliance.mirror_pose(pose));
        mirrored
    }
}
