//! Field layout: alliances, goal positions and named positions.
//!
//! All named positions are in red-alliance field coordinates (origin at the
//! blue driver-station wall, +X towards the red wall). Blue-alliance
//! positions are obtained by mirroring across the field centre line with
//! [`Alliance::mirror`] and [`Alliance::mirror_pose`].

use core::f64::consts::PI;
use serde::{Deserialize, Serialize};

use crate::geometry::{Pose2d, Translation2d};
use crate::subsystem::GoalProvider;

/// Field length along X [m].
pub const FIELD_LENGTH: f64 = 16.541;

/// Field width along Y [m].
pub const FIELD_WIDTH: f64 = 8.211;

/// Centre of the red speaker opening.
pub const RED_SPEAKER_POSITION: Translation2d = Translation2d::new(16.579, 5.548);

/// Centre of the blue speaker opening.
pub const BLUE_SPEAKER_POSITION: Translation2d = Translation2d::new(-0.0381, 5.548);

/// Height of the speaker hood above the carpet [m].
pub const SPEAKER_HOOD_HEIGHT: f64 = 1.98;

/// Which side of the field the robot plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    #[default]
    Red,
    Blue,
}

impl Alliance {
    /// Map a red-coordinate position onto this alliance's half.
    #[inline]
    pub fn mirror(self, position: Translation2d) -> Translation2d {
        match self {
            Self::Red => position,
            Self::Blue => Translation2d::new(FIELD_LENGTH - position.x, position.y),
        }
    }

    /// Map a red-coordinate pose onto this alliance's half.
    #[inline]
    pub fn mirror_pose(self, pose: Pose2d) -> Pose2d {
        match self {
            Self::Red => pose,
            Self::Blue => Pose2d::new(self.mirror(pose.translation), PI - pose.heading),
        }
    }

    /// Speaker this alliance scores into.
    #[inline]
    pub const fn speaker_position(self) -> Translation2d {
        match self {
            Self::Red => RED_SPEAKER_POSITION,
            Self::Blue => BLUE_SPEAKER_POSITION,
        }
    }

    /// Straight in front of this alliance's speaker, shooter facing it.
    /// Where the robot starts when a routine has no start pose.
    pub fn close_straight_pose(self) -> Pose2d {
        let position = ShootingPositions::CLOSE_STRAIGHT;
        self.mirror_pose(Pose2d::new(position, rotation_to_red_speaker(position)))
    }
}

impl core::str::FromStr for Alliance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "blue" => Ok(Self::Blue),
            other => Err(format!("unknown alliance '{other}' (expected red or blue)")),
        }
    }
}

/// Heading that points the robot's rear (the shooter) at the red speaker.
pub fn rotation_to_red_speaker(position: Translation2d) -> f64 {
    (RED_SPEAKER_POSITION - position).angle() + PI
}

/// Ground notes, red coordinates.
///
/// Stage notes are ordered from driver station 1 to 3; centre notes from
/// the amp side wall to the source side.
pub struct NotePositions;

impl NotePositions {
    pub const AMP: Translation2d = Translation2d::new(13.645, 7.00045);
    pub const SPEAKER: Translation2d = Translation2d::new(13.645, 5.55265);
    pub const PODIUM: Translation2d = Translation2d::new(13.645, 4.1057);

    /// Approach to the podium note from the north-west, clear of the stage leg.
    pub const PODIUM_NW: Translation2d = Translation2d::new(14.145, 4.6057);

    pub const CENTRE_1: Translation2d = Translation2d::new(8.2956, 7.4585);
    pub const CENTRE_2: Translation2d = Translation2d::new(8.2956, 5.7821);
    pub const CENTRE_3: Translation2d = Translation2d::new(8.2956, 4.1057);
    pub const CENTRE_4: Translation2d = Translation2d::new(8.2956, 2.4293);
    pub const CENTRE_5: Translation2d = Translation2d::new(8.2956, 0.75286);
}

/// Spots the robot drives to before shooting, red coordinates.
pub struct ShootingPositions;

impl ShootingPositions {
    pub const CLOSE_STRAIGHT: Translation2d = Translation2d::new(15.0, RED_SPEAKER_POSITION.y);
    pub const AMP_SPEAKER_BOUNCE: Translation2d = Translation2d::new(14.6, 6.5);
    pub const SOURCE_SIDE: Translation2d = Translation2d::new(13.2, 2.6);
}

/// Via-points used to route around field elements, red coordinates.
pub struct PathPositions;

impl PathPositions {
    pub const AVOID_WALL: Translation2d = Translation2d::new(10.9, 7.0);
    pub const STAGE_TRANSITION_N: Translation2d = Translation2d::new(11.0, 4.6);
    pub const STAGE_TRANSITION_S: Translation2d = Translation2d::new(11.1, 3.4);
    pub const STAGE_TRANSITION_S_ENTRY: Translation2d = Translation2d::new(13.0, 2.5);
}

/// Goal provider for a fixed alliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldLayout {
    alliance: Alliance,
}

impl FieldLayout {
    pub const fn new(alliance: Alliance) -> Self {
        Self { alliance }
    }

    #[inline]
    pub const fn alliance(&self) -> Alliance {
        self.alliance
    }
}

impl GoalProvider for FieldLayout {
    fn goal_position(&self) -> Translation2d {
        self.alliance.speaker_position()
    }
}
