//! Software simulation of every robot collaborator.
//!
//! [`SimRobot`] bundles a drivetrain, intake and shooter with the notes
//! lying on the field. Controllers command it during a cycle; its
//! [`RobotIo::execute`] then advances the physics by one period.

pub mod chassis;
pub mod intake;
pub mod shooter;

use core::time::Duration;

use heapless::Vec;
use notebot_common::config::ConfigError;
use notebot_common::field::{Alliance, FieldLayout, NotePositions};
use notebot_common::geometry::{Pose2d, Translation2d};
use notebot_common::subsystem::{Drivetrain, GoalProvider, Intake, RobotIo, Shooter};
use serde::Deserialize;
use tracing::debug;

pub use chassis::SimChassis;
pub use intake::SimIntake;
pub use shooter::SimShooter;

pub const FIELD_NOTE_COUNT: usize = 8;

/// Notes placed on the field at the start of a match.
pub const FIELD_NOTES: [Translation2d; FIELD_NOTE_COUNT] = [
    NotePositions::AMP,
    NotePositions::SPEAKER,
    NotePositions::PODIUM,
    NotePositions::CENTRE_1,
    NotePositions::CENTRE_2,
    NotePositions::CENTRE_3,
    NotePositions::CENTRE_4,
    NotePositions::CENTRE_5,
];

// ─── Configuration ──────────────────────────────────────────────────

/// Simulation parameters (`[sim]` section).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Drive speed limit [m/s].
    pub max_speed: f64,
    /// Turn rate limit [rad/s].
    pub max_turn_rate: f64,
    /// Heading error accepted as "at heading" [rad].
    pub heading_tolerance: f64,
    /// Distance from robot centre to a note the intake can reach [m].
    pub pickup_radius: f64,
    pub deploy_time_s: f64,
    pub capture_time_s: f64,
    pub spin_up_time_s: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            max_turn_rate: 6.0,
            heading_tolerance: 0.05,
            pickup_radius: 0.75,
            deploy_time_s: 0.3,
            capture_time_s: 0.2,
            spin_up_time_s: 0.2,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_speed", self.max_speed),
            ("max_turn_rate", self.max_turn_rate),
            ("heading_tolerance", self.heading_tolerance),
            ("pickup_radius", self.pickup_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "sim.{name} must be positive, got {value}"
                )));
            }
        }
        let durations = [
            ("deploy_time_s", self.deploy_time_s),
            ("capture_time_s", self.capture_time_s),
            ("spin_up_time_s", self.spin_up_time_s),
        ];
        for (name, value) in durations {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "sim.{name} must be a non-negative number of seconds, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn deploy_time(&self) -> Duration {
        secs(self.deploy_time_s)
    }

    pub fn capture_time(&self) -> Duration {
        secs(self.capture_time_s)
    }

    pub fn spin_up_time(&self) -> Duration {
        secs(self.spin_up_time_s)
    }
}

/// Validated configs never hit the fallback.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

// ─── Robot ──────────────────────────────────────────────────────────

/// Every simulated collaborator plus the notes still on the field.
#[derive(Debug, Clone)]
pub struct SimRobot {
    chassis: SimChassis,
    intake: SimIntake,
    shooter: SimShooter,
    field: FieldLayout,
    field_notes: Vec<Translation2d, FIELD_NOTE_COUNT>,
    pickup_radius: f64,
    period: Duration,
    notes_fired: u32,
}

impl SimRobot {
    pub fn new(config: &SimConfig, alliance: Alliance, period: Duration) -> Self {
        let mut field_notes = Vec::new();
        for note in FIELD_NOTES {
            let pushed = field_notes.push(alliance.mirror(note));
            debug_assert!(pushed.is_ok(), "same capacity as FIELD_NOTES");
        }
        Self {
            chassis: SimChassis::new(config),
            intake: SimIntake::new(config),
            shooter: SimShooter::new(config),
            field: FieldLayout::new(alliance),
            field_notes,
            pickup_radius: config.pickup_radius,
            period,
            notes_fired: 0,
        }
    }

    /// Start the match holding a note.
    pub fn with_preload(mut self) -> Self {
        self.intake.load();
        self
    }

    /// Put the robot at `pose` and reset odometry.
    pub fn place(&mut self, pose: Pose2d) {
        self.chassis.set_pose(pose);
    }

    #[inline]
    pub fn pose(&self) -> Pose2d {
        self.chassis.pose()
    }

    #[inline]
    pub fn alliance(&self) -> Alliance {
        self.field.alliance()
    }

    #[inline]
    pub fn chassis_mut(&mut self) -> &mut SimChassis {
        &mut self.chassis
    }

    #[inline]
    pub fn sim_chassis(&self) -> &SimChassis {
        &self.chassis
    }

    #[inline]
    pub fn sim_intake(&self) -> &SimIntake {
        &self.intake
    }

    #[inline]
    pub fn sim_shooter(&self) -> &SimShooter {
        &self.shooter
    }

    /// Notes not yet picked up.
    #[inline]
    pub fn field_notes(&self) -> &[Translation2d] {
        &self.field_notes
    }

    /// Notes that left the shooter.
    #[inline]
    pub fn notes_fired(&self) -> u32 {
        self.notes_fired
    }
}

impl RobotIo for SimRobot {
    fn chassis(&mut self) -> &mut dyn Drivetrain {
        &mut self.chassis
    }

    fn intake(&mut self) -> &mut dyn Intake {
        &mut self.intake
    }

    fn shooter(&mut self) -> &mut dyn Shooter {
        &mut self.shooter
    }

    fn goal(&self) -> &dyn GoalProvider {
        &self.field
    }

    fn execute(&mut self) {
        self.chassis.update(self.period);

        let position = self.chassis.pose().translation;
        let reach = self
            .field_notes
            .iter()
            .position(|note| note.distance(position) <= self.pickup_radius);
        if self.intake.update(self.period, reach.is_some()) {
            if let Some(index) = reach {
                let note = self.field_notes.swap_remove(index);
                debug!(x = note.x, y = note.y, "note captured");
            }
        }

        if self.shooter.update(self.period) && self.intake.eject() {
            self.notes_fired += 1;
            debug!(
                range = self.shooter.range(),
                total = self.notes_fired,
                "note fired"
            );
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
