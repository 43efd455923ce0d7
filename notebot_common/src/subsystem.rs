//! Subsystem capability traits.
//!
//! The controllers never talk to hardware directly. Each subsystem is
//! reached through a narrow trait whose getters are non-blocking reads of
//! state already refreshed for this cycle and whose setters are
//! fire-and-forget.
//!
//! # Lifecycle
//!
//! 1. Controllers issue commands during their `execute()` for the cycle.
//! 2. [`RobotIo::execute`] runs once at the end of the cycle and pushes the
//!    latched commands to the actuators (or advances the simulation).
//!
//! # Timing Contracts
//!
//! | Call                | Blocking | Allocation |
//! |---------------------|----------|------------|
//! | getters             | never    | never      |
//! | setters             | never    | never      |
//! | `RobotIo::execute`  | never    | never      |

use crate::geometry::{Pose2d, Translation2d};
use crate::path::Path;

/// Holonomic drivetrain with odometry.
pub trait Drivetrain {
    /// Current estimated pose in field coordinates.
    fn current_pose(&self) -> Pose2d;

    /// Reset odometry to a known pose.
    fn set_pose(&mut self, pose: Pose2d);

    /// Field-relative velocity command [m/s, m/s, rad/s].
    fn drive(&mut self, vx: f64, vy: f64, omega: f64);

    /// Hold the given heading until `stop_snapping` or another snap.
    fn snap_to_heading(&mut self, heading: f64);

    /// Release heading control back to the rotational velocity command.
    fn stop_snapping(&mut self);

    /// Whether the heading is within tolerance of the last snap target.
    fn at_desired_heading(&self) -> bool;

    /// Advance along `path`; call once per cycle. Starting a different path
    /// restarts progress. Returns `true` once the final waypoint is reached.
    fn follow_path(&mut self, path: &Path) -> bool;
}

/// Ground intake with a deployable arm and a note sensor.
pub trait Intake {
    fn deploy(&mut self);
    fn retract(&mut self);
    /// Spin the intake and capture rollers for this cycle.
    fn run_intake(&mut self);
    fn is_fully_deployed(&self) -> bool;
    /// Capture sensor: a note is seated in the robot.
    fn has_note(&self) -> bool;
}

/// Flywheel shooter.
pub trait Shooter {
    /// Publish the distance to the goal; the shooter picks angle and speed.
    fn set_range(&mut self, range: f64);
    /// Flywheels and inclinator are on target.
    fn is_ready(&self) -> bool;
    /// Push the held note into the flywheels for this cycle.
    fn fire(&mut self);
}

/// Source of the scoring target for the active alliance.
pub trait GoalProvider {
    fn goal_position(&self) -> Translation2d;
}

/// Every subsystem a controller may touch during one cycle.
pub trait RobotIo {
    fn chassis(&mut self) -> &mut dyn Drivetrain;
    fn intake(&mut self) -> &mut dyn Intake;
    fn shooter(&mut self) -> &mut dyn Shooter;
    fn goal(&self) -> &dyn GoalProvider;

    /// End-of-cycle hook, called after every controller has run.
    fn execute(&mut self) {}
}
