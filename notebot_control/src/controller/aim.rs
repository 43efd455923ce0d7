//! Aiming math shared by every controller that shoots.
//!
//! The shooter fires out of the back of the robot, so the heading that
//! points the mechanism at the goal is the bearing to the goal plus π.

use core::f64::consts::PI;

use notebot_common::geometry::Translation2d;
use notebot_common::subsystem::RobotIo;

/// Heading and distance that put a shot on the goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSolution {
    /// Robot heading [rad], not normalised.
    pub bearing: f64,
    /// Distance to the goal [m].
    pub range: f64,
}

/// Robot heading that faces the rear-mounted shooter at `goal`.
#[inline]
pub fn bearing_to_goal(goal: Translation2d, robot: Translation2d) -> f64 {
    let offset = goal - robot;
    offset.y.atan2(offset.x) + PI
}

pub fn solve(goal: Translation2d, robot: Translation2d) -> AimSolution {
    AimSolution {
        bearing: bearing_to_goal(goal, robot),
        range: (goal - robot).norm(),
    }
}

/// Publish the current range to the shooter and return it.
pub fn publish_range<R: RobotIo + ?Sized>(io: &mut R) -> f64 {
    let robot = io.chassis().current_pose().translation;
    let range = (io.goal().goal_position() - robot).norm();
    io.shooter().set_range(range);
    range
}

/// Publish the range and snap the drivetrain to the firing heading.
pub fn aim_at_goal<R: RobotIo + ?Sized>(io: &mut R) -> AimSolution {
    let robot = io.chassis().current_pose().translation;
    let solution = solve(io.goal().goal_position(), robot);
    io.shooter().set_range(solution.range);
    io.chassis().snap_to_heading(solution.bearing);
    solution
}
