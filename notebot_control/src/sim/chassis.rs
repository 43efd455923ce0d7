//! Simulated holonomic drivetrain.
//!
//! Integrates the commanded motion once per cycle in [`SimChassis::update`].
//! Path following seeks each waypoint in turn at full speed and never
//! overshoots; heading snapping turns at the turn-rate limit.

use core::time::Duration;

use notebot_common::geometry::{Pose2d, Translation2d, angle_error, normalize_angle};
use notebot_common::path::Path;
use notebot_common::subsystem::Drivetrain;
use tracing::trace;

use super::SimConfig;

/// Distance at which a waypoint counts as reached [m].
pub const WAYPOINT_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Velocity { vx: f64, vy: f64 },
    Seek(Translation2d),
}

#[derive(Debug, Clone, PartialEq)]
struct PathProgress {
    path: Path,
    next: usize,
}

#[derive(Debug, Clone)]
pub struct SimChassis {
    pose: Pose2d,
    motion: Motion,
    omega: f64,
    snap_target: Option<f64>,
    path: Option<PathProgress>,
    max_speed: f64,
    max_turn_rate: f64,
    heading_tolerance: f64,
}

impl SimChassis {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            pose: Pose2d::default(),
            motion: Motion::Velocity { vx: 0.0, vy: 0.0 },
            omega: 0.0,
            snap_target: None,
            path: None,
            max_speed: config.max_speed,
            max_turn_rate: config.max_turn_rate,
            heading_tolerance: config.heading_tolerance,
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose2d {
        self.pose
    }

    #[inline]
    pub fn snap_target(&self) -> Option<f64> {
        self.snap_target
    }

    /// Integrate one cycle of motion.
    pub fn update(&mut self, dt: Duration) {
        let dt_s = dt.as_secs_f64();
        let position = self.pose.translation;

        self.pose.translation = match self.motion {
            Motion::Velocity { vx, vy } => {
                let mut velocity = Translation2d::new(vx, vy);
                let speed = velocity.norm();
                if speed > self.max_speed {
                    velocity = velocity * (self.max_speed / speed);
                }
                position + velocity * dt_s
            }
            Motion::Seek(target) => {
                let offset = target - position;
                let distance = offset.norm();
                let step = (self.max_speed * dt_s).min(distance);
                if distance > 0.0 {
                    position + offset * (step / distance)
                } else {
                    position
                }
            }
        };

        let max_turn = self.max_turn_rate * dt_s;
        let turn = match self.snap_target {
            Some(target) => angle_error(target, self.pose.heading),
            None => self.omega * dt_s,
        };
        self.pose.heading = normalize_angle(self.pose.heading + turn.clamp(-max_turn, max_turn));

        trace!(
            x = self.pose.translation.x,
            y = self.pose.translation.y,
            heading = self.pose.heading,
            "chassis"
        );
    }
}

impl Drivetrain for SimChassis {
    fn current_pose(&self) -> Pose2d {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose2d) {
        self.pose = pose;
        self.path = None;
        self.motion = Motion::Velocity { vx: 0.0, vy: 0.0 };
    }

    fn drive(&mut self, vx: f64, vy: f64, omega: f64) {
        self.motion = Motion::Velocity { vx, vy };
        self.omega = omega;
        self.path = None;
    }

    fn snap_to_heading(&mut self, heading: f64) {
        self.snap_target = Some(heading);
    }

    fn stop_snapping(&mut self) {
        self.snap_target = None;
    }

    fn at_desired_heading(&self) -> bool {
        self.snap_target
            .is_some_and(|target| angle_error(target, self.pose.heading).abs() <= self.heading_tolerance)
    }

    fn follow_path(&mut self, path: &Path) -> bool {
        if self.path.as_ref().is_none_or(|p| p.path != *path) {
            trace!(waypoints = path.waypoints().len(), "new path");
            self.path = Some(PathProgress {
                path: path.clone(),
                next: 0,
            });
        }
        let Some(progress) = self.path.as_mut() else {
            return false;
        };

        let position = self.pose.translation;
        let waypoints = progress.path.waypoints();
        while let Some(&waypoint) = waypoints.get(progress.next) {
            if waypoint.distance(position) > WAYPOINT_TOLERANCE {
                self.motion = Motion::Seek(waypoint);
                return false;
            }
            progress.next += 1;
        }
        self.motion = Motion::Seek(progress.path.end());
        true
    }
}
