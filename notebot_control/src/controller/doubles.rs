//! Scripted collaborator double for controller unit tests.
//!
//! Every readback is a plain field the test sets; every command is recorded.

use notebot_common::geometry::{Pose2d, Translation2d};
use notebot_common::path::Path;
use notebot_common::subsystem::{Drivetrain, GoalProvider, Intake, RobotIo, Shooter};

#[derive(Debug, Clone)]
pub(crate) struct FakeRobot {
    pub pose: Pose2d,
    pub goal: Translation2d,
    pub drive: (f64, f64, f64),
    pub snap_target: Option<f64>,
    pub at_heading: bool,
    pub path_complete: bool,
    pub followed: Vec<Translation2d>,
    pub deploy_commanded: bool,
    pub fully_deployed: bool,
    pub intake_running: bool,
    pub note: bool,
    pub range: Option<f64>,
    pub ready: bool,
    pub fire_calls: u32,
    pub execute_calls: u32,
}

impl FakeRobot {
    pub fn new(goal: Translation2d) -> Self {
        Self {
            pose: Pose2d::default(),
            goal,
            drive: (0.0, 0.0, 0.0),
            snap_target: None,
            at_heading: false,
            path_complete: false,
            followed: Vec::new(),
            deploy_commanded: false,
            fully_deployed: false,
            intake_running: false,
            note: false,
            range: None,
            ready: false,
            fire_calls: 0,
            execute_calls: 0,
        }
    }
}

impl Drivetrain for FakeRobot {
    fn current_pose(&self) -> Pose2d {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose2d) {
        self.pose = pose;
    }

    fn drive(&mut self, vx: f64, vy: f64, omega: f64) {
        self.drive = (vx, vy, omega);
    }

    fn snap_to_heading(&mut self, heading: f64) {
        self.snap_target = Some(heading);
    }

    fn stop_snapping(&mut self) {
        self.snap_target = None;
    }

    fn at_desired_heading(&self) -> bool {
        self.at_heading
    }

    fn follow_path(&mut self, path: &Path) -> bool {
        if self.followed.last() != Some(&path.end()) {
            self.followed.push(path.end());
        }
        self.path_complete
    }
}

impl Intake for FakeRobot {
    fn deploy(&mut self) {
        self.deploy_commanded = true;
    }

    fn retract(&mut self) {
        self.deploy_commanded = false;
    }

    fn run_intake(&mut self) {
        self.intake_running = true;
    }

    fn is_fully_deployed(&self) -> bool {
        self.fully_deployed
    }

    fn has_note(&self) -> bool {
        self.note
    }
}

impl Shooter for FakeRobot {
    fn set_range(&mut self, range: f64) {
        self.range = Some(range);
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    /// Feeding the shooter ejects whatever note is held.
    fn fire(&mut self) {
        self.fire_calls += 1;
        self.note = false;
    }
}

impl GoalProvider for FakeRobot {
    fn goal_position(&self) -> Translation2d {
        self.goal
    }
}

impl RobotIo for FakeRobot {
    fn chassis(&mut self) -> &mut dyn Drivetrain {
        self
    }

    fn intake(&mut self) -> &mut dyn Intake {
        self
    }

    fn shooter(&mut self) -> &mut dyn Shooter {
        self
    }

    fn goal(&self) -> &dyn GoalProvider {
        self
    }

    fn execute(&mut self) {
        self.intake_running = false;
        self.execute_calls += 1;
    }
}
