//! Full autonomous routines on the simulated robot.
//!
//! A recording wrapper logs every path handed to the drivetrain so leg
//! ordering can be checked against the routine definition.

use notebot_common::consts::DEFAULT_CYCLE_TIME;
use notebot_common::field::Alliance;
use notebot_common::geometry::Pose2d;
use notebot_common::path::Path;
use notebot_common::subsystem::{Drivetrain, GoalProvider, Intake, RobotIo, Shooter};
use notebot_control::autonomous::catalogue::{
    AMP_CENTRE_1, PODIUM_SPEAKER_AMP, PODIUM_SPEAKER_AMP_TOP_CENTRE, SPEAKER_CENTRE_3,
};
use notebot_control::autonomous::{AutoState, Routine, RoutineCatalogue};
use notebot_control::controller::NoteTimings;
use notebot_control::cycle::{Mode, Robot};
use notebot_control::sim::{SimConfig, SimRobot};

/// Sixty seconds of cycles.
const MAX_STEPS: u32 = 3_000;

/// Simulated robot that remembers each distinct path it was asked to follow.
struct RecordingRobot {
    sim: SimRobot,
    paths: Vec<Path>,
}

impl Drivetrain for RecordingRobot {
    fn current_pose(&self) -> Pose2d {
        self.sim.sim_chassis().current_pose()
    }

    fn set_pose(&mut self, pose: Pose2d) {
        self.sim.chassis_mut().set_pose(pose);
    }

    fn drive(&mut self, vx: f64, vy: f64, omega: f64) {
        self.sim.chassis_mut().drive(vx, vy, omega);
    }

    fn snap_to_heading(&mut self, heading: f64) {
        self.sim.chassis_mut().snap_to_heading(heading);
    }

    fn stop_snapping(&mut self) {
        self.sim.chassis_mut().stop_snapping();
    }

    fn at_desired_heading(&self) -> bool {
        self.sim.sim_chassis().at_desired_heading()
    }

    fn follow_path(&mut self, path: &Path) -> bool {
        if self.paths.last() != Some(path) {
            self.paths.push(path.clone());
        }
        self.sim.chassis_mut().follow_path(path)
    }
}

impl RobotIo for RecordingRobot {
    fn chassis(&mut self) -> &mut dyn Drivetrain {
        self
    }

    fn intake(&mut self) -> &mut dyn Intake {
        self.sim.intake()
    }

    fn shooter(&mut self) -> &mut dyn Shooter {
        self.sim.shooter()
    }

    fn goal(&self) -> &dyn GoalProvider {
        self.sim.goal()
    }

    fn execute(&mut self) {
        self.sim.execute();
    }
}

fn routine(name: &str, alliance: Alliance) -> Routine {
    RoutineCatalogue::builtin()
        .unwrap()
        .select(name)
        .unwrap()
        .for_alliance(alliance)
}

/// Note path then shoot path for every leg, consecutive repeats merged.
fn expected_paths(routine: &Routine) -> Vec<Path> {
    let mut paths: Vec<Path> = Vec::new();
    for leg in routine.legs() {
        for path in [leg.note_path, leg.shoot_path] {
            if paths.last() != Some(path) {
                paths.push(path.clone());
            }
        }
    }
    paths
}

fn robot(routine: Routine, alliance: Alliance) -> Robot<RecordingRobot> {
    let start = routine
        .start_pose()
        .unwrap_or_else(|| alliance.close_straight_pose());
    let mut sim = SimRobot::new(&SimConfig::default(), alliance, DEFAULT_CYCLE_TIME).with_preload();
    sim.place(start);
    let io = RecordingRobot {
        sim,
        paths: Vec::new(),
    };
    Robot::new(io, NoteTimings::default(), routine, DEFAULT_CYCLE_TIME).unwrap()
}

/// Run autonomous until the routine finishes, checking leg order as it goes.
fn run_to_completion(name: &str, alliance: Alliance) -> Robot<RecordingRobot> {
    let routine = routine(name, alliance);
    let expected = expected_paths(&routine);
    let mut robot = robot(routine, alliance);
    robot.set_mode(Mode::Autonomous);

    let mut legs_completed = 0;
    for _ in 0..MAX_STEPS {
        robot.tick();

        let recorded = &robot.io().paths;
        assert!(
            expected.starts_with(recorded),
            "{name}: out of order after {} paths",
            recorded.len()
        );
        let completed = robot.sequencer().legs_completed();
        assert!(completed == legs_completed || completed == legs_completed + 1);
        legs_completed = completed;

        if robot.sequencer().is_finished() {
            assert_eq!(robot.io().paths, expected);
            return robot;
        }
    }
    panic!(
        "{name}: not finished after {MAX_STEPS} cycles, state {:?}, legs {legs_completed}",
        robot.sequencer().current_state()
    );
}

#[test]
fn four_note_routine_completes_in_order_red() {
    let robot = run_to_completion(PODIUM_SPEAKER_AMP, Alliance::Red);
    assert_eq!(robot.sequencer().legs_completed(), 3);
    // Preload plus one note per leg.
    assert_eq!(robot.io().sim.notes_fired(), 4);
    assert_eq!(robot.sequencer().current_state(), Some(AutoState::Finished));
}

#[test]
fn four_note_routine_completes_in_order_blue() {
    let robot = run_to_completion(PODIUM_SPEAKER_AMP, Alliance::Blue);
    assert_eq!(robot.sequencer().legs_completed(), 3);
    assert_eq!(robot.io().sim.notes_fired(), 4);
    // Every shot taken on the blue half.
    assert!(robot.io().sim.pose().translation.x < 8.0);
}

#[test]
fn speaker_centre_routine_crosses_to_centre_line() {
    let robot = run_to_completion(SPEAKER_CENTRE_3, Alliance::Red);
    assert_eq!(robot.sequencer().legs_completed(), 2);
    assert_eq!(robot.io().sim.notes_fired(), 3);
}

#[test]
fn five_note_routine_without_start_pose_completes() {
    let robot = run_to_completion(PODIUM_SPEAKER_AMP_TOP_CENTRE, Alliance::Red);
    assert_eq!(robot.sequencer().legs_completed(), 4);
    assert_eq!(robot.io().sim.notes_fired(), 5);
    assert_eq!(robot.io().sim.field_notes().len(), 8 - 4);
}

#[test]
fn amp_centre_routine_completes_in_order() {
    let robot = run_to_completion(AMP_CENTRE_1, Alliance::Blue);
    assert_eq!(robot.sequencer().legs_completed(), 2);
    assert_eq!(robot.io().sim.notes_fired(), 3);
}

#[test]
fn disabling_mid_routine_stops_everything() {
    let mut robot = robot(routine(PODIUM_SPEAKER_AMP, Alliance::Red), Alliance::Red);
    robot.set_mode(Mode::Autonomous);
    for _ in 0..10 {
        robot.tick();
    }
    assert_eq!(robot.sequencer().current_state(), Some(AutoState::Shooting));

    robot.set_mode(Mode::Disabled);
    robot.tick();
    assert_eq!(robot.sequencer().current_state(), None);
    assert_eq!(robot.notes().current_state(), None);
    assert_eq!(robot.io().sim.sim_chassis().snap_target(), None);
}
