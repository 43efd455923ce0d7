//! System-wide constants for the notebot workspace.
//!
//! Single source of truth for fixed capacities and contract timings.
//! Capacities size the `heapless` collections so that nothing is allocated
//! once the robot loop is running.

use std::time::Duration;

/// Default control cycle period (50 Hz).
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_millis(20);

/// Wait after the capture sensor first reports a note before treating the
/// intake as complete.
pub const NOTE_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Length of the firing pulse.
pub const FIRE_DURATION: Duration = Duration::from_secs(1);

/// Length of the autonomous period.
pub const AUTONOMOUS_DURATION: Duration = Duration::from_secs(15);

/// Maximum number of states a single machine may declare.
pub const MAX_STATES: usize = 8;

/// Maximum number of waypoints in one path.
pub const MAX_WAYPOINTS: usize = 8;

/// Maximum number of legs in one autonomous routine.
pub const MAX_LEGS: usize = 6;

/// Maximum number of routines in the catalogue.
pub const MAX_ROUTINES: usize = 8;

static_assertions::const_assert!(MAX_STATES >= 6);
static_assertions::const_assert!(MAX_WAYPOINTS >= 3);
static_assertions::const_assert!(MAX_LEGS >= 4);
