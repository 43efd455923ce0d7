//! Prelude module for common re-exports.
//!
//! ```rust
//! use notebot_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CYCLE_TIME, FIRE_DURATION, NOTE_SETTLE_DELAY};

// ─── Geometry & Field ───────────────────────────────────────────────
pub use crate::field::{Alliance, FieldLayout, rotation_to_red_speaker};
pub use crate::geometry::{Pose2d, Translation2d};
pub use crate::path::{Path, PathError};

// ─── Subsystem Contracts ────────────────────────────────────────────
pub use crate::subsystem::{Drivetrain, GoalProvider, Intake, RobotIo, Shooter};
