//! Construction-time error types.
//!
//! Every error here is raised while building machines, routines or the
//! robot loop, before the first tick. A running loop never produces them:
//! an invalid machine or routine refuses to start instead.

use notebot_common::consts::{MAX_LEGS, MAX_STATES};
use notebot_common::path::PathError;
use thiserror::Error;

/// State table validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    #[error("machine '{machine}' declares no states")]
    Empty { machine: &'static str },

    #[error("machine '{machine}' declares {count} states, capacity is {MAX_STATES}")]
    TooManyStates { machine: &'static str, count: usize },

    #[error("machine '{machine}' declares state '{state}' twice")]
    DuplicateState {
        machine: &'static str,
        state: &'static str,
    },

    #[error("machine '{machine}' has no state marked first")]
    MissingFirst { machine: &'static str },

    #[error("machine '{machine}' marks both '{a}' and '{b}' as first")]
    DuplicateFirst {
        machine: &'static str,
        a: &'static str,
        b: &'static str,
    },

    #[error("machine '{machine}' never declares state '{state}'")]
    Unregistered {
        machine: &'static str,
        state: &'static str,
    },

    #[error("machine '{machine}': timed state '{state}' has zero duration")]
    ZeroDuration {
        machine: &'static str,
        state: &'static str,
    },
}

/// Autonomous routine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutineError {
    #[error("routine '{routine}': {notes} note paths but {shots} shoot paths")]
    MismatchedLegs {
        routine: &'static str,
        notes: usize,
        shots: usize,
    },

    #[error("routine '{routine}' has no legs")]
    NoLegs { routine: &'static str },

    #[error("routine '{routine}' has {count} legs, capacity is {MAX_LEGS}")]
    TooManyLegs { routine: &'static str, count: usize },

    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    #[error("routine catalogue is full")]
    CatalogueFull,

    #[error("unknown routine '{0}'")]
    Unknown(String),

    #[error("routine '{0}' is disabled")]
    Disabled(String),
}
