//! Autonomous period: routines, the built-in catalogue and the sequencer
//! that runs one routine against the note manager.

pub mod catalogue;
pub mod routine;
pub mod sequencer;

pub use catalogue::RoutineCatalogue;
pub use routine::{Leg, Routine};
pub use sequencer::{AutoIo, AutoState, Sequencer};
