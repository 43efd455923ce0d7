//! Concrete controllers built on the FSM engine.

pub mod aim;
pub mod note;
pub mod shooter;

pub use note::{Intent, NoteManager, NoteState, NoteTimings};
pub use shooter::{AimAndFire, ShotState};

#[cfg(test)]
pub(crate) mod doubles;
