//! Tick-driven finite state machine engine.
//!
//! - [`table`] - declarative state metadata, validated once
//! - [`engine`] - active state tracking, timed exits, engagement
//! - [`intent`] - request fields reset after every tick

pub mod engine;
pub mod intent;
pub mod table;

pub use engine::{Controller, Fsm, RequestOutcome, Step};
pub use intent::ResetField;
pub use table::{Exit, StateId, StateDecl, StateTable, Timed};
