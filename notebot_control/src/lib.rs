//! # Notebot Control
//!
//! Behavioural core of the note-scoring robot. Everything runs on one
//! thread, ticked once per fixed control cycle.
//!
//! ## Layers
//!
//! 1. **FSM engine** ([`fsm`]) - state tables, timed exits, engagement
//! 2. **Aim-and-fire** ([`controller::shooter`]) - turn to the goal, fire
//! 3. **Note manager** ([`controller::note`]) - intake to shot lifecycle
//! 4. **Autonomous** ([`autonomous`]) - routine legs driven through 3
//! 5. **Robot loop** ([`cycle`]) - modes, tick order, pacing
//!
//! ## Zero-Allocation Loop
//!
//! State tables, paths and routine legs are fixed-capacity `heapless`
//! collections built before the first tick. A running loop never allocates.

pub mod autonomous;
pub mod config;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod fsm;
pub mod sim;
