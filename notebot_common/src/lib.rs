//! Notebot Common Library
//!
//! Hardware-independent vocabulary shared by every notebot crate.
//!
//! # Module Structure
//!
//! - [`geometry`] - 2D translations, poses and angle helpers
//! - [`field`] - Alliance, goal positions and named field positions
//! - [`path`] - Fixed-capacity drive paths
//! - [`subsystem`] - Capability traits for drivetrain, intake and shooter
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide limits and contract timings
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use notebot_common::prelude::*;
//!
//! let layout = FieldLayout::new(Alliance::Red);
//! let range = (layout.goal_position() - Translation2d::new(15.0, 5.5)).norm();
//! assert!(range > 0.0);
//! ```

pub mod config;
pub mod consts;
pub mod field;
pub mod geometry;
pub mod path;
pub mod prelude;
pub mod subsystem;
