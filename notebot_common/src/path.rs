//! Fixed-capacity drive paths.
//!
//! A [`Path`] is built once at startup and never modified; waypoints live in
//! a `heapless::Vec` so following a path never touches the heap.

use heapless::Vec;
use thiserror::Error;

use crate::consts::MAX_WAYPOINTS;
use crate::field::Alliance;
use crate::geometry::Translation2d;

/// Path construction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path has no waypoints")]
    Empty,
    #[error("path has {count} waypoints, capacity is {MAX_WAYPOINTS}")]
    TooManyWaypoints { count: usize },
}

/// Ordered waypoints plus the heading to hold at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<Translation2d, MAX_WAYPOINTS>,
    final_heading: f64,
}

impl Path {
    /// Build a path ending with heading 0.
    pub fn new(waypoints: &[Translation2d]) -> Result<Self, PathError> {
        Self::with_final_heading(waypoints, 0.0)
    }

    pub fn with_final_heading(
        waypoints: &[Translation2d],
        final_heading: f64,
    ) -> Result<Self, PathError> {
        if waypoints.is_empty() {
            return Err(PathError::Empty);
        }
        let mut stored = Vec::new();
        for &waypoint in waypoints {
            stored.push(waypoint).map_err(|_| PathError::TooManyWaypoints {
                count: waypoints.len(),
            })?;
        }
        Ok(Self {
            waypoints: stored,
            final_heading,
        })
    }

    #[inline]
    pub fn waypoints(&self) -> &[Translation2d] {
        &self.waypoints
    }

    #[inline]
    pub fn final_heading(&self) -> f64 {
        self.final_heading
    }

    /// Last waypoint. Never fails: paths are non-empty by construction.
    #[inline]
    pub fn end(&self) -> Translation2d {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Copy of this path mapped onto `alliance`'s half of the field.
    pub fn mirrored(&self, alliance: Alliance) -> Self {
        match alliance {
            Alliance::Red => self.clone(),
            Alliance::Blue => {
                let mut waypoints = Vec::new();
                for &waypoint in &self.waypoints {
                    let pushed = waypoints.push(alliance.mirror(waypoint));
                    debug_assert!(pushed.is_ok(), "same capacity as the source");
                }
                Self {
                    waypoints,
                    final_heading: core::f64::consts::PI - self.final_heading,
                }
            }
        }
    }
}
