//! Planar geometry in field coordinates.
//!
//! Units are metres and radians. Headings are measured counter-clockwise
//! from the field +X axis and are not normalised unless stated.

use core::f64::consts::{PI, TAU};
use core::ops::{Add, Mul, Neg, Sub};
use serde::{Deserialize, Serialize};

/// A 2D offset or position on the field [m].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation2d {
    pub x: f64,
    pub y: f64,
}

impl Translation2d {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[inline]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Direction of this vector, `atan2(y, x)`.
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).norm()
    }
}

impl Add for Translation2d {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Translation2d {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Translation2d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Translation2d {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Robot pose: position plus heading [rad].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2d {
    pub translation: Translation2d,
    pub heading: f64,
}

impl Pose2d {
    #[inline]
    pub const fn new(translation: Translation2d, heading: f64) -> Self {
        Self {
            translation,
            heading,
        }
    }
}

/// Wrap an angle into `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Shortest signed rotation taking `from` onto `to`.
#[inline]
pub fn angle_error(to: f64, from: f64) -> f64 {
    normalize_angle(to - from)
}
