/*
 * Geometry Module
 *
 * Small 2D helpers shared by the grid and the steering engine. World
 * coordinates are pixels with the origin in the top-left corner of the
 * viewport and y growing downwards.
 */

use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_squared(self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Angle of the line from `self` to `other`, in (−π, π].
    #[inline]
    pub fn bearing_to(self, other: Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Mirror `other` through `self`.
    #[inline]
    pub fn reflect(self, other: Position) -> Position {
        Position::new(2.0 * self.x - other.x, 2.0 * self.y - other.y)
    }
}

/// Wrap an angle into the half-open interval (−π, π].
pub fn wrap_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid lands on [−π, π); −π itself belongs to the other end.
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
