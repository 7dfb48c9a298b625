use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > f64::EPSILON && len.is_finite() {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::ZERO
        }
    }

    /// Vertical component halved: the arena floor is seen at an angle.
    pub fn flattened(self) -> Self {
        Vec2::new(self.x, self.y * 0.5)
    }

    pub fn lerp(self, to: Vec2, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Whether `point` lies inside the ellipse centred on `center` with horizontal
/// radius `range` and vertical radius `range / 2`.
pub fn within_reach(center: Vec2, point: Vec2, range: f64) -> bool {
    if range <= 0.0 {
        return center == point;
    }
    let d = point - center;
    let rx = range;
    let ry = range * 0.5;
    (d.x / rx).powi(2) + (d.y / ry).powi(2) <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reach_is_an_ellipse_not_a_circle() {
        let origin = Vec2::ZERO;
        assert!(within_reach(origin, Vec2::new(90.0, 0.0), 90.0));
        assert!(within_reach(origin, Vec2::new(0.0, 45.0), 90.0));
        assert!(!within_reach(origin, Vec2::new(0.0, 60.0), 90.0));
        assert!(!within_reach(origin, Vec2::new(91.0, 0.0), 90.0));
    }

    #[test]
    fn normalize_handles_zero_length() {
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalize_or_zero();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }
}
