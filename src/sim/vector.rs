//! 2D vector helpers
//!
//! `Vector2D` is glam's `DVec2`; add/sub/scale come from its operators.
//! The extension trait adds the zero-safe operations the simulation relies on.

use glam::DVec2;

pub type Vector2D = DVec2;

pub trait Vector2DExt {
    /// Euclidean length
    fn magnitude(self) -> f64;
    /// Unit vector, or zero when there is no defined direction
    fn direction(self) -> Self;
    /// Component-wise division; a zero divisor yields the zero vector
    fn div_or_zero(self, k: f64) -> Self;
    /// Scalar projection onto `axis`
    fn along(self, axis: Self) -> f64;
}

impl Vector2DExt for DVec2 {
    #[inline]
    fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    fn direction(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return DVec2::ZERO;
        }
        self.div_or_zero(mag)
    }

    #[inline]
    fn div_or_zero(self, k: f64) -> Self {
        if k == 0.0 {
            return DVec2::ZERO;
        }
        DVec2::new(self.x / k, self.y / k)
    }

    #[inline]
    fn along(self, axis: Self) -> f64 {
        self.x * axis.x + self.y * axis.y
    }
}
