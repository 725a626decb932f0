use std::f64::consts::TAU;

use crate::error::Result;
use crate::grid::{Dimensions, Grid};
use crate::math::Vec2;
use crate::noise;

/// Dense grid of force vectors, sampled by nearest index
pub type VectorField = Grid<Vec2>;

impl Grid<Vec2> {
    /// Zero field
    pub fn zeros(dims: Dimensions) -> Result<Self> {
        Self::new(dims, Vec2::ZERO)
    }

    /// Unit vectors whose angle follows fBm noise.
    ///
    /// `scale` is the noise frequency per cell and `time` the third noise
    /// coordinate, so stepping `time` animates the field smoothly.
    pub fn from_noise(dims: Dimensions, scale: f64, time: f64, seed: u32) -> Result<Self> {
        Self::from_fn(dims, |x, y| {
            let n = noise::fbm_3d(x as f64 * scale, y as f64 * scale, time, 3, seed);
            Vec2::from_polar(1.0, n * 2.0 * TAU)
        })
    }

    /// Recompute the field in place for a new `time`
    pub fn refresh_noise(&mut self, scale: f64, time: f64, seed: u32) {
        for ((x, y), v) in self.enumerate_2d_mut() {
            let n = noise::fbm_3d(x as f64 * scale, y as f64 * scale, time, 3, seed);
            *v = Vec2::from_polar(1.0, n * 2.0 * TAU);
        }
    }

    /// Vector of the cell containing `position` (floored to indices), or
    /// `default` when the position lies outside the grid or isn't finite
    pub fn sample_or(&self, position: Vec2, default: Vec2) -> Vec2 {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return default;
        }
        // Saturating casts keep huge coordinates out of range instead of wrapping
        self.at_or(position.x as usize, position.y as usize, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> VectorField {
        Grid::from_fn(Dimensions::new(4, 3), |x, y| Vec2::new(x as f64, y as f64)).unwrap()
    }

    #[test]
    fn at_or_returns_default_outside() {
        let field = ramp();
        let fallback = Vec2::new(-1.0, -1.0);
        assert_eq!(field.at_or(3, 2, fallback), Vec2::new(3.0, 2.0));
        assert_eq!(field.at_or(4, 0, fallback), fallback);
        assert_eq!(field.at_or(0, 3, fallback), fallback);
        assert_eq!(field.at_or(usize::MAX, usize::MAX, fallback), fallback);
    }

    #[test]
    fn sample_floors_positions() {
        let field = ramp();
        assert_eq!(field.sample_or(Vec2::new(2.9, 1.2), Vec2::ZERO), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn sample_rejects_negative_and_non_finite() {
        let field = ramp();
        let fallback = Vec2::new(9.0, 9.0);
        assert_eq!(field.sample_or(Vec2::new(-0.5, 1.0), fallback), fallback);
        assert_eq!(field.sample_or(Vec2::new(f64::NAN, 1.0), fallback), fallback);
        assert_eq!(field.sample_or(Vec2::new(1.0, f64::INFINITY), fallback), fallback);
        assert_eq!(field.sample_or(Vec2::new(1e300, 1.0), fallback), fallback);
    }

    #[test]
    fn noise_field_is_unit_length_and_reproducible() {
        let dims = Dimensions::splat(8);
        let a = VectorField::from_noise(dims, 0.3, 1.5, 11).unwrap();
        let b = VectorField::from_noise(dims, 0.3, 1.5, 11).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (v.length() - 1.0).abs() < 1e-9));

        let mut c = VectorField::zeros(dims).unwrap();
        c.refresh_noise(0.3, 1.5, 11);
        assert_eq!(c, a);
    }
}
