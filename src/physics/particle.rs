use crate::error::{Error, Result};
use crate::math::{Circle, Vec2};

/// A point mass with a drawable radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub radius: f64,
    mass: f64,
}

impl Particle {
    /// Particle at rest. `mass` must be positive and finite.
    pub fn new(pos: Vec2, radius: f64, mass: f64) -> Result<Self> {
        Self {
            pos,
            radius,
            ..Self::default()
        }
        .with_mass(mass)
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Result<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(Error::InvalidMass(mass));
        }
        self.mass = mass;
        Ok(self)
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn as_circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// Accumulate `force`; several forces may be applied before [`update`](Self::update)
    #[inline]
    pub fn apply_force(&mut self, force: Vec2) {
        self.acc += force / self.mass;
    }

    /// Semi-implicit Euler step, then clear the accumulated acceleration
    #[inline]
    pub fn update(&mut self, dt: f64) {
        self.vel += self.acc * dt;
        self.pos += self.vel * dt;
        self.acc = Vec2::ZERO;
    }
}

impl Default for Particle {
    /// Unit-mass, unit-radius particle at the origin
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            radius: 1.0,
            mass: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_then_update_integrates_semi_implicitly() {
        let mut p = Particle::new(Vec2::ZERO, 1.0, 2.0).unwrap();
        p.apply_force(Vec2::new(0.0, 10.0));
        p.update(1.0);
        assert_eq!(p.vel, Vec2::new(0.0, 5.0));
        assert_eq!(p.pos, Vec2::new(0.0, 5.0));
        assert_eq!(p.acc, Vec2::ZERO);
    }

    #[test]
    fn forces_accumulate_until_update() {
        let mut p = Particle::default();
        p.apply_force(Vec2::new(1.0, 0.0));
        p.apply_force(Vec2::new(2.0, -4.0));
        assert_eq!(p.acc, Vec2::new(3.0, -4.0));
        p.update(0.5);
        assert_eq!(p.vel, Vec2::new(1.5, -2.0));
        assert_eq!(p.pos, Vec2::new(0.75, -1.0));
    }

    #[test]
    fn rejects_non_positive_mass() {
        assert!(matches!(
            Particle::new(Vec2::ZERO, 1.0, 0.0),
            Err(Error::InvalidMass(m)) if m == 0.0
        ));
        assert!(Particle::default().with_mass(f64::NAN).is_err());
        assert!(Particle::default().with_mass(-1.0).is_err());
    }

    #[test]
    fn circle_matches_particle() {
        let p = Particle::default().with_radius(0.25);
        assert_eq!(p.as_circle(), Circle::new(Vec2::ZERO, 0.25));
    }
}
