use crate::math::{wrap_max, Rect, Vec2};

use super::Particle;

/// Fixed-size set of particles stepped together
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    gravity: Vec2,
    drag: f64,
}

impl ParticleSystem {
    /// `count` copies of `template`
    pub fn new(count: usize, template: Particle) -> Self {
        Self {
            particles: vec![template; count],
            gravity: Vec2::ZERO,
            drag: 0.0,
        }
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            gravity: Vec2::ZERO,
            drag: 0.0,
        }
    }

    /// Uniform acceleration added every step, independent of mass
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Fraction of velocity lost per second (0.0 = none)
    pub fn with_drag(mut self, drag: f64) -> Self {
        self.drag = drag;
        self
    }

    /// Apply the same force to every particle
    pub fn apply_force_all(&mut self, force: Vec2) {
        for p in &mut self.particles {
            p.apply_force(force);
        }
    }

    /// Step every particle by `dt`
    pub fn update(&mut self, dt: f64) {
        // Clamped so a large dt can't reverse velocity
        let drag_factor = (1.0 - self.drag * dt).max(0.0);
        for p in &mut self.particles {
            p.acc += self.gravity;
            p.update(dt);
            if self.drag > 0.0 {
                p.vel *= drag_factor;
            }
        }
    }

    pub fn for_each(&mut self, f: impl FnMut(&mut Particle)) {
        self.particles.iter_mut().for_each(f);
    }

    /// Wrap positions around `bounds` (toroidal world). An axis with zero or
    /// non-finite extent is left as is.
    pub fn wrap(&mut self, bounds: &Rect) {
        let size = Vec2::new(bounds.width(), bounds.height());
        let wrap_x = size.x > 0.0 && size.x.is_finite();
        let wrap_y = size.y > 0.0 && size.y.is_finite();
        for p in &mut self.particles {
            if wrap_x {
                p.pos.x = bounds.min.x + wrap_max(p.pos.x - bounds.min.x, size.x);
            }
            if wrap_y {
                p.pos.y = bounds.min.y + wrap_max(p.pos.y - bounds.min.y, size.y);
            }
        }
    }

    /// Keep particles inside `bounds`, reflecting the velocity component that
    /// pushed them out
    pub fn clamp_to(&mut self, bounds: &Rect) {
        for p in &mut self.particles {
            if p.pos.x < bounds.min.x || p.pos.x > bounds.max.x {
                p.pos.x = p.pos.x.clamp(bounds.min.x, bounds.max.x);
                p.vel.x = -p.vel.x;
            }
            if p.pos.y < bounds.min.y || p.pos.y > bounds.max.y {
                p.pos.y = p.pos.y.clamp(bounds.min.y, bounds.max.y);
                p.vel.y = -p.vel.y;
            }
        }
    }

    /// Clamp every speed to `[0, max_speed]`
    pub fn limit_speed(&mut self, max_speed: f64) {
        for p in &mut self.particles {
            p.vel = p.vel.clamp_length(0.0, max_speed);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

impl std::ops::Index<usize> for ParticleSystem {
    type Output = Particle;

    fn index(&self, index: usize) -> &Particle {
        &self.particles[index]
    }
}

impl std::ops::IndexMut<usize> for ParticleSystem {
    fn index_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.particles[index]
    }
}

impl<'a> IntoIterator for &'a ParticleSystem {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

impl<'a> IntoIterator for &'a mut ParticleSystem {
    type Item = &'a mut Particle;
    type IntoIter = std::slice::IterMut<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter_mut()
    }
}
