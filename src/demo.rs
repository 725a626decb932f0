//! Flow-field particle demo shared by the binary, tests and benches.
//!
//! Particles live in field-cell coordinates `[0, w) x [0, h)`. World space is
//! the same grid shifted so the field centre sits at the origin, which keeps
//! the renderer's default centred transform pointing at the middle of the
//! field.

use tracing::debug;

use crate::config::DemoConfig;
use crate::error::Result;
use crate::grid::Dimensions;
use crate::math::{Circle, Rect, Transform, Vec2};
use crate::physics::{Particle, ParticleSystem, VectorField};
use crate::render::Renderer;
use crate::util::Rng;

/// Noise time advanced per simulated second
const FIELD_DRIFT: f64 = 0.1;

pub struct FlowDemo {
    config: DemoConfig,
    system: ParticleSystem,
    field: VectorField,
    bounds: Rect,
    time: f64,
}

impl FlowDemo {
    /// Scatter `config.particles` particles uniformly over the field
    pub fn new(config: DemoConfig) -> Result<Self> {
        config.validate()?;
        let dims = Dimensions::new(config.field_width, config.field_height);
        let field = VectorField::from_noise(dims, config.noise_scale, 0.0, config.seed as u32)?;
        let bounds = Rect::new(
            Vec2::ZERO,
            Vec2::new(config.field_width as f64, config.field_height as f64),
        );

        let mut rng = Rng::new(config.seed);
        let particles = (0..config.particles)
            .map(|_| Particle::new(rng.vector_in(&bounds), config.particle_radius, 1.0))
            .collect::<Result<Vec<_>>>()?;
        debug!(particles = particles.len(), "flow field seeded");

        Ok(Self {
            config,
            system: ParticleSystem::from_particles(particles),
            field,
            bounds,
            time: 0.0,
        })
    }

    /// Transform that fits the whole field into a `width` x `height` image
    pub fn fitted_transform(&self, width: usize, height: usize) -> Transform {
        let scale = (width as f64 / self.bounds.width()).min(height as f64 / self.bounds.height());
        Transform::centred(width, height, scale)
    }

    /// Advance the field and every particle by `dt` seconds
    pub fn step(&mut self, dt: f64) {
        self.time += dt * FIELD_DRIFT;
        self.field
            .refresh_noise(self.config.noise_scale, self.time, self.config.seed as u32);

        let field = &self.field;
        self.system
            .for_each(|p| p.apply_force(field.sample_or(p.pos, Vec2::ZERO)));
        self.system.update(dt);
        self.system.wrap(&self.bounds);
        self.system.limit_speed(self.config.max_speed);
    }

    /// Queue one faint circle per particle, antialiased over one pixel
    pub fn draw(&self, renderer: &mut Renderer) {
        let aa = 1.0 / renderer.transform().scale.x.abs();
        let origin = self.bounds.centre();
        for p in &self.system {
            renderer.draw_circle(
                Circle::new(p.pos - origin, p.radius),
                self.config.particle_color,
                aa,
            );
        }
    }

    /// Fade, queue and render one frame
    pub fn frame(&mut self, renderer: &mut Renderer, dt: f64) {
        self.step(dt);
        renderer.image_mut().fade(self.config.fade);
        self.draw(renderer);
        renderer.render();
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.system
    }

    /// Field-space rectangle particles wrap around
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}
