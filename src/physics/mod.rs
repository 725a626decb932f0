//! Particle Simulation
//!
//! Point masses integrated with semi-implicit Euler, fixed-size systems of
//! them, position trails, and grid force fields to push them around.

mod particle;
mod particle_system;
mod trail;
mod vector_field;

pub use particle::Particle;
pub use particle_system::ParticleSystem;
pub use trail::Trail;
pub use vector_field::VectorField;
