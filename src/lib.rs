//! rasterkit: a small CPU rasteriser and particle toolkit.
//!
//! Shapes are drawn by coverage functions evaluated per pixel in world space,
//! composited with straight alpha into a [`PixelBuffer`], and flushed across a
//! rayon pool in disjoint row bands. The [`physics`] module supplies particles
//! and force fields to feed it.

pub mod color;
pub mod config;
pub mod demo;
pub mod display;
pub mod error;
pub mod grid;
pub mod math;
pub mod noise;
pub mod physics;
pub mod render;
pub mod util;

pub use color::{ChannelOrder, Color};
pub use config::{DemoConfig, RendererConfig};
pub use display::PixelBuffer;
pub use error::{Error, HexColorError, Result};
pub use grid::{Dimensions, Grid};
pub use math::{Circle, LineSegment, Rect, Transform, Vec2};
pub use physics::{Particle, ParticleSystem, Trail, VectorField};
pub use render::{DrawRequest, RenderState, Renderer, Shape};
