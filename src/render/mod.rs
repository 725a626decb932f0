//! Coverage-based 2D rasterisation.
//!
//! Shapes are described by how much of them covers a world-space point
//! ([`coverage`]), queued as [`DrawRequest`]s and composited into the pixel
//! buffer by the [`Renderer`] in parallel row bands.

pub mod coverage;
mod renderer;
mod request;

pub use coverage::{antialias, line_coverage, CIRCLE_AA_FACTOR, SEGMENT_AA_FACTOR};
pub use renderer::{RenderState, Renderer};
pub use request::{CoverageFn, DrawRequest, Shape};
