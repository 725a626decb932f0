//! Analytic coverage: how much of a shape lies under a world-space point.
//!
//! Every shape reduces to a distance function fed through [`antialias`], so a
//! new shape only needs to know how far a point is from its edge.

use crate::math::{clamped_distance, line_distance, Circle, LineSegment, Vec2};

/// Default antialiasing band for circles, in world units
pub const CIRCLE_AA_FACTOR: f64 = 1.6;
/// Default antialiasing band for segments, in world units
pub const SEGMENT_AA_FACTOR: f64 = 0.1;

/// Linear ramp over the band `[radius - aa_factor, radius]`:
/// 1.0 inside it, 0.0 at or beyond `radius`.
///
/// A non-positive `aa_factor` gives a hard edge.
#[inline]
pub fn antialias(distance: f64, radius: f64, aa_factor: f64) -> f64 {
    if aa_factor <= 0.0 {
        return if distance < radius { 1.0 } else { 0.0 };
    }
    ((radius - distance) / aa_factor).clamp(0.0, 1.0)
}

#[inline]
pub fn circle_coverage(p: Vec2, circle: &Circle, aa_factor: f64) -> f64 {
    antialias(p.distance(&circle.centre), circle.radius, aa_factor)
}

/// Coverage of a stroke of half-width `thickness` around the segment
#[inline]
pub fn segment_coverage(p: Vec2, segment: &LineSegment, thickness: f64, aa_factor: f64) -> f64 {
    antialias(clamped_distance(p, segment), thickness, aa_factor)
}

/// Coverage of a stroke around the infinite line through `segment`
#[inline]
pub fn line_coverage(p: Vec2, segment: &LineSegment, thickness: f64, aa_factor: f64) -> f64 {
    antialias(line_distance(p, segment), thickness, aa_factor)
}
