//! 2D Math Primitives
//!
//! Value types shared by the simulation and the rasterizer: vectors, axis-aligned
//! rectangles, the world-to-pixel transform, and the two shapes the renderer
//! knows how to cover (circles and line segments).

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

// ============================================================================
// Vec2
// ============================================================================

/// 2D vector in world or pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector with both components set to `v`
    #[inline]
    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v }
    }

    /// Build a vector from a length and an angle in radians
    #[inline]
    pub fn from_polar(length: f64, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(length * cos, length * sin)
    }

    #[inline]
    pub fn length_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length_sq().sqrt()
    }

    /// Angle from the positive x axis, in radians
    #[inline]
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            *self / len
        } else {
            *self
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }

    #[inline]
    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    #[inline]
    pub fn min(&self, other: &Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    #[inline]
    pub fn max(&self, other: &Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Rescale so the length lies within `[min, max]`, keeping direction.
    /// A zero vector stays zero.
    pub fn clamp_length(&self, min: f64, max: f64) -> Self {
        let len = self.length();
        if len == 0.0 {
            return *self;
        }
        let clamped = len.clamp(min, max);
        if clamped == len {
            *self
        } else {
            *self * (clamped / len)
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;
    #[inline]
    fn mul(self, v: Vec2) -> Vec2 {
        v * self
    }
}

/// Component-wise product (used for per-axis scale)
impl Mul for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }
}

impl MulAssign<f64> for Vec2 {
    #[inline]
    fn mul_assign(&mut self, scalar: f64) {
        self.x *= scalar;
        self.y *= scalar;
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    #[inline]
    fn div(self, scalar: f64) -> Self {
        Self::new(self.x / scalar, self.y / scalar)
    }
}

/// Component-wise quotient
impl Div for Vec2 {
    type Output = Self;
    #[inline]
    fn div(self, other: Self) -> Self {
        Self::new(self.x / other.x, self.y / other.y)
    }
}

// ============================================================================
// Rect
// ============================================================================

/// Axis-aligned rectangle, `min` <= `max` on both axes once validated
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest rect containing both points, in any order
    #[inline]
    pub fn find_min_max(p1: Vec2, p2: Vec2) -> Self {
        Self::new(p1.min(&p2), p1.max(&p2))
    }

    pub fn from_centre_width_height(centre: Vec2, width: f64, height: f64) -> Self {
        let half = Vec2::new(width / 2.0, height / 2.0);
        Self::new(centre - half, centre + half)
    }

    /// Bounding box of a point set; `None` when empty
    pub fn bounding(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Self::new(*first, *first), |acc, p| {
            Self::new(acc.min.min(p), acc.max.max(p))
        }))
    }

    /// Reorder corners so `min` <= `max`
    #[inline]
    pub fn validated(&self) -> Self {
        Self::find_min_max(self.min, self.max)
    }

    /// Inclusive containment on all edges
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grow every edge outward by `margin`
    #[inline]
    pub fn inflated(&self, margin: f64) -> Self {
        Self::new(self.min - Vec2::splat(margin), self.max + Vec2::splat(margin))
    }

    /// Clamp both corners into `bounds`
    pub fn clamped_to(&self, bounds: &Rect) -> Self {
        let clamp = |p: Vec2| {
            Vec2::new(
                p.x.clamp(bounds.min.x, bounds.max.x),
                p.y.clamp(bounds.min.y, bounds.max.y),
            )
        };
        Self::new(clamp(self.min), clamp(self.max))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    pub fn centre(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Axis-aligned affine map from world space to pixel space:
/// `pixel = world * scale + pos`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub pos: Vec2,
    pub scale: Vec2,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        pos: Vec2::ZERO,
        scale: Vec2::splat(1.0),
    };

    #[inline]
    pub const fn new(pos: Vec2, scale: Vec2) -> Self {
        Self { pos, scale }
    }

    /// World origin at the image centre, `y` pointing up, `scale` pixels per world unit
    pub fn centred(width: usize, height: usize, scale: f64) -> Self {
        Self::new(
            Vec2::new(width as f64 / 2.0, height as f64 / 2.0),
            Vec2::new(scale, -scale),
        )
    }

    #[inline]
    pub fn apply(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.pos
    }

    #[inline]
    pub fn apply_inverse(&self, pixel: Vec2) -> Vec2 {
        (pixel - self.pos) / self.scale
    }

    /// Map a world rect to pixel space; a negative scale flips corners, so they are re-sorted
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        Rect::find_min_max(self.apply(rect.min), self.apply(rect.max))
    }

    pub fn apply_inverse_rect(&self, rect: &Rect) -> Rect {
        Rect::find_min_max(self.apply_inverse(rect.min), self.apply_inverse(rect.max))
    }

    pub fn apply_inverse_segment(&self, segment: &LineSegment) -> LineSegment {
        LineSegment::new(self.apply_inverse(segment.p1), self.apply_inverse(segment.p2))
    }

    /// Zoom by `factor` keeping the pixel `anchor` fixed on screen
    pub fn zoom_about(&mut self, anchor: Vec2, factor: f64) {
        let world = self.apply_inverse(anchor);
        self.scale *= factor;
        self.pos = anchor - world * self.scale;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// Shapes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub centre: Vec2,
    pub radius: f64,
}

impl Circle {
    #[inline]
    pub const fn new(centre: Vec2, radius: f64) -> Self {
        Self { centre, radius }
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(
            self.centre - Vec2::splat(self.radius),
            self.centre + Vec2::splat(self.radius),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub p1: Vec2,
    pub p2: Vec2,
}

impl LineSegment {
    #[inline]
    pub const fn new(p1: Vec2, p2: Vec2) -> Self {
        Self { p1, p2 }
    }

    /// Direction from `p1` to `p2`
    #[inline]
    pub fn vector(&self) -> Vec2 {
        self.p2 - self.p1
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.vector().length()
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::find_min_max(self.p1, self.p2)
    }
}

/// Projection parameter of `p` onto the infinite line through `segment`
/// (0 at `p1`, 1 at `p2`). A degenerate segment projects to 0.
pub fn lerp_along(p: Vec2, segment: &LineSegment) -> f64 {
    let v = segment.vector();
    let len_sq = v.length_sq();
    if len_sq == 0.0 {
        return 0.0;
    }
    (p - segment.p1).dot(&v) / len_sq
}

/// Like [`lerp_along`] but clamped to the segment, `[0, 1]`
#[inline]
pub fn clamped_lerp_along(p: Vec2, segment: &LineSegment) -> f64 {
    lerp_along(p, segment).clamp(0.0, 1.0)
}

/// Distance from `p` to the nearest point on the segment (not the infinite line)
pub fn clamped_distance(p: Vec2, segment: &LineSegment) -> f64 {
    let t = clamped_lerp_along(p, segment);
    p.distance(&(segment.p1 + segment.vector() * t))
}

/// Perpendicular distance from `p` to the infinite line through `segment`
pub fn line_distance(p: Vec2, segment: &LineSegment) -> f64 {
    let t = lerp_along(p, segment);
    p.distance(&(segment.p1 + segment.vector() * t))
}

/// Wrap `value` into `[0, max)`
#[inline]
pub fn wrap_max(value: f64, max: f64) -> f64 {
    value.rem_euclid(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_round_trips() {
        let tr = Transform::centred(200, 100, 10.0);
        let world = Vec2::new(3.5, -2.25);
        let back = tr.apply_inverse(tr.apply(world));
        assert!(back.approx_eq(&world, 1e-12));
        assert_eq!(tr.apply(Vec2::ZERO), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn apply_rect_resorts_flipped_corners() {
        let tr = Transform::centred(100, 100, 10.0);
        let rect = tr.apply_rect(&Rect::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 2.0)));
        assert_eq!(rect.min, Vec2::new(40.0, 30.0));
        assert_eq!(rect.max, Vec2::new(60.0, 60.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut tr = Transform::centred(100, 100, 4.0);
        let anchor = Vec2::new(20.0, 70.0);
        let world_before = tr.apply_inverse(anchor);
        tr.zoom_about(anchor, 1.5);
        assert!(tr.apply(world_before).approx_eq(&anchor, 1e-9));
        assert_eq!(tr.scale, Vec2::new(6.0, -6.0));
    }

    #[test]
    fn clamped_distance_uses_endpoints() {
        let seg = LineSegment::new(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert_eq!(clamped_distance(Vec2::new(5.0, 3.0), &seg), 3.0);
        assert_eq!(clamped_distance(Vec2::new(-4.0, 3.0), &seg), 5.0);
        assert_eq!(line_distance(Vec2::new(-4.0, 3.0), &seg), 3.0);
    }

    #[test]
    fn degenerate_segment_is_a_point() {
        let seg = LineSegment::new(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0));
        assert_eq!(clamped_distance(Vec2::new(4.0, 5.0), &seg), 5.0);
    }

    #[test]
    fn clamp_length_limits_speed() {
        let v = Vec2::new(3.0, 4.0);
        assert!(v.clamp_length(0.0, 2.5).approx_eq(&Vec2::new(1.5, 2.0), 1e-12));
        assert_eq!(v.clamp_length(0.0, 10.0), v);
        assert_eq!(Vec2::ZERO.clamp_length(1.0, 2.0), Vec2::ZERO);
    }

    #[test]
    fn bounding_rect_of_points() {
        let pts = [Vec2::new(1.0, 5.0), Vec2::new(-2.0, 3.0), Vec2::new(4.0, -1.0)];
        let rect = Rect::bounding(&pts).unwrap();
        assert_eq!(rect.min, Vec2::new(-2.0, -1.0));
        assert_eq!(rect.max, Vec2::new(4.0, 5.0));
        assert!(Rect::bounding(&[]).is_none());
    }

    #[test]
    fn wrap_handles_negatives() {
        assert_eq!(wrap_max(-1.0, 10.0), 9.0);
        assert_eq!(wrap_max(12.5, 10.0), 2.5);
    }
}
