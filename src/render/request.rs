use std::fmt;

use super::coverage::{circle_coverage, line_coverage, segment_coverage};
use crate::color::Color;
use crate::math::{clamped_lerp_along, Circle, LineSegment, Rect, Vec2};

/// User coverage function: world point in, color (with coverage in alpha) out
pub type CoverageFn = dyn Fn(Vec2) -> Color + Send + Sync;

/// What a draw request paints. Built-in shapes are plain data; only
/// [`Shape::Custom`] carries a closure.
pub enum Shape {
    Circle {
        circle: Circle,
        color: Color,
        aa_factor: f64,
    },
    Segment {
        segment: LineSegment,
        color: Color,
        thickness: f64,
        aa_factor: f64,
    },
    /// Infinite line through both points of `segment`
    Line {
        segment: LineSegment,
        color: Color,
        thickness: f64,
        aa_factor: f64,
    },
    Custom(Box<CoverageFn>),
}

impl Shape {
    /// Color contributed at world point `p`
    #[inline]
    pub fn evaluate(&self, p: Vec2) -> Color {
        match self {
            Shape::Circle {
                circle,
                color,
                aa_factor,
            } => color.with_multiplied_alpha(circle_coverage(p, circle, *aa_factor)),
            Shape::Segment {
                segment,
                color,
                thickness,
                aa_factor,
            } => color.with_multiplied_alpha(segment_coverage(p, segment, *thickness, *aa_factor)),
            Shape::Line {
                segment,
                color,
                thickness,
                aa_factor,
            } => color.with_multiplied_alpha(line_coverage(p, segment, *thickness, *aa_factor)),
            Shape::Custom(f) => f(p),
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Circle {
                circle,
                color,
                aa_factor,
            } => f
                .debug_struct("Circle")
                .field("circle", circle)
                .field("color", color)
                .field("aa_factor", aa_factor)
                .finish(),
            Shape::Segment {
                segment,
                color,
                thickness,
                aa_factor,
            } => f
                .debug_struct("Segment")
                .field("segment", segment)
                .field("color", color)
                .field("thickness", thickness)
                .field("aa_factor", aa_factor)
                .finish(),
            Shape::Line {
                segment,
                color,
                thickness,
                aa_factor,
            } => f
                .debug_struct("Line")
                .field("segment", segment)
                .field("color", color)
                .field("thickness", thickness)
                .field("aa_factor", aa_factor)
                .finish(),
            Shape::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A shape plus the world-space rectangle outside of which it contributes nothing
#[derive(Debug)]
pub struct DrawRequest {
    shape: Shape,
    bounds: Rect,
}

impl DrawRequest {
    /// Filled circle; bounds are the circle's box grown by the AA band
    pub fn circle(circle: Circle, color: Color, aa_factor: f64) -> Self {
        Self {
            bounds: circle.bounding_box().inflated(aa_factor.max(0.0)),
            shape: Shape::Circle {
                circle,
                color,
                aa_factor,
            },
        }
    }

    /// Stroke of half-width `thickness` around `segment`
    pub fn segment(segment: LineSegment, color: Color, thickness: f64, aa_factor: f64) -> Self {
        Self {
            bounds: segment
                .bounding_box()
                .inflated(thickness.max(0.0) + aa_factor.max(0.0)),
            shape: Shape::Segment {
                segment,
                color,
                thickness,
                aa_factor,
            },
        }
    }

    /// Stroke whose color varies along the segment: `color_at` receives the
    /// clamped position along it, 0 at `p1` and 1 at `p2`
    pub fn segment_with(
        segment: LineSegment,
        color_at: impl Fn(f64) -> Color + Send + Sync + 'static,
        thickness: f64,
        aa_factor: f64,
    ) -> Self {
        let bounds = segment
            .bounding_box()
            .inflated(thickness.max(0.0) + aa_factor.max(0.0));
        Self::custom(
            move |p| {
                let coverage = segment_coverage(p, &segment, thickness, aa_factor);
                color_at(clamped_lerp_along(p, &segment)).with_multiplied_alpha(coverage)
            },
            bounds,
        )
    }

    /// Infinite line through `segment`. It has no natural extent, so the
    /// caller limits it to `bounds` (usually the viewport).
    pub fn line(
        segment: LineSegment,
        color: Color,
        thickness: f64,
        aa_factor: f64,
        bounds: Rect,
    ) -> Self {
        Self {
            shape: Shape::Line {
                segment,
                color,
                thickness,
                aa_factor,
            },
            bounds: bounds.validated(),
        }
    }

    /// Arbitrary coverage function, evaluated only inside `bounds`
    pub fn custom(f: impl Fn(Vec2) -> Color + Send + Sync + 'static, bounds: Rect) -> Self {
        Self {
            shape: Shape::Custom(Box::new(f)),
            bounds: bounds.validated(),
        }
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn evaluate(&self, p: Vec2) -> Color {
        self.shape.evaluate(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_bounds_include_aa_margin() {
        let req = DrawRequest::circle(Circle::new(Vec2::new(1.0, 2.0), 3.0), Color::WHITE, 0.5);
        assert_eq!(req.bounds().min, Vec2::new(-2.5, -1.5));
        assert_eq!(req.bounds().max, Vec2::new(4.5, 5.5));
    }

    #[test]
    fn segment_bounds_cover_the_stroke() {
        let seg = LineSegment::new(Vec2::new(4.0, 0.0), Vec2::new(0.0, 2.0));
        let req = DrawRequest::segment(seg, Color::WHITE, 0.5, 0.25);
        assert_eq!(req.bounds().min, Vec2::new(-0.75, -0.75));
        assert_eq!(req.bounds().max, Vec2::new(4.75, 2.75));
    }

    #[test]
    fn circle_evaluates_to_scaled_alpha() {
        let req = DrawRequest::circle(Circle::new(Vec2::ZERO, 2.0), Color::rgba(9, 8, 7, 200), 1.0);
        assert_eq!(req.evaluate(Vec2::ZERO), Color::rgba(9, 8, 7, 200));
        assert_eq!(req.evaluate(Vec2::new(1.5, 0.0)).a, 100);
        assert_eq!(req.evaluate(Vec2::new(2.0, 0.0)).a, 0);
    }

    #[test]
    fn gradient_segment_colors_by_position() {
        let seg = LineSegment::new(Vec2::ZERO, Vec2::new(4.0, 0.0));
        let req = DrawRequest::segment_with(seg, |t| Color::rgb((t * 200.0) as u8, 0, 0), 1.0, 0.5);
        assert_eq!(req.evaluate(Vec2::new(1.0, 0.0)), Color::rgb(50, 0, 0));
        // beyond the end cap the position stays clamped at 1
        assert_eq!(req.evaluate(Vec2::new(4.25, 0.0)), Color::rgb(200, 0, 0));
        assert_eq!(req.evaluate(Vec2::new(2.0, 1.0)).a, 0);
        assert_eq!(req.bounds().max, Vec2::new(5.5, 1.5));
    }

    #[test]
    fn line_keeps_caller_bounds() {
        let seg = LineSegment::new(Vec2::ZERO, Vec2::new(1.0, 1.0));
        let bounds = Rect::new(Vec2::new(-50.0, -50.0), Vec2::new(50.0, 50.0));
        let req = DrawRequest::line(seg, Color::WHITE, 0.5, 0.0, bounds);
        assert_eq!(req.bounds(), bounds);
        assert_eq!(req.evaluate(Vec2::new(30.0, 30.0)), Color::WHITE);
        assert_eq!(req.evaluate(Vec2::new(30.0, 29.0)).a, 0);
        assert!(format!("{:?}", req.shape()).starts_with("Line"));
    }

    #[test]
    fn custom_requests_call_the_closure() {
        let req = DrawRequest::custom(
            |p| Color::rgba(p.x as u8, p.y as u8, 0, 255),
            Rect::new(Vec2::new(5.0, 5.0), Vec2::ZERO),
        );
        assert_eq!(req.evaluate(Vec2::new(3.0, 4.0)), Color::rgba(3, 4, 0, 255));
        assert_eq!(req.bounds().min, Vec2::ZERO);
        assert_eq!(format!("{:?}", req.shape()), "Custom(..)");
    }
}
