//! Deferred draw queue flushed into a [`PixelBuffer`].
//!
//! Draw calls only record a [`DrawRequest`]. [`Renderer::render`] clips every
//! request to the screen once, then splits the image into disjoint row bands
//! and rasterises them on the rayon pool. Each band applies requests in
//! enqueue order, so the result does not depend on how many bands there are.

use tracing::{debug, trace};

use super::request::DrawRequest;
use crate::color::Color;
use crate::config::RendererConfig;
use crate::display::PixelBuffer;
use crate::error::{Error, Result};
use crate::grid::{Dimensions, RowBand};
use crate::math::{Circle, LineSegment, Rect, Transform, Vec2};
use crate::physics::{Particle, Trail};

/// Whether anything is waiting for the next [`Renderer::render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Queued,
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`, never empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRegion {
    x0: usize,
    x1: usize,
    y0: usize,
    y1: usize,
}

impl PixelRegion {
    /// Pixels whose integer coordinates fall inside `bounds` (pixel space),
    /// limited to the image. `None` when nothing is left.
    fn clip(bounds: &Rect, dims: Dimensions) -> Option<Self> {
        // Also rejects NaN corners
        if !(bounds.min.x <= bounds.max.x && bounds.min.y <= bounds.max.y) {
            return None;
        }
        let x0 = bounds.min.x.ceil().max(0.0);
        let y0 = bounds.min.y.ceil().max(0.0);
        let x1 = (bounds.max.x.floor() + 1.0).min(dims.width as f64);
        let y1 = (bounds.max.y.floor() + 1.0).min(dims.height as f64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Self {
            x0: x0 as usize,
            x1: x1 as usize,
            y0: y0 as usize,
            y1: y1 as usize,
        })
    }
}

/// A queued request together with its clipped pixel region
struct Job<'a> {
    request: &'a DrawRequest,
    region: PixelRegion,
}

/// Apply every job to the rows of `band`, in order.
///
/// Both render paths run this kernel, so they produce identical bytes.
fn rasterize_band(band: &mut RowBand<'_, Color>, jobs: &[Job<'_>], transform: &Transform) {
    for job in jobs {
        let y0 = job.region.y0.max(band.y_start());
        let y1 = job.region.y1.min(band.y_end());
        for y in y0..y1 {
            let row = &mut band.row_mut(y)[job.region.x0..job.region.x1];
            for (px, x) in row.iter_mut().zip(job.region.x0..) {
                let world = transform.apply_inverse(Vec2::new(x as f64, y as f64));
                px.add_alpha_over(job.request.evaluate(world));
            }
        }
    }
}

/// Pixel regions for every visible request; off-screen ones are dropped
fn clip_queue<'a>(queue: &'a [DrawRequest], transform: &Transform, dims: Dimensions) -> Vec<Job<'a>> {
    let jobs: Vec<Job<'a>> = queue
        .iter()
        .filter_map(|request| {
            let bounds = transform.apply_rect(&request.bounds());
            PixelRegion::clip(&bounds, dims).map(|region| Job { request, region })
        })
        .collect();
    let skipped = queue.len() - jobs.len();
    if skipped > 0 {
        trace!(skipped, "requests outside the image");
    }
    jobs
}

/// Multiples of `spacing` inside `[min, max]`.
///
/// Counted up front: far from the origin `k + 1.0` can round back to `k`.
fn grid_positions(min: f64, max: f64, spacing: f64) -> impl Iterator<Item = f64> {
    let first = (min / spacing).ceil();
    let last = (max / spacing).floor();
    let count = if last >= first {
        (last - first) as usize + 1
    } else {
        0
    };
    (0..count).map(move |i| (first + i as f64) * spacing)
}

/// `None` leaves sizing to rayon, `Some(1)` means no pool at all
fn build_thread_pool(threads: Option<usize>) -> Result<Option<rayon::ThreadPool>> {
    match threads {
        Some(0) => Err(Error::InvalidThreadCount),
        Some(1) => {
            debug!("single render thread, no pool");
            Ok(None)
        },
        _ => {
            let mut builder =
                rayon::ThreadPoolBuilder::new().thread_name(|i| format!("rasterkit-render-{}", i));
            if let Some(n) = threads {
                builder = builder.num_threads(n);
            }
            let pool = builder.build()?;
            debug!(threads = pool.current_num_threads(), "render pool ready");
            Ok(Some(pool))
        },
    }
}

pub struct Renderer {
    image: PixelBuffer,
    transform: Transform,
    queue: Vec<DrawRequest>,
    pool: Option<rayon::ThreadPool>,
}

impl Renderer {
    /// Image cleared to `config.clear_color`, pool sized by `config.threads`
    pub fn new(config: &RendererConfig) -> Result<Self> {
        let image = PixelBuffer::new(
            Dimensions::new(config.width, config.height),
            config.clear_color,
        )?;
        Self::with_image(image, config.resolved_transform(), config.threads)
    }

    /// Render into an existing buffer
    pub fn with_image(
        image: PixelBuffer,
        transform: Transform,
        threads: Option<usize>,
    ) -> Result<Self> {
        Ok(Self {
            image,
            transform,
            queue: Vec::new(),
            pool: build_thread_pool(threads)?,
        })
    }

    // ------------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------------

    #[inline]
    pub fn draw(&mut self, request: DrawRequest) {
        self.queue.push(request);
    }

    /// Custom coverage function over `bounds` (world space)
    pub fn draw_fn(&mut self, f: impl Fn(Vec2) -> Color + Send + Sync + 'static, bounds: Rect) {
        self.draw(DrawRequest::custom(f, bounds));
    }

    /// Custom coverage function over the whole visible area
    pub fn draw_fn_everywhere(&mut self, f: impl Fn(Vec2) -> Color + Send + Sync + 'static) {
        let bounds = self.viewport();
        self.draw_fn(f, bounds);
    }

    pub fn draw_circle(&mut self, circle: Circle, color: Color, aa_factor: f64) {
        self.draw(DrawRequest::circle(circle, color, aa_factor));
    }

    pub fn draw_particle(&mut self, particle: &Particle, color: Color, aa_factor: f64) {
        self.draw_circle(particle.as_circle(), color, aa_factor);
    }

    pub fn draw_line_segment(
        &mut self,
        segment: LineSegment,
        color: Color,
        thickness: f64,
        aa_factor: f64,
    ) {
        self.draw(DrawRequest::segment(segment, color, thickness, aa_factor));
    }

    /// Segment colored by `color_at(t)`, with `t` running from 0 at `p1` to 1 at `p2`
    pub fn draw_line_segment_with(
        &mut self,
        segment: LineSegment,
        color_at: impl Fn(f64) -> Color + Send + Sync + 'static,
        thickness: f64,
        aa_factor: f64,
    ) {
        self.draw(DrawRequest::segment_with(segment, color_at, thickness, aa_factor));
    }

    /// Infinite line through both points of `segment`, across the viewport
    pub fn draw_line(&mut self, segment: LineSegment, color: Color, thickness: f64, aa_factor: f64) {
        let bounds = self.viewport();
        self.draw(DrawRequest::line(segment, color, thickness, aa_factor, bounds));
    }

    /// One segment per consecutive pair of points
    pub fn draw_polyline(&mut self, points: &[Vec2], color: Color, thickness: f64, aa_factor: f64) {
        for pair in points.windows(2) {
            self.draw_line_segment(LineSegment::new(pair[0], pair[1]), color, thickness, aa_factor);
        }
    }

    /// Polyline closed back to the first point (when there are at least three)
    pub fn draw_polygon(&mut self, points: &[Vec2], color: Color, thickness: f64, aa_factor: f64) {
        self.draw_polyline(points, color, thickness, aa_factor);
        if let [first, .., last] = points {
            if points.len() >= 3 {
                self.draw_line_segment(LineSegment::new(*last, *first), color, thickness, aa_factor);
            }
        }
    }

    /// Trail as a polyline fading in from transparent at the oldest point to
    /// `color` at the newest
    pub fn draw_trail(&mut self, trail: &Trail, color: Color, thickness: f64, aa_factor: f64) {
        let steps = trail.len().saturating_sub(1);
        if steps == 0 {
            return;
        }
        for (i, (p1, p2)) in trail.points().zip(trail.points().skip(1)).enumerate() {
            let t = (i + 1) as f64 / steps as f64;
            self.draw_line_segment(
                LineSegment::new(*p1, *p2),
                color.with_multiplied_alpha(t),
                thickness,
                aa_factor,
            );
        }
    }

    /// Axis-aligned lines every `spacing` world units through the origin,
    /// one pixel wide, across the current viewport.
    ///
    /// Skipped when lines would be closer than a pixel apart.
    pub fn draw_grid(&mut self, spacing: f64, color: Color) {
        let px = Vec2::new(1.0 / self.transform.scale.x.abs(), 1.0 / self.transform.scale.y.abs());
        if !(spacing > 0.0 && spacing.is_finite() && px.is_finite())
            || spacing < px.x
            || spacing < px.y
        {
            trace!(spacing, "grid spacing below one pixel, skipped");
            return;
        }
        let view = self.viewport();

        for x in grid_positions(view.min.x, view.max.x, spacing) {
            self.draw_line_segment(
                LineSegment::new(Vec2::new(x, view.min.y), Vec2::new(x, view.max.y)),
                color,
                px.x,
                px.x,
            );
        }
        for y in grid_positions(view.min.y, view.max.y, spacing) {
            self.draw_line_segment(
                LineSegment::new(Vec2::new(view.min.x, y), Vec2::new(view.max.x, y)),
                color,
                px.y,
                px.y,
            );
        }
    }

    // ------------------------------------------------------------------------
    // Flush
    // ------------------------------------------------------------------------

    /// Rasterise and drain the queue. Does nothing when the queue is empty.
    #[tracing::instrument(
        level = "debug",
        skip(self),
        fields(requests = self.queue.len(), threads = self.thread_count())
    )]
    pub fn render(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let jobs = clip_queue(&self.queue, &self.transform, self.image.dims());
        let transform = self.transform;

        match &self.pool {
            Some(pool) => {
                let bands = self.image.row_bands_mut(pool.current_num_threads());
                let jobs = &jobs;
                pool.scope(|s| {
                    for mut band in bands {
                        s.spawn(move |_| rasterize_band(&mut band, jobs, &transform));
                    }
                });
            },
            None => {
                for mut band in self.image.row_bands_mut(1) {
                    rasterize_band(&mut band, &jobs, &transform);
                }
            },
        }

        self.queue.clear();
    }

    /// Single-threaded flush, regardless of the pool
    pub fn render_sequential(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let jobs = clip_queue(&self.queue, &self.transform, self.image.dims());
        let transform = self.transform;
        for mut band in self.image.row_bands_mut(1) {
            rasterize_band(&mut band, &jobs, &transform);
        }
        self.queue.clear();
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[inline]
    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    #[inline]
    pub fn image_mut(&mut self) -> &mut PixelBuffer {
        &mut self.image
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    #[inline]
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Overwrite every pixel immediately, bypassing the queue
    pub fn fill(&mut self, color: Color) {
        self.image.fill(color);
    }

    /// Number of queued requests
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn state(&self) -> RenderState {
        if self.queue.is_empty() {
            RenderState::Idle
        } else {
            RenderState::Queued
        }
    }

    /// Worker threads used by [`render`](Self::render)
    pub fn thread_count(&self) -> usize {
        self.pool
            .as_ref()
            .map_or(1, rayon::ThreadPool::current_num_threads)
    }

    /// World-space rectangle covered by the image
    pub fn viewport(&self) -> Rect {
        let dims = self.image.dims();
        self.transform.apply_inverse_rect(&Rect::new(
            Vec2::ZERO,
            Vec2::new(dims.width as f64, dims.height as f64),
        ))
    }

    /// The four edges of [`viewport`](Self::viewport): bottom, right, top, left
    pub fn viewport_box(&self) -> [LineSegment; 4] {
        let Rect { min, max } = self.viewport();
        let (bl, br) = (min, Vec2::new(max.x, min.y));
        let (tr, tl) = (max, Vec2::new(min.x, max.y));
        [
            LineSegment::new(bl, br),
            LineSegment::new(br, tr),
            LineSegment::new(tr, tl),
            LineSegment::new(tl, bl),
        ]
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("dims", &self.image.dims())
            .field("transform", &self.transform)
            .field("pending", &self.queue.len())
            .field("threads", &self.thread_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(width: usize, height: usize, threads: Option<usize>) -> Renderer {
        let image = PixelBuffer::with_size(width, height).unwrap();
        Renderer::with_image(image, Transform::IDENTITY, threads).unwrap()
    }

    fn scene(r: &mut Renderer) {
        r.draw_circle(Circle::new(Vec2::new(6.0, 4.0), 5.0), Color::rgba(200, 40, 40, 180), 1.6);
        r.draw_line_segment(
            LineSegment::new(Vec2::new(-3.0, 1.0), Vec2::new(20.0, 9.0)),
            Color::rgba(20, 220, 90, 120),
            1.5,
            0.5,
        );
        r.draw_fn(
            |p| Color::rgba((p.x * 10.0) as u8, (p.y * 20.0) as u8, 128, 60),
            Rect::new(Vec2::new(2.0, 2.0), Vec2::new(9.0, 6.0)),
        );
        r.draw_circle(Circle::new(Vec2::new(12.0, 2.0), 3.0), Color::rgba(0, 0, 255, 255), 1.0);
    }

    #[test]
    fn empty_queue_is_a_no_op() {
        let mut r = renderer(8, 8, Some(2));
        r.fill(Color::rgb(1, 2, 3));
        let before = r.image().clone();
        assert_eq!(r.state(), RenderState::Idle);
        r.render();
        assert_eq!(r.image(), &before);
    }

    #[test]
    fn off_screen_requests_are_skipped() {
        let mut r = renderer(8, 8, None);
        let before = r.image().clone();
        r.draw_circle(Circle::new(Vec2::new(100.0, 100.0), 2.0), Color::WHITE, 1.0);
        r.draw_fn(|_| Color::WHITE, Rect::new(Vec2::new(-5.0, -5.0), Vec2::new(-1.0, -1.0)));
        assert_eq!(r.state(), RenderState::Queued);
        assert_eq!(r.pending(), 2);
        r.render();
        assert_eq!(r.image(), &before);
        assert_eq!(r.pending(), 0);
    }

    #[test]
    fn clip_limits_to_image_and_integer_pixels() {
        let dims = Dimensions::new(10, 5);
        let region = PixelRegion::clip(&Rect::new(Vec2::new(-3.0, 1.2), Vec2::new(4.0, 40.0)), dims);
        assert_eq!(
            region,
            Some(PixelRegion {
                x0: 0,
                x1: 5,
                y0: 2,
                y1: 5
            })
        );
        // Between two pixel centres: nothing to shade
        assert_eq!(
            PixelRegion::clip(&Rect::new(Vec2::new(3.2, 0.0), Vec2::new(3.8, 4.0)), dims),
            None
        );
        let nan = Vec2::new(f64::NAN, 0.0);
        assert_eq!(PixelRegion::clip(&Rect::new(nan, nan), dims), None);
    }

    #[test]
    fn later_requests_composite_on_top() {
        let mut r = renderer(6, 6, Some(3));
        let circle = Circle::new(Vec2::new(3.0, 3.0), 2.0);
        r.draw_circle(circle, Color::rgb(255, 0, 0), 0.5);
        r.draw_circle(circle, Color::rgb(0, 0, 255), 0.5);
        r.render();
        assert_eq!(r.image()[(3, 3)], Color::rgb(0, 0, 255));
    }

    #[test]
    fn one_pass_equals_two_passes() {
        let first = Circle::new(Vec2::new(4.0, 4.0), 3.0);
        let second = Circle::new(Vec2::new(6.0, 5.0), 3.0);
        let red = Color::rgba(255, 0, 0, 128);
        let green = Color::rgba(0, 255, 0, 100);

        let mut once = renderer(12, 10, Some(4));
        once.draw_circle(first, red, 1.6);
        once.draw_circle(second, green, 1.6);
        once.render();

        let mut twice = renderer(12, 10, Some(4));
        twice.draw_circle(first, red, 1.6);
        twice.render();
        twice.draw_circle(second, green, 1.6);
        twice.render();

        assert_eq!(once.image(), twice.image());
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut reference = renderer(17, 5, Some(1));
        scene(&mut reference);
        reference.render_sequential();

        // 5 rows, so the upper counts give more threads than rows
        for threads in 1..=8 {
            let mut r = renderer(17, 5, Some(threads));
            scene(&mut r);
            r.render();
            assert_eq!(r.image().as_bytes(), reference.image().as_bytes(), "threads={}", threads);
        }
    }

    #[test]
    fn circle_edge_pixels() {
        let mut r = renderer(12, 12, Some(2));
        r.draw_circle(Circle::new(Vec2::new(5.0, 5.0), 3.0), Color::WHITE, 1.0);
        r.render();
        assert_eq!(r.image()[(5, 5)], Color::WHITE);
        // distance 2 = radius - aa: full coverage
        assert_eq!(r.image()[(7, 5)], Color::WHITE);
        // distance 3 = radius: untouched
        assert_eq!(r.image()[(8, 5)], Color::BLACK);
        assert_eq!(r.image()[(5, 9)], Color::BLACK);
    }

    #[test]
    fn polygon_closes_the_loop() {
        let triangle = [Vec2::new(1.0, 1.0), Vec2::new(8.0, 1.0), Vec2::new(1.0, 8.0)];

        let mut open = renderer(10, 10, None);
        open.draw_polyline(&triangle, Color::WHITE, 0.5, 0.25);
        assert_eq!(open.pending(), 2);
        open.render();
        assert_eq!(open.image()[(1, 4)], Color::BLACK);

        let mut closed = renderer(10, 10, None);
        closed.draw_polygon(&triangle, Color::WHITE, 0.5, 0.25);
        assert_eq!(closed.pending(), 3);
        closed.render();
        assert_eq!(closed.image()[(1, 4)], Color::WHITE);
        assert_eq!(closed.image()[(4, 1)], Color::WHITE);
    }

    #[test]
    fn trail_fades_in_toward_the_head() {
        let mut trail = Trail::new(8);
        for x in [1.0, 5.0, 9.0] {
            trail.push_back(Vec2::new(x, 5.0));
        }
        let mut r = renderer(12, 10, None);
        r.fill(Color::TRANSPARENT);
        r.draw_trail(&trail, Color::WHITE, 1.0, 0.5);
        assert_eq!(r.pending(), 2);
        r.render();
        assert_eq!(r.image()[(2, 5)].a, 127);
        assert_eq!(r.image()[(8, 5)], Color::WHITE);
    }

    #[test]
    fn grid_lines_hit_multiples_of_spacing() {
        let mut r = renderer(20, 20, Some(2));
        r.draw_grid(10.0, Color::WHITE);
        r.render();
        assert_eq!(r.image()[(10, 5)], Color::WHITE);
        assert_eq!(r.image()[(5, 10)], Color::WHITE);
        assert_eq!(r.image()[(5, 5)], Color::BLACK);

        let before = r.image().clone();
        r.draw_grid(0.25, Color::rgb(9, 9, 9));
        assert_eq!(r.pending(), 0);
        r.render();
        assert_eq!(r.image(), &before);
    }

    #[test]
    fn grid_far_from_origin_stays_bounded() {
        let image = PixelBuffer::with_size(64, 64).unwrap();
        let far = Transform::new(Vec2::new(-1e17, 0.0), Vec2::splat(1.0));
        let mut r = Renderer::with_image(image, far, None).unwrap();
        r.draw_grid(1.0, Color::WHITE);
        assert!(r.pending() > 0);
        assert!(r.pending() <= 130, "pending={}", r.pending());
    }

    #[test]
    fn line_runs_past_its_defining_points() {
        let mut r = renderer(20, 10, Some(2));
        r.draw_line(
            LineSegment::new(Vec2::new(0.0, 5.0), Vec2::new(1.0, 5.0)),
            Color::WHITE,
            0.5,
            0.25,
        );
        r.render();
        assert_eq!(r.image()[(18, 5)], Color::WHITE);
        assert_eq!(r.image()[(18, 8)], Color::BLACK);
    }

    #[test]
    fn gradient_segment_interpolates_color() {
        let mut r = renderer(16, 10, None);
        r.draw_line_segment_with(
            LineSegment::new(Vec2::new(2.0, 5.0), Vec2::new(12.0, 5.0)),
            |t| Color::rgb((t * 255.0) as u8, 255, 0),
            1.0,
            0.5,
        );
        r.render();
        assert_eq!(r.image()[(2, 5)], Color::rgb(0, 255, 0));
        assert_eq!(r.image()[(7, 5)], Color::rgb(127, 255, 0));
        assert_eq!(r.image()[(12, 5)], Color::rgb(255, 255, 0));
        assert_eq!(r.image()[(14, 5)], Color::BLACK);
        assert_eq!(r.image()[(7, 7)], Color::BLACK);
    }

    #[test]
    fn custom_functions_see_world_coordinates() {
        let image = PixelBuffer::with_size(20, 10).unwrap();
        let mut r = Renderer::with_image(image, Transform::centred(20, 10, 2.0), Some(2)).unwrap();
        r.draw_fn_everywhere(|p| if p.x > 0.0 && p.y > 0.0 { Color::WHITE } else { Color::TRANSPARENT });
        r.render();
        // pixel (15, 2) is world (2.5, 1.5): upper right quadrant
        assert_eq!(r.image()[(15, 2)], Color::WHITE);
        assert_eq!(r.image()[(5, 8)], Color::BLACK);
    }

    #[test]
    fn viewport_follows_transform() {
        let image = PixelBuffer::with_size(200, 100).unwrap();
        let r = Renderer::with_image(image, Transform::centred(200, 100, 10.0), None).unwrap();
        let view = r.viewport();
        assert!(view.min.approx_eq(&Vec2::new(-10.0, -5.0), 1e-12));
        assert!(view.max.approx_eq(&Vec2::new(10.0, 5.0), 1e-12));

        let edges = r.viewport_box();
        assert_eq!(edges[0].p1, view.min);
        assert_eq!(edges[2].p1, view.max);
        assert_eq!(edges[3].p2, edges[0].p1);
    }

    #[test]
    fn thread_count_validation() {
        let image = PixelBuffer::with_size(4, 4).unwrap();
        assert!(matches!(
            Renderer::with_image(image.clone(), Transform::IDENTITY, Some(0)),
            Err(Error::InvalidThreadCount)
        ));
        let single = Renderer::with_image(image.clone(), Transform::IDENTITY, Some(1)).unwrap();
        assert_eq!(single.thread_count(), 1);
        let three = Renderer::with_image(image, Transform::IDENTITY, Some(3)).unwrap();
        assert_eq!(three.thread_count(), 3);
    }

    #[test]
    fn particles_draw_as_circles() {
        let mut r = renderer(10, 10, None);
        let p = Particle::new(Vec2::new(4.0, 4.0), 2.0, 1.0).unwrap();
        r.draw_particle(&p, Color::WHITE, 1.0);
        r.render();
        assert_eq!(r.image()[(4, 4)], Color::WHITE);
        assert_eq!(r.image()[(7, 4)], Color::BLACK);
    }
}
