//! Shared utilities

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::math::{Rect, Vec2};

/// Small deterministic RNG (xorshift64), enough to scatter particles reproducibly
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the zero state
        Self { state: seed.max(1) }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform in [0, 1)
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [min, max)
    #[inline]
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform point inside `rect`
    pub fn vector_in(&mut self, rect: &Rect) -> Vec2 {
        Vec2::new(
            self.range_f64(rect.min.x, rect.max.x),
            self.range_f64(rect.min.y, rect.max.y),
        )
    }
}

// ============================================================================
// Frame timing
// ============================================================================

/// Rolling frame-time window
#[derive(Debug)]
pub struct FpsCounter {
    frame_times: VecDeque<Duration>,
    last_frame: Instant,
    sample_count: usize,
    total_frames: u64,
}

impl FpsCounter {
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count: sample_count.max(1),
            total_frames: 0,
        }
    }

    /// Mark the end of a frame. Returns the time since the previous tick.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;
        self.record(dt);
        dt
    }

    /// Add a measured frame time directly
    pub fn record(&mut self, dt: Duration) {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
        self.total_frames += 1;
    }

    /// Mean of the window, in milliseconds
    pub fn avg_frame_time_ms(&self) -> f64 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.frame_times.iter().sum();
        total.as_secs_f64() * 1000.0 / self.frame_times.len() as f64
    }

    pub fn avg_fps(&self) -> f64 {
        let ms = self.avg_frame_time_ms();
        if ms > 0.0 {
            1000.0 / ms
        } else {
            0.0
        }
    }

    /// Frames recorded since creation, not just in the window
    pub fn frame_count(&self) -> u64 {
        self.total_frames
    }
}
