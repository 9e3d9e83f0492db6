//! Shared utilities

use std::time::{SystemTime, UNIX_EPOCH};

/// Simple deterministic RNG using xorshift64
/// Seeded explicitly so simulation runs can be reproduced in tests
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) } // Ensure non-zero
    }

    /// Seed from the wall clock, for runs that don't ask for reproducibility
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5EED_F1E1D);
        Self::new(nanos ^ 0x9E37_79B9_7F4A_7C15)
    }

    /// Get the next random u64
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Get a random f32 in [0, 1)
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() & 0xFFFFFF) as f32 / 0x1000000 as f32
    }

    /// Get a random f32 in [min, max)
    #[inline]
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform noise in [-amplitude, amplitude)
    #[inline]
    pub fn jitter(&mut self, amplitude: f32) -> f32 {
        self.range_f32(-amplitude, amplitude)
    }
}

/// Scale every channel, truncating toward zero
#[inline]
pub fn scale_color(c: (u8, u8, u8), factor: f32) -> (u8, u8, u8) {
    (
        (c.0 as f32 * factor).floor() as u8,
        (c.1 as f32 * factor).floor() as u8,
        (c.2 as f32 * factor).floor() as u8,
    )
}

/// Add a constant to every channel, clamped to 255
#[inline]
pub fn brighten(c: (u8, u8, u8), amount: u8) -> (u8, u8, u8) {
    (
        c.0.saturating_add(amount),
        c.1.saturating_add(amount),
        c.2.saturating_add(amount),
    )
}

/// Linear interpolation between two colors
#[inline]
pub fn lerp_color(c1: (u8, u8, u8), c2: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    (
        (c1.0 as f32 + (c2.0 as f32 - c1.0 as f32) * t) as u8,
        (c1.1 as f32 + (c2.1 as f32 - c1.1 as f32) * t) as u8,
        (c1.2 as f32 + (c2.2 as f32 - c1.2 as f32) * t) as u8,
    )
}

// ============================================================================
// FPS Counter
// ============================================================================

use std::collections::VecDeque;
use std::time::Instant;

/// FPS counter with rolling average
pub struct FpsCounter {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
}

impl FpsCounter {
    /// Create a new FPS counter with specified sample window
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count,
        }
    }

    /// Call once per frame to record timing
    /// Returns (delta_time, average_fps)
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt)
    }

    fn record(&mut self, dt: f32) -> (f32, f32) {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }

        let avg_dt = self.avg_dt();
        let avg_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
        (dt, avg_fps)
    }

    fn avg_dt(&self) -> f32 {
        self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32
    }

    /// Get the average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_dt() * 1000.0
    }

    /// Get min/max FPS from sample window
    pub fn min_max_fps(&self) -> (f32, f32) {
        if self.frame_times.is_empty() {
            return (0.0, 0.0);
        }
        let min_dt = self
            .frame_times
            .iter()
            .cloned()
            .fold(f32::INFINITY, f32::min);
        let max_dt = self.frame_times.iter().cloned().fold(0.0, f32::max);
        let max_fps = if min_dt > 0.0 { 1.0 / min_dt } else { 0.0 };
        let min_fps = if max_dt > 0.0 { 1.0 / max_dt } else { 0.0 };
        (min_fps, max_fps)
    }
}
