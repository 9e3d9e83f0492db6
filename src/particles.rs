//! Particle store for the glow field
//!
//! Holds the live particles in a stable order. Index matters: the idle grid
//! assigns each particle a cell by its position in the store, so resizing
//! only ever appends or truncates.

use std::f32::consts::TAU;

use crate::math::Vec2;
use crate::util::Rng;

/// Base radius range for new particles, [min, max)
pub const MIN_SIZE: f32 = 2.0;
pub const MAX_SIZE: f32 = 6.0;

/// A single particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    size: f32,
    color: f32,
    initial_phase: f32,
    pub phase: f32,
}

impl Particle {
    pub fn new(pos: Vec2, size: f32, color: f32, phase: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            color,
            initial_phase: phase,
            phase,
        }
    }

    /// A particle at rest somewhere inside `width` x `height`
    pub fn random(rng: &mut Rng, width: f32, height: f32) -> Self {
        let pos = Vec2::new(rng.next_f32() * width, rng.next_f32() * height);
        let size = rng.range_f32(MIN_SIZE, MAX_SIZE);
        let color = rng.next_f32();
        let phase = rng.next_f32() * TAU;
        Self::new(pos, size, color, phase)
    }

    /// Base radius, fixed at creation
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Palette selector in [0, 1), fixed at creation
    #[inline]
    pub fn color(&self) -> f32 {
        self.color
    }

    /// Phase offset the particle was born with
    #[inline]
    pub fn initial_phase(&self) -> f32 {
        self.initial_phase
    }

    /// Size multiplier driven by the phase, in [0.6, 1.0]
    #[inline]
    pub fn pulse(&self) -> f32 {
        0.8 + self.phase.sin() * 0.2
    }
}

/// Ordered, index-stable particle collection
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
        }
    }

    /// Seed a fresh population of `count` particles inside the viewport
    pub fn seeded(count: usize, width: f32, height: f32, rng: &mut Rng) -> Self {
        let mut store = Self::new();
        store.resize_to(count, width, height, rng);
        store
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Grow or shrink to exactly `n` particles.
    /// Retained particles are left untouched; new ones are randomized
    /// within the current viewport.
    pub fn resize_to(&mut self, n: usize, width: f32, height: f32, rng: &mut Rng) {
        if n <= self.particles.len() {
            self.particles.truncate(n);
            return;
        }
        self.particles.reserve(n - self.particles.len());
        while self.particles.len() < n {
            self.particles.push(Particle::random(rng, width, height));
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }
}
