mod particle_field;

pub use particle_field::ParticleField;

use std::time::Instant;

use crate::display::PixelBuffer;

/// Anything the frame scheduler can drive
pub trait Effect {
    /// Update effect state (called each frame)
    /// - time: accumulated simulation time
    /// - width/height: canvas dimensions this frame
    /// - now: wall clock, for input idleness
    fn update(&mut self, time: f32, width: u32, height: u32, now: Instant);

    /// Render effect to the pixel buffer
    fn render(&self, buffer: &mut PixelBuffer);

    /// Effect name for logging
    fn name(&self) -> &str;
}
