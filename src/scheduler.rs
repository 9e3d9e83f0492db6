//! Frame scheduler
//!
//! Drives an effect once per presented frame until cancelled. Presenting
//! blocks on vsync, which keys the loop to the display refresh. Time
//! advances by a fixed step per frame regardless of how long the frame
//! actually took.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::display::PixelBuffer;
use crate::effects::Effect;
use crate::error::Result;

/// Something frames are drawn into and shown on
pub trait Surface {
    fn canvas(&mut self) -> &mut PixelBuffer;

    /// Show the canvas. An error means the surface is gone for good.
    fn present(&mut self) -> Result<()>;
}

/// Shared stop flag. Cancelling from any clone stops the scheduler before
/// its next frame.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

pub struct FrameScheduler {
    time: f32,
    time_step: f32,
    frames: u64,
    cancel: CancelHandle,
}

impl FrameScheduler {
    pub fn new(time_step: f32) -> Self {
        Self {
            time: 0.0,
            time_step,
            frames: 0,
            cancel: CancelHandle::new(),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Frames presented so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance time, update and render the effect, then present.
    /// Returns Ok(false) without touching anything once cancelled. A
    /// present failure cancels the scheduler and is returned.
    pub fn run_frame<S: Surface + ?Sized>(
        &mut self,
        effect: &mut dyn Effect,
        surface: &mut S,
        now: Instant,
    ) -> Result<bool> {
        if !self.is_running() {
            return Ok(false);
        }

        self.time += self.time_step;
        let canvas = surface.canvas();
        let (width, height) = (canvas.width(), canvas.height());
        effect.update(self.time, width, height, now);
        effect.render(surface.canvas());

        if let Err(e) = surface.present() {
            self.cancel.cancel();
            return Err(e);
        }
        self.frames += 1;
        Ok(true)
    }

    /// Run frames until cancelled. `before_frame` runs ahead of every
    /// frame, between frames, and is where input and resizes get applied.
    pub fn run<S: Surface>(
        &mut self,
        effect: &mut dyn Effect,
        surface: &mut S,
        mut before_frame: impl FnMut(&mut S) -> Result<()>,
    ) -> Result<()> {
        log::info!("Running '{}'", effect.name());
        while self.is_running() {
            before_frame(surface)?;
            self.run_frame(effect, surface, Instant::now())?;
        }
        log::info!(
            "'{}' stopped after {} frames ({:.1}s simulated)",
            effect.name(),
            self.frames,
            self.time
        );
        Ok(())
    }
}
