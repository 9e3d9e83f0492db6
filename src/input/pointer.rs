use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use crate::math::Vec2;

/// Whether the pointer has moved recently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerState {
    Moving,
    Idle,
}

/// One pointer or touch movement, stamped when it happened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pos: Vec2,
    pub at: Instant,
}

/// Cloneable handle for event sources (window events, remote feeds).
/// Samples are whole values, so the tracker never sees a half-written
/// position no matter which thread sent it.
#[derive(Debug, Clone)]
pub struct PointerSender {
    sender: Sender<PointerSample>,
}

impl PointerSender {
    /// Report a move to `(x, y)` happening now
    pub fn moved(&self, x: f32, y: f32) -> bool {
        self.send(PointerSample {
            pos: Vec2::new(x, y),
            at: Instant::now(),
        })
    }

    /// Returns false once the tracker has been dropped
    pub fn send(&self, sample: PointerSample) -> bool {
        self.sender.send(sample).is_ok()
    }
}

/// Pointer position and idleness, fed by `PointerSender`s
pub struct InputTracker {
    receiver: Receiver<PointerSample>,
    sender: Sender<PointerSample>,
    pointer: Vec2,
    last_move: Option<Instant>,
    state: PointerState,
    idle_threshold: Duration,
}

impl InputTracker {
    /// Start idle with the pointer resting at `center`
    pub fn new(center: Vec2, idle_threshold: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            receiver,
            sender,
            pointer: center,
            last_move: None,
            state: PointerState::Idle,
            idle_threshold,
        }
    }

    pub fn sender(&self) -> PointerSender {
        PointerSender {
            sender: self.sender.clone(),
        }
    }

    /// Apply a movement directly. Always switches to Moving.
    pub fn record(&mut self, sample: PointerSample) {
        self.pointer = sample.pos;
        self.last_move = Some(sample.at);
        self.state = PointerState::Moving;
    }

    /// Drain pending samples, then drop to Idle if the last movement is
    /// older than the idle threshold. Called once at the start of a frame.
    pub fn refresh(&mut self, now: Instant) -> PointerState {
        while let Ok(sample) = self.receiver.try_recv() {
            self.record(sample);
        }

        if let Some(last) = self.last_move {
            if self.state == PointerState::Moving
                && now.saturating_duration_since(last) > self.idle_threshold
            {
                self.state = PointerState::Idle;
            }
        }
        self.state
    }

    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    #[inline]
    pub fn state(&self) -> PointerState {
        self.state
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.state == PointerState::Moving
    }
}
