//! Glowing particle field
//!
//! Particles chase the pointer while it moves and settle into a loose,
//! wobbling grid once it rests. Each one is painted as a dark-edged glow
//! with a bright core, over a half-faded copy of the previous frame.

use std::time::{Duration, Instant};

use super::Effect;
use crate::config::FieldConfig;
use crate::display::{GradientStop, PixelBuffer};
use crate::input::{InputTracker, PointerSender, PointerState};
use crate::math::Vec2;
use crate::particles::{Particle, ParticleStore};
use crate::physics::{self, StepContext};
use crate::sizing::SizingPolicy;
use crate::util::{brighten, scale_color, Rng};

/// Blue-violet, magenta, purple, white
pub const PALETTE: [(u8, u8, u8); 4] = [(38, 26, 204), (250, 77, 230), (140, 64, 217), (255, 255, 255)];

const GLOW_SCALE: f32 = 2.0;
const GLOW_MID_OFFSET: f32 = 0.6;
const GLOW_MID_BRIGHTNESS: f32 = 0.3;
const CORE_SCALE: f32 = 0.8;
const CORE_BRIGHTEN: u8 = 30;

/// Palette entry for a particle's fixed color selector
#[inline]
pub fn palette_color(selector: f32) -> (u8, u8, u8) {
    let idx = (selector * PALETTE.len() as f32).floor() as usize;
    PALETTE[idx.min(PALETTE.len() - 1)]
}

/// Paint one particle: glow fading to black, then a brightened core
pub fn draw_particle(buffer: &mut PixelBuffer, p: &Particle) {
    let radius = p.size() * p.pulse();
    let color = palette_color(p.color());

    // fading to black rather than transparent keeps overlaps from graying out
    let stops: [GradientStop; 3] = [
        (0.0, color),
        (GLOW_MID_OFFSET, scale_color(color, GLOW_MID_BRIGHTNESS)),
        (1.0, (0, 0, 0)),
    ];
    buffer.fill_circle_radial(p.pos.x, p.pos.y, radius * GLOW_SCALE, &stops);

    let (r, g, b) = brighten(color, CORE_BRIGHTEN);
    buffer.fill_circle(p.pos.x, p.pos.y, radius * CORE_SCALE, r, g, b);
}

/// The whole simulation state for one view
pub struct ParticleField {
    store: ParticleStore,
    input: InputTracker,
    rng: Rng,
    policy: SizingPolicy,
    max_particles: Option<usize>,
    trail_opacity: f32,
    width: u32,
    height: u32,
    last_state: PointerState,
}

impl ParticleField {
    /// Seed a population for a `width` x `height` viewport
    pub fn new(config: &FieldConfig, width: u32, height: u32) -> Self {
        let mut rng = config.seed.map_or_else(Rng::from_clock, Rng::new);
        let policy = SizingPolicy::for_width(width, config.max_particles);
        let store = ParticleStore::seeded(policy.count, width as f32, height as f32, &mut rng);
        let center = Vec2::new(width as f32 / 2.0, height as f32 / 2.0);

        log::info!(
            "Particle field {}x{}: {} particles, repulsion radius {}",
            width,
            height,
            policy.count,
            policy.repulsion.radius
        );

        Self {
            store,
            input: InputTracker::new(center, Duration::from_millis(config.idle_threshold_ms)),
            rng,
            policy,
            max_particles: config.max_particles,
            trail_opacity: config.trail_opacity,
            width,
            height,
            last_state: PointerState::Idle,
        }
    }

    /// Handle for pointer and touch sources
    pub fn pointer_sender(&self) -> PointerSender {
        self.input.sender()
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.store
    }

    pub fn pointer_state(&self) -> PointerState {
        self.input.state()
    }

    /// Re-evaluate the sizing policy for a new viewport. Particles are
    /// appended or truncated; the ones that stay are not touched.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let policy = SizingPolicy::for_width(width, self.max_particles);
        if policy != self.policy {
            log::info!(
                "Viewport {}x{}: {} -> {} particles",
                width,
                height,
                self.store.len(),
                policy.count
            );
        }
        self.policy = policy;
        self.store
            .resize_to(policy.count, width as f32, height as f32, &mut self.rng);
    }

    fn step_context(&self, time: f32) -> StepContext {
        StepContext {
            width: self.width as f32,
            height: self.height as f32,
            time,
            pointer: self.input.is_moving().then(|| self.input.pointer()),
            repulsion: self.policy.repulsion,
        }
    }
}

impl Effect for ParticleField {
    fn update(&mut self, time: f32, width: u32, height: u32, now: Instant) {
        if width != self.width || height != self.height {
            self.resize(width, height);
        }

        let state = self.input.refresh(now);
        if state != self.last_state {
            log::debug!("Pointer {:?}", state);
            self.last_state = state;
        }

        let ctx = self.step_context(time);
        physics::step(self.store.as_mut_slice(), &ctx, &mut self.rng);
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        buffer.darken(self.trail_opacity);
        for p in self.store.iter() {
            draw_particle(buffer, p);
        }
    }

    fn name(&self) -> &str {
        "particle field"
    }
}
