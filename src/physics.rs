//! Per-frame physics for the glow field
//!
//! One explicit Euler step per frame with a fixed unit timestep. Particles
//! are updated in place and in store order, so later particles see the
//! already-moved positions of earlier ones during repulsion.

use crate::math::Vec2;
use crate::particles::Particle;
use crate::sizing::RepulsionMode;
use crate::util::Rng;

// Pointer attraction
const ATTRACT_MIN_DIST: f32 = 30.0;
const ATTRACT_GAIN: f32 = 0.0015;
const ATTRACT_MAX: f32 = 0.8;
const DRIFT: f32 = 0.075;

// Idle grid dispersion
const GRID_SPAN: f32 = 0.9;
const GRID_MARGIN: f32 = 0.05;
const GRID_WOBBLE: f32 = 30.0;
const GRID_SNAP_DIST: f32 = 10.0;
const GRID_PULL: f32 = 0.08;
const FLOAT_AMPLITUDE: f32 = 0.06;
const FLUTTER: f32 = 0.05;

pub const DAMPING: f32 = 0.95;

// Soft walls
pub const WALL_MARGIN: f32 = 50.0;
const WALL_PUSH: f32 = 0.5;
const BOUNCE: f32 = 0.8;

pub const PHASE_STEP: f32 = 0.02;

/// Everything a frame's step reads besides the particles themselves
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    pub width: f32,
    pub height: f32,
    /// Accumulated simulation time
    pub time: f32,
    /// Pointer position while it is moving, `None` once idle
    pub pointer: Option<Vec2>,
    pub repulsion: RepulsionMode,
}

/// Advance every particle by one frame
pub fn step(particles: &mut [Particle], ctx: &StepContext, rng: &mut Rng) {
    let count = particles.len();
    for i in 0..count {
        apply_repulsion(particles, i, &ctx.repulsion);

        let p = &mut particles[i];
        match ctx.pointer {
            Some(pointer) => attract_to_pointer(p, pointer, rng),
            None => drift_to_grid(p, i, count, ctx, rng),
        }

        damp_and_integrate(p);
        contain(p, ctx.width, ctx.height);
        p.phase += PHASE_STEP;
    }
}

/// Push particle `i` away from its close neighbors.
/// Stops after `mode.max_neighbors` repulsions have been applied.
pub fn apply_repulsion(particles: &mut [Particle], i: usize, mode: &RepulsionMode) {
    let push = repulsion_force(particles, i, mode);
    particles[i].vel += push;
}

pub fn repulsion_force(particles: &[Particle], i: usize, mode: &RepulsionMode) -> Vec2 {
    let pos = particles[i].pos;
    let radius_sq = mode.radius * mode.radius;
    let mut force = Vec2::ZERO;
    let mut applied = 0;

    for (j, other) in particles.iter().enumerate() {
        if applied >= mode.max_neighbors {
            break;
        }
        if j == i {
            continue;
        }
        let offset = pos - other.pos;
        let dist_sq = offset.length_squared();
        // coincident particles have no direction to push along
        if dist_sq == 0.0 || dist_sq >= radius_sq {
            continue;
        }
        let dist = dist_sq.sqrt();
        force += offset * ((mode.radius - dist) * mode.strength / dist);
        applied += 1;
    }
    force
}

/// Pull toward the moving pointer, plus a little random drift
pub fn attract_to_pointer(p: &mut Particle, pointer: Vec2, rng: &mut Rng) {
    let offset = pointer - p.pos;
    let dist = offset.length();
    if dist > ATTRACT_MIN_DIST {
        let force = (dist * ATTRACT_GAIN).min(ATTRACT_MAX);
        p.vel += offset * (force / dist);
    }
    p.vel.x += rng.jitter(DRIFT);
    p.vel.y += rng.jitter(DRIFT);
}

/// Where particle `i` of `count` rests while the pointer is idle.
/// Deterministic in all of its inputs.
pub fn idle_target(i: usize, count: usize, width: f32, height: f32, time: f32) -> Vec2 {
    let grid = (count as f32).sqrt().ceil().max(1.0) as usize;
    let cell_x = (i % grid) as f32 / grid as f32;
    let cell_y = (i / grid) as f32 / grid as f32;
    let fi = i as f32;

    Vec2::new(
        cell_x * width * GRID_SPAN + width * GRID_MARGIN + (time * 0.3 + fi).sin() * GRID_WOBBLE,
        cell_y * height * GRID_SPAN + height * GRID_MARGIN + (time * 0.25 + fi).cos() * GRID_WOBBLE,
    )
}

/// Idle behavior: ease toward the grid slot, float, and flutter
pub fn drift_to_grid(p: &mut Particle, i: usize, count: usize, ctx: &StepContext, rng: &mut Rng) {
    let target = idle_target(i, count, ctx.width, ctx.height, ctx.time);
    let offset = target - p.pos;
    let dist = offset.length();
    if dist > GRID_SNAP_DIST {
        p.vel += offset * (GRID_PULL / dist);
    }

    let fi = i as f32;
    p.vel.x += (ctx.time * 2.0 + fi * 0.3).sin() * FLOAT_AMPLITUDE;
    p.vel.y += (ctx.time * 1.5 + fi * 0.4).cos() * FLOAT_AMPLITUDE;

    p.vel.x += rng.jitter(FLUTTER);
    p.vel.y += rng.jitter(FLUTTER);
}

#[inline]
pub fn damp_and_integrate(p: &mut Particle) {
    p.vel *= DAMPING;
    p.pos += p.vel;
}

/// Soft walls near each edge, hard bounce past it
pub fn contain(p: &mut Particle, width: f32, height: f32) {
    contain_axis(&mut p.pos.x, &mut p.vel.x, width);
    contain_axis(&mut p.pos.y, &mut p.vel.y, height);
}

fn contain_axis(pos: &mut f32, vel: &mut f32, extent: f32) {
    if *pos < WALL_MARGIN {
        *vel += (WALL_MARGIN - *pos) / WALL_MARGIN * WALL_PUSH;
        bounce_low(pos, vel);
    }
    if *pos > extent - WALL_MARGIN {
        *vel -= (*pos - (extent - WALL_MARGIN)) / WALL_MARGIN * WALL_PUSH;
        bounce_high(pos, vel, extent);
    }
}

/// Clamp at 0, reversing and damping the velocity
#[inline]
pub fn bounce_low(pos: &mut f32, vel: &mut f32) {
    if *pos < 0.0 {
        *pos = 0.0;
        *vel *= -BOUNCE;
    }
}

/// Clamp at `extent`, reversing and damping the velocity
#[inline]
pub fn bounce_high(pos: &mut f32, vel: &mut f32, extent: f32) {
    if *pos > extent {
        *pos = extent;
        *vel *= -BOUNCE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::ParticleStore;

    fn at(x: f32, y: f32) -> Particle {
        Particle::new(Vec2::new(x, y), 4.0, 0.5, 0.0)
    }

    fn ctx(pointer: Option<Vec2>, time: f32) -> StepContext {
        StepContext {
            width: 800.0,
            height: 600.0,
            time,
            pointer,
            repulsion: RepulsionMode::DESKTOP,
        }
    }

    #[test]
    fn test_close_pair_repels_far_particle_untouched() {
        // repulsion pass only; the soft walls at (0, 0) would swamp its direction
        let mut particles = vec![at(0.0, 0.0), at(5.0, 5.0), at(100.0, 100.0)];
        for i in 0..particles.len() {
            apply_repulsion(&mut particles, i, &RepulsionMode::DESKTOP);
        }

        let v0 = particles[0].vel;
        let v1 = particles[1].vel;
        assert!(v0.x < 0.0 && v0.y < 0.0, "particle 0 should move away: {:?}", v0);
        assert!(v1.x > 0.0 && v1.y > 0.0, "particle 1 should move away: {:?}", v1);
        assert!(v0.approx_eq(&-v1, 1e-6));
        assert_eq!(particles[2].vel, Vec2::ZERO);

        // (40 - 7.071) * 0.008 along the diagonal
        let expected = (40.0 - 50f32.sqrt()) * 0.008;
        assert!((v1.length() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_particles_skip_each_other() {
        let mut particles = vec![at(10.0, 10.0), at(10.0, 10.0)];
        apply_repulsion(&mut particles, 0, &RepulsionMode::DESKTOP);
        assert_eq!(particles[0].vel, Vec2::ZERO);
        assert!(particles[0].vel.is_finite());
    }

    #[test]
    fn test_neighbor_cap_truncates() {
        // particle 0 at origin, 20 neighbors at distinct distances inside the radius
        let mut particles = vec![at(100.0, 100.0)];
        for k in 0..20 {
            particles.push(at(101.0 + k as f32, 100.0));
        }
        let mode = RepulsionMode::MOBILE;
        let capped = repulsion_force(&particles, 0, &mode);

        let mut first_five = 0.0;
        for k in 0..5 {
            let dist = 1.0 + k as f32;
            first_five -= mode.radius - dist;
        }
        first_five *= mode.strength;
        assert!((capped.x - first_five).abs() < 1e-5);
        assert_eq!(capped.y, 0.0);

        let uncapped = repulsion_force(
            &particles,
            0,
            &RepulsionMode {
                max_neighbors: usize::MAX,
                ..mode
            },
        );
        assert!(uncapped.x < capped.x);
    }

    #[test]
    fn test_damping_decays_geometrically() {
        let mut p = at(400.0, 300.0);
        p.vel = Vec2::new(3.0, -4.0);
        let mut prev = p.vel.length();
        for _ in 0..200 {
            damp_and_integrate(&mut p);
            let speed = p.vel.length();
            assert!(speed < prev);
            assert!((speed - prev * DAMPING).abs() < 1e-4);
            prev = speed;
        }
        assert!(prev < 1e-3);
    }

    #[test]
    fn test_bounce_left_edge() {
        let (mut x, mut vx) = (-3.0, -5.0);
        bounce_low(&mut x, &mut vx);
        assert_eq!(x, 0.0);
        assert_eq!(vx, 4.0);
    }

    #[test]
    fn test_bounce_right_edge() {
        let (mut x, mut vx) = (805.0, 10.0);
        bounce_high(&mut x, &mut vx, 800.0);
        assert_eq!(x, 800.0);
        assert_eq!(vx, -8.0);
    }

    #[test]
    fn test_corner_clamps_both_axes() {
        let mut p = at(-10.0, 610.0);
        p.vel = Vec2::new(-2.0, 3.0);
        contain(&mut p, 800.0, 600.0);
        assert_eq!(p.pos, Vec2::new(0.0, 600.0));
        assert!(p.vel.x > 0.0);
        assert!(p.vel.y < 0.0);
    }

    #[test]
    fn test_soft_wall_pushes_inward() {
        let mut p = at(25.0, 300.0);
        contain(&mut p, 800.0, 600.0);
        assert_eq!(p.pos.x, 25.0);
        assert!((p.vel.x - 0.25).abs() < 1e-6);
        assert_eq!(p.vel.y, 0.0);
    }

    #[test]
    fn test_idle_target_is_deterministic() {
        for i in 0..50 {
            let a = idle_target(i, 50, 1280.0, 720.0, 3.2);
            let b = idle_target(i, 50, 1280.0, 720.0, 3.2);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_idle_target_grid_layout() {
        // 9 particles -> 3x3 grid; at time 0 the wobble is sin(i), cos(i)
        let t = idle_target(4, 9, 900.0, 600.0, 0.0);
        let expected = Vec2::new(
            (1.0 / 3.0) * 900.0 * 0.9 + 45.0 + 4f32.sin() * 30.0,
            (1.0 / 3.0) * 600.0 * 0.9 + 30.0 + 4f32.cos() * 30.0,
        );
        assert!(t.approx_eq(&expected, 1e-3));
    }

    fn float_term(i: usize, time: f32) -> Vec2 {
        let fi = i as f32;
        Vec2::new(
            (time * 2.0 + fi * 0.3).sin() * FLOAT_AMPLITUDE,
            (time * 1.5 + fi * 0.4).cos() * FLOAT_AMPLITUDE,
        )
    }

    #[test]
    fn test_float_term_value() {
        // i = 2, t = 1: sin(2.6) and cos(2.3)
        let mut rng = Rng::new(3);
        let c = ctx(None, 1.0);
        let mut p = at(0.0, 0.0);
        p.pos = idle_target(2, 4, c.width, c.height, c.time);
        drift_to_grid(&mut p, 2, 4, &c, &mut rng);

        assert!((p.vel.x - 2.6f32.sin() * 0.06).abs() <= FLUTTER);
        assert!((p.vel.y - 2.3f32.cos() * 0.06).abs() <= FLUTTER);
        assert!((float_term(2, 1.0).x - 0.030930).abs() < 1e-4);
        assert!((float_term(2, 1.0).y + 0.039977).abs() < 1e-4);
    }

    #[test]
    fn test_far_from_grid_pulls_toward_target() {
        let c = ctx(None, 1.0);
        let target = idle_target(0, 4, c.width, c.height, c.time);
        for seed in 1..20 {
            let mut rng = Rng::new(seed);
            let mut p = at(700.0, 500.0);
            drift_to_grid(&mut p, 0, 4, &c, &mut rng);

            let pull = p.vel - float_term(0, c.time);
            let toward = target - Vec2::new(700.0, 500.0);
            let expected = toward * (GRID_PULL / toward.length());
            assert!((pull.x - expected.x).abs() <= FLUTTER, "{:?} vs {:?}", pull, expected);
            assert!((pull.y - expected.y).abs() <= FLUTTER, "{:?} vs {:?}", pull, expected);
        }
    }

    #[test]
    fn test_pull_magnitude_independent_of_distance() {
        let c = ctx(None, 0.5);
        let target = idle_target(1, 9, c.width, c.height, c.time);
        let offsets = [Vec2::new(15.0, 0.0), Vec2::new(-300.0, 200.0), Vec2::new(0.0, -120.0)];
        for offset in offsets {
            let mut rng = Rng::new(8);
            let mut p = at(0.0, 0.0);
            p.pos = target + offset;
            drift_to_grid(&mut p, 1, 9, &c, &mut rng);

            let pull = p.vel - float_term(1, c.time);
            let dir = offset * (-1.0 / offset.length());
            // component along the pull direction: 0.08 plus at most the flutter
            let along = pull.x * dir.x + pull.y * dir.y;
            assert!(along > 0.0);
            assert!((along - GRID_PULL).abs() <= FLUTTER * 2f32.sqrt(), "along = {}", along);
        }
    }

    #[test]
    fn test_within_snap_distance_no_pull() {
        let c = ctx(None, 2.0);
        let target = idle_target(3, 16, c.width, c.height, c.time);
        for seed in 1..20 {
            let mut rng = Rng::new(seed);
            let mut p = at(0.0, 0.0);
            p.pos = target + Vec2::new(6.0, -7.0);
            drift_to_grid(&mut p, 3, 16, &c, &mut rng);

            let rest = p.vel - float_term(3, c.time);
            assert!(rest.x.abs() <= FLUTTER && rest.y.abs() <= FLUTTER, "{:?}", rest);
        }
    }

    #[test]
    fn test_attraction_capped() {
        let mut rng = Rng::new(11);
        let mut p = at(0.0, 300.0);
        attract_to_pointer(&mut p, Vec2::new(2000.0, 300.0), &mut rng);
        // 2000 * 0.0015 = 3.0, capped at 0.8, plus drift
        assert!((p.vel.x - ATTRACT_MAX).abs() <= DRIFT);
        assert!(p.vel.y.abs() <= DRIFT);
    }

    #[test]
    fn test_near_pointer_only_drifts() {
        let mut rng = Rng::new(12);
        let mut p = at(100.0, 100.0);
        attract_to_pointer(&mut p, Vec2::new(110.0, 110.0), &mut rng);
        assert!(p.vel.x.abs() <= DRIFT && p.vel.y.abs() <= DRIFT);
    }

    #[test]
    fn test_step_invariants_hold_over_many_frames() {
        let mut rng = Rng::new(1234);
        let mut store = ParticleStore::seeded(60, 800.0, 600.0, &mut rng);
        let fixed: Vec<(f32, f32, f32)> = store
            .iter()
            .map(|p| (p.size(), p.color(), p.initial_phase()))
            .collect();
        let initial_phase: Vec<f32> = store.iter().map(|p| p.phase).collect();

        let mut time = 0.0;
        let frames = 600;
        for frame in 0..frames {
            time += 0.016;
            // alternate between chasing a corner and idling
            let pointer = if (frame / 100) % 2 == 0 {
                Some(Vec2::new(790.0, 5.0))
            } else {
                None
            };
            step(store.as_mut_slice(), &ctx(pointer, time), &mut rng);

            for p in store.iter() {
                assert!(p.pos.is_finite() && p.vel.is_finite());
                assert!(p.pos.x >= 0.0 && p.pos.x <= 800.0, "x out of bounds: {}", p.pos.x);
                assert!(p.pos.y >= 0.0 && p.pos.y <= 600.0, "y out of bounds: {}", p.pos.y);
            }
        }

        for ((p, fixed), phase0) in store.iter().zip(&fixed).zip(&initial_phase) {
            assert_eq!((p.size(), p.color(), p.initial_phase()), *fixed);
            let expected = phase0 + PHASE_STEP * frames as f32;
            assert!((p.phase - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_step_reproducible_with_same_seed() {
        let run = || {
            let mut rng = Rng::new(77);
            let mut store = ParticleStore::seeded(24, 480.0, 800.0, &mut rng);
            let mut time = 0.0;
            for _ in 0..100 {
                time += 0.016;
                let c = StepContext {
                    width: 480.0,
                    height: 800.0,
                    time,
                    pointer: None,
                    repulsion: RepulsionMode::MOBILE,
                };
                step(store.as_mut_slice(), &c, &mut rng);
            }
            store.as_slice().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_step_on_empty_store() {
        let mut rng = Rng::new(5);
        let mut particles: Vec<Particle> = Vec::new();
        step(&mut particles, &ctx(None, 0.016), &mut rng);
        assert!(particles.is_empty());
    }
}
