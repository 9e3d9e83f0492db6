//! Responsive sizing policy
//!
//! Maps the viewport width to a particle count and to the neighbor
//! repulsion settings. Narrow viewports are treated as low-power devices.

/// Widths at or below this are treated as mobile
pub const MOBILE_MAX_WIDTH: u32 = 768;

/// (max width inclusive, particle count), checked in order
const COUNT_TIERS: [(u32, usize); 3] = [(480, 24), (768, 48), (1024, 60)];
const WIDE_COUNT: usize = 960;

/// Neighbor repulsion settings for one device class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepulsionMode {
    /// Neighbors closer than this push each other apart
    pub radius: f32,
    pub strength: f32,
    /// Repulsions applied per particle per frame before the scan stops.
    /// Undercounts dense clusters on purpose to bound frame cost.
    pub max_neighbors: usize,
}

impl RepulsionMode {
    pub const MOBILE: Self = Self {
        radius: 30.0,
        strength: 0.006,
        max_neighbors: 5,
    };

    pub const DESKTOP: Self = Self {
        radius: 40.0,
        strength: 0.008,
        max_neighbors: 10,
    };
}

/// Particle count for a viewport of the given width
pub fn target_count(width: u32) -> usize {
    COUNT_TIERS
        .iter()
        .find(|(max_width, _)| width <= *max_width)
        .map_or(WIDE_COUNT, |&(_, count)| count)
}

#[inline]
pub fn is_mobile(width: u32) -> bool {
    width <= MOBILE_MAX_WIDTH
}

pub fn repulsion_mode(width: u32) -> RepulsionMode {
    if is_mobile(width) {
        RepulsionMode::MOBILE
    } else {
        RepulsionMode::DESKTOP
    }
}

/// Everything the policy decides for one viewport width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingPolicy {
    pub count: usize,
    pub repulsion: RepulsionMode,
}

impl SizingPolicy {
    /// Evaluate for `width`, optionally clamped to `max_particles`
    pub fn for_width(width: u32, max_particles: Option<usize>) -> Self {
        let count = target_count(width);
        Self {
            count: max_particles.map_or(count, |max| count.min(max)),
            repulsion: repulsion_mode(width),
        }
    }
}
