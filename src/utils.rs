use crate::config::Bounds;
use crate::constants::MAX_AXIS_SPEED;
use glam::{IVec2, Vec2};
use rand::Rng;

// --- Helper Functions ---

/// Maps `value` in `[0, dimension]` onto `[-1, 1]`.
#[inline]
pub fn normalize(value: i32, dimension: i32) -> f32 {
    2.0 * value as f32 / dimension as f32 - 1.0
}

#[inline]
pub fn normalize_position(position: IVec2, bounds: Bounds) -> Vec2 {
    Vec2::new(
        normalize(position.x, bounds.width),
        normalize(position.y, bounds.height),
    )
}

pub fn random_position<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds) -> IVec2 {
    let min = bounds.min();
    let max = bounds.max();
    IVec2::new(rng.gen_range(min.x..=max.x), rng.gen_range(min.y..=max.y))
}

// Each axis gets a magnitude in 1..=MAX_AXIS_SPEED and an independent sign
pub fn random_velocity<R: Rng + ?Sized>(rng: &mut R) -> IVec2 {
    let mut axis = || {
        let speed = rng.gen_range(1..=MAX_AXIS_SPEED);
        if rng.gen_bool(0.5) { speed } else { -speed }
    };
    let x = axis();
    let y = axis();
    IVec2::new(x, y)
}
