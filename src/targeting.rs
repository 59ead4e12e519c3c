//! Hitscan target resolution along an aim ray.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::enemy::Enemy;

/// Cone half-width in radians for ordinary shots.
pub const DEFAULT_CONE: f32 = 0.1;
/// Narrower cone used by the railgun.
pub const RAILGUN_CONE: f32 = 0.05;

/// Absolute angular difference between two headings, wrapped to `[0, π]`.
pub fn angle_between(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(TAU);
    if diff > PI {
        TAU - diff
    } else {
        diff
    }
}

/// Index of the nearest enemy whose centre lies within `cone` radians of
/// `direction` as seen from `origin`. Ties keep the earlier enemy.
pub fn resolve_target(origin: Vec2, direction: Vec2, enemies: &[Enemy], cone: f32) -> Option<usize> {
    let heading = direction.y.atan2(direction.x);
    let mut best: Option<(usize, f32)> = None;

    for (i, enemy) in enemies.iter().enumerate() {
        let delta = enemy.center() - origin;
        let bearing = delta.y.atan2(delta.x);
        if angle_between(bearing, heading) >= cone {
            continue;
        }
        let distance = delta.length();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((i, distance)),
        }
    }

    best.map(|(i, _)| i)
}
