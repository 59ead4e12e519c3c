use std::f32::consts::{FRAC_PI_2, PI};

use approx::assert_relative_eq;
use glam::Vec2;
use pulse_arena::config::{Catalog, ConfigStore};
use pulse_arena::enemy::{Enemy, EnemyKind};
use pulse_arena::targeting::*;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

fn enemy_at(id: u32, center: Vec2) -> Enemy {
    let catalog = Catalog::load(&ConfigStore::builtin()).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let kind = EnemyKind::Rusher;
    let mut e = Enemy::spawn(id, kind, Vec2::ZERO, 0, catalog.enemy(kind), &mut rng);
    e.pos = center - Vec2::splat(e.size / 2.0);
    e
}

// ── angle_between ─────────────────────────────────────────────────────────────

#[rstest]
#[case(0.0, 0.0, 0.0)]
#[case(0.5, 0.2, 0.3)]
#[case(0.2, 0.5, 0.3)]
#[case(PI - 0.05, -PI + 0.05, 0.1)]
#[case(FRAC_PI_2, -FRAC_PI_2, PI)]
fn angle_between_wraps(#[case] a: f32, #[case] b: f32, #[case] expected: f32) {
    assert_relative_eq!(angle_between(a, b), expected, epsilon = 1e-5);
}

// ── resolve_target ────────────────────────────────────────────────────────────

#[test]
fn no_enemies_no_target() {
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &[], DEFAULT_CONE), None);
}

#[test]
fn enemy_behind_is_ignored() {
    let enemies = vec![enemy_at(0, Vec2::new(-200.0, 0.0))];
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &enemies, DEFAULT_CONE), None);
}

#[test]
fn nearest_in_cone_wins() {
    let enemies = vec![
        enemy_at(0, Vec2::new(300.0, 0.0)),
        enemy_at(1, Vec2::new(100.0, 5.0)),
        enemy_at(2, Vec2::new(50.0, 200.0)), // closer but far off-axis
    ];
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &enemies, DEFAULT_CONE), Some(1));
}

#[test]
fn cone_edge_is_exclusive() {
    // Bearing just outside / just inside a 0.1 rad half-width.
    let outside = vec![enemy_at(0, Vec2::new(100.0, 100.0 * 0.11_f32.tan()))];
    let inside = vec![enemy_at(0, Vec2::new(100.0, 100.0 * 0.09_f32.tan()))];
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &outside, DEFAULT_CONE), None);
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &inside, DEFAULT_CONE), Some(0));
}

#[test]
fn railgun_cone_is_narrower() {
    let enemies = vec![enemy_at(0, Vec2::new(100.0, 100.0 * 0.07_f32.tan()))];
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &enemies, DEFAULT_CONE), Some(0));
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &enemies, RAILGUN_CONE), None);
}

#[test]
fn direction_magnitude_is_irrelevant() {
    let enemies = vec![enemy_at(0, Vec2::new(0.0, 150.0))];
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::new(0.0, 0.01), &enemies, DEFAULT_CONE), Some(0));
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::new(0.0, 500.0), &enemies, DEFAULT_CONE), Some(0));
}

#[test]
fn aim_across_the_pi_seam() {
    let origin = Vec2::new(500.0, 500.0);
    let enemies = vec![enemy_at(0, origin + Vec2::new(-200.0, -4.0))];
    let aim = Vec2::new(-1.0, 0.01);
    assert_eq!(resolve_target(origin, aim, &enemies, DEFAULT_CONE), Some(0));
}

#[test]
fn equal_distance_keeps_first() {
    let enemies = vec![enemy_at(4, Vec2::new(100.0, 1.0)), enemy_at(9, Vec2::new(100.0, -1.0))];
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &enemies, DEFAULT_CONE), Some(0));
}

#[test]
fn resolution_is_deterministic() {
    let enemies: Vec<Enemy> =
        (0..6).map(|i| enemy_at(i, Vec2::new(80.0 + 40.0 * i as f32, (i % 3) as f32))).collect();
    let first = resolve_target(Vec2::ZERO, Vec2::X, &enemies, DEFAULT_CONE);
    for _ in 0..10 {
        assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &enemies, DEFAULT_CONE), first);
    }
    assert_eq!(first, Some(0));
}

#[test]
fn target_changes_when_closer_enemy_enters_cone() {
    let mut enemies = vec![enemy_at(0, Vec2::new(300.0, 0.0)), enemy_at(1, Vec2::new(100.0, 80.0))];
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &enemies, DEFAULT_CONE), Some(0));

    enemies[1].pos = Vec2::new(100.0, 0.0) - Vec2::splat(enemies[1].size / 2.0);
    assert_eq!(resolve_target(Vec2::ZERO, Vec2::X, &enemies, DEFAULT_CONE), Some(1));
}
