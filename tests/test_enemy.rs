use approx::assert_relative_eq;
use glam::Vec2;
use pulse_arena::config::{Arena, Catalog, ConfigStore};
use pulse_arena::enemy::*;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn catalog() -> Catalog {
    Catalog::load(&ConfigStore::builtin()).unwrap()
}

/// Wave-0 enemy (unscaled stats) centred on `center`.
fn enemy_at(id: u32, kind: EnemyKind, center: Vec2) -> Enemy {
    let catalog = catalog();
    let mut e = Enemy::spawn(id, kind, Vec2::ZERO, 0, catalog.enemy(kind), &mut seeded_rng());
    e.pos = center - Vec2::splat(e.size / 2.0);
    e
}

const PLAYER: Vec2 = Vec2::new(640.0, 360.0);

// ── Spawning ──────────────────────────────────────────────────────────────────

#[test]
fn spawn_scales_with_wave() {
    let catalog = catalog();
    let e = Enemy::spawn(
        7,
        EnemyKind::Rusher,
        Vec2::ZERO,
        3,
        catalog.enemy(EnemyKind::Rusher),
        &mut seeded_rng(),
    );
    assert_eq!(e.id, 7);
    assert_eq!(e.health, 39);
    assert_eq!(e.max_health, 39);
    assert_relative_eq!(e.speed, 2.5 + 0.24, epsilon = 1e-5);
    assert!(!e.is_boss);
}

#[test]
fn behavior_matches_kind() {
    for kind in EnemyKind::ALL {
        let e = enemy_at(0, kind, Vec2::ZERO);
        assert_eq!(e.behavior.kind(), kind);
    }
}

// ── Hit reaction ──────────────────────────────────────────────────────────────

#[test]
fn take_damage_reports_lethality() {
    let mut e = enemy_at(0, EnemyKind::Rusher, Vec2::ZERO);
    assert!(!e.take_damage(29));
    assert_eq!(e.health, 1);
    assert!(e.take_damage(1));
    assert!(e.health <= 0);
}

#[test]
fn take_damage_sets_flash_and_slow() {
    let mut e = enemy_at(0, EnemyKind::Tank, Vec2::ZERO);
    e.take_damage(1);
    assert_eq!(e.hit_flash, HIT_FLASH_FRAMES);
    assert_eq!(e.slow_timer, SLOW_FRAMES);
}

#[test]
fn slowed_enemy_moves_at_seventy_percent() {
    let arena = Arena::default();
    let mut rng = seeded_rng();
    let mut e = enemy_at(0, EnemyKind::Rusher, Vec2::new(100.0, 360.0));
    e.take_damage(1);
    let step = e.update(PLAYER, &arena, &mut rng);
    assert_relative_eq!(step.movement.x, 2.5 * SLOW_FACTOR, epsilon = 1e-5);

    for _ in 0..SLOW_FRAMES {
        e.update(PLAYER, &arena, &mut rng);
    }
    let step = e.update(PLAYER, &arena, &mut rng);
    assert_relative_eq!(step.movement.x, 2.5, epsilon = 1e-5);
}

// ── Pure chasers ──────────────────────────────────────────────────────────────

#[rstest]
#[case(EnemyKind::Rusher, 2.5)]
#[case(EnemyKind::Tank, 1.2)]
#[case(EnemyKind::Swarm, 3.2)]
fn chasers_close_in_directly(#[case] kind: EnemyKind, #[case] speed: f32) {
    let arena = Arena::default();
    let mut e = enemy_at(0, kind, Vec2::new(240.0, 360.0));
    let step = e.update(PLAYER, &arena, &mut seeded_rng());
    assert_eq!(step.state, AiState::Chase);
    assert!(step.fire.is_none());
    assert_relative_eq!(step.movement.x, speed, epsilon = 1e-5);
    assert_relative_eq!(step.movement.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(e.center().x, 240.0 + speed, epsilon = 1e-4);
}

#[test]
fn zero_distance_yields_no_movement() {
    let arena = Arena::default();
    let mut e = enemy_at(0, EnemyKind::Rusher, PLAYER);
    let step = e.update(PLAYER, &arena, &mut seeded_rng());
    assert_eq!(step.movement, Vec2::ZERO);
    assert!(e.pos.x.is_finite() && e.pos.y.is_finite());
}

#[test]
fn position_clamped_to_oversized_bound() {
    let arena = Arena::default();
    let mut e = enemy_at(0, EnemyKind::Rusher, Vec2::new(-500.0, 2000.0));
    e.update(PLAYER, &arena, &mut seeded_rng());
    assert_eq!(e.pos.x, -e.size);
    assert_eq!(e.pos.y, arena.height);
}

// ── Shooter ───────────────────────────────────────────────────────────────────

#[rstest]
#[case(300.0, AiState::Chase)]
#[case(175.0, AiState::Strafe)]
#[case(100.0, AiState::Retreat)]
fn shooter_range_bands(#[case] distance: f32, #[case] expected: AiState) {
    let arena = Arena::default();
    let mut e = enemy_at(0, EnemyKind::Shooter, PLAYER - Vec2::new(distance, 0.0));
    let step = e.update(PLAYER, &arena, &mut seeded_rng());
    assert_eq!(step.state, expected);
    assert_eq!(e.state, expected);
}

#[test]
fn shooter_retreats_at_reduced_speed() {
    let arena = Arena::default();
    let mut e = enemy_at(0, EnemyKind::Shooter, PLAYER - Vec2::new(100.0, 0.0));
    let step = e.update(PLAYER, &arena, &mut seeded_rng());
    assert_relative_eq!(step.movement.x, -1.8 * 0.7, epsilon = 1e-5);
}

#[test]
fn shooter_strafes_perpendicular() {
    let arena = Arena::default();
    let mut e = enemy_at(0, EnemyKind::Shooter, PLAYER - Vec2::new(175.0, 0.0));
    let step = e.update(PLAYER, &arena, &mut seeded_rng());
    assert_relative_eq!(step.movement.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(step.movement.y.abs(), 1.8, epsilon = 1e-5);
}

#[test]
fn shooter_fires_in_range_then_cools_down() {
    let arena = Arena::default();
    let mut rng = seeded_rng();
    let mut e = enemy_at(0, EnemyKind::Shooter, PLAYER - Vec2::new(300.0, 0.0));

    let step = e.update(PLAYER, &arena, &mut rng);
    let dir = step.fire.expect("shooter should fire");
    assert_relative_eq!(dir.x, 1.0, epsilon = 1e-5);
    assert_eq!(e.shoot_cooldown, 90);

    let step = e.update(PLAYER, &arena, &mut rng);
    assert!(step.fire.is_none());
    assert_eq!(e.shoot_cooldown, 89);
}

#[test]
fn shooter_holds_fire_beyond_range() {
    let arena = Arena::default();
    let mut e = enemy_at(0, EnemyKind::Shooter, PLAYER - Vec2::new(500.0, 0.0));
    let step = e.update(PLAYER, &arena, &mut seeded_rng());
    assert_eq!(step.state, AiState::Chase);
    assert!(step.fire.is_none());
}

// ── Hunter ────────────────────────────────────────────────────────────────────

#[test]
fn hunter_always_flanks_and_never_fires() {
    let arena = Arena::default();
    let mut rng = seeded_rng();
    let mut e = enemy_at(0, EnemyKind::Hunter, PLAYER - Vec2::new(400.0, 0.0));
    for _ in 0..200 {
        let step = e.update(PLAYER, &arena, &mut rng);
        assert_eq!(step.state, AiState::Flank);
        assert!(step.fire.is_none());
    }
}

#[test]
fn hunter_switches_flank_side_every_120_ticks() {
    let arena = Arena::default();
    let mut rng = seeded_rng();
    let mut e = enemy_at(0, EnemyKind::Hunter, PLAYER - Vec2::new(400.0, 0.0));
    let side = |e: &Enemy| match e.behavior {
        EnemyBehavior::Hunter { flank_side, .. } => flank_side,
        _ => unreachable!(),
    };
    let initial = side(&e);
    for _ in 0..119 {
        e.update(PLAYER, &arena, &mut rng);
    }
    assert_eq!(side(&e), initial);
    e.update(PLAYER, &arena, &mut rng);
    assert_eq!(side(&e), -initial);
}

#[test]
fn hunter_blends_approach_and_flank() {
    let arena = Arena::default();
    let mut e = enemy_at(0, EnemyKind::Hunter, PLAYER - Vec2::new(400.0, 0.0));
    let step = e.update(PLAYER, &arena, &mut seeded_rng());
    assert_relative_eq!(step.movement.x, 0.6 * 2.8, epsilon = 1e-4);
    assert_relative_eq!(step.movement.y.abs(), 0.4 * 2.8, epsilon = 1e-4);
}

// ── Sniper ────────────────────────────────────────────────────────────────────

#[test]
fn sniper_chases_from_long_range() {
    let arena = Arena::default();
    let mut e = enemy_at(0, EnemyKind::Sniper, PLAYER - Vec2::new(500.0, 0.0));
    let step = e.update(PLAYER, &arena, &mut seeded_rng());
    assert_eq!(step.state, AiState::Chase);
    assert_eq!(e.behavior.aim_progress(), 0.0);
}

#[test]
fn sniper_aims_for_sixty_ticks_then_fires() {
    let arena = Arena::default();
    let mut rng = seeded_rng();
    let mut e = enemy_at(0, EnemyKind::Sniper, PLAYER - Vec2::new(300.0, 0.0));
    let start = e.pos;

    for _ in 0..SNIPER_AIM_FRAMES - 1 {
        let step = e.update(PLAYER, &arena, &mut rng);
        assert_eq!(step.state, AiState::Aim);
        assert!(step.fire.is_none());
    }
    assert_eq!(e.pos, start);
    assert!(e.behavior.aim_progress() > 0.9);

    let step = e.update(PLAYER, &arena, &mut rng);
    assert!(step.fire.is_some());
    assert_eq!(e.shoot_cooldown, 120);
    assert_eq!(e.behavior.aim_progress(), 0.0);

    let step = e.update(PLAYER, &arena, &mut rng);
    assert_eq!(step.state, AiState::Strafe);
    assert_relative_eq!(step.movement.length(), 1.5 * 0.5, epsilon = 1e-5);
}

// ── Support ───────────────────────────────────────────────────────────────────

#[rstest]
#[case(200.0, AiState::SupportIdle)]
#[case(400.0, AiState::Chase)]
fn support_keeps_its_distance(#[case] distance: f32, #[case] expected: AiState) {
    let arena = Arena::default();
    let mut e = enemy_at(0, EnemyKind::Support, PLAYER - Vec2::new(distance, 0.0));
    let step = e.update(PLAYER, &arena, &mut seeded_rng());
    assert_eq!(step.state, expected);
}

#[test]
fn support_pulses_every_sixty_ticks() {
    let arena = Arena::default();
    let mut rng = seeded_rng();
    let mut e = enemy_at(0, EnemyKind::Support, PLAYER - Vec2::new(400.0, 0.0));
    for _ in 0..59 {
        assert!(!e.update(PLAYER, &arena, &mut rng).heal_pulse);
    }
    assert!(e.update(PLAYER, &arena, &mut rng).heal_pulse);
    assert!(!e.update(PLAYER, &arena, &mut rng).heal_pulse);
}

#[test]
fn heal_pulse_heals_neighbours_only() {
    let origin = Vec2::new(300.0, 300.0);
    let mut enemies = vec![
        enemy_at(0, EnemyKind::Support, origin),
        enemy_at(1, EnemyKind::Rusher, origin + Vec2::new(100.0, 0.0)),
        enemy_at(2, EnemyKind::Rusher, origin + Vec2::new(200.0, 0.0)),
        enemy_at(3, EnemyKind::Tank, origin + Vec2::new(0.0, 50.0)),
    ];
    for e in &mut enemies {
        e.take_damage(10);
    }
    enemies[3].health = enemies[3].max_health - 1;

    let healed = apply_heal_pulse(&mut enemies, 0, origin);
    assert_eq!(healed, 2);
    assert_eq!(enemies[0].health, 50); // healer untouched
    assert_eq!(enemies[1].health, 22);
    assert_eq!(enemies[2].health, 20); // out of radius
    assert_eq!(enemies[3].health, enemies[3].max_health); // capped
}
