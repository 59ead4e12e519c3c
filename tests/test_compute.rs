use std::sync::Arc;

use glam::Vec2;
use pulse_arena::compute::*;
use pulse_arena::config::{Arena, Catalog, ConfigStore};
use pulse_arena::enemy::{Enemy, EnemyKind};
use pulse_arena::entities::*;
use pulse_arena::stats::StatsTracker;
use pulse_arena::upgrade::OFFER_COUNT;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_state() -> GameState {
    let catalog = Arc::new(Catalog::load(&ConfigStore::builtin()).unwrap());
    init_state(catalog, Arena::default(), StatsTracker::in_memory())
}

fn add_enemy(state: &mut GameState, kind: EnemyKind, center: Vec2) {
    let id = state.waves.allocate_id();
    let mut e =
        Enemy::spawn(id, kind, Vec2::ZERO, 0, state.catalog.enemy(kind), &mut seeded_rng());
    e.pos = center - Vec2::splat(e.size / 2.0);
    state.enemies.push(e);
}

/// Quota met and the field empty: the next tick advances the wave.
fn arm_wave_clear(state: &mut GameState) {
    state.waves.spawned_this_wave = state.waves.enemies_per_wave;
    state.waves.spawn_timer = state.waves.spawn_interval - 1;
}

fn kill_player_next_tick(state: &mut GameState) {
    state.player.health = 1;
    let center = state.player.center();
    state.projectiles.push(EnemyProjectile::new(center, Vec2::Y));
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn fresh_run_defaults() {
    let state = make_state();
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.frame, 0);
    assert_eq!(state.waves.wave, 1);
    assert_eq!(state.player.center(), state.arena.center());
    assert_eq!(state.weapons.equipped.key, "rifle");
    assert_eq!(state.weapons.ammo, 30);
    assert!(state.enemies.is_empty());
    assert_eq!(state.tally, Tally::default());
}

// ── Tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_advances_clock_and_moves_player() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    steer(&mut state, Vec2::new(1.0, 0.0));
    let x0 = state.player.pos.x;
    tick(&mut state, &mut rng);
    assert_eq!(state.frame, 1);
    assert_eq!(state.player.pos.x, x0 + PLAYER_BASE_SPEED);
}

#[test]
fn first_enemy_spawns_after_two_seconds() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    for _ in 0..119 {
        tick(&mut state, &mut rng);
    }
    assert!(state.enemies.is_empty());
    tick(&mut state, &mut rng);
    assert_eq!(state.enemies.len(), 1);
}

#[test]
fn enemy_shots_become_projectiles() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    let center = state.player.center();
    add_enemy(&mut state, EnemyKind::Shooter, center + Vec2::new(300.0, 0.0));
    tick(&mut state, &mut rng);
    assert_eq!(state.projectiles.len(), 1);
    assert!(state.projectiles[0].dir.x < 0.0);
}

#[test]
fn reload_completes_on_simulated_clock() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    assert!(!request_reload(&mut state));
    let aim = state.player.center() + Vec2::X;
    assert!(pull_trigger(&mut state, aim, &mut rng).is_some());
    assert!(request_reload(&mut state));

    for _ in 0..89 {
        tick(&mut state, &mut rng);
    }
    assert!(state.weapons.is_reloading());
    tick(&mut state, &mut rng);
    assert!(!state.weapons.is_reloading());
    assert_eq!(state.weapons.ammo, 30);
}

#[test]
fn kill_through_trigger_scores() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    state.player.crit_chance = 0.0;
    let target = state.player.center() + Vec2::new(150.0, 0.0);
    add_enemy(&mut state, EnemyKind::Swarm, target);

    let report = pull_trigger(&mut state, target, &mut rng).unwrap();
    assert!(report.hits[0].killed);
    assert_eq!(state.tally.kills, 1);
    assert_eq!(state.tally.score, 55);
    assert_eq!(state.combat.combo, 1);
    assert!(state.enemies.is_empty());
}

#[test]
fn contact_hit_breaks_combo_during_tick() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    state.combat.combo = 3;
    state.combat.combo_timer = 100;
    let center = state.player.center();
    add_enemy(&mut state, EnemyKind::Tank, center);

    tick(&mut state, &mut rng);
    assert_eq!(state.player.health, PLAYER_MAX_HEALTH - 20);
    assert_eq!(state.combat.combo, 0);
}

// ── Game over ─────────────────────────────────────────────────────────────────

#[test]
fn death_ends_run_and_commits_once() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    state.tally.kills = 7;
    state.combat.best_combo = 4;
    kill_player_next_tick(&mut state);

    tick(&mut state, &mut rng);
    assert_eq!(state.status, GameStatus::GameOver);
    assert!(state.stats.is_committed());
    assert_eq!(state.stats.profile.games_played, 1);
    assert_eq!(state.stats.profile.total_kills, 7);
    assert_eq!(state.stats.profile.longest_combo, 4);

    let frame = state.frame;
    for _ in 0..10 {
        tick(&mut state, &mut rng);
    }
    assert_eq!(state.frame, frame);
    assert_eq!(state.stats.profile.games_played, 1);
}

#[test]
fn death_skips_progression() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    arm_wave_clear(&mut state);
    kill_player_next_tick(&mut state);

    tick(&mut state, &mut rng);
    assert_eq!(state.status, GameStatus::GameOver);
    assert_eq!(state.waves.wave, 1);
    assert!(state.pending_upgrades.is_empty());
}

#[test]
fn intents_ignored_after_game_over() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    kill_player_next_tick(&mut state);
    tick(&mut state, &mut rng);

    let aim = state.player.center() + Vec2::X;
    assert!(pull_trigger(&mut state, aim, &mut rng).is_none());
    assert!(!request_reload(&mut state));
    assert!(!equip_weapon(&mut state, "smg"));
    assert_eq!(state.weapons.ammo, 30);
    steer(&mut state, Vec2::X);
    assert_eq!(state.player.heading, Vec2::ZERO);
}

#[test]
fn restart_keeps_stats_and_resets_world() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    assert!(!restart(&mut state));

    state.tally.score = 900;
    kill_player_next_tick(&mut state);
    tick(&mut state, &mut rng);
    assert!(restart(&mut state));

    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.frame, 0);
    assert_eq!(state.tally, Tally::default());
    assert_eq!(state.player.health, PLAYER_MAX_HEALTH);
    assert!(state.projectiles.is_empty());
    assert_eq!(state.stats.profile.best_score, 900);
    assert!(!state.stats.is_committed());

    kill_player_next_tick(&mut state);
    tick(&mut state, &mut rng);
    assert_eq!(state.stats.profile.games_played, 2);
}

// ── Upgrades ──────────────────────────────────────────────────────────────────

#[test]
fn cleared_wave_opens_upgrade_screen() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    arm_wave_clear(&mut state);

    tick(&mut state, &mut rng);
    assert_eq!(state.status, GameStatus::Upgrade);
    assert_eq!(state.waves.wave, 2);
    assert_eq!(state.pending_upgrades.len(), OFFER_COUNT);

    let frame = state.frame;
    tick(&mut state, &mut rng);
    assert_eq!(state.frame, frame);
    let aim = state.player.center() + Vec2::X;
    assert!(pull_trigger(&mut state, aim, &mut rng).is_none());
}

#[test]
fn selecting_upgrade_resumes_play() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    assert!(!select_upgrade(&mut state, 0));

    arm_wave_clear(&mut state);
    tick(&mut state, &mut rng);
    assert!(!select_upgrade(&mut state, OFFER_COUNT));
    assert_eq!(state.status, GameStatus::Upgrade);

    assert!(select_upgrade(&mut state, 1));
    assert_eq!(state.status, GameStatus::Playing);
    assert!(state.pending_upgrades.is_empty());
}

// ── Weapons ───────────────────────────────────────────────────────────────────

#[test]
fn equip_switches_presets() {
    let mut state = make_state();
    assert!(equip_weapon(&mut state, "shotgun"));
    assert_eq!(state.weapons.equipped.key, "shotgun");
    assert_eq!(state.weapons.ammo, 8);
    assert!(!equip_weapon(&mut state, "plasma"));
    assert_eq!(state.weapons.equipped.key, "shotgun");
}

#[test]
fn railgun_fires_on_release_through_intents() {
    let mut rng = seeded_rng();
    let mut state = make_state();
    equip_weapon(&mut state, "railgun");
    let aim = state.player.center() + Vec2::X * 100.0;

    for _ in 0..45 {
        assert!(pull_trigger(&mut state, aim, &mut rng).is_none());
    }
    let report = release_trigger(&mut state, aim, &mut rng);
    assert!(report.is_some());
    assert_eq!(state.weapons.ammo, 4);
}

// ── Determinism ───────────────────────────────────────────────────────────────

#[test]
fn same_seed_same_run() {
    fn play(seed: u64) -> (Tally, usize, Vec<Vec2>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = make_state();
        for frame in 0..900 {
            if frame % 10 == 0 {
                let aim = state
                    .enemies
                    .first()
                    .map_or(state.player.center() + Vec2::X, |e| e.center());
                pull_trigger(&mut state, aim, &mut rng);
            }
            tick(&mut state, &mut rng);
        }
        let positions = state.enemies.iter().map(|e| e.pos).collect();
        (state.tally, state.effects.particles.len(), positions)
    }

    assert_eq!(play(7), play(7));
}
