//! Game-logic operations on the world aggregate.
//!
//! Input intents and the per-frame `tick` are free functions over
//! `&mut GameState`. All randomness comes through the injected RNG, so a
//! seeded generator replays a run exactly. Intents arriving in the wrong run
//! state are ignored.

use std::mem;
use std::sync::Arc;

use glam::Vec2;
use log::{debug, info};
use rand::Rng;

use crate::collision::check_collisions;
use crate::combat::CombatSystem;
use crate::config::{Arena, Catalog};
use crate::enemy::apply_heal_pulse;
use crate::entities::{Effects, EnemyProjectile, GameState, GameStatus, Player, Tally};
use crate::progression::{WaveEvent, WaveState};
use crate::stats::{RunSummary, StatsTracker};
use crate::upgrade::{self, roll_upgrades, OFFER_COUNT};
use crate::weapon::{ShotReport, WeaponSystem};

// ── Constructors ─────────────────────────────────────────────────────────────

/// A fresh run: player centred, wave 1, default weapon, `stats` attached.
pub fn init_state(catalog: Arc<Catalog>, arena: Arena, stats: StatsTracker) -> GameState {
    GameState {
        player: Player::new(arena.center()),
        enemies: Vec::new(),
        projectiles: Vec::new(),
        powerups: Vec::new(),
        effects: Effects::default(),
        tally: Tally::default(),
        waves: WaveState::new(),
        weapons: WeaponSystem::new(catalog.default_weapon().clone()),
        combat: CombatSystem::new(),
        stats,
        pending_upgrades: Vec::new(),
        status: GameStatus::Playing,
        frame: 0,
        arena,
        catalog,
    }
}

/// Rebuild the world after a game over, keeping only the stats tracker.
pub fn restart(state: &mut GameState) -> bool {
    if state.status != GameStatus::GameOver {
        debug!("restart ignored while {:?}", state.status);
        return false;
    }
    let mut stats = mem::take(&mut state.stats);
    stats.reset_guard();
    *state = init_state(Arc::clone(&state.catalog), state.arena, stats);
    info!("new run started");
    true
}

// ── Input intents ────────────────────────────────────────────────────────────

fn playing(state: &GameState, intent: &str) -> bool {
    if state.status == GameStatus::Playing {
        true
    } else {
        debug!("{intent} ignored while {:?}", state.status);
        false
    }
}

/// Movement intent for the coming ticks; zero stops the player.
pub fn steer(state: &mut GameState, direction: Vec2) {
    if playing(state, "steer") {
        state.player.heading = direction;
    }
}

/// Trigger down (or still held) at arena point `aim`.
pub fn pull_trigger(state: &mut GameState, aim: Vec2, rng: &mut impl Rng) -> Option<ShotReport> {
    trigger(state, true, aim, rng)
}

/// Trigger up at arena point `aim`. Only charge weapons fire on release.
pub fn release_trigger(state: &mut GameState, aim: Vec2, rng: &mut impl Rng) -> Option<ShotReport> {
    trigger(state, false, aim, rng)
}

fn trigger(state: &mut GameState, held: bool, aim: Vec2, rng: &mut impl Rng) -> Option<ShotReport> {
    if !playing(state, "trigger") {
        return None;
    }
    let now = state.now_ms();
    let (weapons, combat, mut battle) = state.arms();
    weapons.trigger(held, aim, now, combat, &mut battle, rng)
}

pub fn request_reload(state: &mut GameState) -> bool {
    if !playing(state, "reload") {
        return false;
    }
    let now = state.now_ms();
    let started = state.weapons.start_reload(now);
    if !started {
        debug!("reload refused: ammo {}/{}", state.weapons.ammo, state.weapons.equipped.max_ammo);
    }
    started
}

/// Switch to the preset stored under `key`.
pub fn equip_weapon(state: &mut GameState, key: &str) -> bool {
    if !playing(state, "equip") {
        return false;
    }
    let Some(weapon) = state.catalog.weapon(key).cloned() else {
        debug!("no weapon preset `{key}`");
        return false;
    };
    info!("equipped {}", weapon.name);
    state.weapons.equip(weapon);
    true
}

/// Pick offer `index` from the upgrade screen and resume play.
pub fn select_upgrade(state: &mut GameState, index: usize) -> bool {
    if state.status != GameStatus::Upgrade {
        debug!("upgrade selection ignored while {:?}", state.status);
        return false;
    }
    let Some(choice) = state.pending_upgrades.get(index).copied() else {
        debug!("upgrade {index} not on offer");
        return false;
    };
    upgrade::apply(choice.effect, &mut state.player, &mut state.weapons);
    state.pending_upgrades.clear();
    state.status = GameStatus::Playing;
    info!("upgrade applied: {}", choice.name);
    true
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame. Does nothing outside `Playing`.
pub fn tick(state: &mut GameState, rng: &mut impl Rng) {
    if state.status != GameStatus::Playing {
        return;
    }
    state.frame += 1;
    let now = state.now_ms();

    // ── 1. Weapon: reload completion, burst drip, crosshair decay ───────────
    state.weapons.update_reload(now);
    {
        let (weapons, combat, mut battle) = state.arms();
        weapons.update(now, combat, &mut battle, rng);
    }

    // ── 2. Player ────────────────────────────────────────────────────────────
    state.player.update(&state.arena);

    // ── 3. Enemy AI ──────────────────────────────────────────────────────────
    let player_center = state.player.center();
    let mut pulses = Vec::new();
    for enemy in &mut state.enemies {
        let step = enemy.update(player_center, &state.arena, rng);
        if let Some(dir) = step.fire {
            state.projectiles.push(EnemyProjectile::new(enemy.center(), dir));
        }
        if step.heal_pulse {
            pulses.push((enemy.id, enemy.center()));
        }
    }
    for (healer, origin) in pulses {
        apply_heal_pulse(&mut state.enemies, healer, origin);
    }

    // ── 4. Projectiles, pickups, effects ─────────────────────────────────────
    for projectile in &mut state.projectiles {
        projectile.update();
    }
    let arena = state.arena;
    state.projectiles.retain(|p| !p.is_out_of_bounds(&arena));

    for powerup in &mut state.powerups {
        powerup.update();
    }
    state.powerups.retain(|p| !p.is_expired());

    state.effects.update();

    // ── 5. Collisions ────────────────────────────────────────────────────────
    let report = check_collisions(&mut state.contacts(), rng);
    if report.player_hit() {
        debug!("player hit, health {}", state.player.health);
    }

    // ── 6. Combat timers ─────────────────────────────────────────────────────
    state.combat.update();

    // ── 7. Death ─────────────────────────────────────────────────────────────
    if !state.player.is_alive() {
        game_over(state);
        return;
    }

    // ── 8. Progression ───────────────────────────────────────────────────────
    let event = state.waves.update(&mut state.enemies, &state.catalog, &arena, rng);
    if let Some(WaveEvent::Advanced { wave, boss }) = event {
        state.pending_upgrades = roll_upgrades(rng, OFFER_COUNT);
        state.status = GameStatus::Upgrade;
        info!("wave {} cleared{}", wave - 1, if boss { ", boss incoming" } else { "" });
    }
}

fn game_over(state: &mut GameState) {
    state.status = GameStatus::GameOver;
    info!(
        "game over on wave {} with score {}",
        state.waves.wave, state.tally.score
    );
    let run = RunSummary {
        wave: state.waves.wave,
        kills: state.tally.kills,
        score: state.tally.score,
        combo: state.combat.best_combo,
    };
    state.stats.commit_run(&run);
}
