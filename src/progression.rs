//! Wave spawner: spawn cadence, wave escalation, boss injection.

use glam::Vec2;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{Arena, Catalog};
use crate::enemy::EnemyKind::{self, *};
use crate::enemy::Enemy;

pub const FIRST_WAVE_QUOTA: u32 = 5;
pub const FIRST_SPAWN_INTERVAL: u32 = 120;
pub const MIN_SPAWN_INTERVAL: u32 = 60;
const QUOTA_STEP: u32 = 2;
const INTERVAL_STEP: u32 = 3;

pub const BOSS_EVERY: u32 = 5;
pub const BOSS_SIZE: f32 = 70.0;
/// Distance outside the arena edge at which regular enemies appear.
const SPAWN_MARGIN: f32 = 50.0;
/// Spawn slots along an edge leave room for the widest regular body.
const SPAWN_SLOT_INSET: f32 = 50.0;

/// Composition tiers, highest threshold first.
const TIERS: [(u32, &[(EnemyKind, u32)]); 4] = [
    (
        11,
        &[
            (Rusher, 20),
            (Tank, 10),
            (Shooter, 15),
            (Swarm, 10),
            (Hunter, 20),
            (Sniper, 15),
            (Support, 10),
        ],
    ),
    (8, &[(Rusher, 25), (Tank, 15), (Shooter, 15), (Swarm, 10), (Hunter, 20), (Sniper, 15)]),
    (5, &[(Rusher, 35), (Tank, 15), (Shooter, 30), (Hunter, 20)]),
    (1, &[(Rusher, 60), (Shooter, 40)]),
];

/// Weighted type pool in force at `wave`.
pub fn spawn_table(wave: u32) -> &'static [(EnemyKind, u32)] {
    TIERS
        .iter()
        .find(|(threshold, _)| wave >= *threshold)
        .map_or(TIERS[TIERS.len() - 1].1, |(_, table)| table)
}

pub fn choose_kind(wave: u32, rng: &mut impl Rng) -> EnemyKind {
    spawn_table(wave)
        .choose_weighted(rng, |(_, weight)| *weight)
        .map_or(Rusher, |(kind, _)| *kind)
}

/// A random point just outside one of the four arena edges.
pub fn edge_spawn_point(arena: &Arena, rng: &mut impl Rng) -> Vec2 {
    let span_x = (arena.width - SPAWN_SLOT_INSET).max(0.0);
    let span_y = (arena.height - SPAWN_SLOT_INSET).max(0.0);
    match rng.gen_range(0..4) {
        0 => Vec2::new(rng.gen_range(0.0..=span_x), -SPAWN_MARGIN),
        1 => Vec2::new(rng.gen_range(0.0..=span_x), arena.height + SPAWN_MARGIN),
        2 => Vec2::new(-SPAWN_MARGIN, rng.gen_range(0.0..=span_y)),
        _ => Vec2::new(arena.width + SPAWN_MARGIN, rng.gen_range(0.0..=span_y)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveEvent {
    Spawned(EnemyKind),
    /// A new wave began; `boss` is set when a boss was injected.
    Advanced { wave: u32, boss: bool },
}

#[derive(Clone, Debug)]
pub struct WaveState {
    pub wave: u32,
    pub spawn_timer: u32,
    pub spawn_interval: u32,
    pub enemies_per_wave: u32,
    pub spawned_this_wave: u32,
    next_enemy_id: u32,
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            wave: 1,
            spawn_timer: 0,
            spawn_interval: FIRST_SPAWN_INTERVAL,
            enemies_per_wave: FIRST_WAVE_QUOTA,
            spawned_this_wave: 0,
            next_enemy_id: 0,
        }
    }
}

impl WaveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quota_reached(&self) -> bool {
        self.spawned_this_wave >= self.enemies_per_wave
    }

    /// Fresh id for an enemy entering the world.
    pub fn allocate_id(&mut self) -> u32 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        id
    }

    /// One tick of the spawn gate.
    pub fn update(
        &mut self,
        enemies: &mut Vec<Enemy>,
        catalog: &Catalog,
        arena: &Arena,
        rng: &mut impl Rng,
    ) -> Option<WaveEvent> {
        self.spawn_timer += 1;
        if self.spawn_timer < self.spawn_interval {
            return None;
        }

        if !self.quota_reached() {
            self.spawn_timer = 0;
            let kind = self.spawn_enemy(enemies, catalog, arena, rng);
            Some(WaveEvent::Spawned(kind))
        } else if enemies.is_empty() {
            self.spawn_timer = 0;
            let boss = self.next_wave(enemies, catalog, arena, rng);
            Some(WaveEvent::Advanced { wave: self.wave, boss })
        } else {
            None
        }
    }

    pub fn spawn_enemy(
        &mut self,
        enemies: &mut Vec<Enemy>,
        catalog: &Catalog,
        arena: &Arena,
        rng: &mut impl Rng,
    ) -> EnemyKind {
        let kind = choose_kind(self.wave, rng);
        let pos = edge_spawn_point(arena, rng);
        let id = self.allocate_id();
        enemies.push(Enemy::spawn(id, kind, pos, self.wave, catalog.enemy(kind), rng));
        self.spawned_this_wave += 1;
        debug!("spawned {} #{id} ({}/{})", kind.key(), self.spawned_this_wave, self.enemies_per_wave);
        kind
    }

    /// Escalate to the next wave. Returns `true` when a boss was injected.
    pub fn next_wave(
        &mut self,
        enemies: &mut Vec<Enemy>,
        catalog: &Catalog,
        arena: &Arena,
        rng: &mut impl Rng,
    ) -> bool {
        self.wave += 1;
        self.enemies_per_wave += QUOTA_STEP;
        self.spawned_this_wave = 0;
        self.spawn_interval = self
            .spawn_interval
            .saturating_sub(INTERVAL_STEP)
            .max(MIN_SPAWN_INTERVAL);
        info!("wave {} begins: {} enemies", self.wave, self.enemies_per_wave);

        if self.wave % BOSS_EVERY != 0 {
            return false;
        }
        let id = self.allocate_id();
        let pos = Vec2::new(arena.width / 2.0, -100.0);
        let mut boss = Enemy::spawn(id, Tank, pos, self.wave, catalog.enemy(Tank), rng);
        boss.health *= 2;
        boss.max_health = boss.health;
        boss.size = BOSS_SIZE;
        boss.is_boss = true;
        info!("boss #{id} joins wave {} with {} hp", self.wave, boss.health);
        enemies.push(boss);
        true
    }
}
