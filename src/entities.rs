//! Game entity types: passive data plus per-frame self-update.
//!
//! `GameState` at the bottom is the composition root the operations in
//! `compute` act on.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;

use crate::collision::{Contacts, Rect};
use crate::combat::{Battle, CombatSystem};
use crate::config::{Arena, Catalog, PowerupDef};
use crate::enemy::Enemy;
use crate::progression::WaveState;
use crate::stats::StatsTracker;
use crate::upgrade::Upgrade;
use crate::weapon::WeaponSystem;

pub const PLAYER_SIZE: f32 = 45.0;
pub const PLAYER_BASE_SPEED: f32 = 6.0;
pub const PLAYER_MAX_HEALTH: u32 = 100;
pub const BASE_CRIT_CHANCE: f32 = 0.15;
/// Frames of immunity after any accepted hit.
pub const INVULNERABLE_FRAMES: u32 = 30;
pub const DAMAGE_INDICATOR_FRAMES: u32 = 30;

pub const PROJECTILE_SPEED: f32 = 8.0;
pub const PROJECTILE_DAMAGE: u32 = 8;
/// Distance outside the arena at which projectiles are culled.
pub const PROJECTILE_MARGIN: f32 = 50.0;

pub const POWERUP_SIZE: f32 = 25.0;
pub const POWERUP_LIFETIME: u32 = 600;

pub const PARTICLE_LIFE: u32 = 30;
const PARTICLE_GRAVITY: f32 = 0.2;
pub const DAMAGE_NUMBER_LIFE: u32 = 60;
const DAMAGE_NUMBER_RISE: f32 = 2.0;

pub const ACCENT_COLOR: [u8; 3] = [255, 70, 100];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Wave cleared; simulation is paused until an upgrade is picked.
    Upgrade,
    GameOver,
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    /// Top-left corner.
    pub pos: Vec2,
    pub size: f32,
    pub health: u32,
    pub max_health: u32,
    pub base_speed: f32,
    pub speed: f32,
    /// Movement intent for the next update, set by `compute::steer`.
    pub heading: Vec2,
    pub invulnerable_frames: u32,

    // Timed powerup modifiers
    pub damage_boost: f32,
    pub damage_boost_timer: u32,
    pub speed_boost: f32,
    pub speed_boost_timer: u32,
    pub shield_active: bool,
    pub shield_timer: u32,

    // Permanent upgrades
    pub damage_upgrade: f32,
    pub crit_chance: f32,
    pub lifesteal: u32,
    /// Granted by the Dash upgrade; nothing consumes it yet.
    pub dash_unlocked: bool,

    pub damage_direction: Option<Vec2>,
    pub damage_indicator_timer: u32,
}

impl Player {
    /// A fresh player centred on `center`.
    pub fn new(center: Vec2) -> Self {
        Self {
            pos: center - Vec2::splat(PLAYER_SIZE / 2.0),
            size: PLAYER_SIZE,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            base_speed: PLAYER_BASE_SPEED,
            speed: PLAYER_BASE_SPEED,
            heading: Vec2::ZERO,
            invulnerable_frames: 0,
            damage_boost: 1.0,
            damage_boost_timer: 0,
            speed_boost: 1.0,
            speed_boost_timer: 0,
            shield_active: false,
            shield_timer: 0,
            damage_upgrade: 1.0,
            crit_chance: BASE_CRIT_CHANCE,
            lifesteal: 0,
            dash_unlocked: false,
            damage_direction: None,
            damage_indicator_timer: 0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_frames > 0
    }

    /// Outgoing damage multiplier: timed boost times permanent upgrades.
    pub fn damage_multiplier(&self) -> f32 {
        self.damage_boost * self.damage_upgrade
    }

    /// Move along `heading`, then tick every timer once.
    pub fn update(&mut self, arena: &Arena) {
        self.pos += self.heading.normalize_or_zero() * self.speed;
        self.pos.x = self.pos.x.clamp(0.0, (arena.width - self.size).max(0.0));
        self.pos.y = self.pos.y.clamp(0.0, (arena.height - self.size).max(0.0));

        self.invulnerable_frames = self.invulnerable_frames.saturating_sub(1);

        if self.damage_boost_timer > 0 {
            self.damage_boost_timer -= 1;
            if self.damage_boost_timer == 0 {
                self.damage_boost = 1.0;
            }
        }

        if self.speed_boost_timer > 0 {
            self.speed_boost_timer -= 1;
            self.speed = self.base_speed * self.speed_boost;
        } else {
            self.speed = self.base_speed;
        }

        if self.shield_timer > 0 {
            self.shield_timer -= 1;
            if self.shield_timer == 0 {
                self.shield_active = false;
            }
        }

        self.damage_indicator_timer = self.damage_indicator_timer.saturating_sub(1);
    }

    /// Returns `true` when the hit was accepted (health lost).
    ///
    /// An active shield swallows exactly one hit and is gone; that hit grants
    /// no invulnerability, so a second hit in the same tick lands.
    pub fn take_damage(&mut self, amount: u32, direction: Option<Vec2>) -> bool {
        if self.shield_active {
            self.shield_active = false;
            self.shield_timer = 0;
            return false;
        }
        if self.is_invulnerable() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        self.invulnerable_frames = INVULNERABLE_FRAMES;
        self.damage_direction = direction;
        self.damage_indicator_timer = DAMAGE_INDICATOR_FRAMES;
        true
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Apply the player-side part of a powerup. Ammo refills are the weapon
    /// system's business and are a no-op here.
    pub fn apply_powerup(&mut self, kind: PowerupKind, def: &PowerupDef) {
        match kind {
            PowerupKind::Health => self.heal(def.amount),
            PowerupKind::Ammo => {}
            PowerupKind::DamageBoost => {
                self.damage_boost = def.multiplier;
                self.damage_boost_timer = def.duration;
            }
            PowerupKind::SpeedBoost => {
                self.speed_boost = def.multiplier;
                self.speed_boost_timer = def.duration;
            }
            PowerupKind::Shield => {
                self.shield_active = true;
                self.shield_timer = def.duration;
            }
        }
    }
}

// ── Enemy projectiles ────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct EnemyProjectile {
    pub pos: Vec2,
    /// Unit vector.
    pub dir: Vec2,
    pub speed: f32,
}

impl EnemyProjectile {
    pub fn new(pos: Vec2, dir: Vec2) -> Self {
        Self { pos, dir: dir.normalize_or_zero(), speed: PROJECTILE_SPEED }
    }

    pub fn update(&mut self) {
        self.pos += self.dir * self.speed;
    }

    pub fn is_out_of_bounds(&self, arena: &Arena) -> bool {
        self.pos.x < -PROJECTILE_MARGIN
            || self.pos.x > arena.width + PROJECTILE_MARGIN
            || self.pos.y < -PROJECTILE_MARGIN
            || self.pos.y > arena.height + PROJECTILE_MARGIN
    }
}

// ── Powerups ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerupKind {
    Health,
    Ammo,
    DamageBoost,
    SpeedBoost,
    Shield,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 5] = [
        PowerupKind::Health,
        PowerupKind::Ammo,
        PowerupKind::DamageBoost,
        PowerupKind::SpeedBoost,
        PowerupKind::Shield,
    ];

    /// Key in the powerup table.
    pub fn key(self) -> &'static str {
        match self {
            PowerupKind::Health => "health",
            PowerupKind::Ammo => "ammo",
            PowerupKind::DamageBoost => "damage_boost",
            PowerupKind::SpeedBoost => "speed_boost",
            PowerupKind::Shield => "shield",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug)]
pub struct Powerup {
    /// Centre point.
    pub pos: Vec2,
    pub kind: PowerupKind,
    pub size: f32,
    pub lifetime: u32,
}

impl Powerup {
    pub fn new(pos: Vec2, kind: PowerupKind) -> Self {
        Self { pos, kind, size: POWERUP_SIZE, lifetime: POWERUP_LIFETIME }
    }

    pub fn update(&mut self) {
        self.lifetime = self.lifetime.saturating_sub(1);
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime == 0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x - self.size,
            self.pos.y - self.size,
            self.size * 2.0,
            self.size * 2.0,
        )
    }
}

// ── Transient effects ────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub color: [u8; 3],
    pub size: u32,
    pub gravity: bool,
}

impl Particle {
    pub fn new(
        rng: &mut impl Rng,
        pos: Vec2,
        color: [u8; 3],
        velocity_range: f32,
        gravity: bool,
    ) -> Self {
        let vel = Vec2::new(
            rng.gen_range(-velocity_range..=velocity_range),
            rng.gen_range(-velocity_range..=velocity_range),
        );
        Self { pos, vel, life: PARTICLE_LIFE, color, size: rng.gen_range(2..=5), gravity }
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
        self.life = self.life.saturating_sub(1);
        if self.gravity {
            self.vel.y += PARTICLE_GRAVITY;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.life == 0
    }
}

/// Floating "-N" label over a hit enemy.
#[derive(Clone, Debug)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub damage: u32,
    pub critical: bool,
    pub life: u32,
}

impl DamageNumber {
    pub fn new(pos: Vec2, damage: u32, critical: bool) -> Self {
        Self { pos, damage, critical, life: DAMAGE_NUMBER_LIFE }
    }

    pub fn update(&mut self) {
        self.pos.y -= DAMAGE_NUMBER_RISE;
        self.life = self.life.saturating_sub(1);
    }

    pub fn is_dead(&self) -> bool {
        self.life == 0
    }
}

/// Everything purely cosmetic, bundled so subsystems can emit effects
/// without touching gameplay state.
#[derive(Clone, Debug, Default)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub damage_numbers: Vec<DamageNumber>,
    pub screen_shake: u32,
}

impl Effects {
    pub fn burst(
        &mut self,
        rng: &mut impl Rng,
        pos: Vec2,
        color: [u8; 3],
        count: usize,
        velocity_range: f32,
        gravity: bool,
    ) {
        for _ in 0..count {
            self.particles.push(Particle::new(rng, pos, color, velocity_range, gravity));
        }
    }

    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.update();
        }
        self.particles.retain(|p| !p.is_dead());

        for dn in &mut self.damage_numbers {
            dn.update();
        }
        self.damage_numbers.retain(|dn| !dn.is_dead());

        self.screen_shake = self.screen_shake.saturating_sub(1);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub score: u32,
    pub kills: u32,
}

// ── Master game state ────────────────────────────────────────────────────────

/// The whole run. Rebuilt from scratch on restart except for `stats`,
/// which carries the persisted profile across runs.
#[derive(Debug)]
pub struct GameState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<EnemyProjectile>,
    pub powerups: Vec<Powerup>,
    pub effects: Effects,
    pub tally: Tally,
    pub waves: WaveState,
    pub weapons: WeaponSystem,
    pub combat: CombatSystem,
    pub stats: StatsTracker,
    /// Offers on screen while `status == Upgrade`.
    pub pending_upgrades: Vec<Upgrade>,
    pub status: GameStatus,
    pub frame: u64,
    pub arena: Arena,
    pub catalog: Arc<Catalog>,
}

impl GameState {
    pub fn now_ms(&self) -> u64 {
        self.arena.elapsed_ms(self.frame)
    }

    /// Split into the firing-side view: the weapon and combat systems plus
    /// the slice of world they are allowed to touch.
    pub fn arms(&mut self) -> (&mut WeaponSystem, &mut CombatSystem, Battle<'_>) {
        (
            &mut self.weapons,
            &mut self.combat,
            Battle {
                player: &mut self.player,
                enemies: &mut self.enemies,
                powerups: &mut self.powerups,
                effects: &mut self.effects,
                tally: &mut self.tally,
            },
        )
    }

    /// View used by the collision pass.
    pub fn contacts(&mut self) -> Contacts<'_> {
        Contacts {
            player: &mut self.player,
            enemies: &self.enemies,
            projectiles: &mut self.projectiles,
            powerups: &mut self.powerups,
            effects: &mut self.effects,
            combat: &mut self.combat,
            weapons: &mut self.weapons,
            catalog: &self.catalog,
        }
    }
}
