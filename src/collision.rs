//! Axis-aligned overlap tests and the per-tick collision pass.

use glam::Vec2;
use log::debug;
use rand::Rng;

use crate::combat::CombatSystem;
use crate::config::Catalog;
use crate::enemy::Enemy;
use crate::entities::{
    Effects, EnemyProjectile, Player, Powerup, PowerupKind, ACCENT_COLOR, PROJECTILE_DAMAGE,
};
use crate::weapon::WeaponSystem;

pub const CONTACT_SHAKE: u32 = 12;
pub const PROJECTILE_SHAKE: u32 = 8;
const IMPACT_PARTICLES: usize = 15;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// Half-open containment: left/top edges inside, right/bottom outside.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

/// The part of the world the collision pass may touch.
pub struct Contacts<'a> {
    pub player: &'a mut Player,
    pub enemies: &'a [Enemy],
    pub projectiles: &'a mut Vec<EnemyProjectile>,
    pub powerups: &'a mut Vec<Powerup>,
    pub effects: &'a mut Effects,
    pub combat: &'a mut CombatSystem,
    pub weapons: &'a mut WeaponSystem,
    pub catalog: &'a Catalog,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionReport {
    /// Accepted enemy body hits.
    pub contact_hits: u32,
    /// Accepted projectile hits.
    pub projectile_hits: u32,
    pub pickups: Vec<PowerupKind>,
}

impl CollisionReport {
    pub fn player_hit(&self) -> bool {
        self.contact_hits + self.projectile_hits > 0
    }
}

/// Enemy bodies, then enemy projectiles, then powerups.
pub fn check_collisions(world: &mut Contacts<'_>, rng: &mut impl Rng) -> CollisionReport {
    let mut report = CollisionReport::default();

    // ── Enemy contact ────────────────────────────────────────────────────────
    for enemy in world.enemies {
        if !world.player.rect().intersects(&enemy.rect()) {
            continue;
        }
        let direction = enemy.center() - world.player.center();
        if world.player.take_damage(enemy.damage, Some(direction)) {
            report.contact_hits += 1;
            world.effects.screen_shake = CONTACT_SHAKE;
            world.combat.break_combo();
            let center = world.player.center();
            world.effects.burst(rng, center, ACCENT_COLOR, IMPACT_PARTICLES, 4.0, true);
        }
    }

    // ── Enemy projectiles ────────────────────────────────────────────────────
    let player_rect = world.player.rect();
    let mut i = 0;
    while i < world.projectiles.len() {
        let projectile = &world.projectiles[i];
        if !player_rect.contains(projectile.pos) {
            i += 1;
            continue;
        }
        let direction = projectile.dir;
        world.projectiles.remove(i);
        if world.player.take_damage(PROJECTILE_DAMAGE, Some(direction)) {
            report.projectile_hits += 1;
            world.effects.screen_shake = PROJECTILE_SHAKE;
            world.combat.break_combo();
        }
    }

    // ── Powerups ─────────────────────────────────────────────────────────────
    let mut i = 0;
    while i < world.powerups.len() {
        if !player_rect.intersects(&world.powerups[i].rect()) {
            i += 1;
            continue;
        }
        let powerup = world.powerups.remove(i);
        let def = world.catalog.powerup(powerup.kind);
        world.player.apply_powerup(powerup.kind, def);
        if powerup.kind == PowerupKind::Ammo {
            world.weapons.refill();
        }
        world.effects.burst(rng, powerup.pos, def.color, IMPACT_PARTICLES, 4.0, true);
        debug!("picked up {}", def.name);
        report.pickups.push(powerup.kind);
    }

    report
}
