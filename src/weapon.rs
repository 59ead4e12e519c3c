//! Weapon presets and the firing state machine.
//!
//! A `Weapon` is an immutable preset; `WeaponSystem` owns the mutable side
//! (ammo, reload, charge, burst queue, fire-rate clock). The firing mode is
//! implied by the preset: charge beats burst beats spread, single otherwise.
//! Every path spends one ammo per discrete shot and resolves its rays through
//! `targeting::resolve_target` and `CombatSystem::resolve_hit`.

use std::collections::HashSet;

use glam::Vec2;
use log::debug;
use rand::Rng;

use crate::combat::{Battle, CombatSystem, HitOutcome};
use crate::config::WeaponStats;
use crate::entities::ACCENT_COLOR;
use crate::targeting::{resolve_target, DEFAULT_CONE, RAILGUN_CONE};

/// Milliseconds per frame at the reference 60 ticks/second, truncated.
pub const MS_PER_FRAME: u64 = 1000 / 60;

pub const SINGLE_CROSSHAIR: u32 = 8;
pub const SPREAD_CROSSHAIR: u32 = 14;
const RAIL_COLOR: [u8; 3] = [120, 200, 255];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireMode {
    Single,
    Burst,
    Spread,
    Charge,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    pub key: String,
    pub name: String,
    pub max_ammo: u32,
    pub damage: u32,
    /// Minimum frames between shots.
    pub fire_rate: u32,
    /// Milliseconds.
    pub reload_time: u32,
    pub spread_count: u32,
    /// Total fan width in radians.
    pub spread_angle: f32,
    pub charge_frames: u32,
    pub burst_count: u32,
    pub burst_interval: u32,
}

impl Weapon {
    pub fn from_stats(key: &str, stats: &WeaponStats) -> Self {
        Self {
            key: key.to_string(),
            name: stats.name.clone(),
            max_ammo: stats.max_ammo,
            damage: stats.damage,
            fire_rate: stats.fire_rate,
            reload_time: stats.reload_time,
            spread_count: stats.spread_count,
            spread_angle: stats.spread_angle,
            charge_frames: stats.charge_frames,
            burst_count: stats.burst_count,
            burst_interval: stats.burst_interval,
        }
    }

    pub fn fire_mode(&self) -> FireMode {
        if self.charge_frames > 0 {
            FireMode::Charge
        } else if self.burst_count > 1 {
            FireMode::Burst
        } else if self.spread_count > 1 {
            FireMode::Spread
        } else {
            FireMode::Single
        }
    }
}

/// What one trigger event (or burst drip) produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ShotReport {
    pub mode: FireMode,
    /// Rays cast.
    pub rays: u32,
    pub hits: Vec<HitOutcome>,
}

#[derive(Clone, Debug)]
pub struct WeaponSystem {
    pub equipped: Weapon,
    pub ammo: u32,
    /// Simulated ms at which the running reload began.
    pub reload_started: Option<u64>,
    pub charge_held: u32,
    pub burst_queue: u32,
    pub burst_tick: u32,
    pub last_shot_ms: Option<u64>,
    /// HUD feedback, decays by one per tick.
    pub crosshair_spread: u32,
    /// Upgrade multipliers; survive weapon swaps.
    pub reload_scale: f32,
    pub fire_rate_scale: f32,
    /// Last aim point, reused by queued burst shots.
    pub aim: Vec2,
}

impl WeaponSystem {
    pub fn new(weapon: Weapon) -> Self {
        Self {
            ammo: weapon.max_ammo,
            equipped: weapon,
            reload_started: None,
            charge_held: 0,
            burst_queue: 0,
            burst_tick: 0,
            last_shot_ms: None,
            crosshair_spread: 0,
            reload_scale: 1.0,
            fire_rate_scale: 1.0,
            aim: Vec2::ZERO,
        }
    }

    /// Swap presets: full magazine, no reload, no charge, no queued burst.
    pub fn equip(&mut self, weapon: Weapon) {
        self.ammo = weapon.max_ammo;
        self.equipped = weapon;
        self.reload_started = None;
        self.charge_held = 0;
        self.burst_queue = 0;
        self.burst_tick = 0;
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_started.is_some()
    }

    pub fn can_fire(&self) -> bool {
        !self.is_reloading() && self.ammo > 0
    }

    pub fn reload_ms(&self) -> u64 {
        (self.equipped.reload_time as f32 * self.reload_scale) as u64
    }

    /// Frames between shots after upgrades, never below one.
    pub fn fire_rate_frames(&self) -> u32 {
        ((self.equipped.fire_rate as f32 * self.fire_rate_scale) as u32).max(1)
    }

    pub fn fire_interval_ms(&self) -> u64 {
        u64::from(self.fire_rate_frames()) * MS_PER_FRAME
    }

    /// Railgun charge progress in `[0, 1]`.
    pub fn charge_pct(&self) -> f32 {
        if self.equipped.charge_frames == 0 {
            return 0.0;
        }
        self.charge_held as f32 / self.equipped.charge_frames as f32
    }

    /// Begin a reload. Refused while already reloading or with a full magazine.
    pub fn start_reload(&mut self, now_ms: u64) -> bool {
        if self.is_reloading() || self.ammo >= self.equipped.max_ammo {
            return false;
        }
        self.reload_started = Some(now_ms);
        self.charge_held = 0;
        debug!("reloading {} ({} ms)", self.equipped.name, self.reload_ms());
        true
    }

    /// Finish the reload once its duration has elapsed. Returns `true` on the
    /// tick the magazine is restored.
    pub fn update_reload(&mut self, now_ms: u64) -> bool {
        match self.reload_started {
            Some(started) if now_ms.saturating_sub(started) >= self.reload_ms() => {
                self.refill();
                debug!("reload complete");
                true
            }
            _ => false,
        }
    }

    /// Full magazine, cancelling any reload in progress.
    pub fn refill(&mut self) {
        self.ammo = self.equipped.max_ammo;
        self.reload_started = None;
    }

    fn fire_rate_ready(&self, now_ms: u64) -> bool {
        match self.last_shot_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.fire_interval_ms(),
            None => true,
        }
    }

    /// Trigger event at `aim`. `held` is `true` for trigger-down (repeated
    /// every tick the trigger stays down) and `false` for trigger-up.
    pub fn trigger(
        &mut self,
        held: bool,
        aim: Vec2,
        now_ms: u64,
        combat: &mut CombatSystem,
        battle: &mut Battle<'_>,
        rng: &mut impl Rng,
    ) -> Option<ShotReport> {
        self.aim = aim;
        let mode = self.equipped.fire_mode();

        if mode == FireMode::Charge {
            if held {
                if self.can_fire() {
                    self.charge_held = (self.charge_held + 1).min(self.equipped.charge_frames);
                }
                return None;
            }
            let charged = self.charge_held >= self.equipped.charge_frames;
            self.charge_held = 0;
            if !charged || !self.can_fire() {
                return None;
            }
            return Some(self.fire_railgun(now_ms, combat, battle, rng));
        }

        if !held || !self.can_fire() || !self.fire_rate_ready(now_ms) {
            return None;
        }

        match mode {
            FireMode::Burst => {
                if self.burst_queue > 0 {
                    return None;
                }
                self.burst_queue = self.equipped.burst_count - 1;
                self.burst_tick = self.equipped.burst_interval;
                Some(self.fire_single(now_ms, combat, battle, rng))
            }
            FireMode::Spread => Some(self.fire_spread(now_ms, combat, battle, rng)),
            _ => Some(self.fire_single(now_ms, combat, battle, rng)),
        }
    }

    /// Per-tick: drip queued burst shots and decay crosshair feedback.
    pub fn update(
        &mut self,
        now_ms: u64,
        combat: &mut CombatSystem,
        battle: &mut Battle<'_>,
        rng: &mut impl Rng,
    ) -> Option<ShotReport> {
        let mut report = None;
        if self.burst_queue > 0 {
            self.burst_tick = self.burst_tick.saturating_sub(1);
            if self.burst_tick == 0 {
                if self.can_fire() {
                    self.burst_queue -= 1;
                    self.burst_tick = self.equipped.burst_interval;
                    report = Some(self.fire_single(now_ms, combat, battle, rng));
                } else {
                    self.burst_queue = 0;
                }
            }
        }
        self.crosshair_spread = self.crosshair_spread.saturating_sub(1);
        report
    }

    // ── Firing paths ─────────────────────────────────────────────────────────

    fn spend_round(&mut self, now_ms: u64) {
        self.ammo -= 1;
        self.last_shot_ms = Some(now_ms);
    }

    fn fire_single(
        &mut self,
        now_ms: u64,
        combat: &mut CombatSystem,
        battle: &mut Battle<'_>,
        rng: &mut impl Rng,
    ) -> ShotReport {
        let origin = battle.player.center();
        battle.effects.burst(rng, origin, ACCENT_COLOR, 8, 3.0, false);
        self.spend_round(now_ms);
        self.crosshair_spread = SINGLE_CROSSHAIR;

        let direction = self.aim - origin;
        let hits = cast(self.equipped.damage, origin, direction, DEFAULT_CONE, combat, battle, rng)
            .into_iter()
            .collect();
        ShotReport { mode: self.equipped.fire_mode(), rays: 1, hits }
    }

    fn fire_spread(
        &mut self,
        now_ms: u64,
        combat: &mut CombatSystem,
        battle: &mut Battle<'_>,
        rng: &mut impl Rng,
    ) -> ShotReport {
        let origin = battle.player.center();
        battle.effects.burst(rng, origin, ACCENT_COLOR, 12, 3.0, false);
        self.spend_round(now_ms);
        self.crosshair_spread = SPREAD_CROSSHAIR;

        let aim = self.aim - origin;
        let base = aim.y.atan2(aim.x);
        let count = self.equipped.spread_count;
        let step = self.equipped.spread_angle / (count - 1) as f32;
        let half = self.equipped.spread_angle / 2.0;

        let mut struck = HashSet::new();
        let mut hits = Vec::new();
        for i in 0..count {
            let ray = Vec2::from_angle(base - half + step * i as f32);
            let Some(target) = resolve_target(origin, ray, battle.enemies.as_slice(), DEFAULT_CONE) else {
                continue;
            };
            if !struck.insert(battle.enemies[target].id) {
                continue;
            }
            if let Some(hit) = combat.resolve_hit(self.equipped.damage, target, battle, rng) {
                hits.push(hit);
            }
        }
        ShotReport { mode: FireMode::Spread, rays: count, hits }
    }

    fn fire_railgun(
        &mut self,
        now_ms: u64,
        combat: &mut CombatSystem,
        battle: &mut Battle<'_>,
        rng: &mut impl Rng,
    ) -> ShotReport {
        let origin = battle.player.center();
        battle.effects.burst(rng, origin, RAIL_COLOR, 20, 5.0, false);
        self.spend_round(now_ms);
        self.crosshair_spread = 0;

        let direction = self.aim - origin;
        let hits = cast(self.equipped.damage, origin, direction, RAILGUN_CONE, combat, battle, rng)
            .into_iter()
            .collect();
        ShotReport { mode: FireMode::Charge, rays: 1, hits }
    }
}

fn cast(
    damage: u32,
    origin: Vec2,
    direction: Vec2,
    cone: f32,
    combat: &mut CombatSystem,
    battle: &mut Battle<'_>,
    rng: &mut impl Rng,
) -> Option<HitOutcome> {
    let target = resolve_target(origin, direction, battle.enemies.as_slice(), cone)?;
    combat.resolve_hit(damage, target, battle, rng)
}
