//! Hit resolution: damage, crits, kill confirmation, combo scoring and drops.

use glam::Vec2;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::enemy::Enemy;
use crate::entities::{DamageNumber, Effects, Player, Powerup, PowerupKind, Tally};

pub const COMBO_WINDOW: u32 = 180;
pub const HITMARKER_FRAMES: u32 = 10;
pub const SCREEN_FLASH_FRAMES: u32 = 5;
pub const DROP_CHANCE: f64 = 0.3;

pub const KILL_SHAKE: u32 = 6;
pub const HIT_SHAKE: u32 = 2;
const DEATH_PARTICLES: usize = 25;
const SPARK_PARTICLES: usize = 5;
const SPARK_COLOR: [u8; 3] = [255, 255, 100];

/// The part of the world a shot may touch.
pub struct Battle<'a> {
    pub player: &'a mut Player,
    pub enemies: &'a mut Vec<Enemy>,
    pub powerups: &'a mut Vec<Powerup>,
    pub effects: &'a mut Effects,
    pub tally: &'a mut Tally,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitOutcome {
    pub enemy_id: u32,
    pub damage: u32,
    pub critical: bool,
    pub killed: bool,
    /// Score awarded by this hit (zero unless it killed).
    pub score: u32,
}

#[derive(Clone, Debug, Default)]
pub struct CombatSystem {
    pub combo: u32,
    pub combo_timer: u32,
    /// Longest streak this run.
    pub best_combo: u32,
    pub hitmarker_timer: u32,
    pub screen_flash: u32,
}

/// Kill score with the streak multiplier applied.
pub fn combo_score(score_value: u32, combo: u32) -> u32 {
    let multiplier = 1.0 + 0.1 * f64::from(combo);
    (f64::from(score_value) * multiplier).round() as u32
}

impl CombatSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one hit of `base_damage` against `enemies[target]`.
    ///
    /// Returns `None` when `target` is out of range. A lethal hit removes the
    /// enemy before returning, so indices past `target` shift down by one.
    pub fn resolve_hit(
        &mut self,
        base_damage: u32,
        target: usize,
        battle: &mut Battle<'_>,
        rng: &mut impl Rng,
    ) -> Option<HitOutcome> {
        let enemy = battle.enemies.get_mut(target)?;

        let mut damage = (base_damage as f32 * battle.player.damage_multiplier()).floor() as u32;
        let critical = rng.gen::<f32>() < battle.player.crit_chance;
        if critical {
            damage *= 2;
        }

        battle.effects.damage_numbers.push(DamageNumber::new(
            Vec2::new(enemy.center().x, enemy.pos.y),
            damage,
            critical,
        ));

        let killed = enemy.take_damage(damage as i32);
        let enemy_id = enemy.id;
        let center = enemy.center();
        let color = enemy.color;
        let score_value = enemy.score_value;

        let mut score = 0;
        if killed {
            battle.tally.kills += 1;
            self.combo += 1;
            self.combo_timer = COMBO_WINDOW;
            self.best_combo = self.best_combo.max(self.combo);
            score = combo_score(score_value, self.combo);
            battle.tally.score += score;

            if battle.player.lifesteal > 0 {
                battle.player.heal(battle.player.lifesteal);
            }

            battle.effects.burst(rng, center, color, DEATH_PARTICLES, 6.0, true);
            if rng.gen_bool(DROP_CHANCE) {
                if let Some(kind) = PowerupKind::ALL.choose(rng) {
                    battle.powerups.push(Powerup::new(center, *kind));
                }
            }

            battle.enemies.remove(target);
            battle.effects.screen_shake = KILL_SHAKE;
            debug!("enemy {enemy_id} killed, combo {}", self.combo);
        } else {
            battle.effects.burst(rng, center, SPARK_COLOR, SPARK_PARTICLES, 2.0, false);
            battle.effects.screen_shake = HIT_SHAKE;
        }

        self.hitmarker_timer = HITMARKER_FRAMES;
        self.screen_flash = SCREEN_FLASH_FRAMES;

        Some(HitOutcome { enemy_id, damage, critical, killed, score })
    }

    /// The player took real damage: the streak is over.
    pub fn break_combo(&mut self) {
        self.combo = 0;
        self.combo_timer = 0;
    }

    pub fn update(&mut self) {
        if self.combo > 0 {
            self.combo_timer = self.combo_timer.saturating_sub(1);
            if self.combo_timer == 0 {
                self.combo = 0;
            }
        }
        self.hitmarker_timer = self.hitmarker_timer.saturating_sub(1);
        self.screen_flash = self.screen_flash.saturating_sub(1);
    }
}
