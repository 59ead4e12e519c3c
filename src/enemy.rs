//! Enemy record and the per-type behaviour engine.
//!
//! Shared fields (health, timers, position) live on `Enemy`; everything that
//! differs by type lives in the `EnemyBehavior` variant injected at spawn.
//! Each tick the behaviour reads an `AiContext` and answers with an `AiStep`:
//! a displacement, an optional shot direction and an optional heal pulse.

use glam::Vec2;
use rand::Rng;

use crate::collision::Rect;
use crate::config::{Arena, EnemyStats};

pub const HIT_FLASH_FRAMES: u32 = 10;
pub const SLOW_FRAMES: u32 = 5;
/// Speed multiplier while the on-hit slow is active.
pub const SLOW_FACTOR: f32 = 0.7;

pub const HEAL_RADIUS: f32 = 120.0;
pub const HEAL_AMOUNT: i32 = 2;
const HEAL_PULSE_FRAMES: u32 = 60;

const SHOOTER_CHASE_RANGE: f32 = 200.0;
const SHOOTER_RETREAT_RANGE: f32 = 150.0;
const SHOOTER_FIRE_RANGE: f32 = 400.0;
const SHOOTER_COOLDOWN: u32 = 90;
const SHOOTER_RETREAT_FACTOR: f32 = 0.7;
const STRAFE_FLIP_CHANCE: f64 = 0.02;

const HUNTER_FLANK_SWITCH: u32 = 120;
const HUNTER_LEAD: f32 = 20.0;
const HUNTER_APPROACH_WEIGHT: f32 = 0.6;
const HUNTER_FLANK_WEIGHT: f32 = 0.4;

const SNIPER_RANGE: f32 = 350.0;
pub const SNIPER_AIM_FRAMES: u32 = 60;
const SNIPER_COOLDOWN: u32 = 120;

const SUPPORT_KEEP_AWAY: f32 = 250.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Rusher,
    Tank,
    Shooter,
    Swarm,
    Hunter,
    Sniper,
    Support,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 7] = [
        EnemyKind::Rusher,
        EnemyKind::Tank,
        EnemyKind::Shooter,
        EnemyKind::Swarm,
        EnemyKind::Hunter,
        EnemyKind::Sniper,
        EnemyKind::Support,
    ];

    /// Key in the enemy stat table.
    pub fn key(self) -> &'static str {
        match self {
            EnemyKind::Rusher => "rusher",
            EnemyKind::Tank => "tank",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Swarm => "swarm",
            EnemyKind::Hunter => "hunter",
            EnemyKind::Sniper => "sniper",
            EnemyKind::Support => "support",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiState {
    Chase,
    Attack,
    Retreat,
    Strafe,
    Flank,
    Aim,
    SupportIdle,
}

/// What the behaviour sees this tick.
#[derive(Clone, Copy, Debug)]
pub struct AiContext {
    pub center: Vec2,
    pub player_center: Vec2,
    /// Unit vector towards the player, zero when standing on it.
    pub to_player: Vec2,
    pub distance: f32,
    /// Wave-scaled speed with the on-hit slow already applied.
    pub speed: f32,
}

/// What the behaviour decided this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AiStep {
    pub state: AiState,
    pub movement: Vec2,
    pub fire: Option<Vec2>,
    pub heal_pulse: bool,
}

impl AiStep {
    fn moving(state: AiState, movement: Vec2) -> Self {
        Self { state, movement, fire: None, heal_pulse: false }
    }
}

// ── Behaviours ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum EnemyBehavior {
    Rusher,
    Tank,
    Swarm,
    Shooter { strafe_dir: f32 },
    Hunter { flank_side: f32, flank_timer: u32 },
    Sniper { aim_timer: u32 },
    Support { heal_tick: u32 },
}

fn random_side(rng: &mut impl Rng) -> f32 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

/// Left-hand perpendicular of `v`.
fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

impl EnemyBehavior {
    pub fn for_kind(kind: EnemyKind, rng: &mut impl Rng) -> Self {
        match kind {
            EnemyKind::Rusher => EnemyBehavior::Rusher,
            EnemyKind::Tank => EnemyBehavior::Tank,
            EnemyKind::Swarm => EnemyBehavior::Swarm,
            EnemyKind::Shooter => EnemyBehavior::Shooter { strafe_dir: random_side(rng) },
            EnemyKind::Hunter => {
                EnemyBehavior::Hunter { flank_side: random_side(rng), flank_timer: 0 }
            }
            EnemyKind::Sniper => EnemyBehavior::Sniper { aim_timer: 0 },
            EnemyKind::Support => EnemyBehavior::Support { heal_tick: 0 },
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self {
            EnemyBehavior::Rusher => EnemyKind::Rusher,
            EnemyBehavior::Tank => EnemyKind::Tank,
            EnemyBehavior::Swarm => EnemyKind::Swarm,
            EnemyBehavior::Shooter { .. } => EnemyKind::Shooter,
            EnemyBehavior::Hunter { .. } => EnemyKind::Hunter,
            EnemyBehavior::Sniper { .. } => EnemyKind::Sniper,
            EnemyBehavior::Support { .. } => EnemyKind::Support,
        }
    }

    /// Lock-on progress in `[0, 1]`; only snipers ever aim.
    pub fn aim_progress(&self) -> f32 {
        match self {
            EnemyBehavior::Sniper { aim_timer } => *aim_timer as f32 / SNIPER_AIM_FRAMES as f32,
            _ => 0.0,
        }
    }

    /// Advance one tick. `shoot_cooldown` is the enemy's shared shot timer,
    /// already decremented for this tick.
    pub fn step(&mut self, ctx: &AiContext, shoot_cooldown: &mut u32, rng: &mut impl Rng) -> AiStep {
        let dir = ctx.to_player;
        let speed = ctx.speed;

        match self {
            EnemyBehavior::Rusher | EnemyBehavior::Tank | EnemyBehavior::Swarm => {
                AiStep::moving(AiState::Chase, dir * speed)
            }

            EnemyBehavior::Shooter { strafe_dir } => {
                let mut step = if ctx.distance > SHOOTER_CHASE_RANGE {
                    AiStep::moving(AiState::Chase, dir * speed)
                } else if ctx.distance < SHOOTER_RETREAT_RANGE {
                    AiStep::moving(AiState::Retreat, -dir * speed * SHOOTER_RETREAT_FACTOR)
                } else {
                    let movement = perp(dir) * speed * *strafe_dir;
                    if rng.gen_bool(STRAFE_FLIP_CHANCE) {
                        *strafe_dir = -*strafe_dir;
                    }
                    AiStep::moving(AiState::Strafe, movement)
                };
                if *shoot_cooldown == 0 && ctx.distance < SHOOTER_FIRE_RANGE {
                    *shoot_cooldown = SHOOTER_COOLDOWN;
                    step.fire = Some(dir);
                }
                step
            }

            EnemyBehavior::Hunter { flank_side, flank_timer } => {
                *flank_timer += 1;
                if *flank_timer >= HUNTER_FLANK_SWITCH {
                    *flank_side = -*flank_side;
                    *flank_timer = 0;
                }
                let predicted = ctx.player_center + dir * HUNTER_LEAD;
                let approach = (predicted - ctx.center).normalize_or_zero();
                let flank = perp(approach) * *flank_side;
                let blend = approach * HUNTER_APPROACH_WEIGHT + flank * HUNTER_FLANK_WEIGHT;
                AiStep::moving(AiState::Flank, blend * speed)
            }

            EnemyBehavior::Sniper { aim_timer } => {
                if ctx.distance > SNIPER_RANGE {
                    *aim_timer = 0;
                    AiStep::moving(AiState::Chase, dir * speed)
                } else if *shoot_cooldown > 0 {
                    *aim_timer = 0;
                    AiStep::moving(AiState::Strafe, perp(dir) * speed * 0.5)
                } else {
                    *aim_timer += 1;
                    let mut step = AiStep::moving(AiState::Aim, Vec2::ZERO);
                    if *aim_timer >= SNIPER_AIM_FRAMES {
                        *aim_timer = 0;
                        *shoot_cooldown = SNIPER_COOLDOWN;
                        step.fire = Some(dir);
                    }
                    step
                }
            }

            EnemyBehavior::Support { heal_tick } => {
                let mut step = if ctx.distance < SUPPORT_KEEP_AWAY {
                    AiStep::moving(AiState::SupportIdle, -dir * speed * 0.5)
                } else {
                    AiStep::moving(AiState::Chase, dir * speed * 0.3)
                };
                *heal_tick += 1;
                if *heal_tick >= HEAL_PULSE_FRAMES {
                    *heal_tick = 0;
                    step.heal_pulse = true;
                }
                step
            }
        }
    }
}

// ── Enemy ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    /// Unique within a run; used to de-duplicate multi-ray hits.
    pub id: u32,
    pub kind: EnemyKind,
    /// Top-left corner.
    pub pos: Vec2,
    pub size: f32,
    pub health: i32,
    pub max_health: i32,
    pub speed: f32,
    /// Contact damage.
    pub damage: u32,
    pub score_value: u32,
    pub color: [u8; 3],
    pub state: AiState,
    pub behavior: EnemyBehavior,
    pub shoot_cooldown: u32,
    pub hit_flash: u32,
    pub slow_timer: u32,
    pub is_boss: bool,
}

impl Enemy {
    /// Build an enemy from its stat record, scaled to `wave`.
    pub fn spawn(
        id: u32,
        kind: EnemyKind,
        pos: Vec2,
        wave: u32,
        stats: &EnemyStats,
        rng: &mut impl Rng,
    ) -> Self {
        let health_scale = 1.0 + f64::from(wave) * 0.1;
        let health = (f64::from(stats.health) * health_scale) as i32;
        Self {
            id,
            kind,
            pos,
            size: stats.size,
            health,
            max_health: health,
            speed: stats.base_speed + wave as f32 * 0.08,
            damage: stats.damage,
            score_value: stats.score_value,
            color: stats.color,
            state: AiState::Chase,
            behavior: EnemyBehavior::for_kind(kind, rng),
            shoot_cooldown: 0,
            hit_flash: 0,
            slow_timer: 0,
            is_boss: false,
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

    pub fn effective_speed(&self) -> f32 {
        if self.slow_timer > 0 {
            self.speed * SLOW_FACTOR
        } else {
            self.speed
        }
    }

    /// One AI tick: count timers down, let the behaviour decide, move, then
    /// clamp to a bound one body-size wider than the arena.
    pub fn update(&mut self, player_center: Vec2, arena: &Arena, rng: &mut impl Rng) -> AiStep {
        let center = self.center();
        let delta = player_center - center;
        let distance = delta.length();
        let to_player = if distance > 0.0 { delta / distance } else { Vec2::ZERO };

        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
        self.hit_flash = self.hit_flash.saturating_sub(1);
        self.slow_timer = self.slow_timer.saturating_sub(1);

        let ctx = AiContext {
            center,
            player_center,
            to_player,
            distance,
            speed: self.effective_speed(),
        };
        let step = self.behavior.step(&ctx, &mut self.shoot_cooldown, rng);

        self.pos += step.movement;
        self.pos.x = self.pos.x.clamp(-self.size, arena.width);
        self.pos.y = self.pos.y.clamp(-self.size, arena.height);
        self.state = step.state;
        step
    }

    /// Returns `true` when the hit was lethal; the caller removes the enemy.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health -= amount;
        self.hit_flash = HIT_FLASH_FRAMES;
        self.slow_timer = SLOW_FRAMES;
        self.health <= 0
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }
}

/// Heal every enemy other than `healer_id` whose centre lies within
/// `HEAL_RADIUS` of `origin`.
pub fn apply_heal_pulse(enemies: &mut [Enemy], healer_id: u32, origin: Vec2) -> usize {
    let mut healed = 0;
    for other in enemies.iter_mut().filter(|e| e.id != healer_id) {
        if other.center().distance(origin) <= HEAL_RADIUS {
            other.heal(HEAL_AMOUNT);
            healed += 1;
        }
    }
    healed
}
