//! Between-wave upgrade pool, rolling and application.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::entities::Player;
use crate::weapon::WeaponSystem;

/// Offers presented after each cleared wave.
pub const OFFER_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpgradeEffect {
    /// Permanent outgoing damage multiplier.
    DamageMultiplier(f32),
    /// Multiplies reload duration.
    ReloadScale(f32),
    /// Health restored per kill.
    Lifesteal(u32),
    UnlockDash,
    CritBonus(f32),
    /// Raises max health and heals to full.
    MaxHealthBonus(u32),
    /// Multiplies the frames between shots.
    FireRateScale(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Upgrade {
    pub name: &'static str,
    pub description: &'static str,
    pub effect: UpgradeEffect,
}

pub const UPGRADE_POOL: [Upgrade; 7] = [
    Upgrade {
        name: "Damage Surge",
        description: "+15% damage permanently",
        effect: UpgradeEffect::DamageMultiplier(1.15),
    },
    Upgrade {
        name: "Speed Loader",
        description: "25% faster reload",
        effect: UpgradeEffect::ReloadScale(0.75),
    },
    Upgrade {
        name: "Lifesteal",
        description: "+5 HP on every kill",
        effect: UpgradeEffect::Lifesteal(5),
    },
    Upgrade {
        name: "Dash",
        description: "Unlocks the dash ability",
        effect: UpgradeEffect::UnlockDash,
    },
    Upgrade {
        name: "Crit Focus",
        description: "+10% critical chance",
        effect: UpgradeEffect::CritBonus(0.10),
    },
    Upgrade {
        name: "Iron Skin",
        description: "+20 max HP, fully heal",
        effect: UpgradeEffect::MaxHealthBonus(20),
    },
    Upgrade {
        name: "Rapid Fire",
        description: "+10% fire rate",
        effect: UpgradeEffect::FireRateScale(0.9),
    },
];

/// `n` distinct upgrades drawn from the pool.
pub fn roll_upgrades(rng: &mut impl Rng, n: usize) -> Vec<Upgrade> {
    UPGRADE_POOL.choose_multiple(rng, n).copied().collect()
}

fn round_to(value: f32, places: i32) -> f32 {
    let scale = 10f32.powi(places);
    (value * scale).round() / scale
}

pub fn apply(effect: UpgradeEffect, player: &mut Player, weapons: &mut WeaponSystem) {
    match effect {
        UpgradeEffect::DamageMultiplier(m) => {
            player.damage_upgrade = round_to(player.damage_upgrade * m, 3);
        }
        UpgradeEffect::ReloadScale(s) => weapons.reload_scale *= s,
        UpgradeEffect::Lifesteal(hp) => player.lifesteal += hp,
        UpgradeEffect::UnlockDash => player.dash_unlocked = true,
        UpgradeEffect::CritBonus(c) => {
            player.crit_chance = round_to(player.crit_chance + c, 2).min(1.0);
        }
        UpgradeEffect::MaxHealthBonus(hp) => {
            player.max_health += hp;
            player.health = player.max_health;
        }
        UpgradeEffect::FireRateScale(s) => weapons.fire_rate_scale *= s,
    }
}
