//! Configuration store: keyed, read-only stat tables.
//!
//! Three categories (enemies, weapons, powerups) are parsed lazily on first
//! access and cached for the lifetime of the store. Nothing mutates a table
//! once it has been loaded. `Catalog` resolves every record the simulation
//! needs up front so a missing key fails at startup, never mid-run.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use glam::Vec2;
use log::debug;
use once_cell::sync::{Lazy, OnceCell};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::enemy::EnemyKind;
use crate::entities::PowerupKind;
use crate::error::ConfigError;
use crate::weapon::Weapon;

const BUILTIN_ENEMIES: &str = include_str!("../data/enemies.json");
const BUILTIN_WEAPONS: &str = include_str!("../data/weapons.json");
const BUILTIN_POWERUPS: &str = include_str!("../data/powerups.json");

/// Weapon presets in the order the front-end binds them to keys 1–5.
/// The first entry is the weapon every run starts with.
pub const WEAPON_KEYS: [&str; 5] = ["rifle", "smg", "shotgun", "railgun", "burst_rifle"];

static BUILTIN: Lazy<ConfigStore> = Lazy::new(ConfigStore::builtin);

// ── Categories & records ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Enemies,
    Weapons,
    Powerups,
}

impl Category {
    pub fn file_name(self) -> &'static str {
        match self {
            Category::Enemies => "enemies.json",
            Category::Weapons => "weapons.json",
            Category::Powerups => "powerups.json",
        }
    }

    fn builtin(self) -> &'static str {
        match self {
            Category::Enemies => BUILTIN_ENEMIES,
            Category::Weapons => BUILTIN_WEAPONS,
            Category::Powerups => BUILTIN_POWERUPS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Enemies => "enemies",
            Category::Weapons => "weapons",
            Category::Powerups => "powerups",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EnemyStats {
    pub size: f32,
    pub base_speed: f32,
    pub health: i32,
    pub damage: u32,
    pub color: [u8; 3],
    pub score_value: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WeaponStats {
    pub name: String,
    pub max_ammo: u32,
    pub damage: u32,
    /// Minimum frames between shots.
    pub fire_rate: u32,
    /// Milliseconds.
    pub reload_time: u32,
    pub spread_count: u32,
    /// Total fan width in radians.
    #[serde(default)]
    pub spread_angle: f32,
    pub charge_frames: u32,
    pub burst_count: u32,
    pub burst_interval: u32,
}

fn unit_multiplier() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PowerupDef {
    pub name: String,
    pub symbol: String,
    pub color: [u8; 3],
    /// Flat amount (health restored).
    #[serde(default)]
    pub amount: u32,
    #[serde(default = "unit_multiplier")]
    pub multiplier: f32,
    /// Frames the effect lasts.
    #[serde(default)]
    pub duration: u32,
}

pub type Table<R> = HashMap<String, R>;

/// A record type stored in one of the keyed tables.
pub trait Record: DeserializeOwned + Clone {
    const CATEGORY: Category;

    /// The cache slot holding this record's table.
    fn table(store: &ConfigStore) -> &OnceCell<Table<Self>>;
}

impl Record for EnemyStats {
    const CATEGORY: Category = Category::Enemies;

    fn table(store: &ConfigStore) -> &OnceCell<Table<Self>> {
        &store.enemies
    }
}

impl Record for WeaponStats {
    const CATEGORY: Category = Category::Weapons;

    fn table(store: &ConfigStore) -> &OnceCell<Table<Self>> {
        &store.weapons
    }
}

impl Record for PowerupDef {
    const CATEGORY: Category = Category::Powerups;

    fn table(store: &ConfigStore) -> &OnceCell<Table<Self>> {
        &store.powerups
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Source {
    Builtin,
    Directory(PathBuf),
}

#[derive(Debug)]
pub struct ConfigStore {
    source: Source,
    enemies: OnceCell<Table<EnemyStats>>,
    weapons: OnceCell<Table<WeaponStats>>,
    powerups: OnceCell<Table<PowerupDef>>,
}

impl ConfigStore {
    /// Store backed by the tables compiled into the binary.
    pub fn builtin() -> Self {
        Self::with_source(Source::Builtin)
    }

    /// Store reading `enemies.json`, `weapons.json` and `powerups.json` from
    /// `dir` on first access.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::with_source(Source::Directory(dir.into()))
    }

    /// Process-wide built-in store.
    pub fn shared() -> &'static ConfigStore {
        &BUILTIN
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            enemies: OnceCell::new(),
            weapons: OnceCell::new(),
            powerups: OnceCell::new(),
        }
    }

    /// Look up `key` in the record's category table.
    pub fn get<R: Record>(&self, key: &str) -> Result<R, ConfigError> {
        self.table::<R>()?
            .get(key)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound {
                category: R::CATEGORY,
                key: key.to_string(),
            })
    }

    /// All keys of a category, sorted.
    pub fn keys<R: Record>(&self) -> Result<Vec<String>, ConfigError> {
        let mut keys: Vec<String> = self.table::<R>()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Whether the record's table has been parsed yet.
    pub fn is_loaded<R: Record>(&self) -> bool {
        R::table(self).get().is_some()
    }

    fn table<R: Record>(&self) -> Result<&Table<R>, ConfigError> {
        R::table(self).get_or_try_init(|| self.load::<R>())
    }

    fn load<R: Record>(&self) -> Result<Table<R>, ConfigError> {
        let category = R::CATEGORY;
        let text = match &self.source {
            Source::Builtin => Cow::Borrowed(category.builtin()),
            Source::Directory(dir) => {
                let path = dir.join(category.file_name());
                let text = fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path, source })?;
                Cow::Owned(text)
            }
        };
        let table: Table<R> = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { category, source })?;
        debug!("loaded {} {category} records", table.len());
        Ok(table)
    }
}

// ── Arena tunables ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub ticks_per_second: u32,
}

impl Default for Arena {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0, ticks_per_second: 60 }
    }
}

impl Arena {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Simulated wall clock: milliseconds elapsed after `frame` ticks.
    pub fn elapsed_ms(&self, frame: u64) -> u64 {
        frame * 1000 / u64::from(self.ticks_per_second.max(1))
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

/// Every record the simulation reads, resolved once.
///
/// Enemy and powerup records are stored in `EnemyKind::ALL` /
/// `PowerupKind::ALL` order, weapons in `WEAPON_KEYS` order.
#[derive(Clone, Debug)]
pub struct Catalog {
    enemies: Vec<EnemyStats>,
    weapons: Vec<Weapon>,
    powerups: Vec<PowerupDef>,
}

impl Catalog {
    pub fn load(store: &ConfigStore) -> Result<Self, ConfigError> {
        let enemies = EnemyKind::ALL
            .iter()
            .map(|kind| store.get::<EnemyStats>(kind.key()))
            .collect::<Result<Vec<_>, _>>()?;
        let weapons = WEAPON_KEYS
            .iter()
            .map(|key| store.get::<WeaponStats>(key).map(|stats| Weapon::from_stats(key, &stats)))
            .collect::<Result<Vec<_>, _>>()?;
        let powerups = PowerupKind::ALL
            .iter()
            .map(|kind| store.get::<PowerupDef>(kind.key()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { enemies, weapons, powerups })
    }

    pub fn enemy(&self, kind: EnemyKind) -> &EnemyStats {
        &self.enemies[kind.index()]
    }

    pub fn powerup(&self, kind: PowerupKind) -> &PowerupDef {
        &self.powerups[kind.index()]
    }

    pub fn weapon(&self, key: &str) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.key == key)
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn default_weapon(&self) -> &Weapon {
        &self.weapons[0]
    }
}
