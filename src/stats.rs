//! Persisted best-stats profile and the once-per-game-over commit guard.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

const PROFILE_FILE: &str = ".pulse_arena_profile.json";

pub fn default_profile_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(PROFILE_FILE)
}

/// Lifetime bests. Missing fields in a stored file take their defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub highest_wave: u32,
    pub total_kills: u32,
    pub best_score: u32,
    pub longest_combo: u32,
    pub games_played: u32,
}

/// Numbers from the run that just ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub wave: u32,
    pub kills: u32,
    pub score: u32,
    pub combo: u32,
}

impl Profile {
    /// Max for bests, sum for totals.
    pub fn merge(&mut self, run: &RunSummary) {
        self.games_played += 1;
        self.highest_wave = self.highest_wave.max(run.wave);
        self.total_kills += run.kills;
        self.best_score = self.best_score.max(run.score);
        self.longest_combo = self.longest_combo.max(run.combo);
    }
}

#[derive(Debug, Default)]
pub struct StatsTracker {
    pub profile: Profile,
    path: Option<PathBuf>,
    committed: bool,
}

impl StatsTracker {
    /// Tracker that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load `path`; a missing or unreadable file starts from defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let profile = if path.exists() {
            load(&path).unwrap_or_else(|e| {
                warn!("{e}; starting a fresh profile");
                Profile::default()
            })
        } else {
            Profile::default()
        };
        Self { profile, path: Some(path), committed: false }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Fold `run` into the profile and persist it. Only the first call per
    /// game over counts; returns whether this call did.
    pub fn commit_run(&mut self, run: &RunSummary) -> bool {
        if self.committed {
            return false;
        }
        self.committed = true;
        self.profile.merge(run);
        info!(
            "run committed: wave {}, {} kills, score {}",
            run.wave, run.kills, run.score
        );
        if let Some(path) = &self.path {
            if let Err(e) = save(path, &self.profile) {
                warn!("{e}; profile not saved");
            }
        }
        true
    }

    /// Arm the guard for the next game over.
    pub fn reset_guard(&mut self) {
        self.committed = false;
    }
}

pub fn load(path: &Path) -> Result<Profile, ProfileError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ProfileError::Io { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&text)?)
}

pub fn save(path: &Path, profile: &Profile) -> Result<(), ProfileError> {
    let io_err = |source| ProfileError::Io { path: path.to_path_buf(), source };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let text = serde_json::to_string_pretty(profile)?;
    fs::write(path, text).map_err(io_err)
}
