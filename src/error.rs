//! Error types surfaced by the simulation core.
//!
//! Only two failure domains exist: the stat tables (fatal at startup) and the
//! persisted profile (best effort, never fatal).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::Category;

/// Stat-table lookup or load failure. Fatal: the catalog is resolved eagerly
/// at startup, so these never appear mid-run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no `{key}` entry in the {category} table")]
    NotFound { category: Category, key: String },

    #[error("malformed {category} table: {source}")]
    Parse {
        category: Category,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Profile persistence failure. Callers log it and carry on.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("cannot access profile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed profile: {0}")]
    Json(#[from] serde_json::Error),
}
