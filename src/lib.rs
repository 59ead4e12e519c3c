//! Pulse Arena simulation core.
//!
//! The binary in `main.rs` is a thin terminal front-end; everything it drives
//! lives here so the integration tests in `tests/` can exercise it headless.

pub mod collision;
pub mod combat;
pub mod compute;
pub mod config;
pub mod enemy;
pub mod entities;
pub mod error;
pub mod logging;
pub mod progression;
pub mod stats;
pub mod targeting;
pub mod upgrade;
pub mod weapon;
