//! Combo Combat Core
//!
//! This crate provides the real-time combo and hit-timing logic for melee combat:
//! - Input buffering with longest-match-first combo recognition
//! - Parity-based attack windows (time-segmented hitbox activation)
//! - Tick-driven controller state machine (buffering → attack → chained combo)
//! - Basic-attack repeat cycling (jab, jab, hook)
//! - Rapier sensor tracking for active hit volumes
//! - Offline-authored move sets (RON/JSON), validated at load time

pub mod combat;
pub mod config;
pub mod constants;
pub mod logging;
