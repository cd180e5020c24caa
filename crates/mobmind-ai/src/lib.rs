//! # Mobmind AI
//!
//! Per-tick behaviour controller for hostile mobs in a zone simulation.
//!
//! This crate provides:
//! - The mob model and its tuning (flags, mods, cooldown timers)
//! - Target resolution over an enmity table
//! - Aggro detection (sight, hearing, magic, low HP, job abilities, scent)
//! - Ally linking through a command bus
//! - Combat action selection (special skills, spells, mob skills, movement)
//! - Roaming, leashing home and despawn
//! - A zone registry that ticks every mob and applies cross-mob requests
//!
//! Collaborators (pathfinding, catalogs, scripts, the zone view) are traits
//! so the controller can be driven by a real world or by test fakes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actions;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod context;
pub mod controller;
pub mod detection;
pub mod enmity;
pub mod entity;
pub mod flags;
pub mod hooks;
pub mod linking;
pub mod mob;
pub mod mods;
pub mod pathfind;
pub mod registry;
pub mod roam;
pub mod targeting;
pub mod timers;
pub mod zone;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actions::*;
    pub use crate::catalog::*;
    pub use crate::commands::*;
    pub use crate::config::*;
    pub use crate::context::*;
    pub use crate::controller::*;
    pub use crate::enmity::*;
    pub use crate::entity::*;
    pub use crate::flags::*;
    pub use crate::hooks::*;
    pub use crate::mob::*;
    pub use crate::mods::*;
    pub use crate::pathfind::*;
    pub use crate::registry::*;
    pub use crate::roam::*;
    pub use crate::timers::*;
    pub use crate::zone::*;
}

pub use prelude::*;
