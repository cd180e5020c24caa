//! # Mobmind Common
//!
//! Common types shared by the Mobmind crates:
//! - Spatial types (positions, distances, facing cones)
//! - ID types (EntityId, ZoneId, SkillId, SpellId)
//! - Simulation time (TickTime)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod time;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::time::*;
}

pub use prelude::*;
