//! Error types for Mobmind.

use crate::ids::{SkillId, SpellId};
use thiserror::Error;

/// Top-level error type for Mobmind operations.
#[derive(Debug, Error)]
pub enum MobmindError {
    /// Catalog lookup errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Missing-data errors raised by skill and spell catalogs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Skill id has no catalog entry
    #[error("{0} is not in the skill catalog")]
    SkillNotFound(SkillId),

    /// Spell id has no catalog entry
    #[error("{0} is not in the spell catalog")]
    SpellNotFound(SpellId),
}

/// Result type alias for Mobmind operations.
pub type MobmindResult<T> = Result<T, MobmindError>;
