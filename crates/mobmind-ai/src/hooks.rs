//! Script hook interface.
//!
//! Encounter scripts may veto skills, pick spells and react to fight, roam
//! and path events. Hooks are synchronous. A hook that fails is logged and
//! treated as if it had declined.

use crate::catalog::MobSkill;
use crate::entity::EntitySnapshot;
use crate::mob::Mob;
use mobmind_common::prelude::*;
use thiserror::Error;
use tracing::warn;

/// Errors a script hook may report.
#[derive(Debug, Error)]
pub enum HookError {
    /// The script raised an error
    #[error("Script error in {hook}: {message}")]
    Script {
        /// Hook that failed
        hook: &'static str,
        /// Script-provided message
        message: String,
    },

    /// The script returned something the hook cannot use
    #[error("Invalid result from {0}")]
    InvalidResult(&'static str),
}

/// Result type alias for hook calls.
pub type HookResult<T> = Result<T, HookError>;

/// Override points for encounter scripts. Every method has a default that
/// leaves behaviour unchanged.
pub trait ScriptHooks: Send + Sync {
    /// Eligibility check before a skill is issued.
    fn on_skill_check(&self, _mob: &Mob, _target: EntityId, _skill: &MobSkill) -> HookResult<bool> {
        Ok(true)
    }

    /// Called every combat tick with the validated target.
    fn on_fight(&self, _mob: &Mob, _target: &EntitySnapshot) -> HookResult<()> {
        Ok(())
    }

    /// Ambient roam notification.
    fn on_roam(&self, _mob: &Mob) -> HookResult<()> {
        Ok(())
    }

    /// Roam action for event-driven mobs.
    fn on_roam_action(&self, _mob: &Mob) -> HookResult<()> {
        Ok(())
    }

    /// A roam waypoint was reached.
    fn on_path(&self, _mob: &Mob) -> HookResult<()> {
        Ok(())
    }

    /// Script-driven spell choice. `None` means cast nothing.
    fn on_magic_prepare(&self, _mob: &Mob, _target: Option<EntityId>) -> HookResult<Option<SpellId>> {
        Ok(None)
    }
}

/// Hooks for mobs without a script.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScripts;

impl ScriptHooks for NoScripts {}

/// Unwraps a hook result, logging a failure and substituting `declined`.
pub(crate) fn or_decline<T>(result: HookResult<T>, mob: EntityId, declined: T) -> T {
    result.unwrap_or_else(|e| {
        warn!(mob = %mob, "Hook failed, treating as declined: {e}");
        declined
    })
}
