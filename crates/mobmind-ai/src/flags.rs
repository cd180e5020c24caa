//! Bitmasks describing how a mob perceives, moves and idles.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Detection channels that can trigger unprovoked hostility.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Aggro: u16 {
        /// Sees targets in front of it
        const SIGHT        = 1 << 0;
        /// Hears targets that are not sneaking
        const HEARING      = 1 << 1;
        /// Notices wounded targets
        const LOW_HP       = 1 << 2;
        /// Sees through invisibility
        const TRUE_SIGHT   = 1 << 3;
        /// Hears through sneak
        const TRUE_HEARING = 1 << 4;
        /// Notices spellcasting
        const MAGIC        = 1 << 5;
        /// Notices weapon skills
        const WEAPONSKILL  = 1 << 6;
        /// Notices job abilities
        const JOB_ABILITY  = 1 << 7;
        /// Tracks by scent
        const SCENT        = 1 << 8;
    }
}

bitflags! {
    /// Movement and positioning quirks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Behaviour: u8 {
        /// Never turns to face its target
        const NO_TURN      = 1 << 0;
        /// Keeps its distance instead of closing to melee
        const STANDBACK    = 1 << 1;
        /// Aggroes anything that walks right up to it
        const AGGRO_AMBUSH = 1 << 2;
    }
}

bitflags! {
    /// Idle posture and roaming modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RoamFlags: u8 {
        /// Ignores enmity and claims while roaming
        const IGNORE  = 1 << 0;
        /// Waits hidden underground
        const AMBUSH  = 1 << 1;
        /// Hides its name and cannot be targeted
        const STEALTH = 1 << 2;
        /// Roam action is driven by a script
        const EVENT   = 1 << 3;
        /// Burrows before moving
        const WORM    = 1 << 4;
    }
}

bitflags! {
    /// Encounter-specific flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SpecialFlags: u8 {
        /// Special skill is only usable while the name is hidden
        const HIDDEN = 1 << 0;
    }
}

bitflags! {
    /// Fields the network layer should resend.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UpdateMask: u8 {
        /// Position changed
        const POSITION = 1 << 0;
        /// Status or posture changed
        const STATUS   = 1 << 1;
        /// HP or visibility changed
        const HP       = 1 << 2;
    }
}
