//! Skill and spell lookups plus the mob's own spell repertoire.

use ahash::AHashMap;
use bitflags::bitflags;
use mobmind_common::prelude::*;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Entities a skill or spell may be aimed at.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TargetFlags: u8 {
        /// The user itself
        const SELF         = 1 << 0;
        /// Members of the user's party
        const PLAYER_PARTY = 1 << 1;
        /// The user's battle target
        const ENEMY        = 1 << 2;
    }
}

/// Catalog entry for a mob skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobSkill {
    /// Skill id
    pub id: SkillId,
    /// Valid target classes
    pub targets: TargetFlags,
    /// Maximum distance to the target
    pub range: f32,
    /// Shared cooldown group
    #[serde(default)]
    pub cooldown_group: u16,
    /// Limit-break skills skip the eligibility hook
    #[serde(default)]
    pub limit_break: bool,
}

impl MobSkill {
    /// A skill aimed at the current enemy.
    #[must_use]
    pub fn enemy(id: SkillId, range: f32) -> Self {
        Self {
            id,
            targets: TargetFlags::ENEMY,
            range,
            cooldown_group: 0,
            limit_break: false,
        }
    }

    /// A skill the mob uses on itself.
    #[must_use]
    pub fn self_target(id: SkillId) -> Self {
        Self {
            targets: TargetFlags::SELF,
            ..Self::enemy(id, 0.0)
        }
    }

    /// Marks the skill as a limit break.
    #[must_use]
    pub fn limit_break(mut self) -> Self {
        self.limit_break = true;
        self
    }
}

/// Catalog entry for a spell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellInfo {
    /// Spell id
    pub id: SpellId,
    /// Valid target classes
    pub targets: TargetFlags,
    /// Casting range; also the radius of party redirects
    pub range: f32,
}

/// Lookup of mob skills and skill lists.
pub trait SkillCatalog {
    /// Catalog entry for a skill.
    fn skill(&self, id: SkillId) -> Option<&MobSkill>;

    /// Skills in a list. Unknown lists are empty.
    fn skill_list(&self, list: SkillListId) -> &[SkillId];

    /// Like [`skill`](Self::skill) with a typed missing-data error.
    fn require_skill(&self, id: SkillId) -> Result<&MobSkill, CatalogError> {
        self.skill(id).ok_or(CatalogError::SkillNotFound(id))
    }
}

/// Lookup of spells.
pub trait SpellCatalog {
    /// Catalog entry for a spell.
    fn spell(&self, id: SpellId) -> Option<&SpellInfo>;

    /// Like [`spell`](Self::spell) with a typed missing-data error.
    fn require_spell(&self, id: SpellId) -> Result<&SpellInfo, CatalogError> {
        self.spell(id).ok_or(CatalogError::SpellNotFound(id))
    }
}

/// In-memory skill catalog.
#[derive(Debug, Clone, Default)]
pub struct SkillTable {
    skills: AHashMap<SkillId, MobSkill>,
    lists: AHashMap<SkillListId, Vec<SkillId>>,
}

impl SkillTable {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a skill.
    #[must_use]
    pub fn with_skill(mut self, skill: MobSkill) -> Self {
        self.skills.insert(skill.id, skill);
        self
    }

    /// Adds a skill list.
    #[must_use]
    pub fn with_list(mut self, list: SkillListId, skills: Vec<SkillId>) -> Self {
        self.lists.insert(list, skills);
        self
    }
}

impl SkillCatalog for SkillTable {
    fn skill(&self, id: SkillId) -> Option<&MobSkill> {
        self.skills.get(&id)
    }

    fn skill_list(&self, list: SkillListId) -> &[SkillId] {
        self.lists.get(&list).map_or(&[], Vec::as_slice)
    }
}

/// In-memory spell catalog.
#[derive(Debug, Clone, Default)]
pub struct SpellTable {
    spells: AHashMap<SpellId, SpellInfo>,
}

impl SpellTable {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a spell.
    #[must_use]
    pub fn with_spell(mut self, spell: SpellInfo) -> Self {
        self.spells.insert(spell.id, spell);
        self
    }
}

impl SpellCatalog for SpellTable {
    fn spell(&self, id: SpellId) -> Option<&SpellInfo> {
        self.spells.get(&id)
    }
}

/// The spells a mob knows and how it picks among them.
pub trait SpellRepertoire: Send {
    /// Whether the mob knows any spell.
    fn has_spells(&self) -> bool;

    /// Opening spell for a fight.
    fn aggro_spell(&mut self) -> Option<SpellId>;

    /// Any combat spell.
    fn spell(&mut self) -> Option<SpellId>;

    /// Whether the mob knows a buff.
    fn has_buff_spells(&self) -> bool;

    /// A buff to cast while idle.
    fn buff_spell(&mut self) -> Option<SpellId>;
}

/// How a mob uses a spell it knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellRole {
    /// Opens fights
    Aggro,
    /// General combat spell
    Offensive,
    /// Cast while idle
    Buff,
}

/// Repertoire that picks uniformly among spells of the requested role.
#[derive(Debug, Clone)]
pub struct SpellList {
    spells: Vec<(SpellId, SpellRole)>,
    rng: fastrand::Rng,
}

impl Default for SpellList {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SpellList {
    /// Creates an empty repertoire with a seeded picker.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            spells: Vec::new(),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Teaches a spell.
    #[must_use]
    pub fn with_spell(mut self, spell: SpellId, role: SpellRole) -> Self {
        self.spells.push((spell, role));
        self
    }

    fn pick(&mut self, accept: impl Fn(SpellRole) -> bool) -> Option<SpellId> {
        let candidates: Vec<SpellId> = self
            .spells
            .iter()
            .filter(|(_, role)| accept(*role))
            .map(|(id, _)| *id)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.usize(..candidates.len())])
    }
}

impl SpellRepertoire for SpellList {
    fn has_spells(&self) -> bool {
        !self.spells.is_empty()
    }

    fn aggro_spell(&mut self) -> Option<SpellId> {
        self.pick(|role| role == SpellRole::Aggro)
            .or_else(|| self.pick(|role| role != SpellRole::Buff))
    }

    fn spell(&mut self) -> Option<SpellId> {
        self.pick(|role| role != SpellRole::Buff)
    }

    fn has_buff_spells(&self) -> bool {
        self.spells.iter().any(|(_, role)| *role == SpellRole::Buff)
    }

    fn buff_spell(&mut self) -> Option<SpellId> {
        self.pick(|role| role == SpellRole::Buff)
    }
}
