//! Enmity ranking.

use ahash::AHashMap;
use mobmind_common::EntityId;

/// A per-mob ranked table of hostility values.
pub trait EnmityTable: Send {
    /// Entity with the highest enmity, if any.
    fn highest(&self) -> Option<EntityId>;

    /// Removes one entity from the table.
    fn clear(&mut self, id: EntityId);

    /// Removes every entry.
    fn clear_all(&mut self);

    /// Adds the minimal entry a link call produces. Entities already in the
    /// table keep their ranking.
    fn add_link_enmity(&mut self, target: EntityId);

    /// Adds the entry an aggro check produces. Entities already in the
    /// table keep their ranking.
    fn add_base_enmity(&mut self, target: EntityId);

    /// Whether `id` has an entry.
    fn contains(&self, id: EntityId) -> bool;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether the table is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cumulative and volatile hostility toward one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Enmity {
    /// Long-lived hostility
    pub cumulative: u32,
    /// Decaying hostility
    pub volatile: u32,
}

impl Enmity {
    /// Combined ranking value.
    #[must_use]
    pub const fn total(self) -> u32 {
        self.cumulative.saturating_add(self.volatile)
    }
}

/// Hash-map backed enmity table. Ties resolve to the lowest entity id.
#[derive(Debug, Clone, Default)]
pub struct EnmityContainer {
    entries: AHashMap<EntityId, Enmity>,
}

impl EnmityContainer {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds hostility toward `target`, creating the entry if needed.
    pub fn update(&mut self, target: EntityId, cumulative: u32, volatile: u32) {
        let entry = self.entries.entry(target).or_default();
        entry.cumulative = entry.cumulative.saturating_add(cumulative);
        entry.volatile = entry.volatile.saturating_add(volatile);
    }

    /// Current entry for `target`.
    #[must_use]
    pub fn get(&self, target: EntityId) -> Option<Enmity> {
        self.entries.get(&target).copied()
    }
}

impl EnmityTable for EnmityContainer {
    fn highest(&self) -> Option<EntityId> {
        self.entries
            .iter()
            .max_by(|(a_id, a), (b_id, b)| a.total().cmp(&b.total()).then(b_id.cmp(a_id)))
            .map(|(id, _)| *id)
    }

    fn clear(&mut self, id: EntityId) {
        self.entries.remove(&id);
    }

    fn clear_all(&mut self) {
        self.entries.clear();
    }

    fn add_link_enmity(&mut self, target: EntityId) {
        self.entries.entry(target).or_insert(Enmity {
            cumulative: 1,
            volatile: 0,
        });
    }

    fn add_base_enmity(&mut self, target: EntityId) {
        self.entries.entry(target).or_insert(Enmity {
            cumulative: 1,
            volatile: 1,
        });
    }

    fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
