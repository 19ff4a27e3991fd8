//! Live cached entity views
//!
//! A view tracks every entity that currently carries all of its component
//! types. The [`World`](super::World) keeps one view per distinct type set and
//! updates it incrementally as components come and go.

use super::{ComponentType, Entity};
use std::collections::HashMap;

slotmap::new_key_type! {
    /// Handle to a view cached by a [`World`](super::World)
    pub struct ViewId;
}

/// Compaction kicks in once tombstones outnumber live entries by this margin
const COMPACT_SLACK: usize = 32;

/// Ordered set of entities matching a fixed component type set
///
/// Iteration follows the order in which entities started matching.
/// Membership tests, inserts and removals are O(1); removed entries leave a
/// tombstone that is swept out lazily.
#[derive(Debug)]
pub struct EntityView {
    component_types: Vec<ComponentType>,
    slots: Vec<Option<Entity>>,
    index: HashMap<Entity, usize>,
}

impl EntityView {
    /// `component_types` must already be sorted and deduplicated
    pub(super) fn new(component_types: Vec<ComponentType>) -> Self {
        Self {
            component_types,
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The (sorted) component types every member carries
    pub fn component_types(&self) -> &[ComponentType] {
        &self.component_types
    }

    /// Whether the type set includes `component_type`
    pub fn requires(&self, component_type: ComponentType) -> bool {
        self.component_types.binary_search(&component_type).is_ok()
    }

    /// Whether `entity` is currently tracked
    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    /// Number of tracked entities
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no entity is tracked
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate tracked entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    /// Snapshot copy of the tracked entities
    pub fn to_vec(&self) -> Vec<Entity> {
        self.iter().collect()
    }

    pub(super) fn insert(&mut self, entity: Entity) -> bool {
        if self.index.contains_key(&entity) {
            return false;
        }
        self.index.insert(entity, self.slots.len());
        self.slots.push(Some(entity));
        true
    }

    pub(super) fn remove(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.index.remove(&entity) else {
            return false;
        };
        self.slots[slot] = None;
        if self.slots.len() > self.index.len() * 2 + COMPACT_SLACK {
            self.compact();
        }
        true
    }

    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        for (position, slot) in self.slots.iter().enumerate() {
            if let Some(entity) = slot {
                self.index.insert(*entity, position);
            }
        }
    }
}

impl<'a> IntoIterator for &'a EntityView {
    type Item = Entity;
    type IntoIter = Box<dyn Iterator<Item = Entity> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> EntityView {
        EntityView::new(Vec::new())
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut view = view();
        for id in [5, 1, 9, 3] {
            assert!(view.insert(Entity::new(id)));
        }
        let ids: Vec<u64> = view.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![5, 1, 9, 3]);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut view = view();
        assert!(view.insert(Entity::new(1)));
        assert!(!view.insert(Entity::new(1)));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order_of_survivors() {
        let mut view = view();
        for id in 0..6 {
            view.insert(Entity::new(id));
        }
        assert!(view.remove(Entity::new(2)));
        assert!(!view.remove(Entity::new(2)));
        assert!(!view.contains(Entity::new(2)));
        let ids: Vec<u64> = view.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn test_compaction_preserves_membership_and_order() {
        let mut view = view();
        for id in 0..200 {
            view.insert(Entity::new(id));
        }
        for id in (0..200).filter(|id| id % 4 != 0) {
            view.remove(Entity::new(id));
        }
        assert_eq!(view.len(), 50);
        assert!(view.slots.len() <= view.len() * 2 + COMPACT_SLACK + 1);

        let ids: Vec<u64> = view.iter().map(|e| e.id()).collect();
        let expected: Vec<u64> = (0..200).filter(|id| id % 4 == 0).collect();
        assert_eq!(ids, expected);

        // Index stays valid after compaction
        assert!(view.remove(Entity::new(100)));
        assert!(!view.contains(Entity::new(100)));
        assert!(view.contains(Entity::new(104)));
    }
}
