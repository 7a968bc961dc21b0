use std::collections::{BTreeMap, HashMap};

use crate::model::{Entity, EntityId};

use super::EngineError;

/// Normalized collection for one entity kind: an id index plus the ids keyed
/// by insertion sequence, so iteration is stable across calls and removal
/// does not shift the rest.
#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    order: BTreeMap<u64, EntityId>,
    entities: HashMap<EntityId, (u64, T)>,
    next_seq: u64,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            order: BTreeMap::new(),
            entities: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let mut store = Self::new();
        store.upsert_many(entities);
        store
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Insert or replace by id. A replaced entity keeps its position.
    pub fn upsert_many(&mut self, entities: impl IntoIterator<Item = T>) {
        for entity in entities {
            let id = entity.id();
            match self.entities.get_mut(&id) {
                Some((_, slot)) => *slot = entity,
                None => {
                    let seq = self.next_seq;
                    self.next_seq += 1;
                    self.order.insert(seq, id);
                    self.entities.insert(id, (seq, entity));
                }
            }
        }
    }

    pub fn upsert_one(&mut self, entity: T) {
        self.upsert_many(std::iter::once(entity));
    }

    /// Remove by id. Absent ids are a no-op.
    pub fn remove_one(&mut self, id: EntityId) -> Option<T> {
        let (seq, removed) = self.entities.remove(&id)?;
        self.order.remove(&seq);
        Some(removed)
    }

    pub fn get_by_id(&self, id: EntityId) -> Option<&T> {
        self.entities.get(&id).map(|(_, entity)| entity)
    }

    /// Like `get_by_id`, but absence is a `NotFound` error naming the kind.
    pub fn require(&self, id: EntityId) -> Result<&T, EngineError> {
        self.get_by_id(id)
            .ok_or(EngineError::NotFound { kind: T::KIND, id })
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.values().filter_map(|id| self.get_by_id(*id))
    }

    /// Snapshot of every entity in insertion order.
    pub fn get_all(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    pub fn max_id(&self) -> Option<EntityId> {
        self.entities.keys().copied().max()
    }
}
