use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use shopgate_core::{DomainResult, Entity, StoreError, StoreResult};

use crate::RecordError;

/// Keyed record store abstraction.
///
/// `update` runs the mutation under the store's write guard and applies it to
/// a copy, so a rejected mutation leaves the stored record untouched.
pub trait RecordStore<V: Entity>: Send + Sync {
    fn get(&self, id: V::Id) -> StoreResult<Option<V>>;
    /// Fails with `StoreError::Conflict` when the id is already taken.
    fn insert(&self, value: V) -> StoreResult<()>;
    fn update<F>(&self, id: V::Id, mutate: F) -> Result<V, RecordError>
    where
        F: FnOnce(&mut V) -> DomainResult<()>;
    fn remove(&self, id: V::Id) -> StoreResult<V>;
    fn list(&self) -> StoreResult<Vec<V>>;

    fn filter<P>(&self, predicate: P) -> StoreResult<Vec<V>>
    where
        P: Fn(&V) -> bool,
    {
        let mut values = self.list()?;
        values.retain(|v| predicate(v));
        Ok(values)
    }
}

impl<V, S> RecordStore<V> for Arc<S>
where
    V: Entity,
    S: RecordStore<V>,
{
    fn get(&self, id: V::Id) -> StoreResult<Option<V>> {
        (**self).get(id)
    }

    fn insert(&self, value: V) -> StoreResult<()> {
        (**self).insert(value)
    }

    fn update<F>(&self, id: V::Id, mutate: F) -> Result<V, RecordError>
    where
        F: FnOnce(&mut V) -> DomainResult<()>,
    {
        (**self).update(id, mutate)
    }

    fn remove(&self, id: V::Id) -> StoreResult<V> {
        (**self).remove(id)
    }

    fn list(&self) -> StoreResult<Vec<V>> {
        (**self).list()
    }

    fn filter<P>(&self, predicate: P) -> StoreResult<Vec<V>>
    where
        P: Fn(&V) -> bool,
    {
        (**self).filter(predicate)
    }
}

/// In-memory record store for tests/dev.
#[derive(Debug)]
pub struct InMemoryRecordStore<V: Entity> {
    inner: RwLock<HashMap<V::Id, V>>,
}

impl<V: Entity> InMemoryRecordStore<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<V::Id, V>>> {
        self.inner
            .read()
            .map_err(|_| StoreError::unavailable("record store lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<V::Id, V>>> {
        self.inner
            .write()
            .map_err(|_| StoreError::unavailable("record store lock poisoned"))
    }
}

impl<V: Entity> Default for InMemoryRecordStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecordStore<V> for InMemoryRecordStore<V>
where
    V: Entity + Clone + Send + Sync,
    V::Id: Send + Sync,
{
    fn get(&self, id: V::Id) -> StoreResult<Option<V>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn insert(&self, value: V) -> StoreResult<()> {
        let mut map = self.write()?;
        let id = value.id();
        if map.contains_key(&id) {
            return Err(StoreError::conflict(format!("record {id:?} already exists")));
        }
        map.insert(id, value);
        Ok(())
    }

    fn update<F>(&self, id: V::Id, mutate: F) -> Result<V, RecordError>
    where
        F: FnOnce(&mut V) -> DomainResult<()>,
    {
        let mut map = self.write()?;
        let current = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        let mut next = current.clone();
        mutate(&mut next)?;
        *current = next.clone();
        Ok(next)
    }

    fn remove(&self, id: V::Id) -> StoreResult<V> {
        self.write()?.remove(&id).ok_or(StoreError::NotFound)
    }

    /// Records come back in id order (ids are time-ordered).
    fn list(&self) -> StoreResult<Vec<V>> {
        let mut values: Vec<V> = self.read()?.values().cloned().collect();
        values.sort_by_key(|v| v.id());
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopgate_core::{DomainError, ProductId};
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Note {
        id: ProductId,
        text: String,
    }

    impl Entity for Note {
        type Id = ProductId;

        fn id(&self) -> ProductId {
            self.id
        }
    }

    fn note(text: &str) -> Note {
        Note {
            id: ProductId::new(),
            text: text.to_string(),
        }
    }

    fn note_with_id(n: u128, text: &str) -> Note {
        Note {
            id: ProductId::from_uuid(Uuid::from_u128(n)),
            text: text.to_string(),
        }
    }

    #[test]
    fn insert_get_remove() {
        let store = InMemoryRecordStore::new();
        let n = note("hello");
        store.insert(n.clone()).unwrap();

        assert_eq!(store.get(n.id).unwrap(), Some(n.clone()));
        assert_eq!(store.remove(n.id).unwrap(), n);
        assert_eq!(store.get(n.id).unwrap(), None);
        assert_eq!(store.remove(n.id).unwrap_err(), StoreError::NotFound);
    }

    #[test]
    fn duplicate_id_conflicts() {
        let store = InMemoryRecordStore::new();
        let n = note("a");
        store.insert(n.clone()).unwrap();
        assert!(matches!(store.insert(n), Err(StoreError::Conflict(_))));
    }

    #[test]
    fn rejected_update_keeps_previous_value() {
        let store = InMemoryRecordStore::new();
        let n = note("before");
        store.insert(n.clone()).unwrap();

        let err = store
            .update(n.id, |v| {
                v.text = "half-written".to_string();
                Err(DomainError::validation("nope"))
            })
            .unwrap_err();

        assert!(matches!(err, RecordError::Domain(_)));
        assert_eq!(store.get(n.id).unwrap(), Some(n));
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let store: InMemoryRecordStore<Note> = InMemoryRecordStore::new();
        let err = store.update(ProductId::new(), |_| Ok(())).unwrap_err();
        assert_eq!(err, RecordError::Store(StoreError::NotFound));
    }

    #[test]
    fn list_is_in_id_order() {
        let store = InMemoryRecordStore::new();
        let first = note_with_id(1, "first");
        let second = note_with_id(2, "second");
        store.insert(second.clone()).unwrap();
        store.insert(first.clone()).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed, vec![first.clone(), second]);

        let filtered = store.filter(|n| n.text == "first").unwrap();
        assert_eq!(filtered, vec![first]);
    }
}
