//! Persistence abstraction
//!
//! The marshaller hands built entity graphs to a DAO and takes graphs from one
//! when serializing. `InMemoryDao` keeps everything in process and matches
//! transient entities against stored ones by business key.

use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{Entity, EntityKind};

/// Error type for persistence operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DaoError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: EntityKind, id: i64 },
    #[error("{0} is not persistent")]
    NotPersistent(EntityKind),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Lookup and storage operations per entity kind
pub trait MetadataDao {
    /// Fetch a stored entity by its identifier
    fn find_by_id(&self, kind: EntityKind, id: i64) -> Result<Option<Entity>, DaoError>;

    /// Identifier of the stored entity with the same business key, if any
    fn find_id(&self, entity: &Entity) -> Result<Option<i64>, DaoError>;

    /// Store `entity`, updating an existing equivalent. Returns the assigned id.
    fn make_persistent(&mut self, entity: Entity) -> Result<i64, DaoError>;

    /// Remove the stored equivalent of `entity`
    fn make_transient(&mut self, entity: &Entity) -> Result<(), DaoError>;
}

#[derive(Debug, Default)]
pub struct InMemoryDao {
    store: BTreeMap<EntityKind, Vec<Entity>>,
    next_id: i64,
}

impl InMemoryDao {
    pub fn new() -> Self {
        Self {
            store: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.store.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the stored equivalent of `entity` within its kind
    fn position(&self, entity: &Entity) -> Option<usize> {
        let stored = self.store.get(&entity.kind())?;
        if let Some(id) = entity.id() {
            if let Some(index) = stored.iter().position(|e| e.id() == Some(id)) {
                return Some(index);
            }
        }
        // Keyless kinds compare by value, so ids must not take part.
        let mut probe = entity.clone();
        probe.set_id(None);
        stored.iter().position(|e| {
            let mut candidate = e.clone();
            candidate.set_id(None);
            candidate.same_entity(&probe)
        })
    }
}

impl MetadataDao for InMemoryDao {
    fn find_by_id(&self, kind: EntityKind, id: i64) -> Result<Option<Entity>, DaoError> {
        Ok(self
            .store
            .get(&kind)
            .and_then(|stored| stored.iter().find(|e| e.id() == Some(id)))
            .cloned())
    }

    fn find_id(&self, entity: &Entity) -> Result<Option<i64>, DaoError> {
        Ok(self
            .position(entity)
            .and_then(|index| self.store[&entity.kind()][index].id()))
    }

    fn make_persistent(&mut self, mut entity: Entity) -> Result<i64, DaoError> {
        let kind = entity.kind();
        if let Some(index) = self.position(&entity) {
            let stored = self
                .store
                .get_mut(&kind)
                .ok_or(DaoError::NotPersistent(kind))?;
            let id = stored[index]
                .id()
                .ok_or_else(|| DaoError::BackendError(format!("stored {} has no id", kind)))?;
            entity.set_id(Some(id));
            stored[index] = entity;
            debug!("Updated {} {}", kind, id);
            return Ok(id);
        }

        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = self.next_id.max(1);
                self.next_id = id + 1;
                id
            }
        };
        self.next_id = self.next_id.max(id + 1);
        entity.set_id(Some(id));
        self.store.entry(kind).or_default().push(entity);
        debug!("Stored new {} {}", kind, id);
        Ok(id)
    }

    fn make_transient(&mut self, entity: &Entity) -> Result<(), DaoError> {
        let kind = entity.kind();
        let index = self
            .position(entity)
            .ok_or(DaoError::NotPersistent(kind))?;
        if let Some(stored) = self.store.get_mut(&kind) {
            stored.remove(index);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Device, Keyword};

    #[test]
    fn test_make_persistent_assigns_ids() {
        let mut dao = InMemoryDao::new();
        let first = dao.make_persistent(Keyword::named("ctd").into()).unwrap();
        let second = dao.make_persistent(Keyword::named("adcp").into()).unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(dao.len(), 2);
    }

    #[test]
    fn test_business_key_lookup_updates_in_place() {
        let mut dao = InMemoryDao::new();
        let device = Device {
            uuid: Some("1234".to_string()),
            ..Default::default()
        };
        let id = dao.make_persistent(device.clone().into()).unwrap();

        let renamed = Device {
            name: Some("CTD 911".to_string()),
            ..device
        };
        assert_eq!(dao.find_id(&renamed.clone().into()).unwrap(), Some(id));
        assert_eq!(dao.make_persistent(renamed.into()).unwrap(), id);
        assert_eq!(dao.len(), 1);

        let stored = dao.find_by_id(EntityKind::Device, id).unwrap().unwrap();
        assert_eq!(stored.as_device().unwrap().name.as_deref(), Some("CTD 911"));
    }

    #[test]
    fn test_make_transient() {
        let mut dao = InMemoryDao::new();
        dao.make_persistent(Keyword::named("ctd").into()).unwrap();
        dao.make_transient(&Keyword::named("ctd").into()).unwrap();
        assert!(dao.is_empty());
        assert_eq!(
            dao.make_transient(&Keyword::named("ctd").into()),
            Err(DaoError::NotPersistent(EntityKind::Keyword))
        );
    }
}
