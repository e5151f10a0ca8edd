//! Models module
//!
//! Defines the SSDS metadata entities exchanged through XML documents.
//! Relationships are owned values: a DataProducer owns its output DataContainers
//! and a DataContainer owns the DataProducers consuming it, so every entity graph
//! is a finite tree.

pub mod annotation;
pub mod data_container;
pub mod data_producer;
pub mod device;
pub mod entity;
pub mod person;
pub mod record;
pub mod resource;
pub mod standard;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coercion::VERSION_SENTINEL;

pub use annotation::{Event, Keyword, Software};
pub use data_container::{DataContainer, DataContainerGroup, DataContainerType};
pub use data_producer::{DataProducer, DataProducerGroup, DataProducerType, ROLES};
pub use device::{Device, DeviceType};
pub use entity::{Entity, EntityKind};
pub use person::{Person, UserGroup};
pub use record::{CommentTag, HeaderDescription, RecordDescription, RecordVariable};
pub use resource::{Resource, ResourceBlob, ResourceType};
pub use standard::{
    StandardDomain, StandardKeyword, StandardReferenceScale, StandardUnit, StandardVariable,
};

/// Optimistic-concurrency version counter. Unknown versions hold the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub i64);

impl Version {
    pub const UNKNOWN: Version = Version(VERSION_SENTINEL);

    pub fn is_known(&self) -> bool {
        self.0 != VERSION_SENTINEL
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::UNKNOWN
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Natural-key equality, used to keep membership collections free of duplicates
/// and to find persisted equivalents of transient entities.
pub trait BusinessKey: PartialEq {
    fn same_entity(&self, other: &Self) -> bool;
}

/// Push `item` unless an entity with the same business key is already present.
/// Returns whether the item was added.
pub fn add_unique<T: BusinessKey>(items: &mut Vec<T>, item: T) -> bool {
    if items.iter().any(|existing| existing.same_entity(&item)) {
        return false;
    }
    items.push(item);
    true
}

/// Compare two optional keys; `None` unless both sides carry one.
pub(crate) fn keys_match<K: PartialEq>(a: Option<K>, b: Option<K>) -> Option<bool> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a == b),
        _ => None,
    }
}
