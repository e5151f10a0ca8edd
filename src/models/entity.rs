//! The closed set of entity kinds and the `Entity` sum type over them

use serde::{Deserialize, Serialize};
use std::fmt;

use super::*;

macro_rules! entity_kinds {
    ($($variant:ident => $tag:literal),+ $(,)?) => {
        /// Every kind of entity that can appear in a metadata document
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum EntityKind {
            $($variant),+
        }

        impl EntityKind {
            pub const ALL: &'static [EntityKind] = &[$(EntityKind::$variant),+];

            /// Element tag used in the current dialect
            pub fn tag(&self) -> &'static str {
                match self {
                    $(EntityKind::$variant => $tag),+
                }
            }
        }

        /// An entity of any kind
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "kind")]
        pub enum Entity {
            $($variant($variant)),+
        }

        impl Entity {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Entity::$variant(_) => EntityKind::$variant),+
                }
            }

            /// Business-key equality; entities of different kinds are never the same
            pub fn same_entity(&self, other: &Entity) -> bool {
                match (self, other) {
                    $((Entity::$variant(a), Entity::$variant(b)) => a.same_entity(b),)+
                    _ => false,
                }
            }
        }

        $(
            impl From<$variant> for Entity {
                fn from(value: $variant) -> Self {
                    Entity::$variant(value)
                }
            }
        )+
    };
}

entity_kinds! {
    CommentTag => "CommentTag",
    DataContainer => "DataContainer",
    DataContainerGroup => "DataContainerGroup",
    DataProducer => "DataProducer",
    DataProducerGroup => "DataProducerGroup",
    Device => "Device",
    DeviceType => "DeviceType",
    Event => "Event",
    HeaderDescription => "HeaderDescription",
    Keyword => "Keyword",
    Person => "Person",
    RecordDescription => "RecordDescription",
    RecordVariable => "RecordVariable",
    Resource => "Resource",
    ResourceBlob => "ResourceBLOB",
    ResourceType => "ResourceType",
    Software => "Software",
    StandardDomain => "StandardDomain",
    StandardKeyword => "StandardKeyword",
    StandardReferenceScale => "StandardReferenceScale",
    StandardUnit => "StandardUnit",
    StandardVariable => "StandardVariable",
    UserGroup => "UserGroup",
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Entity {
    pub fn as_data_producer(&self) -> Option<&DataProducer> {
        match self {
            Entity::DataProducer(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_data_container(&self) -> Option<&DataContainer> {
        match self {
            Entity::DataContainer(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_device(&self) -> Option<&Device> {
        match self {
            Entity::Device(d) => Some(d),
            _ => None,
        }
    }

    /// Persistent identifier, if the entity has been stored
    pub fn id(&self) -> Option<i64> {
        match self {
            Entity::CommentTag(e) => e.id,
            Entity::DataContainer(e) => e.id,
            Entity::DataContainerGroup(e) => e.id,
            Entity::DataProducer(e) => e.id,
            Entity::DataProducerGroup(e) => e.id,
            Entity::Device(e) => e.id,
            Entity::DeviceType(e) => e.id,
            Entity::Event(e) => e.id,
            Entity::HeaderDescription(e) => e.id,
            Entity::Keyword(e) => e.id,
            Entity::Person(e) => e.id,
            Entity::RecordDescription(e) => e.id,
            Entity::RecordVariable(e) => e.id,
            Entity::Resource(e) => e.id,
            Entity::ResourceBlob(e) => e.id,
            Entity::ResourceType(e) => e.id,
            Entity::Software(e) => e.id,
            Entity::StandardDomain(e) => e.id,
            Entity::StandardKeyword(e) => e.id,
            Entity::StandardReferenceScale(e) => e.id,
            Entity::StandardUnit(e) => e.id,
            Entity::StandardVariable(e) => e.id,
            Entity::UserGroup(e) => e.id,
        }
    }

    pub fn set_id(&mut self, id: Option<i64>) {
        let slot = match self {
            Entity::CommentTag(e) => &mut e.id,
            Entity::DataContainer(e) => &mut e.id,
            Entity::DataContainerGroup(e) => &mut e.id,
            Entity::DataProducer(e) => &mut e.id,
            Entity::DataProducerGroup(e) => &mut e.id,
            Entity::Device(e) => &mut e.id,
            Entity::DeviceType(e) => &mut e.id,
            Entity::Event(e) => &mut e.id,
            Entity::HeaderDescription(e) => &mut e.id,
            Entity::Keyword(e) => &mut e.id,
            Entity::Person(e) => &mut e.id,
            Entity::RecordDescription(e) => &mut e.id,
            Entity::RecordVariable(e) => &mut e.id,
            Entity::Resource(e) => &mut e.id,
            Entity::ResourceBlob(e) => &mut e.id,
            Entity::ResourceType(e) => &mut e.id,
            Entity::Software(e) => &mut e.id,
            Entity::StandardDomain(e) => &mut e.id,
            Entity::StandardKeyword(e) => &mut e.id,
            Entity::StandardReferenceScale(e) => &mut e.id,
            Entity::StandardUnit(e) => &mut e.id,
            Entity::StandardVariable(e) => &mut e.id,
            Entity::UserGroup(e) => &mut e.id,
        };
        *slot = id;
    }
}
