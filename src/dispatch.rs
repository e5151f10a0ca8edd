//! Element tag ⇄ entity kind resolution, including the legacy dialect aliases
//!
//! | Current tag     | Legacy tag(s)          | Resolves to                  |
//! |-----------------|------------------------|------------------------------|
//! | `DataContainer` | `DataFile`, `DataStream` | DataContainer              |
//! | `DataProducer`  | `Deployment`, `ProcessRun` | DataProducer             |
//! | `consumer`      | `destiny`              | wrapper around a DataProducer |
//! | `output`        | `output`               | wrapper around a DataContainer |

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::models::{DataContainer, DataContainerType, DataProducer, DataProducerType, EntityKind};

pub const DESCRIPTION_TAG: &str = "description";
pub const ROOT_TAG: &str = "Metadata";
pub const OUTPUT_TAG: &str = "output";
pub const CONSUMER_TAG: &str = "consumer";
pub const LEGACY_CONSUMER_TAG: &str = "destiny";

pub const DATA_CONTAINER_TAGS: &[&str] = &["DataContainer", "DataFile", "DataStream"];
pub const DATA_PRODUCER_TAGS: &[&str] = &["DataProducer", "Deployment", "ProcessRun"];

/// Element that wraps exactly one entity to give it a role in its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wrapper {
    /// `<output>` around a DataContainer produced by a DataProducer
    Output,
    /// `<consumer>`/`<destiny>` around a DataProducer reading a DataContainer
    Consumer,
}

impl Wrapper {
    /// Tags accepted inside this wrapper
    pub fn content_tags(&self) -> &'static [&'static str] {
        match self {
            Wrapper::Output => DATA_CONTAINER_TAGS,
            Wrapper::Consumer => DATA_PRODUCER_TAGS,
        }
    }

    pub fn content_kind(&self) -> EntityKind {
        match self {
            Wrapper::Output => EntityKind::DataContainer,
            Wrapper::Consumer => EntityKind::DataProducer,
        }
    }

    pub fn tag(&self, legacy: bool) -> &'static str {
        match (self, legacy) {
            (Wrapper::Output, _) => OUTPUT_TAG,
            (Wrapper::Consumer, false) => CONSUMER_TAG,
            (Wrapper::Consumer, true) => LEGACY_CONSUMER_TAG,
        }
    }
}

/// What an element tag denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRole {
    Entity(EntityKind),
    Wrapper(Wrapper),
    Description,
}

static TAGS: Lazy<HashMap<String, TagRole>> = Lazy::new(|| {
    let mut tags: HashMap<String, TagRole> = EntityKind::ALL
        .iter()
        .map(|kind| (kind.tag().to_ascii_lowercase(), TagRole::Entity(*kind)))
        .collect();
    for alias in &DATA_CONTAINER_TAGS[1..] {
        tags.insert(
            alias.to_ascii_lowercase(),
            TagRole::Entity(EntityKind::DataContainer),
        );
    }
    for alias in &DATA_PRODUCER_TAGS[1..] {
        tags.insert(
            alias.to_ascii_lowercase(),
            TagRole::Entity(EntityKind::DataProducer),
        );
    }
    tags.insert(OUTPUT_TAG.to_string(), TagRole::Wrapper(Wrapper::Output));
    tags.insert(CONSUMER_TAG.to_string(), TagRole::Wrapper(Wrapper::Consumer));
    tags.insert(
        LEGACY_CONSUMER_TAG.to_string(),
        TagRole::Wrapper(Wrapper::Consumer),
    );
    tags.insert(DESCRIPTION_TAG.to_string(), TagRole::Description);
    tags
});

/// Resolve any tag that may appear below the document root
pub fn resolve_tag(tag: &str) -> Option<TagRole> {
    TAGS.get(&tag.to_ascii_lowercase()).copied()
}

/// Entity kind built from an element with this tag
pub fn tag_to_entity(tag: &str) -> Option<EntityKind> {
    match resolve_tag(tag)? {
        TagRole::Entity(kind) => Some(kind),
        _ => None,
    }
}

/// All tags a builder for `kind` accepts
pub fn accepted_tags(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::DataContainer => DATA_CONTAINER_TAGS,
        EntityKind::DataProducer => DATA_PRODUCER_TAGS,
        EntityKind::CommentTag => &["CommentTag"],
        EntityKind::DataContainerGroup => &["DataContainerGroup"],
        EntityKind::DataProducerGroup => &["DataProducerGroup"],
        EntityKind::Device => &["Device"],
        EntityKind::DeviceType => &["DeviceType"],
        EntityKind::Event => &["Event"],
        EntityKind::HeaderDescription => &["HeaderDescription"],
        EntityKind::Keyword => &["Keyword"],
        EntityKind::Person => &["Person"],
        EntityKind::RecordDescription => &["RecordDescription"],
        EntityKind::RecordVariable => &["RecordVariable"],
        EntityKind::Resource => &["Resource"],
        EntityKind::ResourceBlob => &["ResourceBLOB"],
        EntityKind::ResourceType => &["ResourceType"],
        EntityKind::Software => &["Software"],
        EntityKind::StandardDomain => &["StandardDomain"],
        EntityKind::StandardKeyword => &["StandardKeyword"],
        EntityKind::StandardReferenceScale => &["StandardReferenceScale"],
        EntityKind::StandardUnit => &["StandardUnit"],
        EntityKind::StandardVariable => &["StandardVariable"],
        EntityKind::UserGroup => &["UserGroup"],
    }
}

/// DataContainer subtype implied by a legacy tag
pub fn container_type_for_tag(tag: &str) -> Option<DataContainerType> {
    if tag.eq_ignore_ascii_case("DataFile") {
        Some(DataContainerType::File)
    } else if tag.eq_ignore_ascii_case("DataStream") {
        Some(DataContainerType::Stream)
    } else {
        None
    }
}

/// DataProducer subtype implied by a legacy tag
pub fn producer_type_for_tag(tag: &str) -> Option<DataProducerType> {
    if tag.eq_ignore_ascii_case("Deployment") {
        Some(DataProducerType::Deployment)
    } else if tag.eq_ignore_ascii_case("ProcessRun") {
        Some(DataProducerType::ProcessRun)
    } else {
        None
    }
}

pub fn data_container_tag(container: &DataContainer, legacy: bool) -> &'static str {
    match (legacy, container.data_container_type) {
        (false, _) => "DataContainer",
        (true, Some(DataContainerType::Stream)) => "DataStream",
        (true, _) => "DataFile",
    }
}

pub fn data_producer_tag(producer: &DataProducer, legacy: bool) -> &'static str {
    match (legacy, producer.data_producer_type) {
        (false, _) => "DataProducer",
        (true, Some(DataProducerType::ProcessRun)) => "ProcessRun",
        (true, _) => "Deployment",
    }
}
