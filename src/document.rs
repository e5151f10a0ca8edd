//! Document-level entry points and the per-parse result structure

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::MarshalConfig;
use crate::dispatch::{self, DESCRIPTION_TAG};
use crate::error::Result;
use crate::export::XmlBuilder;
use crate::import::ObjectBuilder;
use crate::models::{DataProducer, Device, Entity, EntityKind};
use crate::xml::XmlElement;

/// Top-level entities of one parsed document, bucketed by kind.
///
/// Each bucket behaves as an ordered set under business-key equality: the first
/// occurrence wins and later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedDocument {
    buckets: BTreeMap<EntityKind, Vec<Entity>>,
}

impl ParsedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entity` to its kind's bucket. Returns false if it was a duplicate.
    pub fn insert(&mut self, entity: Entity) -> bool {
        let bucket = self.buckets.entry(entity.kind()).or_default();
        if bucket.iter().any(|existing| existing.same_entity(&entity)) {
            return false;
        }
        bucket.push(entity);
        true
    }

    pub fn get(&self, kind: EntityKind) -> &[Entity] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every entity, grouped by kind
    pub fn list_all(&self) -> Vec<&Entity> {
        self.buckets.values().flatten().collect()
    }

    pub fn list_data_producers(&self) -> Vec<&DataProducer> {
        self.get(EntityKind::DataProducer)
            .iter()
            .filter_map(Entity::as_data_producer)
            .collect()
    }

    pub fn list_devices(&self) -> Vec<&Device> {
        self.get(EntityKind::Device)
            .iter()
            .filter_map(Entity::as_device)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entities per non-empty kind
    pub fn counts(&self) -> BTreeMap<EntityKind, usize> {
        self.buckets
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(kind, bucket)| (*kind, bucket.len()))
            .collect()
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.buckets.into_values().flatten().collect()
    }
}

/// Rewrite a root whose only child is a DataProducerGroup so that the group's
/// DataProducers become root children, each holding the (now childless) group.
///
/// Returns whether the tree was changed. Documents with any other shape, including
/// several top-level groups or a group with no child elements, are left untouched.
pub fn invert_single_group(root: &mut XmlElement) -> bool {
    if root.children.len() != 1
        || !root.children[0].has_tag("DataProducerGroup")
        || root.children[0].children.is_empty()
    {
        return false;
    }
    let Some(mut group) = root.children.pop() else {
        return false;
    };

    let members = std::mem::take(&mut group.children);
    let mut producers = Vec::new();
    for member in members {
        if member.has_tag(DESCRIPTION_TAG) {
            group.set_attribute(DESCRIPTION_TAG, member.text_content());
        } else if dispatch::DATA_PRODUCER_TAGS
            .iter()
            .any(|tag| member.has_tag(tag))
        {
            producers.push(member);
        } else {
            debug!(
                "Dropping <{}> from inverted DataProducerGroup at line {}",
                member.name, member.line
            );
        }
    }

    info!(
        "Inverting DataProducerGroup {:?} over {} DataProducer(s)",
        group.attribute("name").unwrap_or_default(),
        producers.len()
    );
    for mut producer in producers {
        producer.push_child(group.clone());
        root.push_child(producer);
    }
    true
}

/// Parse a `<Metadata>` document into its top-level entities
pub fn parse_document(xml_text: &str, config: &MarshalConfig) -> Result<ParsedDocument> {
    ObjectBuilder::new(config.clone()).unmarshal(xml_text)
}

/// Serialize `entities` as the children of a `<Metadata>` document, in order
pub fn serialize_document(entities: &[Entity], config: &MarshalConfig) -> Result<String> {
    let mut builder = XmlBuilder::new(config.clone());
    builder.extend(entities.iter().cloned());
    builder.to_xml_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Keyword;
    use crate::xml::parse_str;

    #[test]
    fn test_insert_suppresses_duplicates() {
        let mut document = ParsedDocument::new();
        assert!(document.insert(Keyword::named("ctd").into()));
        assert!(!document.insert(Keyword::named("ctd").into()));
        assert!(document.insert(Keyword::named("adcp").into()));
        assert_eq!(document.get(EntityKind::Keyword).len(), 2);
        assert_eq!(document.len(), 2);
        assert!(document.get(EntityKind::Device).is_empty());
    }

    #[test]
    fn test_invert_single_group() {
        let mut root = parse_str(
            r#"<Metadata>
                <DataProducerGroup name="G">
                    <description>moorings</description>
                    <Deployment id="1"/>
                    <Deployment id="2"/>
                </DataProducerGroup>
            </Metadata>"#,
        )
        .unwrap();
        assert!(invert_single_group(&mut root));
        assert_eq!(root.children.len(), 2);
        let group = &root.children[0].children[0];
        assert!(group.has_tag("DataProducerGroup"));
        assert_eq!(group.attribute("description"), Some("moorings"));
        assert!(group.children.is_empty());
    }

    #[test]
    fn test_two_groups_left_alone() {
        let mut root = parse_str(
            r#"<Metadata><DataProducerGroup name="A"/><DataProducerGroup name="B"/></Metadata>"#,
        )
        .unwrap();
        assert!(!invert_single_group(&mut root));
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_childless_group_left_alone() {
        let mut root = parse_str(r#"<Metadata><DataProducerGroup name="G"/></Metadata>"#).unwrap();
        assert!(!invert_single_group(&mut root));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].attribute("name"), Some("G"));
    }
}
