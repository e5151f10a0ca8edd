//! Structural validation of a parsed document tree
//!
//! Checks the tree against the metadata schema's shape before any entity is
//! built: known tags, allowed children per entity kind, wrapper content and
//! attribute values that must coerce. All violations are collected.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::coercion::{self, DateFormat, XmlDateFormat};
use crate::dispatch::{self, TagRole, Wrapper};
use crate::error::ValidityError;
use crate::models::{DataContainerType, DataProducerType, EntityKind};
use crate::xml::XmlElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeType {
    Long,
    Int,
    Double,
    Float,
    Bool,
    Date,
    Base64,
    ContainerType,
    ProducerType,
}

/// Typed attributes, keyed by lowercase name. Names not listed are free text.
static TYPED_ATTRIBUTES: Lazy<HashMap<&'static str, AttributeType>> = Lazy::new(|| {
    use AttributeType::*;
    HashMap::from([
        ("id", Long),
        ("contentlength", Long),
        ("numberofrecords", Long),
        ("recordtype", Long),
        ("columnindex", Long),
        ("sourcesensorid", Long),
        ("byteoffset", Long),
        ("numheaderlines", Int),
        ("original", Bool),
        ("dodsaccessible", Bool),
        ("nonetcdf", Bool),
        ("parseable", Bool),
        ("startdate", Date),
        ("enddate", Date),
        ("minlatitude", Double),
        ("maxlatitude", Double),
        ("minlongitude", Double),
        ("maxlongitude", Double),
        ("nominallatitude", Double),
        ("nominallongitude", Double),
        ("displaymin", Double),
        ("displaymax", Double),
        ("conversionscale", Double),
        ("conversionoffset", Double),
        ("mindepth", Float),
        ("maxdepth", Float),
        ("nominallatitudeaccuracy", Float),
        ("nominallongitudeaccuracy", Float),
        ("nominaldepth", Float),
        ("nominaldepthaccuracy", Float),
        ("nominalbenthicaltitude", Float),
        ("nominalbenthicaltitudeaccuracy", Float),
        ("xoffset", Float),
        ("yoffset", Float),
        ("zoffset", Float),
        ("bytearray", Base64),
        ("datacontainertype", ContainerType),
        ("dataproducertype", ProducerType),
    ])
});

/// Child tags an entity element of `kind` may contain
fn allowed_children(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::DataContainer => &[
            "consumer",
            "destiny",
            "description",
            "DataContainerGroup",
            "HeaderDescription",
            "Keyword",
            "Person",
            "RecordDescription",
            "Resource",
        ],
        EntityKind::DataProducer => &[
            "DataProducer",
            "Deployment",
            "ProcessRun",
            "DataProducerGroup",
            "description",
            "Device",
            "Event",
            "Keyword",
            "output",
            "Person",
            "Resource",
            "Software",
        ],
        EntityKind::Device => &["description", "DeviceType", "Person", "Resource"],
        EntityKind::Resource => &[
            "description",
            "Keyword",
            "Person",
            "ResourceBLOB",
            "ResourceType",
        ],
        EntityKind::Software => &["description", "Person", "Resource"],
        EntityKind::Person => &["UserGroup"],
        EntityKind::HeaderDescription => &["description", "CommentTag"],
        EntityKind::RecordDescription => &["RecordVariable"],
        EntityKind::RecordVariable => &[
            "description",
            "StandardDomain",
            "StandardKeyword",
            "StandardReferenceScale",
            "StandardUnit",
            "StandardVariable",
        ],
        EntityKind::StandardVariable => &["description", "StandardUnit"],
        EntityKind::CommentTag | EntityKind::UserGroup => &[],
        EntityKind::DataContainerGroup
        | EntityKind::DataProducerGroup
        | EntityKind::DeviceType
        | EntityKind::Event
        | EntityKind::Keyword
        | EntityKind::ResourceBlob
        | EntityKind::ResourceType
        | EntityKind::StandardDomain
        | EntityKind::StandardKeyword
        | EntityKind::StandardReferenceScale
        | EntityKind::StandardUnit => &["description"],
    }
}

struct TreeValidator {
    date_format: XmlDateFormat,
    problems: Vec<ValidityError>,
}

impl TreeValidator {
    fn report(&mut self, element: &XmlElement, message: String) {
        self.problems
            .push(ValidityError::new(element.line, element.column, message));
    }

    fn check_entity(&mut self, kind: EntityKind, element: &XmlElement) {
        self.check_attributes(element);
        let allowed = allowed_children(kind);
        for child in &element.children {
            if !allowed.iter().any(|tag| child.has_tag(tag)) {
                self.report(
                    child,
                    format!("<{}> is not allowed inside <{}>", child.name, element.name),
                );
                continue;
            }
            self.check_element(child);
        }
    }

    fn check_wrapper(&mut self, wrapper: Wrapper, element: &XmlElement) {
        let content_tags = wrapper.content_tags();
        match element.children.as_slice() {
            [content] if content_tags.iter().any(|tag| content.has_tag(tag)) => {
                self.check_entity(wrapper.content_kind(), content)
            }
            _ => self.report(
                element,
                format!(
                    "<{}> must contain exactly one of {}",
                    element.name,
                    content_tags.join(", ")
                ),
            ),
        }
    }

    fn check_element(&mut self, element: &XmlElement) {
        match dispatch::resolve_tag(&element.name) {
            Some(TagRole::Entity(kind)) => self.check_entity(kind, element),
            Some(TagRole::Wrapper(wrapper)) => self.check_wrapper(wrapper, element),
            Some(TagRole::Description) => {
                if !element.children.is_empty() {
                    self.report(element, "<description> may only contain text".to_string());
                }
            }
            None => self.report(element, format!("unknown element <{}>", element.name)),
        }
    }

    fn check_attributes(&mut self, element: &XmlElement) {
        for (name, value) in &element.attributes {
            let key = name.to_ascii_lowercase();
            let Some(attribute_type) = TYPED_ATTRIBUTES.get(key.as_str()) else {
                continue;
            };
            if let Some(message) = self.coercion_problem(*attribute_type, name, value) {
                self.report(element, message);
            }
        }
    }

    fn coercion_problem(&self, attribute_type: AttributeType, name: &str, value: &str) -> Option<String> {
        let outcome = match attribute_type {
            AttributeType::Long => coercion::parse_long(name, value).map(|_| ()),
            AttributeType::Int => coercion::parse_int(name, value).map(|_| ()),
            AttributeType::Double => coercion::parse_double(name, value).map(|_| ()),
            AttributeType::Float => coercion::parse_float(name, value).map(|_| ()),
            AttributeType::Bool => coercion::parse_bool(name, value).map(|_| ()),
            AttributeType::Base64 => coercion::decode_base64(name, value).map(|_| ()),
            AttributeType::Date => {
                if self.date_format.parse(value).is_some() {
                    Ok(())
                } else {
                    return Some(format!("attribute {}=\"{}\" is not a valid date", name, value));
                }
            }
            AttributeType::ContainerType => {
                return DataContainerType::parse(value).is_none().then(|| {
                    format!("attribute {}=\"{}\" is not a DataContainer type", name, value)
                });
            }
            AttributeType::ProducerType => {
                return DataProducerType::parse(value).is_none().then(|| {
                    format!("attribute {}=\"{}\" is not a DataProducer type", name, value)
                });
            }
        };
        outcome.err().map(|e| e.to_string())
    }
}

/// Validate a whole document tree, returning every problem found
pub fn validate_tree(root: &XmlElement) -> Vec<ValidityError> {
    let mut validator = TreeValidator {
        date_format: XmlDateFormat,
        problems: Vec::new(),
    };
    if !root.has_tag(dispatch::ROOT_TAG) {
        validator.report(
            root,
            format!("root element must be <{}>, found <{}>", dispatch::ROOT_TAG, root.name),
        );
        return validator.problems;
    }
    for child in &root.children {
        match dispatch::resolve_tag(&child.name) {
            Some(TagRole::Entity(kind)) => validator.check_entity(kind, child),
            _ => validator.report(
                child,
                format!("<{}> is not allowed at the top level", child.name),
            ),
        }
    }
    validator.problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn test_valid_document_has_no_problems() {
        let root = parse_str(
            r#"<Metadata>
                <Deployment id="1" startDate="2004-06-01T00:00:00Z">
                    <Device uuid="d1"><DeviceType name="CTD"/></Device>
                    <output><DataFile uriString="http://x/1" original="true"/></output>
                </Deployment>
            </Metadata>"#,
        )
        .unwrap();
        assert!(validate_tree(&root).is_empty());
    }

    #[test]
    fn test_collects_every_problem() {
        let root = parse_str(
            "<Metadata>\n<Device id=\"abc\">\n<Software name=\"s\"/>\n</Device>\n<Keyword name=\"k\"><Person/></Keyword>\n</Metadata>",
        )
        .unwrap();
        let problems = validate_tree(&root);
        assert_eq!(problems.len(), 3);
        assert_eq!(problems[0].line, 2);
        assert_eq!(problems[1].line, 3);
        assert_eq!(problems[2].line, 5);
    }

    #[test]
    fn test_wrapper_content_checked() {
        let root = parse_str(
            r#"<Metadata><DataFile uriString="u"><destiny><Keyword name="k"/></destiny></DataFile></Metadata>"#,
        )
        .unwrap();
        let problems = validate_tree(&root);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("exactly one"));
    }

    #[test]
    fn test_type_attributes_checked() {
        let root = parse_str(
            r#"<Metadata><DataContainer dataContainerType="Tape"/><DataProducer dataProducerType="ProcessRun"/></Metadata>"#,
        )
        .unwrap();
        let problems = validate_tree(&root);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("Tape"));
    }
}
