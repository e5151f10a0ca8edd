//! Value checks on built entities.
//!
//! These run after unmarshalling (or before persisting) and look at field
//! contents rather than document shape: string lengths and coordinate ranges.
//! Nested entities are checked recursively and every finding is returned.

use serde::Serialize;
use thiserror::Error;

use crate::models::*;

/// Maximum length for entity names
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length for descriptions
pub const MAX_DESCRIPTION_LENGTH: usize = 2048;

/// Maximum length for URIs
pub const MAX_URI_LENGTH: usize = 2048;

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-360.0, 360.0);

/// A field value that fails a check
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum EntityValidationError {
    #[error("{path}.{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        path: String,
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{path}.{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        path: String,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{path}.{field} = {value} must not be negative")]
    Negative {
        path: String,
        field: &'static str,
        value: f64,
    },
}

/// Walks an entity graph and collects every finding
#[derive(Debug, Default)]
pub struct EntityValidator {
    findings: Vec<EntityValidationError>,
}

impl EntityValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(mut self, entity: &Entity) -> Vec<EntityValidationError> {
        let path = entity.kind().tag().to_string();
        self.entity(&path, entity);
        self.findings
    }

    fn entity(&mut self, path: &str, entity: &Entity) {
        match entity {
            Entity::DataContainer(e) => self.data_container(path, e),
            Entity::DataProducer(e) => self.data_producer(path, e),
            Entity::Device(e) => self.device(path, e),
            Entity::Resource(e) => self.resource(path, e),
            Entity::Software(e) => self.software(path, e),
            Entity::RecordDescription(e) => self.record_description(path, e),
            Entity::RecordVariable(e) => self.record_variable(path, e),
            Entity::HeaderDescription(e) => self.description(path, &e.description),
            Entity::Event(e) => self.named(path, &e.name, &e.description),
            Entity::Keyword(e) => self.named(path, &e.name, &e.description),
            Entity::DataContainerGroup(e) => self.named(path, &e.name, &e.description),
            Entity::DataProducerGroup(e) => self.named(path, &e.name, &e.description),
            Entity::DeviceType(e) => self.named(path, &e.name, &e.description),
            Entity::ResourceType(e) => self.named(path, &e.name, &e.description),
            Entity::ResourceBlob(e) => self.named(path, &e.name, &e.description),
            Entity::StandardDomain(e) => self.named(path, &e.name, &e.description),
            Entity::StandardKeyword(e) => self.named(path, &e.name, &e.description),
            Entity::StandardReferenceScale(e) => self.named(path, &e.name, &e.description),
            Entity::StandardUnit(e) => self.named(path, &e.name, &e.description),
            Entity::StandardVariable(e) => self.standard_variable(path, e),
            Entity::Person(_) | Entity::UserGroup(_) | Entity::CommentTag(_) => {}
        }
    }

    fn length(&mut self, path: &str, field: &'static str, value: &Option<String>, max: usize) {
        if let Some(value) = value {
            let actual = value.chars().count();
            if actual > max {
                self.findings.push(EntityValidationError::TooLong {
                    path: path.to_string(),
                    field,
                    max,
                    actual,
                });
            }
        }
    }

    fn range(&mut self, path: &str, field: &'static str, value: Option<f64>, (min, max): (f64, f64)) {
        if let Some(value) = value.filter(|v| !v.is_nan() && !(min..=max).contains(v)) {
            self.findings.push(EntityValidationError::OutOfRange {
                path: path.to_string(),
                field,
                value,
                min,
                max,
            });
        }
    }

    fn depth(&mut self, path: &str, field: &'static str, value: Option<f32>) {
        if let Some(value) = value.filter(|v| *v < 0.0) {
            self.findings.push(EntityValidationError::Negative {
                path: path.to_string(),
                field,
                value: f64::from(value),
            });
        }
    }

    fn description(&mut self, path: &str, description: &Option<String>) {
        self.length(path, "description", description, MAX_DESCRIPTION_LENGTH);
    }

    fn named(&mut self, path: &str, name: &Option<String>, description: &Option<String>) {
        self.length(path, "name", name, MAX_NAME_LENGTH);
        self.description(path, description);
    }

    fn data_container(&mut self, path: &str, dc: &DataContainer) {
        self.named(path, &dc.name, &dc.description);
        self.length(path, "uriString", &dc.uri_string, MAX_URI_LENGTH);
        self.length(path, "dodsUrlString", &dc.dods_url_string, MAX_URI_LENGTH);
        self.range(path, "minLatitude", dc.min_latitude, LATITUDE_RANGE);
        self.range(path, "maxLatitude", dc.max_latitude, LATITUDE_RANGE);
        self.range(path, "minLongitude", dc.min_longitude, LONGITUDE_RANGE);
        self.range(path, "maxLongitude", dc.max_longitude, LONGITUDE_RANGE);
        self.depth(path, "minDepth", dc.min_depth);
        self.depth(path, "maxDepth", dc.max_depth);

        if let Some(header) = &dc.header_description {
            self.description(&format!("{}.HeaderDescription", path), &header.description);
        }
        if let Some(record) = &dc.record_description {
            self.record_description(&format!("{}.RecordDescription", path), record);
        }
        for (i, group) in dc.data_container_groups.iter().enumerate() {
            self.named(
                &format!("{}.DataContainerGroup[{}]", path, i),
                &group.name,
                &group.description,
            );
        }
        for (i, keyword) in dc.keywords.iter().enumerate() {
            self.named(&format!("{}.Keyword[{}]", path, i), &keyword.name, &keyword.description);
        }
        for (i, resource) in dc.resources.iter().enumerate() {
            self.resource(&format!("{}.Resource[{}]", path, i), resource);
        }
        for (i, consumer) in dc.consumers.iter().enumerate() {
            self.data_producer(&format!("{}.consumer[{}]", path, i), consumer);
        }
    }

    fn data_producer(&mut self, path: &str, dp: &DataProducer) {
        self.named(path, &dp.name, &dp.description);
        self.range(path, "nominalLatitude", dp.nominal_latitude, LATITUDE_RANGE);
        self.range(path, "nominalLongitude", dp.nominal_longitude, LONGITUDE_RANGE);
        self.depth(path, "nominalDepth", dp.nominal_depth);

        if let Some(device) = &dp.device {
            self.device(&format!("{}.Device", path), device);
        }
        if let Some(software) = &dp.software {
            self.software(&format!("{}.Software", path), software);
        }
        for (i, child) in dp.child_data_producers.iter().enumerate() {
            self.data_producer(&format!("{}.DataProducer[{}]", path, i), child);
        }
        for (i, group) in dp.data_producer_groups.iter().enumerate() {
            self.named(
                &format!("{}.DataProducerGroup[{}]", path, i),
                &group.name,
                &group.description,
            );
        }
        for (i, event) in dp.events.iter().enumerate() {
            self.named(&format!("{}.Event[{}]", path, i), &event.name, &event.description);
        }
        for (i, keyword) in dp.keywords.iter().enumerate() {
            self.named(&format!("{}.Keyword[{}]", path, i), &keyword.name, &keyword.description);
        }
        for (i, resource) in dp.resources.iter().enumerate() {
            self.resource(&format!("{}.Resource[{}]", path, i), resource);
        }
        for (i, output) in dp.outputs.iter().enumerate() {
            self.data_container(&format!("{}.output[{}]", path, i), output);
        }
    }

    fn device(&mut self, path: &str, device: &Device) {
        self.named(path, &device.name, &device.description);
        self.length(path, "infoUrlList", &device.info_url_list, MAX_URI_LENGTH);
        if let Some(device_type) = &device.device_type {
            self.named(
                &format!("{}.DeviceType", path),
                &device_type.name,
                &device_type.description,
            );
        }
        for (i, resource) in device.resources.iter().enumerate() {
            self.resource(&format!("{}.Resource[{}]", path, i), resource);
        }
    }

    fn resource(&mut self, path: &str, resource: &Resource) {
        self.named(path, &resource.name, &resource.description);
        self.length(path, "uriString", &resource.uri_string, MAX_URI_LENGTH);
    }

    fn software(&mut self, path: &str, software: &Software) {
        self.named(path, &software.name, &software.description);
        self.length(path, "uriString", &software.uri_string, MAX_URI_LENGTH);
        for (i, resource) in software.resources.iter().enumerate() {
            self.resource(&format!("{}.Resource[{}]", path, i), resource);
        }
    }

    fn record_description(&mut self, path: &str, record: &RecordDescription) {
        for (i, variable) in record.record_variables.iter().enumerate() {
            self.record_variable(&format!("{}.RecordVariable[{}]", path, i), variable);
        }
    }

    fn record_variable(&mut self, path: &str, variable: &RecordVariable) {
        self.named(path, &variable.name, &variable.description);
    }

    fn standard_variable(&mut self, path: &str, variable: &StandardVariable) {
        self.named(path, &variable.name, &variable.description);
        self.length(
            path,
            "namespaceUriString",
            &variable.namespace_uri_string,
            MAX_URI_LENGTH,
        );
    }
}

/// Validate one entity graph
pub fn validate_entity(entity: &Entity) -> Vec<EntityValidationError> {
    EntityValidator::new().validate(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_entity_has_no_findings() {
        let mut dc = DataContainer::new(DataContainerType::File);
        dc.name = Some("ctd.dat".to_string());
        dc.min_latitude = Some(36.5);
        dc.min_longitude = Some(-240.0);
        assert!(validate_entity(&dc.into()).is_empty());
    }

    #[test]
    fn test_nested_findings_are_all_reported() {
        let mut output = DataContainer::new(DataContainerType::Stream);
        output.max_latitude = Some(91.0);
        output.min_depth = Some(-3.0);
        let mut producer = DataProducer::new(DataProducerType::Deployment);
        producer.name = Some("x".repeat(MAX_NAME_LENGTH + 1));
        producer.outputs.push(output);

        let findings = validate_entity(&producer.into());
        assert_eq!(findings.len(), 3);
        assert!(matches!(findings[0], EntityValidationError::TooLong { .. }));
        assert!(findings[1].to_string().starts_with("DataProducer.output[0].maxLatitude"));
        assert!(matches!(findings[2], EntityValidationError::Negative { .. }));
    }

    #[test]
    fn test_description_limit() {
        let keyword = Keyword {
            name: Some("ctd".to_string()),
            description: Some("d".repeat(MAX_DESCRIPTION_LENGTH + 1)),
            ..Default::default()
        };
        assert_eq!(validate_entity(&keyword.into()).len(), 1);
    }
}
