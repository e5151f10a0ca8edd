//! XmlBuilder: serializes entity graphs into metadata XML
//!
//! Children of DataContainer and DataProducer elements are emitted in the order
//! the schema requires, which differs between the current and legacy dialects.
//! Any child element that ends up with no attributes, children or text is dropped.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::coercion::{self, DateFormat, XmlDateFormat};
use crate::config::MarshalConfig;
use crate::dispatch::{self, Wrapper};
use crate::error::Result;
use crate::models::*;
use crate::xml::{self, WriteOptions, XmlElement};

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str =
    "http://ssds.shore.mbari.org/ssds-docs/xml/schema/2010/SSDS_Metadata.xsd";

/// Which side of the DataContainer ⇄ DataProducer edge a pass follows.
///
/// A pass rooted at a DataProducer descends into outputs and never into
/// consumers; a pass rooted at a DataContainer does the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Outputs,
    Consumers,
}

/// Marshaller for SSDS metadata documents
#[derive(Debug)]
pub struct XmlBuilder {
    config: MarshalConfig,
    date_format: Box<dyn DateFormat>,
    roots: Vec<Entity>,
}

impl Default for XmlBuilder {
    fn default() -> Self {
        Self::new(MarshalConfig::default())
    }
}

impl XmlBuilder {
    pub fn new(config: MarshalConfig) -> Self {
        Self {
            config,
            date_format: Box::new(XmlDateFormat),
            roots: Vec::new(),
        }
    }

    pub fn with_date_format(mut self, date_format: Box<dyn DateFormat>) -> Self {
        self.date_format = date_format;
        self
    }

    /// Queue an entity to become a child of the document root
    pub fn add(&mut self, entity: impl Into<Entity>) {
        self.roots.push(entity.into());
    }

    pub fn extend<I: IntoIterator<Item = Entity>>(&mut self, entities: I) {
        self.roots.extend(entities);
    }

    fn legacy(&self) -> bool {
        self.config.legacy
    }

    /// Build the `<Metadata>` tree from the queued entities, in the order added
    pub fn marshal(&self) -> XmlElement {
        let mut root = XmlElement::new(dispatch::ROOT_TAG);
        root.set_attribute("xmlns:xsi", XSI_NAMESPACE);
        root.set_attribute("xsi:noNamespaceSchemaLocation", SCHEMA_LOCATION);
        for entity in &self.roots {
            match self.entity_to_element(entity) {
                Some(element) if !element.is_empty() => root.push_child(element),
                _ => debug!("Top-level {} produced no element", entity.kind()),
            }
        }
        root
    }

    /// Marshal and render the document as text
    pub fn to_xml_string(&self) -> Result<String> {
        let options = WriteOptions {
            pretty: self.config.pretty,
            declaration: true,
        };
        xml::write_string(&self.marshal(), options)
    }

    /// Serialize a single entity, `None` when it has nothing to emit
    pub fn entity_to_element(&self, entity: &Entity) -> Option<XmlElement> {
        match entity {
            Entity::CommentTag(e) => self.comment_tag_element(e),
            Entity::DataContainer(e) => self.data_container_element(e, Direction::Consumers),
            Entity::DataContainerGroup(e) => self.data_container_group_element(e),
            Entity::DataProducer(e) => self.data_producer_element(e, Direction::Outputs),
            Entity::DataProducerGroup(e) => self.data_producer_group_element(e),
            Entity::Device(e) => self.device_element(e),
            Entity::DeviceType(e) => self.device_type_element(e),
            Entity::Event(e) => self.event_element(e),
            Entity::HeaderDescription(e) => self.header_description_element(e),
            Entity::Keyword(e) => self.keyword_element(e),
            Entity::Person(e) => self.person_element(e),
            Entity::RecordDescription(e) => self.record_description_element(e),
            Entity::RecordVariable(e) => self.record_variable_element(e),
            Entity::Resource(e) => self.resource_element(e),
            Entity::ResourceBlob(e) => self.resource_blob_element(e),
            Entity::ResourceType(e) => self.resource_type_element(e),
            Entity::Software(e) => self.software_element(e),
            Entity::StandardDomain(e) => {
                self.named_element("StandardDomain", e.id, &e.name, &e.description, e.version)
            }
            Entity::StandardKeyword(e) => {
                self.named_element("StandardKeyword", e.id, &e.name, &e.description, e.version)
            }
            Entity::StandardReferenceScale(e) => self.named_element(
                "StandardReferenceScale",
                e.id,
                &e.name,
                &e.description,
                e.version,
            ),
            Entity::StandardUnit(e) => self.standard_unit_element(e),
            Entity::StandardVariable(e) => self.standard_variable_element(e),
            Entity::UserGroup(e) => self.user_group_element(e),
        }
    }

    // ---- attribute helpers ----

    fn put_str(element: &mut XmlElement, name: &str, value: &Option<String>) {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            element.set_attribute(name, value);
        }
    }

    fn put_long(element: &mut XmlElement, name: &str, value: Option<i64>) {
        if let Some(value) = value {
            element.set_attribute(name, value.to_string());
        }
    }

    fn put_int(element: &mut XmlElement, name: &str, value: Option<i32>) {
        if let Some(value) = value {
            element.set_attribute(name, value.to_string());
        }
    }

    fn put_double(element: &mut XmlElement, name: &str, value: Option<f64>) {
        if let Some(text) = value.and_then(coercion::format_double) {
            element.set_attribute(name, text);
        }
    }

    fn put_float(element: &mut XmlElement, name: &str, value: Option<f32>) {
        if let Some(text) = value.and_then(coercion::format_float) {
            element.set_attribute(name, text);
        }
    }

    fn put_bool(element: &mut XmlElement, name: &str, value: Option<bool>) {
        if let Some(value) = value {
            element.set_attribute(name, value.to_string());
        }
    }

    fn put_date(&self, element: &mut XmlElement, name: &str, value: &Option<DateTime<Utc>>) {
        if let Some(date) = value {
            element.set_attribute(name, self.date_format.format(date));
        }
    }

    fn put_version(element: &mut XmlElement, version: Version) {
        if version.is_known() {
            element.set_attribute("version", version.to_string());
        }
    }

    /// Append `child` unless it is missing or empty
    fn push(parent: &mut XmlElement, child: Option<XmlElement>) {
        if let Some(child) = child.filter(|c| !c.is_empty()) {
            parent.push_child(child);
        }
    }

    fn push_description(parent: &mut XmlElement, description: &Option<String>) {
        if let Some(text) = description.as_deref().filter(|d| !d.trim().is_empty()) {
            parent.push_child(XmlElement::with_text(dispatch::DESCRIPTION_TAG, text));
        }
    }

    /// Append `child` inside its own wrapper element
    fn push_wrapped(&self, parent: &mut XmlElement, wrapper: Wrapper, child: Option<XmlElement>) {
        if let Some(child) = child.filter(|c| !c.is_empty()) {
            let mut wrapped = XmlElement::new(wrapper.tag(self.legacy()));
            wrapped.push_child(child);
            parent.push_child(wrapped);
        }
    }

    // ---- per-entity serializers ----

    fn data_container_element(
        &self,
        dc: &DataContainer,
        direction: Direction,
    ) -> Option<XmlElement> {
        let legacy = self.legacy();
        let mut element = XmlElement::new(dispatch::data_container_tag(dc, legacy));
        Self::put_long(&mut element, "id", dc.id);
        Self::put_str(&mut element, "name", &dc.name);
        if !legacy {
            if let Some(container_type) = dc.data_container_type {
                element.set_attribute("dataContainerType", container_type.as_str());
            }
        }
        self.put_date(&mut element, "startDate", &dc.start_date);
        self.put_date(&mut element, "endDate", &dc.end_date);
        Self::put_bool(&mut element, "original", dc.original);
        Self::put_str(&mut element, "uriString", &dc.uri_string);
        Self::put_long(&mut element, "contentLength", dc.content_length);
        Self::put_str(&mut element, "mimeType", &dc.mime_type);
        Self::put_long(&mut element, "numberOfRecords", dc.number_of_records);
        Self::put_bool(&mut element, "dodsAccessible", dc.dods_accessible);
        Self::put_str(&mut element, "dodsUrlString", &dc.dods_url_string);
        Self::put_bool(&mut element, "noNetCDF", dc.no_net_cdf);
        Self::put_double(&mut element, "minLatitude", dc.min_latitude);
        Self::put_double(&mut element, "maxLatitude", dc.max_latitude);
        Self::put_double(&mut element, "minLongitude", dc.min_longitude);
        Self::put_double(&mut element, "maxLongitude", dc.max_longitude);
        Self::put_float(&mut element, "minDepth", dc.min_depth);
        Self::put_float(&mut element, "maxDepth", dc.max_depth);
        Self::put_version(&mut element, dc.version);

        if direction == Direction::Consumers {
            for consumer in &dc.consumers {
                let child = self.data_producer_element(consumer, direction);
                self.push_wrapped(&mut element, Wrapper::Consumer, child);
            }
        }

        let person = dc.person.as_ref().and_then(|p| self.person_element(p));
        let record = dc
            .record_description
            .as_ref()
            .and_then(|r| self.record_description_element(r));
        let header = dc
            .header_description
            .as_ref()
            .and_then(|h| self.header_description_element(h));

        if legacy {
            Self::push(&mut element, person);
            for resource in &dc.resources {
                Self::push(&mut element, self.resource_element(resource));
            }
            if dc.data_container_type != Some(DataContainerType::Stream) {
                Self::push(&mut element, header);
            }
            Self::push_description(&mut element, &dc.description);
            Self::push(&mut element, record);
        } else {
            Self::push_description(&mut element, &dc.description);
            for group in &dc.data_container_groups {
                Self::push(&mut element, self.data_container_group_element(group));
            }
            Self::push(&mut element, header);
            for keyword in &dc.keywords {
                Self::push(&mut element, self.keyword_element(keyword));
            }
            Self::push(&mut element, person);
            Self::push(&mut element, record);
            for resource in &dc.resources {
                Self::push(&mut element, self.resource_element(resource));
            }
        }
        Some(element)
    }

    fn data_container_group_element(&self, group: &DataContainerGroup) -> Option<XmlElement> {
        self.named_element(
            "DataContainerGroup",
            group.id,
            &group.name,
            &group.description,
            group.version,
        )
    }

    fn data_producer_element(&self, dp: &DataProducer, direction: Direction) -> Option<XmlElement> {
        let legacy = self.legacy();
        let mut element = XmlElement::new(dispatch::data_producer_tag(dp, legacy));
        Self::put_long(&mut element, "id", dp.id);
        Self::put_str(&mut element, "name", &dp.name);
        if !legacy {
            if let Some(producer_type) = dp.data_producer_type {
                element.set_attribute("dataProducerType", producer_type.as_str());
            }
        }
        self.put_date(&mut element, "startDate", &dp.start_date);
        self.put_date(&mut element, "endDate", &dp.end_date);
        Self::put_str(&mut element, "role", &dp.role);
        Self::put_double(&mut element, "nominalLatitude", dp.nominal_latitude);
        Self::put_float(
            &mut element,
            "nominalLatitudeAccuracy",
            dp.nominal_latitude_accuracy,
        );
        Self::put_double(&mut element, "nominalLongitude", dp.nominal_longitude);
        Self::put_float(
            &mut element,
            "nominalLongitudeAccuracy",
            dp.nominal_longitude_accuracy,
        );
        Self::put_float(&mut element, "nominalDepth", dp.nominal_depth);
        Self::put_float(&mut element, "nominalDepthAccuracy", dp.nominal_depth_accuracy);
        Self::put_float(
            &mut element,
            "nominalBenthicAltitude",
            dp.nominal_benthic_altitude,
        );
        Self::put_float(
            &mut element,
            "nominalBenthicAltitudeAccuracy",
            dp.nominal_benthic_altitude_accuracy,
        );
        Self::put_float(&mut element, "xoffset", dp.x_offset);
        Self::put_float(&mut element, "yoffset", dp.y_offset);
        Self::put_float(&mut element, "zoffset", dp.z_offset);
        Self::put_str(
            &mut element,
            "orientationDescription",
            &dp.orientation_description,
        );
        Self::put_str(&mut element, "x3DOrientationText", &dp.x3d_orientation_text);
        Self::put_str(&mut element, "hostName", &dp.host_name);
        Self::put_version(&mut element, dp.version);

        let children: Vec<Option<XmlElement>> = dp
            .child_data_producers
            .iter()
            .map(|child| self.data_producer_element(child, direction))
            .collect();
        let device = dp.device.as_ref().and_then(|d| self.device_element(d));
        let person = dp.person.as_ref().and_then(|p| self.person_element(p));
        let software = dp.software.as_ref().and_then(|s| self.software_element(s));

        if legacy {
            if dp.data_producer_type == Some(DataProducerType::ProcessRun) {
                Self::push_description(&mut element, &dp.description);
                Self::push(&mut element, person);
                Self::push(&mut element, software);
            } else {
                Self::push(&mut element, device);
                for child in children {
                    Self::push(&mut element, child);
                }
                Self::push(&mut element, person);
                Self::push_description(&mut element, &dp.description);
            }
            for resource in &dp.resources {
                Self::push(&mut element, self.resource_element(resource));
            }
            for event in &dp.events {
                Self::push(&mut element, self.event_element(event));
            }
            self.push_outputs(&mut element, dp, direction);
        } else {
            for child in children {
                Self::push(&mut element, child);
            }
            for group in &dp.data_producer_groups {
                Self::push(&mut element, self.data_producer_group_element(group));
            }
            Self::push_description(&mut element, &dp.description);
            Self::push(&mut element, device);
            for event in &dp.events {
                Self::push(&mut element, self.event_element(event));
            }
            for keyword in &dp.keywords {
                Self::push(&mut element, self.keyword_element(keyword));
            }
            self.push_outputs(&mut element, dp, direction);
            Self::push(&mut element, person);
            for resource in &dp.resources {
                Self::push(&mut element, self.resource_element(resource));
            }
            Self::push(&mut element, software);
        }
        Some(element)
    }

    fn push_outputs(&self, element: &mut XmlElement, dp: &DataProducer, direction: Direction) {
        if direction != Direction::Outputs {
            return;
        }
        for output in &dp.outputs {
            let child = self.data_container_element(output, direction);
            self.push_wrapped(element, Wrapper::Output, child);
        }
    }

    fn data_producer_group_element(&self, group: &DataProducerGroup) -> Option<XmlElement> {
        self.named_element(
            "DataProducerGroup",
            group.id,
            &group.name,
            &group.description,
            group.version,
        )
    }

    fn device_element(&self, device: &Device) -> Option<XmlElement> {
        let mut element = XmlElement::new("Device");
        Self::put_long(&mut element, "id", device.id);
        Self::put_str(&mut element, "uuid", &device.uuid);
        Self::put_str(&mut element, "name", &device.name);
        Self::put_str(&mut element, "mfgName", &device.mfg_name);
        Self::put_str(&mut element, "mfgModel", &device.mfg_model);
        Self::put_str(&mut element, "mfgSerialNumber", &device.mfg_serial_number);
        Self::put_str(&mut element, "infoUrlList", &device.info_url_list);
        Self::put_version(&mut element, device.version);

        Self::push_description(&mut element, &device.description);
        Self::push(
            &mut element,
            device
                .device_type
                .as_ref()
                .and_then(|t| self.device_type_element(t)),
        );
        Self::push(
            &mut element,
            device.person.as_ref().and_then(|p| self.person_element(p)),
        );
        for resource in &device.resources {
            Self::push(&mut element, self.resource_element(resource));
        }
        Some(element)
    }

    fn device_type_element(&self, device_type: &DeviceType) -> Option<XmlElement> {
        self.named_element(
            "DeviceType",
            device_type.id,
            &device_type.name,
            &device_type.description,
            device_type.version,
        )
    }

    fn event_element(&self, event: &Event) -> Option<XmlElement> {
        let mut element = XmlElement::new("Event");
        Self::put_long(&mut element, "id", event.id);
        Self::put_str(&mut element, "name", &event.name);
        self.put_date(&mut element, "startDate", &event.start_date);
        self.put_date(&mut element, "endDate", &event.end_date);
        Self::put_version(&mut element, event.version);
        Self::push_description(&mut element, &event.description);
        Some(element)
    }

    fn header_description_element(&self, header: &HeaderDescription) -> Option<XmlElement> {
        let mut element = XmlElement::new("HeaderDescription");
        Self::put_long(&mut element, "id", header.id);
        Self::put_long(&mut element, "byteOffset", header.byte_offset);
        Self::put_int(&mut element, "numHeaderLines", header.num_header_lines);
        Self::put_version(&mut element, header.version);
        Self::push_description(&mut element, &header.description);
        for tag in &header.comment_tags {
            Self::push(&mut element, self.comment_tag_element(tag));
        }
        Some(element)
    }

    fn comment_tag_element(&self, tag: &CommentTag) -> Option<XmlElement> {
        tag.tag_string.as_ref()?;
        let mut element = XmlElement::new("CommentTag");
        Self::put_long(&mut element, "id", tag.id);
        Self::put_str(&mut element, "tagString", &tag.tag_string);
        Self::put_version(&mut element, tag.version);
        Some(element)
    }

    fn keyword_element(&self, keyword: &Keyword) -> Option<XmlElement> {
        self.named_element(
            "Keyword",
            keyword.id,
            &keyword.name,
            &keyword.description,
            keyword.version,
        )
    }

    fn person_element(&self, person: &Person) -> Option<XmlElement> {
        let mut element = XmlElement::new("Person");
        Self::put_long(&mut element, "id", person.id);
        Self::put_str(&mut element, "firstname", &person.firstname);
        Self::put_str(&mut element, "surname", &person.surname);
        Self::put_str(&mut element, "organization", &person.organization);
        Self::put_str(&mut element, "username", &person.username);
        Self::put_str(&mut element, "password", &person.password);
        Self::put_str(&mut element, "email", &person.email);
        Self::put_str(&mut element, "phone", &person.phone);
        Self::put_str(&mut element, "address1", &person.address1);
        Self::put_str(&mut element, "address2", &person.address2);
        Self::put_str(&mut element, "city", &person.city);
        Self::put_str(&mut element, "state", &person.state);
        Self::put_str(&mut element, "zipcode", &person.zipcode);
        Self::put_str(&mut element, "status", &person.status);
        Self::put_version(&mut element, person.version);
        for group in &person.user_groups {
            Self::push(&mut element, self.user_group_element(group));
        }
        Some(element)
    }

    fn record_description_element(&self, record: &RecordDescription) -> Option<XmlElement> {
        let mut element = XmlElement::new("RecordDescription");
        Self::put_long(&mut element, "id", record.id);
        Self::put_long(&mut element, "recordType", record.record_type);
        Self::put_str(&mut element, "bufferStyle", &record.buffer_style);
        Self::put_str(&mut element, "bufferParseType", &record.buffer_parse_type);
        Self::put_str(
            &mut element,
            "bufferItemSeparator",
            &record.buffer_item_separator,
        );
        Self::put_str(&mut element, "bufferLengthType", &record.buffer_length_type);
        Self::put_str(&mut element, "recordTerminator", &record.record_terminator);
        Self::put_bool(&mut element, "parseable", record.parseable);
        Self::put_str(&mut element, "endian", &record.endian);
        Self::put_str(
            &mut element,
            "recordParseRegExp",
            &record.record_parse_reg_exp,
        );
        Self::put_version(&mut element, record.version);
        for variable in record.ordered_variables() {
            Self::push(&mut element, self.record_variable_element(variable));
        }
        Some(element)
    }

    fn record_variable_element(&self, variable: &RecordVariable) -> Option<XmlElement> {
        let mut element = XmlElement::new("RecordVariable");
        Self::put_long(&mut element, "id", variable.id);
        Self::put_str(&mut element, "name", &variable.name);
        Self::put_str(&mut element, "longName", &variable.long_name);
        Self::put_str(&mut element, "format", &variable.format);
        Self::put_str(&mut element, "units", &variable.units);
        Self::put_long(&mut element, "columnIndex", variable.column_index);
        Self::put_str(&mut element, "validMin", &variable.valid_min);
        Self::put_str(&mut element, "validMax", &variable.valid_max);
        Self::put_str(&mut element, "missingValue", &variable.missing_value);
        Self::put_str(&mut element, "accuracy", &variable.accuracy);
        Self::put_double(&mut element, "displayMin", variable.display_min);
        Self::put_double(&mut element, "displayMax", variable.display_max);
        Self::put_str(&mut element, "referenceScale", &variable.reference_scale);
        Self::put_double(&mut element, "conversionScale", variable.conversion_scale);
        Self::put_double(&mut element, "conversionOffset", variable.conversion_offset);
        Self::put_str(&mut element, "convertedUnits", &variable.converted_units);
        Self::put_long(&mut element, "sourceSensorID", variable.source_sensor_id);
        Self::put_str(&mut element, "parseRegExp", &variable.parse_reg_exp);
        Self::put_version(&mut element, variable.version);

        Self::push_description(&mut element, &variable.description);
        if let Some(domain) = &variable.standard_domain {
            Self::push(
                &mut element,
                self.named_element(
                    "StandardDomain",
                    domain.id,
                    &domain.name,
                    &domain.description,
                    domain.version,
                ),
            );
        }
        if let Some(keyword) = &variable.standard_keyword {
            Self::push(
                &mut element,
                self.named_element(
                    "StandardKeyword",
                    keyword.id,
                    &keyword.name,
                    &keyword.description,
                    keyword.version,
                ),
            );
        }
        if let Some(scale) = &variable.standard_reference_scale {
            Self::push(
                &mut element,
                self.named_element(
                    "StandardReferenceScale",
                    scale.id,
                    &scale.name,
                    &scale.description,
                    scale.version,
                ),
            );
        }
        Self::push(
            &mut element,
            variable
                .standard_unit
                .as_ref()
                .and_then(|u| self.standard_unit_element(u)),
        );
        Self::push(
            &mut element,
            variable
                .standard_variable
                .as_ref()
                .and_then(|v| self.standard_variable_element(v)),
        );
        Some(element)
    }

    fn resource_element(&self, resource: &Resource) -> Option<XmlElement> {
        let mut element = XmlElement::new("Resource");
        Self::put_long(&mut element, "id", resource.id);
        Self::put_str(&mut element, "name", &resource.name);
        self.put_date(&mut element, "startDate", &resource.start_date);
        self.put_date(&mut element, "endDate", &resource.end_date);
        Self::put_str(&mut element, "uriString", &resource.uri_string);
        Self::put_long(&mut element, "contentLength", resource.content_length);
        Self::put_str(&mut element, "mimeType", &resource.mime_type);
        Self::put_version(&mut element, resource.version);

        Self::push_description(&mut element, &resource.description);
        for keyword in &resource.keywords {
            Self::push(&mut element, self.keyword_element(keyword));
        }
        Self::push(
            &mut element,
            resource.person.as_ref().and_then(|p| self.person_element(p)),
        );
        Self::push(
            &mut element,
            resource
                .resource_blob
                .as_ref()
                .and_then(|b| self.resource_blob_element(b)),
        );
        Self::push(
            &mut element,
            resource
                .resource_type
                .as_ref()
                .and_then(|t| self.resource_type_element(t)),
        );
        Some(element)
    }

    fn resource_blob_element(&self, blob: &ResourceBlob) -> Option<XmlElement> {
        let mut element = XmlElement::new("ResourceBLOB");
        Self::put_long(&mut element, "id", blob.id);
        Self::put_str(&mut element, "name", &blob.name);
        if let Some(bytes) = &blob.byte_array {
            element.set_attribute("byteArray", coercion::encode_base64(bytes));
        }
        Self::put_version(&mut element, blob.version);
        Self::push_description(&mut element, &blob.description);
        Some(element)
    }

    fn resource_type_element(&self, resource_type: &ResourceType) -> Option<XmlElement> {
        self.named_element(
            "ResourceType",
            resource_type.id,
            &resource_type.name,
            &resource_type.description,
            resource_type.version,
        )
    }

    fn software_element(&self, software: &Software) -> Option<XmlElement> {
        let mut element = XmlElement::new("Software");
        Self::put_long(&mut element, "id", software.id);
        Self::put_str(&mut element, "name", &software.name);
        Self::put_str(&mut element, "uriString", &software.uri_string);
        Self::put_str(&mut element, "softwareVersion", &software.software_version);
        Self::put_version(&mut element, software.version);
        Self::push_description(&mut element, &software.description);
        Self::push(
            &mut element,
            software.person.as_ref().and_then(|p| self.person_element(p)),
        );
        for resource in &software.resources {
            Self::push(&mut element, self.resource_element(resource));
        }
        Some(element)
    }

    fn standard_unit_element(&self, unit: &StandardUnit) -> Option<XmlElement> {
        let mut element =
            self.named_element("StandardUnit", unit.id, &unit.name, &None, unit.version)?;
        Self::put_str(&mut element, "longName", &unit.long_name);
        Self::put_str(&mut element, "symbol", &unit.symbol);
        Self::push_description(&mut element, &unit.description);
        Some(element)
    }

    fn standard_variable_element(&self, variable: &StandardVariable) -> Option<XmlElement> {
        let mut element = self.named_element(
            "StandardVariable",
            variable.id,
            &variable.name,
            &None,
            variable.version,
        )?;
        Self::put_str(
            &mut element,
            "namespaceUriString",
            &variable.namespace_uri_string,
        );
        Self::put_str(&mut element, "referenceScale", &variable.reference_scale);
        Self::push_description(&mut element, &variable.description);
        for unit in &variable.standard_units {
            Self::push(&mut element, self.standard_unit_element(unit));
        }
        Some(element)
    }

    fn user_group_element(&self, group: &UserGroup) -> Option<XmlElement> {
        group.group_name.as_ref()?;
        let mut element = XmlElement::new("UserGroup");
        Self::put_long(&mut element, "id", group.id);
        Self::put_str(&mut element, "groupName", &group.group_name);
        Self::put_version(&mut element, group.version);
        Some(element)
    }

    /// Element for the id/name/description/version entities. These are identified by
    /// name, so an unnamed one produces nothing.
    fn named_element(
        &self,
        tag: &str,
        id: Option<i64>,
        name: &Option<String>,
        description: &Option<String>,
        version: Version,
    ) -> Option<XmlElement> {
        name.as_ref()?;
        let mut element = XmlElement::new(tag);
        Self::put_long(&mut element, "id", id);
        Self::put_str(&mut element, "name", name);
        Self::put_version(&mut element, version);
        Self::push_description(&mut element, description);
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_tags(element: &XmlElement) -> Vec<&str> {
        element.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_unnamed_keyword_is_omitted() {
        let builder = XmlBuilder::default();
        assert!(builder.keyword_element(&Keyword::default()).is_none());
        assert!(builder.keyword_element(&Keyword::named("ctd")).is_some());
    }

    #[test]
    fn test_nan_and_empty_strings_skipped() {
        let dc = DataContainer {
            name: Some(String::new()),
            min_latitude: Some(f64::NAN),
            max_latitude: Some(36.8),
            ..Default::default()
        };
        let element = XmlBuilder::default()
            .data_container_element(&dc, Direction::Consumers)
            .unwrap();
        assert_eq!(element.attribute("name"), None);
        assert_eq!(element.attribute("minLatitude"), None);
        assert_eq!(element.attribute("maxLatitude"), Some("36.8"));
    }

    #[test]
    fn test_producer_never_descends_into_consumers() {
        let mut reader = DataProducer::new(DataProducerType::ProcessRun);
        reader.name = Some("qc".to_string());
        let mut container = DataContainer::new(DataContainerType::File);
        container.uri_string = Some("u1".to_string());
        container.consumers.push(reader);
        let mut producer = DataProducer::new(DataProducerType::Deployment);
        producer.name = Some("m1".to_string());
        producer.outputs.push(container.clone());

        let builder = XmlBuilder::default();
        let element = builder.entity_to_element(&producer.into()).unwrap();
        let output = &element.children[0];
        assert_eq!(output.name, "output");
        assert!(output.children[0].children.is_empty());

        let element = builder.entity_to_element(&container.into()).unwrap();
        assert_eq!(child_tags(&element), ["consumer"]);
    }

    #[test]
    fn test_legacy_process_run_order() {
        let mut run = DataProducer::new(DataProducerType::ProcessRun);
        run.description = Some("calibration".to_string());
        run.person = Some(Person::with_username("kgomes"));
        run.software = Some(Software {
            name: Some("cal".to_string()),
            ..Default::default()
        });
        run.device = Some(Device {
            uuid: Some("dev-1".to_string()),
            ..Default::default()
        });
        run.events.push(Event {
            name: Some("start".to_string()),
            ..Default::default()
        });
        let builder = XmlBuilder::new(MarshalConfig::builder().legacy(true).build());
        let element = builder.entity_to_element(&run.into()).unwrap();
        assert_eq!(element.name, "ProcessRun");
        assert_eq!(element.attribute("dataProducerType"), None);
        assert_eq!(child_tags(&element), ["description", "Person", "Software", "Event"]);
    }

    #[test]
    fn test_root_attributes() {
        let root = XmlBuilder::default().marshal();
        assert_eq!(root.name, "Metadata");
        assert_eq!(root.attribute("xsi:noNamespaceSchemaLocation"), Some(SCHEMA_LOCATION));
        assert!(root.children.is_empty());
    }
}
