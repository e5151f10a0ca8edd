//! ObjectBuilder: turns metadata XML elements into entity graphs
//!
//! Every builder follows the same shape: check the tag, set any subtype implied by
//! the tag, coerce the attributes it knows, then build each child element and route
//! the result into the matching relationship slot. In lenient mode (the default)
//! unknown attributes, unknown elements and children with no matching slot are
//! logged and skipped; strict mode rejects them.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::coercion::{self, DateFormat, XmlDateFormat};
use crate::config::MarshalConfig;
use crate::dispatch::{self, TagRole};
use crate::document::{self, ParsedDocument};
use crate::error::{MetadataError, Result};
use crate::models::*;
use crate::validation::schema;
use crate::xml::{self, XmlElement};

/// Unmarshaller for SSDS metadata documents
#[derive(Debug)]
pub struct ObjectBuilder {
    config: MarshalConfig,
    date_format: Box<dyn DateFormat>,
    /// Problems that were logged and skipped while building
    pub errors: Vec<String>,
    failure: Option<MetadataError>,
}

impl Default for ObjectBuilder {
    fn default() -> Self {
        Self::new(MarshalConfig::default())
    }
}

/// A built child together with the tag of the element it came from
struct Child {
    tag: String,
    entity: Entity,
}

impl ObjectBuilder {
    pub fn new(config: MarshalConfig) -> Self {
        Self {
            config,
            date_format: Box::new(XmlDateFormat),
            errors: Vec::new(),
            failure: None,
        }
    }

    /// Replace the date profile used for date attributes
    pub fn with_date_format(mut self, date_format: Box<dyn DateFormat>) -> Self {
        self.date_format = date_format;
        self
    }

    pub fn config(&self) -> &MarshalConfig {
        &self.config
    }

    /// Parse a complete `<Metadata>` document.
    ///
    /// The outcome is remembered for [`did_unmarshal_fail`](Self::did_unmarshal_fail)
    /// and [`error_message`](Self::error_message).
    pub fn unmarshal(&mut self, xml_text: &str) -> Result<ParsedDocument> {
        self.errors.clear();
        self.failure = None;
        let result = self.unmarshal_inner(xml_text);
        if let Err(e) = &result {
            self.failure = Some(e.clone());
        }
        result
    }

    fn unmarshal_inner(&mut self, xml_text: &str) -> Result<ParsedDocument> {
        let mut root = xml::parse_str(xml_text)?;
        if !root.has_tag(dispatch::ROOT_TAG) {
            return Err(MetadataError::SchemaMismatch {
                expected: dispatch::ROOT_TAG.to_string(),
                found: root.name,
            });
        }

        if self.config.validate {
            let problems = schema::validate_tree(&root);
            if !problems.is_empty() {
                for problem in &problems {
                    error!("Validity error at {}", problem);
                }
                return Err(MetadataError::Validity(problems));
            }
        }

        document::invert_single_group(&mut root);

        let mut parsed = ParsedDocument::new();
        for child in &root.children {
            match self.element_to_entity(child)? {
                Some(entity) => {
                    if !parsed.insert(entity) {
                        debug!("Duplicate top-level <{}> suppressed", child.name);
                    }
                }
                None => info!(
                    "Top-level <{}> at line {} produced no object and was dropped",
                    child.name, child.line
                ),
            }
        }
        Ok(parsed)
    }

    /// Whether the last call to [`unmarshal`](Self::unmarshal) failed
    pub fn did_unmarshal_fail(&self) -> bool {
        self.failure.is_some()
    }

    /// Report of the last unmarshal: the fatal error (with every validity error) and
    /// every problem that was skipped.
    pub fn error_message(&self) -> String {
        let mut report = String::new();
        if let Some(failure) = &self.failure {
            report.push_str(&format!("Unmarshal failed: {}\n", failure));
            for problem in failure.validity_errors() {
                report.push_str(&format!("  {}\n", problem));
            }
        }
        for problem in &self.errors {
            report.push_str(&format!("Skipped: {}\n", problem));
        }
        report
    }

    /// Build whatever entity `element` denotes.
    ///
    /// Wrapper elements (`output`, `consumer`, `destiny`) yield the first entity of
    /// the wrapped kind. Unrecognised tags and empty wrappers yield `None`.
    pub fn element_to_entity(&mut self, element: &XmlElement) -> Result<Option<Entity>> {
        debug!("Dispatching <{}>", element.name);
        match dispatch::resolve_tag(&element.name) {
            Some(TagRole::Entity(kind)) => self.build(kind, element).map(Some),
            Some(TagRole::Wrapper(wrapper)) => {
                match element.first_child_of(wrapper.content_tags()) {
                    Some(content) => self.element_to_entity(content),
                    None => {
                        info!(
                            "<{}> at line {} wraps no {}",
                            element.name,
                            element.line,
                            wrapper.content_kind()
                        );
                        Ok(None)
                    }
                }
            }
            Some(TagRole::Description) => Ok(None),
            None => {
                if self.config.is_strict() {
                    return Err(MetadataError::UnknownConstruct {
                        context: format!("line {}", element.line),
                        name: format!("element <{}>", element.name),
                    });
                }
                let message = format!("unknown element <{}> at line {}", element.name, element.line);
                info!("Ignoring {}", message);
                self.errors.push(message);
                Ok(None)
            }
        }
    }

    /// Build an entity of `kind`, failing if the element's tag belongs to another kind
    pub fn build(&mut self, kind: EntityKind, element: &XmlElement) -> Result<Entity> {
        let entity = match kind {
            EntityKind::CommentTag => self.build_comment_tag(element)?.into(),
            EntityKind::DataContainer => self.build_data_container(element)?.into(),
            EntityKind::DataContainerGroup => self.build_data_container_group(element)?.into(),
            EntityKind::DataProducer => self.build_data_producer(element)?.into(),
            EntityKind::DataProducerGroup => self.build_data_producer_group(element)?.into(),
            EntityKind::Device => self.build_device(element)?.into(),
            EntityKind::DeviceType => self.build_device_type(element)?.into(),
            EntityKind::Event => self.build_event(element)?.into(),
            EntityKind::HeaderDescription => self.build_header_description(element)?.into(),
            EntityKind::Keyword => self.build_keyword(element)?.into(),
            EntityKind::Person => self.build_person(element)?.into(),
            EntityKind::RecordDescription => self.build_record_description(element)?.into(),
            EntityKind::RecordVariable => self.build_record_variable(element)?.into(),
            EntityKind::Resource => self.build_resource(element)?.into(),
            EntityKind::ResourceBlob => self.build_resource_blob(element)?.into(),
            EntityKind::ResourceType => self.build_resource_type(element)?.into(),
            EntityKind::Software => self.build_software(element)?.into(),
            EntityKind::StandardDomain => self.build_standard_domain(element)?.into(),
            EntityKind::StandardKeyword => self.build_standard_keyword(element)?.into(),
            EntityKind::StandardReferenceScale => {
                self.build_standard_reference_scale(element)?.into()
            }
            EntityKind::StandardUnit => self.build_standard_unit(element)?.into(),
            EntityKind::StandardVariable => self.build_standard_variable(element)?.into(),
            EntityKind::UserGroup => self.build_user_group(element)?.into(),
        };
        Ok(entity)
    }

    // ---- shared helpers ----

    fn expect_tag(&self, kind: EntityKind, element: &XmlElement) -> Result<()> {
        if dispatch::accepted_tags(kind)
            .iter()
            .any(|tag| element.has_tag(tag))
        {
            Ok(())
        } else {
            Err(MetadataError::SchemaMismatch {
                expected: kind.tag().to_string(),
                found: element.name.clone(),
            })
        }
    }

    fn date(&self, field: &str, value: &str) -> Result<DateTime<Utc>> {
        coercion::parse_date(self.date_format.as_ref(), field, value)
    }

    /// Parse a version attribute; failure keeps the sentinel unless strict.
    fn version(&self, element: &XmlElement, value: &str) -> Result<Version> {
        match coercion::parse_version(value) {
            Some(version) => Ok(Version(version)),
            None if self.config.is_strict() => {
                Err(MetadataError::conversion("version", value, "long"))
            }
            None => {
                warn!(
                    "Unparseable version \"{}\" on <{}> at line {}, keeping {}",
                    value,
                    element.name,
                    element.line,
                    Version::UNKNOWN
                );
                Ok(Version::UNKNOWN)
            }
        }
    }

    fn unknown_attribute(&mut self, element: &XmlElement, name: &str) -> Result<()> {
        if self.config.is_strict() {
            return Err(MetadataError::UnknownConstruct {
                context: format!("<{}> at line {}", element.name, element.line),
                name: format!("attribute {}", name),
            });
        }
        warn!(
            "Ignoring unknown attribute {} on <{}> at line {}",
            name, element.name, element.line
        );
        Ok(())
    }

    /// Build every child element. Returns the text of a `description` child, if
    /// any, and the built children in document order.
    fn build_children(&mut self, element: &XmlElement) -> Result<(Option<String>, Vec<Child>)> {
        let mut description = None;
        let mut children = Vec::new();
        for child in &element.children {
            if child.has_tag(dispatch::DESCRIPTION_TAG) {
                description = Some(child.text_content().to_string());
                continue;
            }
            match self.element_to_entity(child)? {
                Some(entity) => children.push(Child {
                    tag: child.name.clone(),
                    entity,
                }),
                None => info!(
                    "Child <{}> of <{}> produced no object",
                    child.name, element.name
                ),
            }
        }
        Ok((description, children))
    }

    /// A child whose kind fits none of the parent's relationships
    fn unroutable(&mut self, parent: &XmlElement, child: Child) -> Result<()> {
        if self.config.is_strict() {
            return Err(MetadataError::UnknownConstruct {
                context: format!("<{}> at line {}", parent.name, parent.line),
                name: format!("child <{}>", child.tag),
            });
        }
        let message = format!(
            "<{}> at line {} has no relationship for child <{}> ({})",
            parent.name,
            parent.line,
            child.tag,
            child.entity.kind()
        );
        error!("{}", message);
        self.errors.push(message);
        Ok(())
    }

    fn add<T: BusinessKey>(&self, items: &mut Vec<T>, item: T, parent: &XmlElement, tag: &str) {
        if !add_unique(items, item) {
            debug!("Duplicate <{}> under <{}> skipped", tag, parent.name);
        }
    }

    // ---- per-entity builders ----

    pub fn build_data_container(&mut self, element: &XmlElement) -> Result<DataContainer> {
        self.expect_tag(EntityKind::DataContainer, element)?;
        let mut dc = DataContainer {
            data_container_type: dispatch::container_type_for_tag(&element.name),
            ..Default::default()
        };

        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => dc.id = Some(coercion::parse_long(name, value)?),
                "name" => dc.name = Some(value.clone()),
                "description" => dc.description = Some(value.clone()),
                "datacontainertype" => {
                    dc.data_container_type = Some(DataContainerType::parse(value).ok_or_else(
                        || MetadataError::conversion(name, value, "DataContainer type"),
                    )?)
                }
                "startdate" => dc.start_date = Some(self.date(name, value)?),
                "enddate" => dc.end_date = Some(self.date(name, value)?),
                "original" => dc.original = Some(coercion::parse_bool(name, value)?),
                "uristring" | "url" | "uri" => dc.uri_string = Some(value.clone()),
                "contentlength" => dc.content_length = Some(coercion::parse_long(name, value)?),
                "mimetype" | "contenttype" => dc.mime_type = Some(value.clone()),
                "numberofrecords" => {
                    dc.number_of_records = Some(coercion::parse_long(name, value)?)
                }
                "dodsaccessible" => dc.dods_accessible = Some(coercion::parse_bool(name, value)?),
                "dodsurlstring" | "dodsurl" => dc.dods_url_string = Some(value.clone()),
                "nonetcdf" => dc.no_net_cdf = Some(coercion::parse_bool(name, value)?),
                "minlatitude" => dc.min_latitude = Some(coercion::parse_double(name, value)?),
                "maxlatitude" => dc.max_latitude = Some(coercion::parse_double(name, value)?),
                "minlongitude" => dc.min_longitude = Some(coercion::parse_double(name, value)?),
                "maxlongitude" => dc.max_longitude = Some(coercion::parse_double(name, value)?),
                "mindepth" => dc.min_depth = Some(coercion::parse_float(name, value)?),
                "maxdepth" => dc.max_depth = Some(coercion::parse_float(name, value)?),
                "version" => dc.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }

        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            dc.description = description;
        }
        for child in children {
            match child.entity {
                Entity::Person(person) => dc.person = Some(person),
                Entity::HeaderDescription(header) => dc.header_description = Some(header),
                Entity::RecordDescription(record) => dc.record_description = Some(record),
                Entity::DataContainerGroup(group) => {
                    self.add(&mut dc.data_container_groups, group, element, &child.tag)
                }
                Entity::Resource(resource) => {
                    self.add(&mut dc.resources, resource, element, &child.tag)
                }
                Entity::Keyword(keyword) => self.add(&mut dc.keywords, keyword, element, &child.tag),
                Entity::DataProducer(producer)
                    if dispatch::resolve_tag(&child.tag)
                        == Some(TagRole::Wrapper(dispatch::Wrapper::Consumer)) =>
                {
                    self.add(&mut dc.consumers, producer, element, &child.tag)
                }
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(dc)
    }

    pub fn build_data_container_group(&mut self, element: &XmlElement) -> Result<DataContainerGroup> {
        self.expect_tag(EntityKind::DataContainerGroup, element)?;
        let mut group = DataContainerGroup::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => group.id = Some(coercion::parse_long(name, value)?),
                "name" => group.name = Some(value.clone()),
                "description" => group.description = Some(value.clone()),
                "version" => group.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            group.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(group)
    }

    pub fn build_data_producer(&mut self, element: &XmlElement) -> Result<DataProducer> {
        self.expect_tag(EntityKind::DataProducer, element)?;
        let mut dp = DataProducer {
            data_producer_type: dispatch::producer_type_for_tag(&element.name),
            ..Default::default()
        };

        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => dp.id = Some(coercion::parse_long(name, value)?),
                "name" => dp.name = Some(value.clone()),
                "description" => dp.description = Some(value.clone()),
                "dataproducertype" => {
                    dp.data_producer_type = Some(DataProducerType::parse(value).ok_or_else(
                        || MetadataError::conversion(name, value, "DataProducer type"),
                    )?)
                }
                "startdate" => dp.start_date = Some(self.date(name, value)?),
                "enddate" => dp.end_date = Some(self.date(name, value)?),
                "role" => dp.role = Some(value.clone()),
                "nominallatitude" => {
                    dp.nominal_latitude = Some(coercion::parse_double(name, value)?)
                }
                "nominallatitudeaccuracy" => {
                    dp.nominal_latitude_accuracy = Some(coercion::parse_float(name, value)?)
                }
                "nominallongitude" => {
                    dp.nominal_longitude = Some(coercion::parse_double(name, value)?)
                }
                "nominallongitudeaccuracy" => {
                    dp.nominal_longitude_accuracy = Some(coercion::parse_float(name, value)?)
                }
                "nominaldepth" => dp.nominal_depth = Some(coercion::parse_float(name, value)?),
                "nominaldepthaccuracy" => {
                    dp.nominal_depth_accuracy = Some(coercion::parse_float(name, value)?)
                }
                "nominalbenthicaltitude" => {
                    dp.nominal_benthic_altitude = Some(coercion::parse_float(name, value)?)
                }
                "nominalbenthicaltitudeaccuracy" => {
                    dp.nominal_benthic_altitude_accuracy =
                        Some(coercion::parse_float(name, value)?)
                }
                "xoffset" => dp.x_offset = Some(coercion::parse_float(name, value)?),
                "yoffset" => dp.y_offset = Some(coercion::parse_float(name, value)?),
                "zoffset" => dp.z_offset = Some(coercion::parse_float(name, value)?),
                "orientationdescription" => dp.orientation_description = Some(value.clone()),
                "x3dorientationtext" => dp.x3d_orientation_text = Some(value.clone()),
                "hostname" => dp.host_name = Some(value.clone()),
                "version" => dp.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }

        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            dp.description = description;
        }
        for child in children {
            let wrapped = dispatch::resolve_tag(&child.tag);
            match child.entity {
                Entity::Person(person) => dp.person = Some(person),
                Entity::Device(device) => dp.device = Some(device),
                Entity::Software(software) => dp.software = Some(software),
                Entity::DataProducer(producer)
                    if wrapped == Some(TagRole::Entity(EntityKind::DataProducer)) =>
                {
                    self.add(&mut dp.child_data_producers, producer, element, &child.tag)
                }
                Entity::DataProducerGroup(group) => {
                    self.add(&mut dp.data_producer_groups, group, element, &child.tag)
                }
                Entity::Resource(resource) => {
                    self.add(&mut dp.resources, resource, element, &child.tag)
                }
                Entity::Keyword(keyword) => self.add(&mut dp.keywords, keyword, element, &child.tag),
                Entity::Event(event) => self.add(&mut dp.events, event, element, &child.tag),
                Entity::DataContainer(container)
                    if wrapped == Some(TagRole::Wrapper(dispatch::Wrapper::Output)) =>
                {
                    self.add(&mut dp.outputs, container, element, &child.tag)
                }
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(dp)
    }

    pub fn build_data_producer_group(&mut self, element: &XmlElement) -> Result<DataProducerGroup> {
        self.expect_tag(EntityKind::DataProducerGroup, element)?;
        let mut group = DataProducerGroup::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => group.id = Some(coercion::parse_long(name, value)?),
                "name" => group.name = Some(value.clone()),
                "description" => group.description = Some(value.clone()),
                "version" => group.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            group.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(group)
    }

    pub fn build_device(&mut self, element: &XmlElement) -> Result<Device> {
        self.expect_tag(EntityKind::Device, element)?;
        let mut device = Device::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => device.id = Some(coercion::parse_long(name, value)?),
                "uuid" => device.uuid = Some(value.clone()),
                "name" => device.name = Some(value.clone()),
                "description" => device.description = Some(value.clone()),
                "mfgname" => device.mfg_name = Some(value.clone()),
                "mfgmodel" => device.mfg_model = Some(value.clone()),
                "mfgserialnumber" => device.mfg_serial_number = Some(value.clone()),
                "infourllist" => device.info_url_list = Some(value.clone()),
                "type" => device.device_type = Some(DeviceType::named(value.clone())),
                "version" => device.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            device.description = description;
        }
        for child in children {
            match child.entity {
                Entity::Person(person) => device.person = Some(person),
                Entity::DeviceType(device_type) => device.device_type = Some(device_type),
                Entity::Resource(resource) => {
                    self.add(&mut device.resources, resource, element, &child.tag)
                }
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(device)
    }

    pub fn build_device_type(&mut self, element: &XmlElement) -> Result<DeviceType> {
        self.expect_tag(EntityKind::DeviceType, element)?;
        let mut device_type = DeviceType::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => device_type.id = Some(coercion::parse_long(name, value)?),
                "name" => device_type.name = Some(value.clone()),
                "description" => device_type.description = Some(value.clone()),
                "version" => device_type.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            device_type.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(device_type)
    }

    pub fn build_event(&mut self, element: &XmlElement) -> Result<Event> {
        self.expect_tag(EntityKind::Event, element)?;
        let mut event = Event::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => event.id = Some(coercion::parse_long(name, value)?),
                "name" => event.name = Some(value.clone()),
                "description" => event.description = Some(value.clone()),
                "startdate" => event.start_date = Some(self.date(name, value)?),
                "enddate" => event.end_date = Some(self.date(name, value)?),
                "version" => event.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            event.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(event)
    }

    pub fn build_header_description(&mut self, element: &XmlElement) -> Result<HeaderDescription> {
        self.expect_tag(EntityKind::HeaderDescription, element)?;
        let mut header = HeaderDescription::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => header.id = Some(coercion::parse_long(name, value)?),
                "description" => header.description = Some(value.clone()),
                "byteoffset" => header.byte_offset = Some(coercion::parse_long(name, value)?),
                "numheaderlines" => {
                    header.num_header_lines = Some(coercion::parse_int(name, value)?)
                }
                "version" => header.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            header.description = description;
        }
        for child in children {
            match child.entity {
                Entity::CommentTag(tag) => {
                    self.add(&mut header.comment_tags, tag, element, &child.tag)
                }
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(header)
    }

    pub fn build_comment_tag(&mut self, element: &XmlElement) -> Result<CommentTag> {
        self.expect_tag(EntityKind::CommentTag, element)?;
        let mut tag = CommentTag::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => tag.id = Some(coercion::parse_long(name, value)?),
                "tagstring" => tag.tag_string = Some(value.clone()),
                "version" => tag.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (_, children) = self.build_children(element)?;
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(tag)
    }

    pub fn build_keyword(&mut self, element: &XmlElement) -> Result<Keyword> {
        self.expect_tag(EntityKind::Keyword, element)?;
        let mut keyword = Keyword::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => keyword.id = Some(coercion::parse_long(name, value)?),
                "name" => keyword.name = Some(value.clone()),
                "description" => keyword.description = Some(value.clone()),
                "version" => keyword.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            keyword.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(keyword)
    }

    pub fn build_person(&mut self, element: &XmlElement) -> Result<Person> {
        self.expect_tag(EntityKind::Person, element)?;
        let mut person = Person::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => person.id = Some(coercion::parse_long(name, value)?),
                "firstname" => person.firstname = Some(value.clone()),
                "surname" => person.surname = Some(value.clone()),
                "organization" => person.organization = Some(value.clone()),
                "username" => person.username = Some(value.clone()),
                "password" => person.password = Some(value.clone()),
                "email" => person.email = Some(value.clone()),
                "phone" => person.phone = Some(value.clone()),
                "address1" => person.address1 = Some(value.clone()),
                "address2" => person.address2 = Some(value.clone()),
                "city" => person.city = Some(value.clone()),
                "state" => person.state = Some(value.clone()),
                "zipcode" => person.zipcode = Some(value.clone()),
                "status" => person.status = Some(value.clone()),
                "version" => person.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (_, children) = self.build_children(element)?;
        for child in children {
            match child.entity {
                Entity::UserGroup(group) => {
                    self.add(&mut person.user_groups, group, element, &child.tag)
                }
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(person)
    }

    pub fn build_record_description(&mut self, element: &XmlElement) -> Result<RecordDescription> {
        self.expect_tag(EntityKind::RecordDescription, element)?;
        let mut record = RecordDescription::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => record.id = Some(coercion::parse_long(name, value)?),
                "recordtype" => record.record_type = Some(coercion::parse_long(name, value)?),
                "bufferstyle" => record.buffer_style = Some(value.clone()),
                "bufferparsetype" => record.buffer_parse_type = Some(value.clone()),
                "bufferitemseparator" => record.buffer_item_separator = Some(value.clone()),
                "bufferlengthtype" => record.buffer_length_type = Some(value.clone()),
                "recordterminator" => record.record_terminator = Some(value.clone()),
                "parseable" => record.parseable = Some(coercion::parse_bool(name, value)?),
                "endian" => record.endian = Some(value.clone()),
                "recordparseregexp" => record.record_parse_reg_exp = Some(value.clone()),
                "version" => record.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (_, children) = self.build_children(element)?;
        for child in children {
            match child.entity {
                Entity::RecordVariable(variable) => {
                    self.add(&mut record.record_variables, variable, element, &child.tag)
                }
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(record)
    }

    pub fn build_record_variable(&mut self, element: &XmlElement) -> Result<RecordVariable> {
        self.expect_tag(EntityKind::RecordVariable, element)?;
        let mut variable = RecordVariable::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => variable.id = Some(coercion::parse_long(name, value)?),
                "name" => variable.name = Some(value.clone()),
                "description" => variable.description = Some(value.clone()),
                "longname" => variable.long_name = Some(value.clone()),
                "format" => variable.format = Some(value.clone()),
                "units" => variable.units = Some(value.clone()),
                "columnindex" => variable.column_index = Some(coercion::parse_long(name, value)?),
                "validmin" => variable.valid_min = Some(value.clone()),
                "validmax" => variable.valid_max = Some(value.clone()),
                "missingvalue" => variable.missing_value = Some(value.clone()),
                "accuracy" => variable.accuracy = Some(value.clone()),
                "displaymin" => variable.display_min = Some(coercion::parse_double(name, value)?),
                "displaymax" => variable.display_max = Some(coercion::parse_double(name, value)?),
                "referencescale" => variable.reference_scale = Some(value.clone()),
                "conversionscale" => {
                    variable.conversion_scale = Some(coercion::parse_double(name, value)?)
                }
                "conversionoffset" => {
                    variable.conversion_offset = Some(coercion::parse_double(name, value)?)
                }
                "convertedunits" => variable.converted_units = Some(value.clone()),
                "sourcesensorid" => {
                    variable.source_sensor_id = Some(coercion::parse_long(name, value)?)
                }
                "parseregexp" => variable.parse_reg_exp = Some(value.clone()),
                "version" => variable.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            variable.description = description;
        }
        for child in children {
            match child.entity {
                Entity::StandardDomain(domain) => variable.standard_domain = Some(domain),
                Entity::StandardKeyword(keyword) => variable.standard_keyword = Some(keyword),
                Entity::StandardReferenceScale(scale) => {
                    variable.standard_reference_scale = Some(scale)
                }
                Entity::StandardUnit(unit) => variable.standard_unit = Some(unit),
                Entity::StandardVariable(standard) => variable.standard_variable = Some(standard),
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(variable)
    }

    pub fn build_resource(&mut self, element: &XmlElement) -> Result<Resource> {
        self.expect_tag(EntityKind::Resource, element)?;
        let mut resource = Resource::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => resource.id = Some(coercion::parse_long(name, value)?),
                "name" => resource.name = Some(value.clone()),
                "description" => resource.description = Some(value.clone()),
                "startdate" => resource.start_date = Some(self.date(name, value)?),
                "enddate" => resource.end_date = Some(self.date(name, value)?),
                "uristring" | "uri" | "url" => resource.uri_string = Some(value.clone()),
                "contentlength" => {
                    resource.content_length = Some(coercion::parse_long(name, value)?)
                }
                "mimetype" => resource.mime_type = Some(value.clone()),
                "resourcetype" => resource.resource_type = Some(ResourceType::named(value.clone())),
                "version" => resource.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            resource.description = description;
        }
        for child in children {
            match child.entity {
                Entity::ResourceType(resource_type) => resource.resource_type = Some(resource_type),
                Entity::ResourceBlob(blob) => resource.resource_blob = Some(blob),
                Entity::Person(person) => resource.person = Some(person),
                Entity::Keyword(keyword) => {
                    self.add(&mut resource.keywords, keyword, element, &child.tag)
                }
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(resource)
    }

    pub fn build_resource_blob(&mut self, element: &XmlElement) -> Result<ResourceBlob> {
        self.expect_tag(EntityKind::ResourceBlob, element)?;
        let mut blob = ResourceBlob::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => blob.id = Some(coercion::parse_long(name, value)?),
                "name" => blob.name = Some(value.clone()),
                "description" => blob.description = Some(value.clone()),
                "bytearray" => blob.byte_array = Some(coercion::decode_base64(name, value)?),
                "version" => blob.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            blob.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(blob)
    }

    pub fn build_resource_type(&mut self, element: &XmlElement) -> Result<ResourceType> {
        self.expect_tag(EntityKind::ResourceType, element)?;
        let mut resource_type = ResourceType::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => resource_type.id = Some(coercion::parse_long(name, value)?),
                "name" => resource_type.name = Some(value.clone()),
                "description" => resource_type.description = Some(value.clone()),
                "version" => resource_type.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            resource_type.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(resource_type)
    }

    pub fn build_software(&mut self, element: &XmlElement) -> Result<Software> {
        self.expect_tag(EntityKind::Software, element)?;
        let mut software = Software::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => software.id = Some(coercion::parse_long(name, value)?),
                "name" => software.name = Some(value.clone()),
                "description" => software.description = Some(value.clone()),
                "uristring" | "uri" | "url" => software.uri_string = Some(value.clone()),
                "softwareversion" => software.software_version = Some(value.clone()),
                "version" => {
                    software.version = self.version(element, value)?;
                    // Older documents put the release name ("2.1b") in version.
                    if !software.version.is_known() && software.software_version.is_none() {
                        software.software_version = Some(value.clone());
                    }
                }
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            software.description = description;
        }
        for child in children {
            match child.entity {
                Entity::Person(person) => software.person = Some(person),
                Entity::Resource(resource) => {
                    self.add(&mut software.resources, resource, element, &child.tag)
                }
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(software)
    }

    pub fn build_standard_domain(&mut self, element: &XmlElement) -> Result<StandardDomain> {
        self.expect_tag(EntityKind::StandardDomain, element)?;
        let mut domain = StandardDomain::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => domain.id = Some(coercion::parse_long(name, value)?),
                "name" => domain.name = Some(value.clone()),
                "description" => domain.description = Some(value.clone()),
                "version" => domain.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            domain.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(domain)
    }

    pub fn build_standard_keyword(&mut self, element: &XmlElement) -> Result<StandardKeyword> {
        self.expect_tag(EntityKind::StandardKeyword, element)?;
        let mut keyword = StandardKeyword::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => keyword.id = Some(coercion::parse_long(name, value)?),
                "name" => keyword.name = Some(value.clone()),
                "description" => keyword.description = Some(value.clone()),
                "version" => keyword.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            keyword.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(keyword)
    }

    pub fn build_standard_reference_scale(
        &mut self,
        element: &XmlElement,
    ) -> Result<StandardReferenceScale> {
        self.expect_tag(EntityKind::StandardReferenceScale, element)?;
        let mut scale = StandardReferenceScale::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => scale.id = Some(coercion::parse_long(name, value)?),
                "name" => scale.name = Some(value.clone()),
                "description" => scale.description = Some(value.clone()),
                "version" => scale.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            scale.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(scale)
    }

    pub fn build_standard_unit(&mut self, element: &XmlElement) -> Result<StandardUnit> {
        self.expect_tag(EntityKind::StandardUnit, element)?;
        let mut unit = StandardUnit::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => unit.id = Some(coercion::parse_long(name, value)?),
                "name" => unit.name = Some(value.clone()),
                "description" => unit.description = Some(value.clone()),
                "longname" => unit.long_name = Some(value.clone()),
                "symbol" => unit.symbol = Some(value.clone()),
                "version" => unit.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            unit.description = description;
        }
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(unit)
    }

    pub fn build_standard_variable(&mut self, element: &XmlElement) -> Result<StandardVariable> {
        self.expect_tag(EntityKind::StandardVariable, element)?;
        let mut variable = StandardVariable::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => variable.id = Some(coercion::parse_long(name, value)?),
                "name" => variable.name = Some(value.clone()),
                "namespaceuristring" => variable.namespace_uri_string = Some(value.clone()),
                "description" => variable.description = Some(value.clone()),
                "referencescale" => variable.reference_scale = Some(value.clone()),
                "version" => variable.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (description, children) = self.build_children(element)?;
        if description.is_some() {
            variable.description = description;
        }
        for child in children {
            match child.entity {
                Entity::StandardUnit(unit) => {
                    self.add(&mut variable.standard_units, unit, element, &child.tag)
                }
                entity => self.unroutable(
                    element,
                    Child {
                        tag: child.tag,
                        entity,
                    },
                )?,
            }
        }
        Ok(variable)
    }

    pub fn build_user_group(&mut self, element: &XmlElement) -> Result<UserGroup> {
        self.expect_tag(EntityKind::UserGroup, element)?;
        let mut group = UserGroup::default();
        for (name, value) in &element.attributes {
            match name.to_ascii_lowercase().as_str() {
                "id" => group.id = Some(coercion::parse_long(name, value)?),
                "groupname" => group.group_name = Some(value.clone()),
                "version" => group.version = self.version(element, value)?,
                _ => self.unknown_attribute(element, name)?,
            }
        }
        let (_, children) = self.build_children(element)?;
        for child in children {
            self.unroutable(element, child)?;
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseMode;

    fn element(xml: &str) -> XmlElement {
        xml::parse_str(xml).unwrap()
    }

    #[test]
    fn test_tag_mismatch() {
        let mut builder = ObjectBuilder::default();
        let err = builder
            .build_keyword(&element(r#"<Device uuid="x"/>"#))
            .unwrap_err();
        assert_eq!(
            err,
            MetadataError::SchemaMismatch {
                expected: "Keyword".to_string(),
                found: "Device".to_string(),
            }
        );
    }

    #[test]
    fn test_attribute_names_ignore_case_and_unknown_skipped() {
        let mut builder = ObjectBuilder::default();
        let device = builder
            .build_device(&element(
                r#"<device UUID="1234" MfgName="SeaBird" colour="orange" type="CTD"/>"#,
            ))
            .unwrap();
        assert_eq!(device.uuid.as_deref(), Some("1234"));
        assert_eq!(device.mfg_name.as_deref(), Some("SeaBird"));
        assert_eq!(device.device_type, Some(DeviceType::named("CTD")));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_attribute() {
        let config = MarshalConfig::builder().mode(ParseMode::Strict).build();
        let mut builder = ObjectBuilder::new(config);
        let err = builder
            .build_keyword(&element(r#"<Keyword name="a" colour="red"/>"#))
            .unwrap_err();
        assert!(matches!(err, MetadataError::UnknownConstruct { .. }));
    }

    #[test]
    fn test_version_sentinel_and_strict_version() {
        let xml = r#"<Keyword name="a" version="not-a-number"/>"#;
        let keyword = ObjectBuilder::default().build_keyword(&element(xml)).unwrap();
        assert_eq!(keyword.version, Version::UNKNOWN);

        let mut strict = ObjectBuilder::new(MarshalConfig::builder().strict().build());
        assert!(matches!(
            strict.build_keyword(&element(xml)),
            Err(MetadataError::Conversion { .. })
        ));
    }

    #[test]
    fn test_software_version_fallback() {
        let software = ObjectBuilder::default()
            .build_software(&element(r#"<Software name="ingest" version="2.1b"/>"#))
            .unwrap();
        assert_eq!(software.version, Version::UNKNOWN);
        assert_eq!(software.software_version.as_deref(), Some("2.1b"));
    }

    #[test]
    fn test_description_child_wins_over_dispatch() {
        let keyword = ObjectBuilder::default()
            .build_keyword(&element(
                "<Keyword name=\"a\" description=\"attr\"><description> from child </description></Keyword>",
            ))
            .unwrap();
        assert_eq!(keyword.description.as_deref(), Some("from child"));
    }

    #[test]
    fn test_unroutable_child_is_recorded_not_fatal() {
        let mut builder = ObjectBuilder::default();
        let person = builder
            .build_person(&element(
                r#"<Person username="kgomes"><Keyword name="oops"/><UserGroup groupName="admin"/></Person>"#,
            ))
            .unwrap();
        assert_eq!(person.user_groups, vec![UserGroup::named("admin")]);
        assert_eq!(builder.errors.len(), 1);
    }

    #[test]
    fn test_consumer_only_from_consumer_tag() {
        let mut builder = ObjectBuilder::default();
        let container = builder
            .build_data_container(&element(
                r#"<DataContainer uriString="u1">
                     <destiny><ProcessRun name="qc"/></destiny>
                     <ProcessRun name="stray"/>
                   </DataContainer>"#,
            ))
            .unwrap();
        assert_eq!(container.consumers.len(), 1);
        assert_eq!(container.consumers[0].name.as_deref(), Some("qc"));
        assert_eq!(
            container.consumers[0].data_producer_type,
            Some(DataProducerType::ProcessRun)
        );
        assert_eq!(builder.errors.len(), 1);
    }

    #[test]
    fn test_output_routed_by_wrapper_tag() {
        let mut builder = ObjectBuilder::default();
        let producer = builder
            .build_data_producer(&element(
                r#"<Deployment name="m1">
                     <output><DataStream uriString="u1"/></output>
                     <Deployment name="ctd"/>
                   </Deployment>"#,
            ))
            .unwrap();
        assert_eq!(producer.data_producer_type, Some(DataProducerType::Deployment));
        assert_eq!(producer.outputs.len(), 1);
        assert_eq!(
            producer.outputs[0].data_container_type,
            Some(DataContainerType::Stream)
        );
        assert_eq!(producer.child_data_producers.len(), 1);
    }

    #[test]
    fn test_empty_wrapper_yields_nothing() {
        let mut builder = ObjectBuilder::default();
        assert_eq!(
            builder.element_to_entity(&element("<output><Keyword name=\"k\"/></output>")).unwrap(),
            None
        );
        assert_eq!(builder.element_to_entity(&element("<Spaceship/>")).unwrap(), None);
    }

    #[test]
    fn test_bad_base64_is_fatal() {
        let err = ObjectBuilder::default()
            .build_resource_blob(&element(r#"<ResourceBLOB byteArray="%%%"/>"#))
            .unwrap_err();
        assert!(matches!(err, MetadataError::Encoding { .. }));
    }

    #[test]
    fn test_bad_container_type_is_conversion_error() {
        let err = ObjectBuilder::default()
            .build_data_container(&element(r#"<DataContainer dataContainerType="Tape"/>"#))
            .unwrap_err();
        assert!(matches!(err, MetadataError::Conversion { .. }));
    }
}
