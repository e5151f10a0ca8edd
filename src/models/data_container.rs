//! DataContainer and DataContainerGroup entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    BusinessKey, DataProducer, HeaderDescription, Keyword, Person, RecordDescription, Resource,
    Version, keys_match,
};

/// Whether a DataContainer holds a file or a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataContainerType {
    File,
    Stream,
}

impl DataContainerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataContainerType::File => "File",
            DataContainerType::Stream => "Stream",
        }
    }

    /// Parse a `dataContainerType` attribute value, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("File") {
            Some(DataContainerType::File)
        } else if value.eq_ignore_ascii_case("Stream") {
            Some(DataContainerType::Stream)
        } else {
            None
        }
    }
}

impl fmt::Display for DataContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A described unit of data: a file or a stream
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DataContainer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_container_type: Option<DataContainerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_records: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dods_accessible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dods_url_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_net_cdf: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_depth: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<f32>,
    pub version: Version,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_description: Option<HeaderDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_description: Option<RecordDescription>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data_container_groups: Vec<DataContainerGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<Keyword>,
    /// DataProducers that read this container as input
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumers: Vec<DataProducer>,
}

impl DataContainer {
    pub fn new(data_container_type: DataContainerType) -> Self {
        Self {
            data_container_type: Some(data_container_type),
            ..Default::default()
        }
    }

    pub fn is_file(&self) -> bool {
        self.data_container_type == Some(DataContainerType::File)
    }
}

impl BusinessKey for DataContainer {
    fn same_entity(&self, other: &Self) -> bool {
        keys_match(self.uri_string.as_ref(), other.uri_string.as_ref())
            .unwrap_or_else(|| self == other)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DataContainerGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: Version,
}

impl DataContainerGroup {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl BusinessKey for DataContainerGroup {
    fn same_entity(&self, other: &Self) -> bool {
        keys_match(self.name.as_ref(), other.name.as_ref()).unwrap_or_else(|| self == other)
    }
}
