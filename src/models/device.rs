//! Device and DeviceType entities

use serde::{Deserialize, Serialize};

use super::{BusinessKey, Person, Resource, Version, keys_match};

/// A physical instrument, identified by its uuid
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfg_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfg_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfg_serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_url_list: Option<String>,
    pub version: Version,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

impl BusinessKey for Device {
    fn same_entity(&self, other: &Self) -> bool {
        keys_match(self.uuid.as_ref(), other.uuid.as_ref()).unwrap_or_else(|| self == other)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: Version,
}

impl DeviceType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl BusinessKey for DeviceType {
    fn same_entity(&self, other: &Self) -> bool {
        keys_match(self.name.as_ref(), other.name.as_ref()).unwrap_or_else(|| self == other)
    }
}
