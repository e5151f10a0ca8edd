//! Keyword, Event and Software entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BusinessKey, Person, Resource, Version, keys_match};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Keyword {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: Version,
}

impl Keyword {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl BusinessKey for Keyword {
    fn same_entity(&self, other: &Self) -> bool {
        keys_match(self.name.as_ref(), other.name.as_ref()).unwrap_or_else(|| self == other)
    }
}

/// Something that happened during a deployment (e.g. a recovery or a calibration)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub version: Version,
}

impl BusinessKey for Event {
    fn same_entity(&self, other: &Self) -> bool {
        match keys_match(self.name.as_ref(), other.name.as_ref()) {
            Some(true) => self.start_date == other.start_date && self.end_date == other.end_date,
            Some(false) => false,
            None => self == other,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Software {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
    pub version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

impl BusinessKey for Software {
    fn same_entity(&self, other: &Self) -> bool {
        match keys_match(self.name.as_ref(), other.name.as_ref()) {
            Some(true) => self.software_version == other.software_version,
            Some(false) => false,
            None => self == other,
        }
    }
}
