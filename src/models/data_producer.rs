//! DataProducer and DataProducerGroup entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    BusinessKey, DataContainer, Device, Event, Keyword, Person, Resource, Software, Version,
    keys_match,
};

/// Recognised values of `DataProducer::role`
pub const ROLES: [&str; 4] = ["sensor", "instrument", "platform", "observatory"];

/// A Deployment of a Device or a ProcessRun of Software
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataProducerType {
    Deployment,
    ProcessRun,
}

impl DataProducerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataProducerType::Deployment => "Deployment",
            DataProducerType::ProcessRun => "ProcessRun",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("Deployment") {
            Some(DataProducerType::Deployment)
        } else if value.eq_ignore_ascii_case("ProcessRun") {
            Some(DataProducerType::ProcessRun)
        } else {
            None
        }
    }
}

impl fmt::Display for DataProducerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DataProducer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_producer_type: Option<DataProducerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_latitude_accuracy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_longitude_accuracy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_depth: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_depth_accuracy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_benthic_altitude: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_benthic_altitude_accuracy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_offset: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_offset: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_offset: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x3d_orientation_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    pub version: Version,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<Software>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub child_data_producers: Vec<DataProducer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data_producer_groups: Vec<DataProducerGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<Keyword>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<DataContainer>,
}

impl DataProducer {
    pub fn new(data_producer_type: DataProducerType) -> Self {
        Self {
            data_producer_type: Some(data_producer_type),
            ..Default::default()
        }
    }

    pub fn is_deployment(&self) -> bool {
        self.data_producer_type == Some(DataProducerType::Deployment)
    }
}

impl BusinessKey for DataProducer {
    fn same_entity(&self, other: &Self) -> bool {
        if let Some(same_name) = keys_match(self.name.as_ref(), other.name.as_ref()) {
            return same_name
                && self.data_producer_type == other.data_producer_type
                && self.start_date == other.start_date;
        }
        keys_match(self.id, other.id).unwrap_or_else(|| self == other)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DataProducerGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: Version,
}

impl DataProducerGroup {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl BusinessKey for DataProducerGroup {
    fn same_entity(&self, other: &Self) -> bool {
        keys_match(self.name.as_ref(), other.name.as_ref()).unwrap_or_else(|| self == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_type_parse() {
        assert_eq!(
            DataProducerType::parse("processrun"),
            Some(DataProducerType::ProcessRun)
        );
        assert_eq!(DataProducerType::parse("Cruise"), None);
    }

    #[test]
    fn test_producer_key_uses_name_type_and_start() {
        let mut a = DataProducer::new(DataProducerType::Deployment);
        a.name = Some("MOOS M1".to_string());
        let mut b = a.clone();
        b.id = Some(99);
        assert!(a.same_entity(&b));

        b.data_producer_type = Some(DataProducerType::ProcessRun);
        assert!(!a.same_entity(&b));
    }

    #[test]
    fn test_unnamed_producers_keyed_by_id() {
        let mut a = DataProducer::default();
        a.id = Some(1);
        let mut b = DataProducer::default();
        b.id = Some(1);
        b.host_name = Some("shore".to_string());
        assert!(a.same_entity(&b));
    }
}
