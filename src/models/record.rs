//! Record layout entities: HeaderDescription, CommentTag, RecordDescription, RecordVariable

use serde::{Deserialize, Serialize};

use super::{
    BusinessKey, StandardDomain, StandardKeyword, StandardReferenceScale, StandardUnit,
    StandardVariable, Version, keys_match,
};

/// Describes the header lines that precede records in a DataContainer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_header_lines: Option<i32>,
    pub version: Version,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comment_tags: Vec<CommentTag>,
}

impl BusinessKey for HeaderDescription {
    fn same_entity(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentTag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_string: Option<String>,
    pub version: Version,
}

impl CommentTag {
    pub fn new(tag_string: impl Into<String>) -> Self {
        Self {
            tag_string: Some(tag_string.into()),
            ..Default::default()
        }
    }
}

impl BusinessKey for CommentTag {
    fn same_entity(&self, other: &Self) -> bool {
        keys_match(self.tag_string.as_ref(), other.tag_string.as_ref())
            .unwrap_or_else(|| self == other)
    }
}

/// Layout of the records inside a DataContainer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_parse_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_item_separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_length_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_terminator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parseable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endian: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_parse_reg_exp: Option<String>,
    pub version: Version,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub record_variables: Vec<RecordVariable>,
}

impl RecordDescription {
    /// Record variables in column order: indexed variables ascending, then the
    /// unindexed ones in their original order.
    pub fn ordered_variables(&self) -> Vec<&RecordVariable> {
        let mut indexed: Vec<&RecordVariable> = self
            .record_variables
            .iter()
            .filter(|v| v.column_index.is_some_and(|i| i >= 0))
            .collect();
        // Stable sort keeps encounter order among equal indices.
        indexed.sort_by_key(|v| v.column_index);
        indexed.extend(
            self.record_variables
                .iter()
                .filter(|v| !v.column_index.is_some_and(|i| i >= 0)),
        );
        indexed
    }
}

impl BusinessKey for RecordDescription {
    fn same_entity(&self, other: &Self) -> bool {
        self == other
    }
}

/// One column of a record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordVariable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_sensor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_reg_exp: Option<String>,
    pub version: Version,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_domain: Option<StandardDomain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_keyword: Option<StandardKeyword>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_reference_scale: Option<StandardReferenceScale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_unit: Option<StandardUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_variable: Option<StandardVariable>,
}

impl RecordVariable {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl BusinessKey for RecordVariable {
    fn same_entity(&self, other: &Self) -> bool {
        self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str, column_index: Option<i64>) -> RecordVariable {
        RecordVariable {
            column_index,
            ..RecordVariable::named(name)
        }
    }

    #[test]
    fn test_ordered_variables() {
        let description = RecordDescription {
            record_variables: vec![
                variable("pressure", Some(2)),
                variable("time", Some(0)),
                variable("notes", None),
                variable("flag", Some(-1)),
                variable("temperature", Some(1)),
            ],
            ..Default::default()
        };
        let names: Vec<&str> = description
            .ordered_variables()
            .iter()
            .filter_map(|v| v.name.as_deref())
            .collect();
        assert_eq!(names, ["time", "temperature", "pressure", "notes", "flag"]);
    }
}
