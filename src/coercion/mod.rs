//! Scalar coercion between attribute text and typed entity fields
//!
//! Every parser names the field and raw value in its `MetadataError::Conversion`.
//! `version` is the exception: [`parse_version`] never fails, callers fall back to
//! [`VERSION_SENTINEL`].

pub mod xml_date;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

use crate::error::{MetadataError, Result};

pub use xml_date::{DateFormat, XmlDateFormat};

/// Version value of an entity whose version is unknown
pub const VERSION_SENTINEL: i64 = -1;

pub fn parse_long(field: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| MetadataError::conversion(field, value, "long"))
}

pub fn parse_int(field: &str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| MetadataError::conversion(field, value, "integer"))
}

pub fn parse_double(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| MetadataError::conversion(field, value, "double"))
}

pub fn parse_float(field: &str, value: &str) -> Result<f32> {
    value
        .trim()
        .parse::<f32>()
        .map_err(|_| MetadataError::conversion(field, value, "float"))
}

/// `true` or `false`, ignoring case. Anything else is an error.
pub fn parse_bool(field: &str, value: &str) -> Result<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(MetadataError::conversion(field, value, "boolean"))
    }
}

pub fn parse_date(format: &dyn DateFormat, field: &str, value: &str) -> Result<DateTime<Utc>> {
    format
        .parse(value)
        .ok_or_else(|| MetadataError::conversion(field, value, "date"))
}

/// Parse a version attribute. `None` means the caller keeps the sentinel.
pub fn parse_version(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

pub fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>> {
    // Encoders commonly wrap long payloads, so whitespace is not significant.
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| MetadataError::Encoding {
            field: field.to_string(),
            message: e.to_string(),
        })
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Render a double the way it is written back into an attribute.
/// `None` for NaN, which has no attribute form.
pub fn format_double(value: f64) -> Option<String> {
    if value.is_nan() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn format_float(value: f32) -> Option<String> {
    if value.is_nan() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_parsing() {
        assert_eq!(parse_long("id", " 42 ").unwrap(), 42);
        assert_eq!(parse_int("numHeaderLines", "7").unwrap(), 7);
        assert_eq!(parse_double("minLatitude", "-36.5").unwrap(), -36.5);
        assert_eq!(parse_float("xoffset", "1.25").unwrap(), 1.25);
    }

    #[test]
    fn test_conversion_error_names_field_and_value() {
        let err = parse_long("contentLength", "lots").unwrap_err();
        assert_eq!(
            err,
            MetadataError::Conversion {
                field: "contentLength".to_string(),
                value: "lots".to_string(),
                target: "long",
            }
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("original", "TRUE").unwrap());
        assert!(!parse_bool("original", "false").unwrap());
        assert!(parse_bool("original", "yes").is_err());
    }

    #[test]
    fn test_parse_version_never_fails() {
        assert_eq!(parse_version("3"), Some(3));
        assert_eq!(parse_version("not-a-number"), None);
    }

    #[test]
    fn test_parse_date_error() {
        let err = parse_date(&XmlDateFormat, "startDate", "not-a-date").unwrap_err();
        assert!(matches!(err, MetadataError::Conversion { target: "date", .. }));
    }

    #[test]
    fn test_base64() {
        let encoded = encode_base64(b"SSDS blob");
        assert_eq!(decode_base64("byteArray", &encoded).unwrap(), b"SSDS blob");
        assert_eq!(decode_base64("byteArray", "U1NE\nUyBibG9i").unwrap(), b"SSDS blob");
        assert!(matches!(
            decode_base64("byteArray", "%%%"),
            Err(MetadataError::Encoding { .. })
        ));
    }

    #[test]
    fn test_nan_has_no_attribute_form() {
        assert_eq!(format_double(f64::NAN), None);
        assert_eq!(format_double(2.5), Some("2.5".to_string()));
        assert_eq!(format_float(f32::NAN), None);
    }
}
