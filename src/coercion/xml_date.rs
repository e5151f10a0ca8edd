//! The XML date profile used by every date attribute in a metadata document.
//!
//! Dates are written as `yyyy-MM-ddTHH:mm:ssZ` in UTC. Parsing is forgiving:
//! `/` or `-` separate the date fields, any non-digit run may separate date from
//! time, and an optional zone suffix shifts the result to UTC (`+hh` subtracts,
//! `-hh` adds, a trailing `:mm`, `+mm` or `-mm` adjusts minutes).

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Debug;

static DATE_WITH_ZONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{4})[/|-]+(\d+)[/|-]+(\d+)\D*(\d+):(\d+):(\d+)\s*([^\s\d]\S*)\s*$")
        .expect("valid date regex")
});

static DATE_WITHOUT_ZONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{4})[/|-]+(\d+)[/|-]+(\d+)\D*(\d+):(\d+):(\d+)\s*$")
        .expect("valid date regex")
});

static ZONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\D*([+|-])(\d{2})(\D*)(\d{2})*$").expect("valid zone regex"));

/// Date parse/format collaborator used by the builders
pub trait DateFormat: Debug + Send + Sync {
    /// Parse a date attribute value, `None` when the text is not a date
    fn parse(&self, source: &str) -> Option<DateTime<Utc>>;

    /// Format a date for an attribute value
    fn format(&self, date: &DateTime<Utc>) -> String;
}

/// The fixed SSDS XML date profile
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDateFormat;

impl XmlDateFormat {
    pub fn new() -> Self {
        Self
    }
}

impl DateFormat for XmlDateFormat {
    fn parse(&self, source: &str) -> Option<DateTime<Utc>> {
        let (caps, zone) = if let Some(caps) = DATE_WITH_ZONE.captures(source) {
            let zone = caps.get(7).map(|m| m.as_str().to_string());
            (caps, zone)
        } else {
            (DATE_WITHOUT_ZONE.captures(source)?, None)
        };

        let field = |i: usize| -> Option<i64> { caps.get(i)?.as_str().parse().ok() };
        let year = i32::try_from(field(1)?).ok()?;
        let month = u32::try_from(field(2)?).ok()?;
        let day = u32::try_from(field(3)?).ok()?;

        // Time fields roll over like a lenient calendar, so 24:00:00 is next midnight.
        // Out-of-range results are not dates.
        let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
        let mut date = midnight
            .and_utc()
            .checked_add_signed(TimeDelta::try_hours(field(4)?)?)?
            .checked_add_signed(TimeDelta::try_minutes(field(5)?)?)?
            .checked_add_signed(TimeDelta::try_seconds(field(6)?)?)?;

        if let Some(zone) = zone {
            date = date.checked_add_signed(zone_correction(&zone)?)?;
        }
        Some(date)
    }

    fn format(&self, date: &DateTime<Utc>) -> String {
        date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Offset to add to a local time carrying `zone` to reach UTC.
///
/// Zones the pattern does not recognise count as UTC.
fn zone_correction(zone: &str) -> Option<TimeDelta> {
    let Some(caps) = ZONE.captures(zone) else {
        return Some(TimeDelta::zero());
    };
    let negative_zone = &caps[1] == "-";
    let hours: i64 = caps[2].parse().ok()?;
    let mut correction = TimeDelta::try_hours(if negative_zone { hours } else { -hours })?;

    if let Some(minutes) = caps.get(4).and_then(|m| m.as_str().parse::<i64>().ok()) {
        let indicator = caps.get(3).map_or("", |m| m.as_str());
        let add_minutes = match indicator {
            ":" => Some(negative_zone),
            "+" => Some(false),
            "-" => Some(true),
            _ => None,
        };
        let minutes = TimeDelta::try_minutes(minutes)?;
        correction = match add_minutes {
            Some(true) => correction.checked_add(&minutes)?,
            Some(false) => correction.checked_sub(&minutes)?,
            None => correction,
        };
    }
    Some(correction)
}
