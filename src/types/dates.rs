//! Date parsing for request bodies
//!
//! The admin forms submit `datetime-local` and `date` inputs, while API
//! clients tend to send full RFC 3339 timestamps. All three are accepted;
//! zone-less values are taken as UTC.

use bson::DateTime;
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::error::{HubError, Result};

const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a date string from a request body into a BSON date
pub fn parse_date(field: &str, raw: &str) -> Result<DateTime> {
    let raw = raw.trim();

    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(DateTime::from_chrono(parsed.with_timezone(&Utc)));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(DateTime::from_chrono(Utc.from_utc_datetime(&naive)));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::from_chrono(Utc.from_utc_datetime(&midnight)));
        }
    }

    Err(HubError::BadRequest(format!("Invalid date for {}: {}", field, raw)))
}
