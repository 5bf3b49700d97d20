//! Record post-processing
//!
//! Aircall reports call timestamps (`started_at`, `answered_at`, `ended_at`)
//! as Unix epochs. Streams declare which fields carry epochs and those are
//! rewritten into RFC 3339 UTC strings before the record is emitted.

use crate::error::{Error, Result};
use crate::types::Record;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Rewrite the declared epoch fields of a record as UTC timestamps.
///
/// Absent and null fields are left untouched. Anything other than a number
/// is rejected rather than coerced.
pub fn normalize(mut record: Record, stream: &str, datetime_fields: &[String]) -> Result<Record> {
    for field in datetime_fields {
        let Some(value) = record.get_mut(field.as_str()) else {
            continue;
        };
        if value.is_null() {
            continue;
        }

        let timestamp = epoch_to_timestamp(value)
            .map_err(|message| Error::data_quality(stream, field.as_str(), message))?;
        *value = Value::String(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }
    Ok(record)
}

/// Convert a JSON epoch (integer or fractional seconds) into a UTC datetime
pub fn epoch_to_timestamp(value: &Value) -> std::result::Result<DateTime<Utc>, String> {
    let Value::Number(number) = value else {
        return Err(format!("expected a Unix timestamp, found {value}"));
    };

    let parsed = if let Some(secs) = number.as_i64() {
        DateTime::from_timestamp(secs, 0)
    } else if let Some(secs) = number.as_f64() {
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1e9).round() as u32;
        if whole.is_finite() && whole.abs() < i64::MAX as f64 {
            DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
        } else {
            None
        }
    } else {
        None
    };

    parsed.ok_or_else(|| format!("Unix timestamp {number} is out of range"))
}
