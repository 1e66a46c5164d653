//! Typed readers turning untyped frontmatter values into validated fields.
//!
//! Every reader fails fast with the offending field name and never coerces a
//! value of the wrong shape.

use super::error::ValidationError;
use crate::codec::{FrontmatterMap, FrontmatterValue};
use crate::util::unique_strings;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Reads a required scalar, trimmed and non-empty.
pub(crate) fn required_string(
    map: &FrontmatterMap,
    key: &str,
    label: &str,
) -> Result<String, ValidationError> {
    match map.get(key) {
        Some(FrontmatterValue::Scalar(value)) if !value.trim().is_empty() => {
            Ok(value.trim().to_string())
        }
        Some(FrontmatterValue::Scalar(_)) | None => Err(ValidationError::EmptyField {
            field: label.to_string(),
        }),
        Some(_) => Err(ValidationError::NotAString {
            field: label.to_string(),
        }),
    }
}

/// Reads an optional scalar as-is.
pub(crate) fn optional_string(
    map: &FrontmatterMap,
    key: &str,
    label: &str,
) -> Result<Option<String>, ValidationError> {
    match map.get(key) {
        None => Ok(None),
        Some(FrontmatterValue::Scalar(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ValidationError::NotAString {
            field: label.to_string(),
        }),
    }
}

/// Reads an optional array of scalars, trimmed, without empties or duplicates.
pub(crate) fn string_list(
    map: &FrontmatterMap,
    key: &str,
    label: &str,
) -> Result<Vec<String>, ValidationError> {
    match map.get(key) {
        None => Ok(Vec::new()),
        Some(FrontmatterValue::Array(values)) => Ok(unique_strings(values)),
        Some(_) => Err(ValidationError::NotAStringArray {
            field: label.to_string(),
        }),
    }
}

/// Reads an optional timestamp scalar and checks it is a calendar date-time.
pub(crate) fn optional_timestamp(
    map: &FrontmatterMap,
    key: &str,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = optional_string(map, key, key)? else {
        return Ok(None);
    };
    validate_timestamp(&value, key)?;
    Ok(Some(value))
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` and plain `YYYY-MM-DD`.
pub fn validate_timestamp(value: &str, field: &str) -> Result<(), ValidationError> {
    let candidate = value.trim();
    let valid = DateTime::parse_from_rfc3339(candidate).is_ok()
        || NaiveDateTime::parse_from_str(candidate, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(candidate, "%Y-%m-%d").is_ok();
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}
