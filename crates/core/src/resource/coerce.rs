//! Input coercion.
//!
//! Request bodies and query strings arrive loosely typed: numbers as strings,
//! flags as `"on"`, dates in several shapes. Everything is normalized here,
//! before the repository sees it.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::definition::{FieldDef, FieldDefault, FieldKind, KeyKind, ResourceDefinition};
use super::error::ResourceError;
use super::value::{FieldChange, FieldValue, Filter, ListQuery, RecordKey};

/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";

const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Coerce one raw JSON value to the kind of `field`.
///
/// # Errors
///
/// Returns a validation error naming the field when the value cannot be
/// interpreted as the declared kind.
pub fn coerce_value(field: &FieldDef, raw: &Value) -> Result<FieldValue, ResourceError> {
    let invalid = || {
        ResourceError::validation(format!(
            "field '{}' expects {}",
            field.name,
            describe(field.kind)
        ))
    };

    if let Value::String(s) = raw
        && s.trim().is_empty()
    {
        return Ok(FieldValue::Null);
    }

    let value = match (field.kind, raw) {
        (_, Value::Null) => FieldValue::Null,
        (FieldKind::Text | FieldKind::Asset, Value::String(s)) => FieldValue::Text(s.clone()),
        (FieldKind::Integer, Value::Number(n)) => {
            FieldValue::Integer(n.as_i64().ok_or_else(invalid)?)
        }
        (FieldKind::Integer, Value::String(s)) => {
            FieldValue::Integer(s.trim().parse().map_err(|_| invalid())?)
        }
        (FieldKind::Boolean, Value::Bool(b)) => FieldValue::Boolean(*b),
        (FieldKind::Boolean, Value::Number(n)) => match n.as_i64() {
            Some(0) => FieldValue::Boolean(false),
            Some(1) => FieldValue::Boolean(true),
            _ => return Err(invalid()),
        },
        (FieldKind::Boolean, Value::String(s)) => {
            FieldValue::Boolean(parse_flag(s).ok_or_else(invalid)?)
        }
        (FieldKind::Timestamp, Value::String(s)) => {
            FieldValue::Timestamp(parse_timestamp(s).ok_or_else(invalid)?)
        }
        (FieldKind::Date, Value::String(s)) => FieldValue::Date(parse_date(s).ok_or_else(invalid)?),
        _ => return Err(invalid()),
    };

    Ok(value)
}

const fn describe(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "a string",
        FieldKind::Asset => "an asset key or URL",
        FieldKind::Integer => "an integer",
        FieldKind::Boolean => "a boolean",
        FieldKind::Timestamp => "a timestamp",
        FieldKind::Date => "a date (YYYY-MM-DD)",
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a timestamp; zone-less inputs are taken as UTC.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ts.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Parse a calendar date, accepting a full timestamp for its date part.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|ts| ts.date_naive()))
}

/// Coerce a raw path or query id to the key kind of `def`.
///
/// # Errors
///
/// Returns a validation error, never not-found, when the id is empty or not
/// of the declared kind.
pub fn parse_key(def: &ResourceDefinition, raw: &str) -> Result<RecordKey, ResourceError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ResourceError::validation(format!(
            "{} id must not be empty",
            def.name
        )));
    }

    match def.key.kind {
        KeyKind::Integer => raw.parse().map(RecordKey::Integer).map_err(|_| {
            ResourceError::validation(format!("{} id must be an integer, got '{raw}'", def.name))
        }),
        KeyKind::Text => Ok(RecordKey::Text(raw.to_string())),
    }
}

/// Coerce a JSON id (string or number) to the key kind of `def`.
///
/// # Errors
///
/// Returns a validation error for any other JSON type or an unparsable id.
pub fn key_from_json(def: &ResourceDefinition, raw: &Value) -> Result<RecordKey, ResourceError> {
    match raw {
        Value::String(s) => parse_key(def, s),
        Value::Number(n) => parse_key(def, &n.to_string()),
        _ => Err(ResourceError::validation(format!(
            "{} id must be a string or number",
            def.name
        ))),
    }
}

fn as_object(body: &Value) -> Result<&serde_json::Map<String, Value>, ResourceError> {
    body.as_object()
        .ok_or_else(|| ResourceError::validation("request body must be a JSON object"))
}

/// Coerce a create body.
///
/// Applies declared defaults and checks required fields, reporting every
/// missing field at once. Returns the caller-supplied key for text-keyed
/// resources; integer keys are always assigned by the store.
///
/// # Errors
///
/// Returns a validation error if the body is not an object, a value cannot be
/// coerced, or required fields are missing.
pub fn coerce_create(
    def: &'static ResourceDefinition,
    body: &Value,
) -> Result<(Option<RecordKey>, Vec<FieldChange>), ResourceError> {
    let object = as_object(body)?;

    let key = match (def.key.kind, object.get(def.key.name)) {
        (KeyKind::Text, Some(raw)) if !is_blank(raw) => Some(key_from_json(def, raw)?),
        _ => None,
    };

    let mut changes = Vec::with_capacity(def.fields.len());
    let mut missing = Vec::new();

    for field in def.fields {
        let mut value = match object.get(field.name) {
            Some(raw) => coerce_value(field, raw)?,
            None => FieldValue::Null,
        };

        if value.is_null() {
            value = match field.default {
                FieldDefault::None => FieldValue::Null,
                FieldDefault::Now => FieldValue::Timestamp(Utc::now()),
                FieldDefault::Bool(b) => FieldValue::Boolean(b),
            };
        }

        if value.is_null() {
            if field.required {
                missing.push(field.name);
            }
            continue;
        }

        changes.push(FieldChange { field, value });
    }

    if !missing.is_empty() {
        return Err(ResourceError::validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    Ok((key, changes))
}

/// Coerce a partial update body.
///
/// Only declared fields are kept; the key and timestamps are ignored.
///
/// # Errors
///
/// Returns a validation error if the body is not an object, a value cannot be
/// coerced, or a required field is set to null.
pub fn coerce_update(
    def: &'static ResourceDefinition,
    body: &Value,
) -> Result<Vec<FieldChange>, ResourceError> {
    let object = as_object(body)?;
    let mut changes = Vec::new();

    for (name, raw) in object {
        if def.is_read_only(name) {
            continue;
        }
        let Some(field) = def.field(name) else {
            debug!(resource = def.name, field = %name, "Ignoring undeclared field");
            continue;
        };

        let value = coerce_value(field, raw)?;
        if value.is_null() && field.required {
            return Err(ResourceError::validation(format!(
                "field '{}' is required and cannot be cleared",
                field.name
            )));
        }
        changes.push(FieldChange { field, value });
    }

    Ok(changes)
}

/// Parse list query parameters into typed filters and a limit.
///
/// Undeclared parameters are ignored. Empty filter values are skipped.
///
/// # Errors
///
/// Returns a validation error if `limit` or a declared filter value cannot be
/// coerced.
pub fn parse_list_query(
    def: &'static ResourceDefinition,
    params: &HashMap<String, String>,
) -> Result<ListQuery, ResourceError> {
    let limit = match params.get(LIMIT_PARAM).map(|s| s.trim()) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .ok()
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(|| {
                    ResourceError::validation(format!(
                        "limit must be a non-negative integer no larger than {}, got '{raw}'",
                        i64::MAX
                    ))
                })?,
        ),
    };

    let mut filters = Vec::new();
    for filter in def.filters {
        let Some(raw) = params.get(filter.param) else {
            continue;
        };
        let Some(field) = def.field(filter.field) else {
            continue;
        };

        let value = coerce_value(field, &Value::String(raw.clone()))?;
        if !value.is_null() {
            filters.push(Filter { field, value });
        }
    }

    for param in params.keys() {
        if param != LIMIT_PARAM && param != def.key.name && def.filter(param).is_none() {
            debug!(resource = def.name, param = %param, "Ignoring undeclared filter");
        }
    }

    Ok(ListQuery { filters, limit })
}

fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
