//! Typed values flowing between coercion and the repository.

use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

use super::definition::FieldDef;

/// A record as returned to callers: JSON object with camelCase keys.
pub type Record = serde_json::Map<String, Value>;

/// A coerced field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Absent value.
    Null,
    /// Text or asset reference.
    Text(String),
    /// Integer.
    Integer(i64),
    /// Flag.
    Boolean(bool),
    /// Point in time.
    Timestamp(DateTime<Utc>),
    /// Calendar date.
    Date(NaiveDate),
}

impl FieldValue {
    /// Returns `true` for [`FieldValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON form, matching what the relational store returns on read.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(n) => Value::from(*n),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Timestamp(ts) => Value::String(format_timestamp(ts)),
            Self::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Canonical wire format for timestamps.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A coerced primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Integer key.
    Integer(i64),
    /// Text key.
    Text(String),
}

impl RecordKey {
    /// JSON form of the key.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(n) => Value::from(*n),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One field write.
#[derive(Debug, Clone)]
pub struct FieldChange {
    /// Field written.
    pub field: &'static FieldDef,
    /// New value.
    pub value: FieldValue,
}

/// Equality predicate on a declared field.
#[derive(Debug, Clone)]
pub struct Filter {
    /// Field compared.
    pub field: &'static FieldDef,
    /// Value it must equal.
    pub value: FieldValue,
}

/// Parsed list parameters.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Conjunction of equality predicates.
    pub filters: Vec<Filter>,
    /// Maximum number of records.
    pub limit: Option<u64>,
}
