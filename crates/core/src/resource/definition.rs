//! Static resource type definitions.
//!
//! A [`ResourceDefinition`] is everything the generic engine needs to serve
//! one resource type: its table, key, fields, relations, ordering, filters,
//! and the asset folder its uploads land in. Definitions are immutable and
//! live in [`crate::catalog`].

use crate::asset::AssetFolder;

/// JSON name of the creation timestamp present on every record.
pub const CREATED_AT: &str = "createdAt";
/// JSON name of the last-modification timestamp present on every record.
pub const UPDATED_AT: &str = "updatedAt";

/// Primary key type of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Store-assigned integer.
    Integer,
    /// Caller-chosen or generated text.
    Text,
}

/// Primary key definition.
#[derive(Debug, Clone, Copy)]
pub struct KeyDef {
    /// JSON field name.
    pub name: &'static str,
    /// Column name.
    pub column: &'static str,
    /// Key type.
    pub kind: KeyKind,
}

impl KeyDef {
    /// Integer `id` key.
    pub const INTEGER: Self = Self {
        name: "id",
        column: "id",
        kind: KeyKind::Integer,
    };

    /// Text `id` key.
    pub const TEXT: Self = Self {
        name: "id",
        column: "id",
        kind: KeyKind::Text,
    };
}

/// Scalar type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// 64-bit integer.
    Integer,
    /// Flag.
    Boolean,
    /// Point in time, UTC.
    Timestamp,
    /// Calendar date.
    Date,
    /// Reference to an object in the asset store (key or public URL).
    Asset,
}

/// Value applied on create when a field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Stored as null.
    None,
    /// Current time.
    Now,
    /// Fixed flag value.
    Bool(bool),
}

/// A declared field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// JSON field name (camelCase).
    pub name: &'static str,
    /// Column name (snake_case).
    pub column: &'static str,
    /// Scalar type.
    pub kind: FieldKind,
    /// Must be present on create and can never be nulled.
    pub required: bool,
    /// Default applied on create.
    pub default: FieldDefault,
}

impl FieldDef {
    const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            required: false,
            default: FieldDefault::None,
        }
    }

    /// Text field.
    #[must_use]
    pub const fn text(name: &'static str, column: &'static str) -> Self {
        Self::new(name, column, FieldKind::Text)
    }

    /// Integer field.
    #[must_use]
    pub const fn integer(name: &'static str, column: &'static str) -> Self {
        Self::new(name, column, FieldKind::Integer)
    }

    /// Boolean field defaulting to `value`.
    #[must_use]
    pub const fn flag(name: &'static str, column: &'static str, value: bool) -> Self {
        Self::new(name, column, FieldKind::Boolean).with_default(FieldDefault::Bool(value))
    }

    /// Timestamp field.
    #[must_use]
    pub const fn timestamp(name: &'static str, column: &'static str) -> Self {
        Self::new(name, column, FieldKind::Timestamp)
    }

    /// Date field.
    #[must_use]
    pub const fn date(name: &'static str, column: &'static str) -> Self {
        Self::new(name, column, FieldKind::Date)
    }

    /// Asset reference field.
    #[must_use]
    pub const fn asset(name: &'static str, column: &'static str) -> Self {
        Self::new(name, column, FieldKind::Asset)
    }

    /// Mark the field required.
    #[must_use]
    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// Set the create-time default.
    #[must_use]
    pub const fn with_default(self, default: FieldDefault) -> Self {
        Self { default, ..self }
    }
}

/// Many-to-one relation expanded into a nested projection on read.
#[derive(Debug)]
pub struct RelationDef {
    /// Output name of the nested object.
    pub name: &'static str,
    /// Foreign-key field on this resource.
    pub field: &'static str,
    /// Referenced resource.
    pub target: &'static ResourceDefinition,
    /// Fields of the target copied into the nested object.
    pub projection: &'static [&'static str],
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

/// One term of the default ordering.
#[derive(Debug, Clone, Copy)]
pub struct OrderDef {
    /// Field name.
    pub field: &'static str,
    /// Direction.
    pub direction: SortDirection,
}

impl OrderDef {
    /// Ascending on `field`.
    #[must_use]
    pub const fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Descending on `field`.
    #[must_use]
    pub const fn desc(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Equality filter accepted on list.
#[derive(Debug, Clone, Copy)]
pub struct FilterDef {
    /// Query parameter name.
    pub param: &'static str,
    /// Field compared against.
    pub field: &'static str,
}

impl FilterDef {
    /// Filter whose parameter is named after its field.
    #[must_use]
    pub const fn on(field: &'static str) -> Self {
        Self {
            param: field,
            field,
        }
    }
}

/// Everything the generic engine knows about one resource type.
#[derive(Debug)]
pub struct ResourceDefinition {
    /// Route name (`/resources/{name}`).
    pub name: &'static str,
    /// Table name.
    pub table: &'static str,
    /// Primary key.
    pub key: KeyDef,
    /// Declared fields, excluding key and timestamps.
    pub fields: &'static [FieldDef],
    /// Relations expanded on read.
    pub relations: &'static [RelationDef],
    /// Default ordering; the key ascending is appended as tie-breaker.
    pub order: &'static [OrderDef],
    /// Accepted list filters.
    pub filters: &'static [FilterDef],
    /// Folder uploads for this resource are stored in.
    pub folder: Option<AssetFolder>,
}

impl ResourceDefinition {
    /// Look up a declared field by JSON name.
    #[must_use]
    pub fn field(&'static self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Column backing a JSON name, including the key and timestamps.
    #[must_use]
    pub fn column_of(&self, name: &str) -> Option<&'static str> {
        if name == self.key.name {
            return Some(self.key.column);
        }
        match name {
            CREATED_AT => Some("created_at"),
            UPDATED_AT => Some("updated_at"),
            _ => self.fields.iter().find(|f| f.name == name).map(|f| f.column),
        }
    }

    /// Fields holding asset references.
    pub fn asset_fields(&'static self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Asset)
    }

    /// Look up a declared filter by query parameter.
    #[must_use]
    pub fn filter(&self, param: &str) -> Option<&FilterDef> {
        self.filters.iter().find(|f| f.param == param)
    }

    /// JSON names accepted but never written by callers.
    #[must_use]
    pub fn is_read_only(&self, name: &str) -> bool {
        name == self.key.name || name == CREATED_AT || name == UPDATED_AT
    }
}
