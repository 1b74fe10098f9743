//! Generic resource engine.
//!
//! One CRUD implementation parameterized by static [`ResourceDefinition`]s:
//! - Coercion of loosely typed request input to declared field kinds
//! - Declared filters, ordering, and relation projections
//! - Asset-reference consistency through the [`crate::asset::AssetManager`]

mod coerce;
mod definition;
mod error;
mod repository;
mod service;
mod value;

pub use coerce::{
    LIMIT_PARAM, coerce_create, coerce_update, coerce_value, key_from_json, parse_date,
    parse_key, parse_list_query, parse_timestamp,
};
pub use definition::{
    CREATED_AT, FieldDef, FieldDefault, FieldKind, FilterDef, KeyDef, KeyKind, OrderDef,
    RelationDef, ResourceDefinition, SortDirection, UPDATED_AT,
};
pub use error::ResourceError;
pub use repository::ResourceRepository;
pub use service::ResourceService;
pub use value::{
    FieldChange, FieldValue, Filter, ListQuery, Record, RecordKey, format_timestamp,
};
