//! Persistence contract for resource records.

use std::future::Future;

use super::definition::ResourceDefinition;
use super::error::ResourceError;
use super::value::{FieldChange, ListQuery, Record, RecordKey};

/// Repository trait for resource persistence.
///
/// This trait is implemented by the db crate to provide actual database
/// operations. One implementation serves every resource type; the definition
/// passed in decides table, columns, ordering, and relation projections.
///
/// Records returned by `list` and `find` carry the key, every declared field,
/// `createdAt`/`updatedAt`, and one nested object per relation (null when the
/// foreign key is null or dangling).
pub trait ResourceRepository: Send + Sync {
    /// List records matching every filter, in the definition's order followed
    /// by key ascending.
    fn list(
        &self,
        def: &'static ResourceDefinition,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Vec<Record>, ResourceError>> + Send;

    /// Find a record by key.
    fn find(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
    ) -> impl Future<Output = Result<Option<Record>, ResourceError>> + Send;

    /// Insert a record and return its key.
    ///
    /// `key` is `None` for store-assigned keys.
    fn insert(
        &self,
        def: &'static ResourceDefinition,
        key: Option<RecordKey>,
        changes: &[FieldChange],
    ) -> impl Future<Output = Result<RecordKey, ResourceError>> + Send;

    /// Apply changes to a record. Returns `false` if no record has the key.
    fn update(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
        changes: &[FieldChange],
    ) -> impl Future<Output = Result<bool, ResourceError>> + Send;

    /// Delete a record. Returns `false` if no record has the key.
    fn delete(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
    ) -> impl Future<Output = Result<bool, ResourceError>> + Send;

    /// Returns `true` if an asset field of any record of `defs` holds one of
    /// `references` verbatim.
    fn is_asset_referenced(
        &self,
        defs: &[&'static ResourceDefinition],
        references: &[String],
    ) -> impl Future<Output = Result<bool, ResourceError>> + Send;
}
