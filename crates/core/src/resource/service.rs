//! Resource service implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::coerce::{coerce_create, coerce_update, parse_key, parse_list_query};
use super::definition::{FieldKind, KeyKind, ResourceDefinition};
use super::error::ResourceError;
use super::repository::ResourceRepository;
use super::value::{FieldChange, FieldValue, Record, RecordKey};
use crate::asset::{AssetFile, AssetManager};
use crate::catalog;
use crate::storage::AssetStore;

/// Generic CRUD over every declared resource type.
///
/// Keeps asset-reference fields consistent with object storage: references
/// are verified before they are stored, and superseded objects are deleted
/// only after the record no longer points at them.
pub struct ResourceService<R: ResourceRepository, S: AssetStore> {
    repo: Arc<R>,
    assets: Arc<AssetManager<S>>,
}

impl<R: ResourceRepository, S: AssetStore> ResourceService<R, S> {
    /// Create a new resource service.
    #[must_use]
    pub fn new(repo: Arc<R>, assets: Arc<AssetManager<S>>) -> Self {
        Self { repo, assets }
    }

    /// Get the asset lifecycle manager.
    #[must_use]
    pub fn assets(&self) -> &AssetManager<S> {
        &self.assets
    }

    /// List records.
    ///
    /// `params` is the raw query string; declared filters become equality
    /// predicates, `limit` caps the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a filter or the limit cannot be coerced, or the
    /// repository fails.
    pub async fn list(
        &self,
        def: &'static ResourceDefinition,
        params: &HashMap<String, String>,
    ) -> Result<Vec<Record>, ResourceError> {
        let query = parse_list_query(def, params)?;
        self.repo.list(def, &query).await
    }

    /// Get one record with its relations expanded.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed id, not found if no record
    /// has the key.
    pub async fn get(
        &self,
        def: &'static ResourceDefinition,
        raw_id: &str,
    ) -> Result<Record, ResourceError> {
        let key = parse_key(def, raw_id)?;
        self.fetch(def, &key).await
    }

    /// Create a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the body fails coercion, references a missing
    /// asset, or the repository rejects the insert.
    pub async fn create(
        &self,
        def: &'static ResourceDefinition,
        body: &Value,
    ) -> Result<Record, ResourceError> {
        let (key, changes) = coerce_create(def, body)?;
        self.verify_references(changes.iter()).await?;

        let key = match (def.key.kind, key) {
            (KeyKind::Text, None) => Some(RecordKey::Text(Uuid::now_v7().to_string())),
            (_, key) => key,
        };

        let key = self.repo.insert(def, key, &changes).await?;
        info!(resource = def.name, id = %key, "Record created");

        self.fetch(def, &key).await
    }

    /// Apply a partial update.
    ///
    /// Objects referenced by asset fields that change are deleted after the
    /// record update has been stored, unless another record still holds them.
    /// A failed delete is logged and leaves an orphaned object.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or body fails coercion, the record does not
    /// exist, a new reference names a missing asset, or the repository fails.
    pub async fn update(
        &self,
        def: &'static ResourceDefinition,
        raw_id: &str,
        body: &Value,
    ) -> Result<Record, ResourceError> {
        let key = parse_key(def, raw_id)?;
        let changes = coerce_update(def, body)?;
        let current = self.fetch(def, &key).await?;

        if changes.is_empty() {
            debug!(resource = def.name, id = %key, "Empty update, nothing to do");
            return Ok(current);
        }

        let superseding: Vec<&FieldChange> = changes
            .iter()
            .filter(|c| c.field.kind == FieldKind::Asset)
            .filter(|c| !self.is_unchanged_reference(&current, c))
            .collect();
        self.verify_references(superseding.iter().copied()).await?;

        if !self.repo.update(def, &key, &changes).await? {
            return Err(ResourceError::not_found(def.name, &key));
        }
        info!(resource = def.name, id = %key, fields = changes.len(), "Record updated");

        for change in superseding {
            if let Some(old) = current.get(change.field.name).and_then(Value::as_str) {
                self.release_unreferenced(old).await;
            }
        }

        self.fetch(def, &key).await
    }

    /// Delete a record, then every managed asset it referenced that no other
    /// record shares.
    ///
    /// Asset deletion is best-effort and never fails the operation.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed id, not found if no record
    /// has the key, or a repository error.
    pub async fn delete(
        &self,
        def: &'static ResourceDefinition,
        raw_id: &str,
    ) -> Result<(), ResourceError> {
        let key = parse_key(def, raw_id)?;
        let current = self.fetch(def, &key).await?;

        if !self.repo.delete(def, &key).await? {
            return Err(ResourceError::not_found(def.name, &key));
        }
        info!(resource = def.name, id = %key, "Record deleted");

        for field in def.asset_fields() {
            if let Some(reference) = current.get(field.name).and_then(Value::as_str) {
                self.release_unreferenced(reference).await;
            }
        }

        Ok(())
    }

    /// Replace the object behind an asset field.
    ///
    /// Order is upload, then record update, then delete of the old object. An
    /// upload failure leaves the record untouched; a failed record update
    /// removes the fresh upload again.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is not an asset field, the record does
    /// not exist, the upload is rejected or fails, or the record update fails.
    pub async fn replace_asset(
        &self,
        def: &'static ResourceDefinition,
        raw_id: &str,
        field_name: &str,
        file: AssetFile,
    ) -> Result<Record, ResourceError> {
        let field = def
            .field(field_name)
            .filter(|f| f.kind == FieldKind::Asset)
            .ok_or_else(|| {
                ResourceError::validation(format!(
                    "'{field_name}' is not an asset field of {}",
                    def.name
                ))
            })?;
        let folder = def.folder.ok_or_else(|| {
            ResourceError::validation(format!("{} does not store assets", def.name))
        })?;

        let key = parse_key(def, raw_id)?;
        let current = self.fetch(def, &key).await?;

        let stored = self.assets.upload(file.into_upload(folder)).await?;

        let change = FieldChange {
            field,
            value: FieldValue::Text(stored.public_url.clone()),
        };
        let updated = match self.repo.update(def, &key, std::slice::from_ref(&change)).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ResourceError::not_found(def.name, &key)),
            Err(e) => Err(e),
        };
        if let Err(e) = updated {
            warn!(
                resource = def.name,
                id = %key,
                key = %stored.key,
                error = %e,
                "Record update failed after upload, removing new asset"
            );
            self.assets.release(&stored.key).await;
            return Err(e);
        }
        info!(resource = def.name, id = %key, field = field.name, key = %stored.key, "Asset replaced");

        if let Some(old) = current.get(field.name).and_then(Value::as_str)
            && !self.assets.same_object(old, &stored.key)
        {
            self.release_unreferenced(old).await;
        }

        self.fetch(def, &key).await
    }

    async fn fetch(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
    ) -> Result<Record, ResourceError> {
        self.repo
            .find(def, key)
            .await?
            .ok_or_else(|| ResourceError::not_found(def.name, key))
    }

    /// Release an object that a record stopped pointing at, unless another
    /// record still holds it. A failed lookup keeps the object.
    async fn release_unreferenced(&self, reference: &str) {
        let Some(key) = self.assets.resolve_key(reference) else {
            return;
        };

        let mut candidates = vec![key.clone(), self.assets.public_url(&key)];
        if !candidates.iter().any(|c| c == reference) {
            candidates.push(reference.to_string());
        }

        match self
            .repo
            .is_asset_referenced(catalog::all(), &candidates)
            .await
        {
            Ok(false) => {
                self.assets.release(&key).await;
            }
            Ok(true) => debug!(key = %key, "Asset still referenced by another record, keeping it"),
            Err(e) => warn!(key = %key, error = %e, "Reference check failed, keeping asset"),
        }
    }

    fn is_unchanged_reference(&self, current: &Record, change: &FieldChange) -> bool {
        match (
            current.get(change.field.name).and_then(Value::as_str),
            change.value.as_text(),
        ) {
            (Some(old), Some(new)) => self.assets.same_object(old, new),
            (None, None) => true,
            _ => false,
        }
    }

    async fn verify_references(
        &self,
        changes: impl Iterator<Item = &FieldChange>,
    ) -> Result<(), ResourceError> {
        for change in changes.filter(|c| c.field.kind == FieldKind::Asset) {
            let Some(reference) = change.value.as_text() else {
                continue;
            };
            if !self.assets.verify_reference(reference).await? {
                return Err(ResourceError::validation(format!(
                    "field '{}' references missing asset '{reference}'",
                    change.field.name
                )));
            }
        }
        Ok(())
    }
}
