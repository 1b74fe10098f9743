//! Asset lifecycle manager.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::folder::AssetFolder;
use super::types::{AssetUpload, StoredAsset, UploadPolicy};
use crate::storage::{AssetStore, StorageError};

/// Owns every mutation of object storage.
///
/// Callers update record fields themselves; this type never touches the
/// relational store.
pub struct AssetManager<S: AssetStore> {
    store: Arc<S>,
    policy: UploadPolicy,
}

impl<S: AssetStore> AssetManager<S> {
    /// Create a lifecycle manager over an object store client.
    #[must_use]
    pub fn new(store: Arc<S>, policy: UploadPolicy) -> Self {
        Self { store, policy }
    }

    /// Provision a folder namespace.
    ///
    /// Lists the folder with a page size of one and writes the marker only
    /// when nothing is there. The list/create pair is not atomic; concurrent
    /// callers may both write the marker, which is harmless because the
    /// marker key is fixed.
    ///
    /// # Errors
    ///
    /// Returns an error if listing or writing the marker fails.
    pub async fn ensure_folder(&self, folder: AssetFolder) -> Result<(), StorageError> {
        let existing = self.store.list(&folder.prefix(), 1).await?;
        if !existing.is_empty() {
            debug!(folder = %folder, "Folder already provisioned");
            return Ok(());
        }

        self.store.create_folder(folder.as_str()).await?;
        info!(folder = %folder, "Folder provisioned");
        Ok(())
    }

    /// Generate a storage key for a new object.
    ///
    /// Format: `{folder}/{uuid}-{sanitized_filename}`. The UUID prefix keeps
    /// a replacement from ever reusing the key of the object it supersedes.
    #[must_use]
    pub fn generate_key(folder: AssetFolder, file_name: &str) -> String {
        let sanitized = sanitize_filename(file_name);
        let name = if sanitized.trim_matches(['.', '_']).is_empty() {
            "file".to_string()
        } else {
            sanitized
        };

        format!("{}/{}-{}", folder.as_str(), Uuid::now_v7().simple(), name)
    }

    /// Store a new asset.
    ///
    /// Validates the upload, provisions the folder, writes the object, and
    /// derives its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or any storage call fails. Nothing
    /// is written when validation fails.
    pub async fn upload(&self, upload: AssetUpload) -> Result<StoredAsset, StorageError> {
        let size = u64::try_from(upload.payload.len()).unwrap_or(u64::MAX);
        self.policy.validate(&upload.content_type, size)?;

        self.ensure_folder(upload.folder).await?;

        let key = Self::generate_key(upload.folder, &upload.file_name);
        self.store
            .put(&key, upload.payload, &upload.content_type)
            .await?;

        let public_url = self.store.public_url(&key);
        info!(
            key = %key,
            folder = %upload.folder,
            size,
            content_type = %upload.content_type,
            "Asset uploaded"
        );

        Ok(StoredAsset {
            key,
            public_url,
            content_type: upload.content_type,
            size,
        })
    }

    /// Delete an object. A key that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to delete the object.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self.store.delete(key).await {
            Ok(()) | Err(StorageError::NotFound { .. }) => {
                info!(key = %key, "Asset deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Derive the public URL for a key. Pure, no I/O.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        self.store.public_url(key)
    }

    /// Map a stored reference back to a storage key.
    ///
    /// Accepts either a public URL under this store's base or a bare key.
    /// URLs pointing anywhere else are not managed here and yield `None`.
    #[must_use]
    pub fn resolve_key(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        let base = self.store.public_url("");

        let key = if let Some(rest) = reference.strip_prefix(base.as_str()) {
            rest.split(['?', '#']).next().unwrap_or_default()
        } else if reference.contains(':') {
            return None;
        } else {
            reference.trim_start_matches('/')
        };

        if key.is_empty() || key.ends_with('/') {
            None
        } else {
            Some(key.to_string())
        }
    }

    /// Check that a reference does not point at a missing managed object.
    ///
    /// Foreign URLs are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check itself fails.
    pub async fn verify_reference(&self, reference: &str) -> Result<bool, StorageError> {
        match self.resolve_key(reference) {
            Some(key) => self.store.exists(&key).await,
            None => Ok(true),
        }
    }

    /// Delete the object behind a reference that a record no longer holds.
    ///
    /// Best-effort: a failure is logged and leaves an orphaned object, which
    /// is recoverable. Returns `true` if nothing is left behind.
    pub async fn release(&self, reference: &str) -> bool {
        let Some(key) = self.resolve_key(reference) else {
            debug!(reference = %reference, "Reference is not managed by this store, skipping");
            return true;
        };

        match self.delete(&key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Asset cleanup failed, object left orphaned");
                false
            }
        }
    }

    /// Returns `true` when both references name the same stored object.
    #[must_use]
    pub fn same_object(&self, a: &str, b: &str) -> bool {
        match (self.resolve_key(a), self.resolve_key(b)) {
            (Some(a), Some(b)) => a == b,
            _ => a.trim() == b.trim(),
        }
    }
}

/// Sanitize filename for storage key.
///
/// Removes or replaces characters that could cause issues in storage paths.
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::testing::RecordingStore;
    use proptest::prelude::*;

    proptest! {
        // Sanitized names only contain characters that are safe in keys.
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }

        // Generated keys always have exactly one separator, after a known folder.
        #[test]
        fn prop_generated_key_stays_in_folder(filename in ".*", index in 0usize..7) {
            let folder = AssetFolder::ALL[index];
            let key = AssetManager::<RecordingStore>::generate_key(folder, &filename);
            let parts: Vec<&str> = key.split('/').collect();

            prop_assert_eq!(parts.len(), 2);
            prop_assert_eq!(parts[0], folder.as_str());
            prop_assert!(!parts[1].is_empty());
        }

        // A generated key survives the URL round trip.
        #[test]
        fn prop_public_url_resolves_to_key(filename in "[a-zA-Z0-9 _-]{1,30}\\.[a-z]{2,4}") {
            let store = Arc::new(RecordingStore::default());
            let assets = AssetManager::new(store, UploadPolicy::default());
            let key = AssetManager::<RecordingStore>::generate_key(AssetFolder::Documents, &filename);

            let url = assets.public_url(&key);
            prop_assert_eq!(assets.resolve_key(&url), Some(key));
        }
    }
}
