//! Object store contract used by the asset lifecycle manager.

use std::future::Future;

use bytes::Bytes;

use super::error::StorageError;

/// Minimal object store contract.
///
/// Implemented by [`super::StorageService`] for real providers. Keys are
/// `/`-separated paths without a leading slash.
pub trait AssetStore: Send + Sync {
    /// Writes an object, replacing any existing object under the same key.
    fn put(
        &self,
        key: &str,
        payload: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Deletes an object. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Returns `true` if an object exists under `key`.
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Lists at most `limit` keys under `prefix`. A missing prefix lists empty.
    fn list(
        &self,
        prefix: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<String>, StorageError>> + Send;

    /// Writes the zero-byte marker for a folder (`"{folder}/"`).
    fn create_folder(&self, folder: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Derives the public URL for a key. Pure, no I/O.
    fn public_url(&self, key: &str) -> String;
}
