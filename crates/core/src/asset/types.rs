//! Asset types and upload policy.

use bytes::Bytes;
use serde::Serialize;

use campus_shared::StorageSettings;

use super::folder::AssetFolder;
use crate::storage::StorageError;

/// An uploaded file before it is assigned a folder.
#[derive(Debug, Clone)]
pub struct AssetFile {
    /// File contents.
    pub payload: Bytes,
    /// Original file name as supplied by the client.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
}

impl AssetFile {
    /// Place the file in a folder.
    #[must_use]
    pub fn into_upload(self, folder: AssetFolder) -> AssetUpload {
        AssetUpload {
            payload: self.payload,
            file_name: self.file_name,
            content_type: self.content_type,
            folder,
        }
    }
}

/// Request to store a new asset.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    /// File contents.
    pub payload: Bytes,
    /// Original file name as supplied by the client.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Target folder.
    pub folder: AssetFolder,
}

/// A durably written asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAsset {
    /// Storage key (`{folder}/{name}`).
    pub key: String,
    /// Fully-qualified public URL.
    #[serde(rename = "url")]
    pub public_url: String,
    /// MIME type the object was written with.
    #[serde(rename = "contentType")]
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
}

/// Limits applied to every upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Allowed MIME types for upload.
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Self::default_mime_types(),
        }
    }
}

impl UploadPolicy {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set allowed MIME types.
    #[must_use]
    pub fn with_allowed_mime_types(mut self, types: Vec<String>) -> Self {
        self.allowed_mime_types = types;
        self
    }

    /// Default allowed MIME types for website assets.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        vec![
            // Images
            "image/png".to_string(),
            "image/jpeg".to_string(),
            "image/gif".to_string(),
            "image/webp".to_string(),
            // Documents
            "application/pdf".to_string(),
            "application/msword".to_string(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
            "application/vnd.ms-excel".to_string(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
        ]
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        self.allowed_mime_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(essence))
    }

    /// Validate an upload against size and MIME constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.max_file_size {
            return Err(StorageError::file_too_large(size, self.max_file_size));
        }

        if !self.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }
}

impl From<&StorageSettings> for UploadPolicy {
    fn from(settings: &StorageSettings) -> Self {
        let policy = Self::default().with_max_file_size(settings.max_file_size);
        match &settings.allowed_mime_types {
            Some(types) if !types.is_empty() => policy.with_allowed_mime_types(types.clone()),
            _ => policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.max_file_size, UploadPolicy::DEFAULT_MAX_FILE_SIZE);
        assert!(!policy.allowed_mime_types.is_empty());
    }

    #[test]
    fn test_mime_type_validation() {
        let policy = UploadPolicy::default();
        assert!(policy.is_mime_type_allowed("application/pdf"));
        assert!(policy.is_mime_type_allowed("image/png"));
        assert!(policy.is_mime_type_allowed("IMAGE/JPEG"));
        assert!(policy.is_mime_type_allowed("application/pdf; charset=binary"));
        assert!(!policy.is_mime_type_allowed("application/x-executable"));
        assert!(!policy.is_mime_type_allowed("text/html"));
    }

    #[test]
    fn test_validate_upload_size() {
        let policy = UploadPolicy::default().with_max_file_size(1024);

        assert!(policy.validate("application/pdf", 512).is_ok());
        assert!(policy.validate("application/pdf", 1024).is_ok());

        let err = policy.validate("application/pdf", 2048).unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }

    #[test]
    fn test_validate_upload_mime_type() {
        let err = UploadPolicy::default()
            .validate("application/x-executable", 1024)
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidMimeType { .. }));
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = StorageSettings {
            max_file_size: 2048,
            allowed_mime_types: Some(vec!["image/svg+xml".to_string()]),
            ..StorageSettings::default()
        };
        let policy = UploadPolicy::from(&settings);
        assert_eq!(policy.max_file_size, 2048);
        assert!(policy.is_mime_type_allowed("image/svg+xml"));
        assert!(!policy.is_mime_type_allowed("image/png"));
    }

    #[test]
    fn test_file_into_upload() {
        let file = AssetFile {
            payload: Bytes::from_static(b"%PDF"),
            file_name: "notice.pdf".to_string(),
            content_type: "application/pdf".to_string(),
        };
        let upload = file.into_upload(AssetFolder::Documents);
        assert_eq!(upload.folder, AssetFolder::Documents);
        assert_eq!(upload.file_name, "notice.pdf");
    }
}
