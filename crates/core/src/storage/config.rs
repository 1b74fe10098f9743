//! Storage configuration types.

use std::path::PathBuf;

use campus_shared::{Secret, StorageSettings};

use super::error::StorageError;

/// Storage provider configuration.
///
/// Credentials are held as [`Secret`] so a `{:?}` of the provider never
/// leaks them into logs.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, Cloudflare R2, DigitalOcean Spaces
    S3 {
        /// Custom endpoint URL; AWS when absent.
        endpoint: Option<String>,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: Secret,
        /// Secret access key.
        secret_access_key: Secret,
        /// Region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: Secret,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory store (tests only)
    Memory,
}

impl StorageProvider {
    /// Create S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: Option<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<Secret>,
        secret_access_key: impl Into<Secret>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint,
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create Azure Blob Storage provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<Secret>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::AzureBlob { container, .. } => container,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }

    /// Public URL prefix objects of this provider are served under.
    #[must_use]
    pub fn default_public_base(&self) -> String {
        match self {
            Self::S3 {
                endpoint: Some(endpoint),
                bucket,
                ..
            } => format!("{}/{bucket}", endpoint.trim_end_matches('/')),
            Self::S3 {
                endpoint: None,
                bucket,
                region,
                ..
            } => format!("https://{bucket}.s3.{region}.amazonaws.com"),
            Self::AzureBlob {
                account, container, ..
            } => format!("https://{account}.blob.core.windows.net/{container}"),
            Self::LocalFs { root } => {
                format!("file://{}", root.to_string_lossy().trim_end_matches('/'))
            }
            Self::Memory => "memory://".to_string(),
        }
    }
}

/// Storage client configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Overrides the provider-derived public URL prefix.
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Create a new storage config with the provider's own public URLs.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            public_base_url: None,
        }
    }

    /// Serve objects from a different base URL (CDN, custom domain).
    #[must_use]
    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        self.public_base_url = Some(base.into());
        self
    }

    /// Prefix every public URL starts with, without a trailing slash.
    #[must_use]
    pub fn public_base(&self) -> String {
        self.public_base_url.as_ref().map_or_else(
            || self.provider.default_public_base(),
            |base| base.trim_end_matches('/').to_string(),
        )
    }

    /// Derive the public URL for a key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base(), key.trim_start_matches('/'))
    }
}

impl TryFrom<&StorageSettings> for StorageConfig {
    type Error = StorageError;

    fn try_from(settings: &StorageSettings) -> Result<Self, Self::Error> {
        let provider = match settings.provider.as_str() {
            "s3" => {
                if settings.bucket.is_empty() {
                    return Err(StorageError::configuration("s3 provider requires a bucket"));
                }
                StorageProvider::s3(
                    settings.endpoint.clone(),
                    settings.bucket.clone(),
                    settings.access_key_id.clone(),
                    settings.secret_access_key.clone(),
                    settings.region.clone(),
                )
            }
            "azure_blob" => {
                let account = settings.account.clone().ok_or_else(|| {
                    StorageError::configuration("azure_blob provider requires an account")
                })?;
                if settings.bucket.is_empty() {
                    return Err(StorageError::configuration(
                        "azure_blob provider requires a container",
                    ));
                }
                StorageProvider::azure_blob(
                    account,
                    settings.secret_access_key.clone(),
                    settings.bucket.clone(),
                )
            }
            "local" => StorageProvider::local_fs(&settings.root),
            "memory" => StorageProvider::Memory,
            other => {
                return Err(StorageError::configuration(format!(
                    "unknown storage provider '{other}'"
                )));
            }
        };

        Ok(Self {
            provider,
            public_base_url: settings.public_base_url.clone(),
        })
    }
}
