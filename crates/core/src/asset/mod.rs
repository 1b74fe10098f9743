//! Asset lifecycle management.
//!
//! Keeps asset-reference fields of resource records consistent with what
//! exists in object storage:
//! - Folder namespaces are provisioned idempotently before the first write
//! - Uploads are validated, written, and given a deterministic public URL
//! - Superseded or released objects are deleted best-effort, so a failure
//!   leaves an orphaned object rather than a dangling reference

mod folder;
mod manager;
mod types;

pub use folder::AssetFolder;
pub use manager::{AssetManager, sanitize_filename};
pub use types::{AssetFile, AssetUpload, StoredAsset, UploadPolicy};
