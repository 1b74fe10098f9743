//! Object store client for binary assets using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: AWS S3, Cloudflare R2, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - In-process memory (tests)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │                   (Unified Storage API)                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write("key", data)      │ op.list_with("prefix/").limit(n)   │
//! │ op.delete("key")           │ op.stat("key")                     │
//! │ op.create_dir("folder/")   │                                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the asset lifecycle manager talks to this module; nothing else
//! mutates storage directly.

mod config;
mod error;
mod service;
mod store;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::StorageService;
pub use store::AssetStore;
