//! Core domain logic for the campus CMS.
//!
//! This crate contains the resource engine and asset lifecycle with ZERO web or
//! database dependencies. Persistence is reached through the
//! [`resource::ResourceRepository`] trait, object storage through
//! [`storage::AssetStore`].
//!
//! # Modules
//!
//! - `storage` - Object store client (OpenDAL)
//! - `asset` - Folder provisioning, upload, and orphan-safe replacement
//! - `resource` - Resource definitions, input coercion, and the CRUD service
//! - `catalog` - The declared resource types of the website

pub mod asset;
pub mod catalog;
pub mod resource;
pub mod storage;

#[cfg(test)]
mod testing;
