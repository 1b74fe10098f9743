//! Folder namespaces for stored assets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::storage::StorageError;

/// Closed set of folder namespaces.
///
/// Every asset key starts with one of these folders; uploads naming any other
/// folder are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetFolder {
    /// Faculty portraits.
    Faculty,
    /// Program brochures.
    Programs,
    /// News images.
    News,
    /// Event posters.
    Events,
    /// Society logos.
    Societies,
    /// Publications, notices, and other documents.
    Documents,
    /// Free-standing gallery images.
    Gallery,
}

impl AssetFolder {
    /// All known folders.
    pub const ALL: [Self; 7] = [
        Self::Faculty,
        Self::Programs,
        Self::News,
        Self::Events,
        Self::Societies,
        Self::Documents,
        Self::Gallery,
    ];

    /// Folder name as used in storage keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Faculty => "faculty",
            Self::Programs => "programs",
            Self::News => "news",
            Self::Events => "events",
            Self::Societies => "societies",
            Self::Documents => "documents",
            Self::Gallery => "gallery",
        }
    }

    /// Key prefix including the trailing separator.
    #[must_use]
    pub fn prefix(&self) -> String {
        format!("{}/", self.as_str())
    }
}

impl fmt::Display for AssetFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetFolder {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|folder| folder.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| StorageError::UnknownFolder(s.to_string()))
    }
}
