//! Claims carried by access-gate bearer tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims for editor tokens.
///
/// Tokens are issued by the external identity provider; this backend only
/// checks that they are genuine and unexpired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (editor identifier, opaque).
    pub sub: String,
    /// Role label assigned by the identity provider.
    #[serde(default)]
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a subject.
    #[must_use]
    pub fn new(subject: &str, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the subject from claims.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.sub
    }
}
