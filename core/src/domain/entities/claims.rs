//! JWT claims for access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied claims merged into every issued token.
///
/// Kept as a small closed set instead of an open string map so claim shapes
/// are checked at compile time while the wire format stays the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    /// Role tags granted to the subject (e.g. `PARENT`, `ADMIN`)
    pub roles: Vec<String>,

    /// Admin acting on behalf of the subject, when impersonating
    pub impersonator_id: Option<i64>,
}

impl ClaimSet {
    /// Claim set carrying only roles.
    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            impersonator_id: None,
        }
    }
}

/// Full JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Token id, unique per issued token. Keeps two tokens minted for the
    /// same subject in the same second from being byte-identical.
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Role tags granted to the subject
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Impersonating admin, if the session was opened by impersonation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impersonator_id: Option<String>,
}

impl Claims {
    /// Builds the payload for a token issued to `user_id`.
    pub fn new(
        user_id: i64,
        issuer: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        extra: &ClaimSet,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            roles: extra.roles.clone(),
            impersonator_id: extra.impersonator_id.map(|id| id.to_string()),
        }
    }

    /// Parses the subject back into a user id.
    pub fn user_id(&self) -> Result<i64, std::num::ParseIntError> {
        self.sub.parse()
    }
}
