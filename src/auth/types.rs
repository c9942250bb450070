//! Request-scoped identity types.

use std::collections::BTreeSet;
use std::fmt;

use crate::db::Identity;

/// A capability granted to an identity, the upper-cased role name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Authority(String);

impl Authority {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a stored identity to the authorities the authorization layer checks.
pub fn authorities_of(identity: &Identity) -> BTreeSet<Authority> {
    identity
        .roles
        .iter()
        .map(|role| Authority(role.to_uppercase()))
        .collect()
}

/// Identity established by the authentication middleware for one request.
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Public user id
    pub user_id: String,
    /// Username, also the access token subject
    pub username: String,
    pub authorities: BTreeSet<Authority>,
}

impl AuthContext {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            authorities: authorities_of(identity),
        }
    }

    pub fn subject(&self) -> &str {
        &self.username
    }

    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str() == name)
    }
}

/// Marker attached instead of a context when the credential store failed
/// during authentication.
#[derive(Debug, Clone, Copy)]
pub struct AuthUnavailable;
