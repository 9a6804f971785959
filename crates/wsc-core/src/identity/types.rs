//! Identity record types.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    /// Normal, usable identity.
    Active,
    /// Temporarily barred.
    Suspended,
    /// Permanently barred.
    Banned,
    /// Removed; retained for audit only.
    Deleted,
}

impl IdentityStatus {
    /// Returns the string representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
            Self::Deleted => "deleted",
        }
    }
}

/// Authentication provider for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    /// First-party account.
    Internal,
    /// External OAuth provider.
    Oauth,
    /// Platform account (console, storefront).
    Platform,
    /// Enterprise single sign-on.
    Sso,
}

/// Authentication metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthBlock {
    /// Where the identity authenticates.
    pub provider: AuthProvider,
    /// Provider-scoped subject identifier.
    pub subject: String,
    /// Last successful authentication, unix epoch milliseconds.
    pub last_authenticated_at_ms: u64,
}

/// Public-facing profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Display name.
    pub display_name: String,
    /// Home region, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// A granted entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Entitlement identifier (`ent_` prefix).
    pub entitlement_id: String,
    /// Grant time, unix epoch milliseconds.
    pub granted_at_ms: u64,
    /// Expiry, if bounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
}

/// Audit metadata carried on the identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAudit {
    /// Principal that created the record.
    pub created_by: String,
    /// Idempotency token of the last applied mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_change_id: Option<String>,
}

/// A player identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// Identity identifier (`pid_` prefix).
    pub identity_id: String,
    /// Lifecycle status.
    pub status: IdentityStatus,
    /// Creation time, unix epoch milliseconds.
    pub created_at_ms: u64,
    /// Last update, unix epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_ms: Option<u64>,
    /// Authentication metadata.
    pub auth: AuthBlock,
    /// Profile fields.
    pub profile: IdentityProfile,
    /// Granted permission scopes.
    pub scopes: Vec<String>,
    /// Granted entitlements.
    pub entitlements: Vec<Entitlement>,
    /// Audit metadata.
    pub audit: IdentityAudit,
}

impl PlayerIdentity {
    /// Returns `true` if the identity may initiate transitions.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, IdentityStatus::Active)
    }

    /// Builds a minimal active identity, for seeding stores in tests and
    /// fixtures.
    #[must_use]
    pub fn seeded(identity_id: &str, created_by: &str, at_ms: u64) -> Self {
        Self {
            identity_id: identity_id.to_string(),
            status: IdentityStatus::Active,
            created_at_ms: at_ms,
            updated_at_ms: None,
            auth: AuthBlock {
                provider: AuthProvider::Internal,
                subject: format!("user:{identity_id}"),
                last_authenticated_at_ms: at_ms,
            },
            profile: IdentityProfile {
                display_name: "Traveler".to_string(),
                region: None,
            },
            scopes: vec!["world.travel".to_string(), "assets.transfer".to_string()],
            entitlements: Vec::new(),
            audit: IdentityAudit {
                created_by: created_by.to_string(),
                last_change_id: None,
            },
        }
    }
}
