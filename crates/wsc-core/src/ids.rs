//! Prefixed identifier generation and validation.
//!
//! Every entity id in the kernel carries a short type prefix
//! (`pid_…` for players, `aid_…` for assets, `tx_…` for transitions and
//! escrows) so that a bare string in a log line or an error payload is
//! self-describing.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{WscError, WscResult};

/// Minimum number of random characters after the prefix for an id to be
/// accepted by [`assert_id`].
const MIN_BODY_LEN: usize = 10;

/// The id namespaces used by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPrefix {
    /// Player identity.
    Player,
    /// Asset.
    Asset,
    /// World.
    World,
    /// Shard.
    Shard,
    /// Guild.
    Guild,
    /// Entitlement.
    Entitlement,
    /// Transaction-scoped entity (transition, escrow).
    Tx,
}

impl IdPrefix {
    /// Returns the short string form used as the id prefix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "pid",
            Self::Asset => "aid",
            Self::World => "wid",
            Self::Shard => "sid",
            Self::Guild => "gid",
            Self::Entitlement => "ent",
            Self::Tx => "tx",
        }
    }
}

/// Generates a fresh random id under the given prefix.
#[must_use]
pub fn new_id(prefix: IdPrefix) -> String {
    format!("{}_{}", prefix.as_str(), Uuid::new_v4().simple())
}

/// Validates that `value` is a well-formed id under `prefix`.
///
/// # Errors
///
/// Returns a Validation error when the prefix does not match or the body is
/// too short or contains characters outside `[A-Za-z0-9_-]`.
pub fn assert_id(prefix: IdPrefix, value: &str) -> WscResult<()> {
    let expected = format!("{}_", prefix.as_str());
    let body = value.strip_prefix(&expected).ok_or_else(|| {
        WscError::validation_with(
            format!("Invalid {} id.", prefix.as_str()),
            json!({ "value": value }),
        )
    })?;

    let well_formed = body.len() >= MIN_BODY_LEN
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !well_formed {
        return Err(WscError::validation_with(
            format!("Invalid {} id.", prefix.as_str()),
            json!({ "value": value }),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_shape() {
        let id = new_id(IdPrefix::Asset);
        assert!(id.starts_with("aid_"));
        assert_id(IdPrefix::Asset, &id).unwrap();
    }

    #[test]
    fn test_assert_id_rejects_wrong_prefix() {
        let id = new_id(IdPrefix::Player);
        let err = assert_id(IdPrefix::Asset, &id).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_assert_id_rejects_short_body() {
        let err = assert_id(IdPrefix::Tx, "tx_short").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_assert_id_rejects_bad_chars() {
        let err = assert_id(IdPrefix::Shard, "sid_not/valid!!chars").unwrap_err();
        assert!(err.is_validation());
    }
}
