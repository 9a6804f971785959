//! JSON Schema validation for persisted records.
//!
//! Records are shape-checked at the ingestion edge, before they enter the
//! stores the coordination kernel reads. The kernel itself trusts records it
//! reads back. Schemas use draft 2020-12 and are embedded as constants so the
//! registry has no filesystem dependency.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use wsc_core::schema::{SchemaName, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new().unwrap();
//! let shard = json!({
//!     "shard_id": "sid_hub_west_0001",
//!     "world_ref": "wid_prime_00000001",
//!     "status": "open",
//! });
//! registry.validate(SchemaName::WorldShard, &shard).unwrap();
//! ```

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::error::{WscError, WscResult};

/// Record shapes known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaName {
    /// Player identity record.
    PlayerIdentity,
    /// Asset ownership record.
    AssetOwnership,
    /// World shard record.
    WorldShard,
}

impl SchemaName {
    /// Returns the registry key for this schema.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerIdentity => "player-identity",
            Self::AssetOwnership => "asset-ownership",
            Self::WorldShard => "world-shard",
        }
    }

    /// All known schema names.
    pub const ALL: [Self; 3] = [Self::PlayerIdentity, Self::AssetOwnership, Self::WorldShard];
}

/// Record schema definitions.
pub mod record_schemas {
    /// Player identity record schema.
    pub const PLAYER_IDENTITY: &str = r#"{
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["identity_id", "status", "created_at_ms", "auth", "profile", "scopes", "audit"],
        "properties": {
            "identity_id": {"type": "string", "pattern": "^pid_[A-Za-z0-9_-]{10,}$"},
            "status": {"enum": ["active", "suspended", "banned", "deleted"]},
            "created_at_ms": {"type": "integer", "minimum": 0},
            "updated_at_ms": {"type": "integer", "minimum": 0},
            "auth": {
                "type": "object",
                "required": ["provider", "subject", "last_authenticated_at_ms"],
                "properties": {
                    "provider": {"enum": ["internal", "oauth", "platform", "sso"]},
                    "subject": {"type": "string", "minLength": 1},
                    "last_authenticated_at_ms": {"type": "integer", "minimum": 0}
                }
            },
            "profile": {
                "type": "object",
                "required": ["display_name"],
                "properties": {
                    "display_name": {"type": "string", "minLength": 1},
                    "region": {"type": "string"}
                }
            },
            "scopes": {"type": "array", "items": {"type": "string"}},
            "entitlements": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["entitlement_id", "granted_at_ms"],
                    "properties": {
                        "entitlement_id": {"type": "string", "pattern": "^ent_[A-Za-z0-9_-]{10,}$"},
                        "granted_at_ms": {"type": "integer", "minimum": 0},
                        "expires_at_ms": {"type": "integer", "minimum": 0}
                    }
                }
            },
            "audit": {
                "type": "object",
                "required": ["created_by"],
                "properties": {
                    "created_by": {"type": "string", "minLength": 1},
                    "last_change_id": {"type": "string"}
                }
            }
        }
    }"#;

    /// Asset ownership record schema.
    pub const ASSET_OWNERSHIP: &str = r#"{
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["asset_id", "asset_class", "scope", "owner", "state", "lifecycle", "transfer_policy", "version", "last_change_id"],
        "properties": {
            "asset_id": {"type": "string", "pattern": "^aid_[A-Za-z0-9_-]{10,}$"},
            "asset_class": {"enum": ["currency", "item", "vehicle", "property", "entitlement", "reputation", "other"]},
            "asset_type": {"type": "string"},
            "scope": {"enum": ["global", "world_local", "shard_local"]},
            "world_ref": {"type": "string"},
            "shard_ref": {"type": "string"},
            "owner": {
                "type": "object",
                "required": ["owner_type", "owner_id"],
                "properties": {
                    "owner_type": {"enum": ["player", "system", "world", "guild"]},
                    "owner_id": {"type": "string", "minLength": 1}
                }
            },
            "state": {
                "type": "object",
                "required": ["status"],
                "properties": {
                    "status": {"enum": ["active", "locked", "escrow", "consumed", "destroyed", "suspended"]},
                    "quantity": {"type": "integer", "minimum": 0},
                    "state_reason": {"type": "string"},
                    "attributes": {"type": "object"}
                }
            },
            "lifecycle": {
                "type": "object",
                "required": ["created_at_ms", "origin"],
                "properties": {
                    "created_at_ms": {"type": "integer", "minimum": 0},
                    "updated_at_ms": {"type": "integer", "minimum": 0},
                    "origin": {
                        "type": "object",
                        "required": ["origin_type"],
                        "properties": {
                            "origin_type": {"enum": ["mint", "reward", "purchase", "drop", "grant", "migration"]},
                            "origin_ref": {"type": "string"}
                        }
                    }
                }
            },
            "transfer_policy": {
                "type": "object",
                "required": ["transferable"],
                "properties": {
                    "transferable": {"type": "boolean"},
                    "requires_escrow": {"type": "boolean"}
                }
            },
            "version": {"type": "integer", "minimum": 1},
            "last_change_id": {"type": "string", "minLength": 1},
            "last_changed_at_ms": {"type": "integer", "minimum": 0}
        }
    }"#;

    /// World shard record schema.
    pub const WORLD_SHARD: &str = r#"{
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["shard_id", "world_ref", "status"],
        "properties": {
            "shard_id": {"type": "string", "pattern": "^sid_[A-Za-z0-9_-]{1,}$"},
            "world_ref": {"type": "string", "pattern": "^wid_[A-Za-z0-9_-]{1,}$"},
            "status": {"enum": ["open", "draining", "closed", "maintenance"]},
            "capacity": {"type": "integer", "minimum": 0},
            "population": {"type": "integer", "minimum": 0},
            "region": {"type": "string"}
        }
    }"#;
}

/// Compiled registry of record validators.
#[derive(Debug)]
pub struct SchemaRegistry {
    validators: HashMap<SchemaName, jsonschema::Validator>,
}

impl SchemaRegistry {
    /// Compiles all record schemas.
    ///
    /// # Errors
    ///
    /// Returns a Validation error if an embedded schema fails to compile;
    /// this only happens when a schema constant itself is malformed.
    pub fn new() -> WscResult<Self> {
        let mut validators = HashMap::new();
        for name in SchemaName::ALL {
            let raw = match name {
                SchemaName::PlayerIdentity => record_schemas::PLAYER_IDENTITY,
                SchemaName::AssetOwnership => record_schemas::ASSET_OWNERSHIP,
                SchemaName::WorldShard => record_schemas::WORLD_SHARD,
            };
            let schema: Value = serde_json::from_str(raw).map_err(|err| {
                WscError::validation_with(
                    format!("Schema is not valid JSON: {}", name.as_str()),
                    json!({ "schema": name.as_str(), "error": err.to_string() }),
                )
            })?;
            let validator = jsonschema::options()
                .should_validate_formats(true)
                .build(&schema)
                .map_err(|err| {
                    WscError::validation_with(
                        format!("Schema failed to compile: {}", name.as_str()),
                        json!({ "schema": name.as_str(), "error": err.to_string() }),
                    )
                })?;
            validators.insert(name, validator);
        }
        Ok(Self { validators })
    }

    /// Validates `record` against the named schema.
    ///
    /// # Errors
    ///
    /// Returns a Validation error whose details list every violation path
    /// and message.
    pub fn validate(&self, name: SchemaName, record: &Value) -> WscResult<()> {
        let validator = self.validators.get(&name).ok_or_else(|| {
            WscError::validation_with(
                format!("Schema not registered: {}", name.as_str()),
                json!({ "schema": name.as_str() }),
            )
        })?;

        let violations: Vec<Value> = validator
            .iter_errors(record)
            .map(|err| {
                let path = err.instance_path.to_string();
                json!({
                    "path": if path.is_empty() { "$".to_string() } else { format!("${path}") },
                    "message": err.to_string(),
                })
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(WscError::validation_with(
                format!("Schema validation failed: {}", name.as_str()),
                json!({ "schema": name.as_str(), "errors": violations }),
            ))
        }
    }
}
