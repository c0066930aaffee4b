/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! UserInfo claims and the schema used to decode them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ProviderFailure, Stage};

/// Client whose `resource_access` roles are kept when nothing else is configured.
pub const DEFAULT_ROLE_CLIENT: &str = "example-frontend";

/// Roles granted to the subject by one client (Keycloak `resource_access`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRoles {
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
}

/// Identity claims of a validated token.
///
/// Field order is the render order. Absent or `null` claims decode to their
/// empty value; unrecognized claims are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email_verified: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub given_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub family_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resource_access: BTreeMap<String, ClientRoles>,
}

impl ClaimsRecord {
    /// JSON document of the claims, indented by four spaces.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever writes UTF-8.
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn roles_for(&self, client: &str) -> &[String] {
        self.resource_access
            .get(client)
            .map(|c| c.roles.as_slice())
            .unwrap_or(&[])
    }
}

/// Wire shape before the schema picks which role grants to keep. Role
/// entries stay untyped so an odd grant for an unrelated client cannot fail
/// the whole decode.
#[derive(Deserialize)]
struct RawClaims {
    #[serde(flatten)]
    identity: ClaimsRecord,
    #[serde(default, rename = "resource_access", deserialize_with = "null_as_default")]
    grants: BTreeMap<String, serde_json::Value>,
}

/// Which provider-specific claims a deployment expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsSchema {
    /// Clients whose `resource_access.<client>.roles` are kept. Empty keeps none.
    pub role_clients: Vec<String>,
}

impl Default for ClaimsSchema {
    fn default() -> Self {
        Self::new(vec![DEFAULT_ROLE_CLIENT.to_string()])
    }
}

impl ClaimsSchema {
    pub fn new(role_clients: Vec<String>) -> Self {
        Self { role_clients }
    }

    /// Decode a UserInfo payload into a [`ClaimsRecord`].
    pub fn decode(&self, payload: &[u8]) -> Result<ClaimsRecord, ProviderFailure> {
        let raw: RawClaims = serde_json::from_slice(payload)
            .map_err(|e| ProviderFailure::schema_mismatch(Stage::UserInfo, e.to_string()))?;

        let mut claims = raw.identity;
        for client in &self.role_clients {
            let Some(grant) = raw.grants.get(client) else {
                continue;
            };
            let roles = ClientRoles::deserialize(grant).map_err(|e| {
                ProviderFailure::schema_mismatch(
                    Stage::UserInfo,
                    format!("resource_access.{client}: {e}"),
                )
            })?;
            claims.resource_access.insert(client.clone(), roles);
        }
        Ok(claims)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
