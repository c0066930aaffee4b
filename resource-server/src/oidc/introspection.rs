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

//! RFC 7662 token introspection: asking the provider whether a token is live.

use oauth2::Scope;
use serde::Deserialize;

use crate::credential::BearerCredential;
use crate::error::{ProviderFailure, Rejection, Stage};

use super::binding::ProviderBinding;

/// Response from the provider's introspection endpoint.
///
/// Only the members the acceptance decision reads are modelled; `exp`,
/// `client_id` and the rest are left to the provider, which already folds
/// expiry into `active`.
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionResponse {
    pub active: bool,
    #[serde(default)]
    pub sub: Option<String>,
    /// Space-separated scopes granted to the token.
    #[serde(default)]
    pub scope: Option<String>,
}

impl IntrospectionResponse {
    /// Accept only an active token that carries every required scope.
    ///
    /// A response without a `scope` member is not checked for scopes; the
    /// provider is then the only authority on what the token may do.
    pub fn ensure_acceptable(&self, required: &[Scope]) -> Result<(), Rejection> {
        if !self.active {
            return Err(Rejection::InvalidToken);
        }
        if let Some(granted) = &self.scope {
            let missing = required
                .iter()
                .find(|scope| !granted.split_whitespace().any(|g| g == scope.as_str()));
            if let Some(scope) = missing {
                tracing::debug!(scope = %scope.as_str(), "Token lacks a required scope");
                return Err(Rejection::InvalidToken);
            }
        }
        Ok(())
    }
}

/// POST the token to the introspection endpoint, authenticating as the client.
pub async fn introspect_token(
    binding: &ProviderBinding,
    credential: &BearerCredential,
) -> Result<IntrospectionResponse, ProviderFailure> {
    let endpoint = binding.introspection_url().ok_or_else(|| {
        ProviderFailure::unavailable(Stage::Introspection, "provider has no introspection endpoint")
    })?;

    let mut request = binding
        .http()
        .post(endpoint.url().as_str())
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&[
            ("token", credential.secret()),
            ("token_type_hint", "access_token"),
        ]);
    if let Some(creds) = &binding.client().credentials {
        request = request.basic_auth(creds.client_id.as_str(), Some(creds.client_secret.secret()));
    }

    let resp = request
        .send()
        .await
        .map_err(|e| ProviderFailure::from_transport(Stage::Introspection, e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        return Err(ProviderFailure::unavailable(
            Stage::Introspection,
            format!("{} returned HTTP {status}", endpoint.url()),
        ));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ProviderFailure::from_transport(Stage::Introspection, e))?;

    serde_json::from_slice::<IntrospectionResponse>(&bytes)
        .map_err(|e| ProviderFailure::schema_mismatch(Stage::Introspection, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(names: &[&str]) -> Vec<Scope> {
        names.iter().map(|s| Scope::new(s.to_string())).collect()
    }

    fn response(json: &str) -> IntrospectionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn inactive_token_is_rejected() {
        let r = response(r#"{"active": false}"#);
        assert_eq!(
            r.ensure_acceptable(&scopes(&["openid"])),
            Err(Rejection::InvalidToken)
        );
    }

    #[test]
    fn active_token_with_required_scopes_is_accepted() {
        let r = response(r#"{"active": true, "sub": "u1", "scope": "openid email profile"}"#);
        assert!(r.ensure_acceptable(&scopes(&["openid", "email"])).is_ok());
        assert_eq!(r.sub.as_deref(), Some("u1"));
    }

    #[test]
    fn missing_scope_is_rejected() {
        let r = response(r#"{"active": true, "scope": "email profile"}"#);
        assert_eq!(
            r.ensure_acceptable(&scopes(&["openid"])),
            Err(Rejection::InvalidToken)
        );
    }

    #[test]
    fn scope_prefix_does_not_count() {
        let r = response(r#"{"active": true, "scope": "openid-lite"}"#);
        assert!(r.ensure_acceptable(&scopes(&["openid"])).is_err());
    }

    #[test]
    fn absent_scope_member_is_not_checked() {
        let r = response(r#"{"active": true}"#);
        assert!(r.ensure_acceptable(&scopes(&["openid"])).is_ok());
    }

    #[test]
    fn unmodelled_members_of_any_shape_are_ignored() {
        let r = response(
            r#"{"active": true, "scope": "openid", "exp": 1735689600.5, "client_id": 7, "username": null}"#,
        );
        assert!(r.ensure_acceptable(&scopes(&["openid"])).is_ok());
    }

    #[test]
    fn active_member_is_required() {
        assert!(serde_json::from_str::<IntrospectionResponse>(r#"{"sub": "u1"}"#).is_err());
    }
}
