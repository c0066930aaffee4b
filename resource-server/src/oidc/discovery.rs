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

//! OIDC discovery: fetching `.well-known/openid-configuration`.

use serde::Deserialize;

use crate::error::{ProviderFailure, Stage};

/// Metadata published in a provider's `.well-known/openid-configuration`.
///
/// Only the fields this server consumes are modelled; everything else in the
/// document is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default)]
    pub introspection_endpoint: Option<String>,
    #[serde(default)]
    pub scopes_supported: Option<Vec<String>>,
}

/// The discovery document location for an issuer base URL.
pub fn discovery_url(provider_url: &str) -> String {
    format!(
        "{}/.well-known/openid-configuration",
        provider_url.trim_end_matches('/')
    )
}

/// Fetch the discovery document for `provider_url`.
pub async fn discover_provider_metadata(
    http: &reqwest::Client,
    provider_url: &str,
) -> Result<ProviderMetadata, ProviderFailure> {
    let url = discovery_url(provider_url);
    let resp = http
        .get(&url)
        .send()
        .await
        .map_err(|e| ProviderFailure::from_transport(Stage::Discovery, e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderFailure::unavailable(
            Stage::Discovery,
            format!("{url} returned HTTP {status}: {body}"),
        ));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ProviderFailure::from_transport(Stage::Discovery, e))?;

    serde_json::from_slice::<ProviderMetadata>(&bytes).map_err(|e| {
        ProviderFailure::schema_mismatch(
            Stage::Discovery,
            format!("malformed discovery document at {url}: {e}"),
        )
    })
}
