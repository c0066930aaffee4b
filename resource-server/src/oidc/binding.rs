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

//! The immutable provider handle resolved once at startup.

use oauth2::{IntrospectionUrl, Scope, TokenUrl};
use url::Url;

use crate::config::{ClientCredentials, Config, VerificationMode};
use crate::error::{ProviderFailure, Stage, StartupError};

use super::discovery::{discover_provider_metadata, ProviderMetadata};

/// OAuth2 client configuration this server holds for the provider.
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    /// `None` for a public client; no client authentication is performed.
    pub credentials: Option<ClientCredentials>,
    pub scopes: Vec<Scope>,
    pub token_url: TokenUrl,
}

/// Everything needed to verify tokens and fetch claims against one provider.
///
/// Built once by [`ProviderBinding::discover`], never mutated afterwards, and
/// shared read-only (behind an `Arc`) by every request handler.
#[derive(Debug)]
pub struct ProviderBinding {
    issuer: String,
    client: OAuthClientConfig,
    userinfo_url: Url,
    introspection_url: Option<IntrospectionUrl>,
    verification: VerificationMode,
    http: reqwest::Client,
}

impl ProviderBinding {
    /// Perform OIDC discovery against `config.provider_url` and bind to the result.
    ///
    /// Any failure here is a startup failure; there is no retry.
    pub async fn discover(config: &Config) -> Result<Self, StartupError> {
        let http = reqwest::Client::builder()
            .timeout(config.provider_timeout)
            .connect_timeout(config.provider_timeout)
            .build()
            .map_err(|e| StartupError::Config(format!("failed to build HTTP client: {e}")))?;

        let metadata = discover_provider_metadata(&http, &config.provider_url).await?;
        let binding = Self::from_metadata(metadata, config, http)?;

        tracing::info!(
            issuer = %binding.issuer,
            userinfo = %binding.userinfo_url,
            verification = ?binding.verification,
            "Bound to identity provider"
        );
        Ok(binding)
    }

    /// Bind to an already-fetched discovery document.
    pub fn from_metadata(
        metadata: ProviderMetadata,
        config: &Config,
        http: reqwest::Client,
    ) -> Result<Self, StartupError> {
        let token_url = TokenUrl::new(metadata.token_endpoint).map_err(|e| {
            ProviderFailure::schema_mismatch(Stage::Discovery, format!("invalid token_endpoint: {e}"))
        })?;

        let userinfo_url = metadata
            .userinfo_endpoint
            .ok_or_else(|| {
                ProviderFailure::schema_mismatch(
                    Stage::Discovery,
                    "discovery document has no userinfo_endpoint",
                )
            })
            .and_then(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ProviderFailure::schema_mismatch(
                        Stage::Discovery,
                        format!("invalid userinfo_endpoint: {e}"),
                    )
                })
            })?;

        let introspection_url = metadata
            .introspection_endpoint
            .map(IntrospectionUrl::new)
            .transpose()
            .map_err(|e| {
                ProviderFailure::schema_mismatch(
                    Stage::Discovery,
                    format!("invalid introspection_endpoint: {e}"),
                )
            })?;

        if config.verification == VerificationMode::Introspection {
            if config.credentials.is_none() {
                return Err(StartupError::Config(
                    "introspection requires client credentials".to_string(),
                ));
            }
            if introspection_url.is_none() {
                return Err(ProviderFailure::schema_mismatch(
                    Stage::Discovery,
                    "introspection requested but the provider publishes no introspection_endpoint",
                )
                .into());
            }
        }

        if let Some(supported) = &metadata.scopes_supported {
            for scope in &config.scopes {
                if !supported.iter().any(|s| s == scope.as_str()) {
                    tracing::warn!(scope = %scope.as_str(), "Provider does not advertise a required scope");
                }
            }
        }

        Ok(Self {
            issuer: metadata.issuer,
            client: OAuthClientConfig {
                credentials: config.credentials.clone(),
                scopes: config.scopes.clone(),
                token_url,
            },
            userinfo_url,
            introspection_url,
            verification: config.verification,
            http,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn client(&self) -> &OAuthClientConfig {
        &self.client
    }

    pub fn userinfo_url(&self) -> &Url {
        &self.userinfo_url
    }

    pub fn introspection_url(&self) -> Option<&IntrospectionUrl> {
        self.introspection_url.as_ref()
    }

    pub fn verification(&self) -> VerificationMode {
        self.verification
    }

    /// The shared HTTP client; every request through it is bounded by the
    /// configured provider timeout.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use oauth2::{ClientId, ClientSecret};

    use super::*;

    fn config(verification: VerificationMode, with_credentials: bool) -> Config {
        Config {
            listen_addr: "127.0.0.1:0".to_string(),
            provider_url: "https://idp.example.com".to_string(),
            client_name: "example-resource".to_string(),
            credentials: with_credentials.then(|| ClientCredentials {
                client_id: ClientId::new("example-resource".to_string()),
                client_secret: ClientSecret::new("secret".to_string()),
            }),
            scopes: vec![Scope::new("openid".to_string())],
            verification,
            role_clients: Vec::new(),
            provider_timeout: Duration::from_secs(5),
        }
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            issuer: "https://idp.example.com".to_string(),
            authorization_endpoint: "https://idp.example.com/auth".to_string(),
            token_endpoint: "https://idp.example.com/token".to_string(),
            userinfo_endpoint: Some("https://idp.example.com/userinfo".to_string()),
            introspection_endpoint: Some("https://idp.example.com/token/introspect".to_string()),
            scopes_supported: Some(vec!["openid".to_string(), "email".to_string()]),
        }
    }

    #[test]
    fn binds_endpoints_from_metadata() {
        let binding = ProviderBinding::from_metadata(
            metadata(),
            &config(VerificationMode::Introspection, true),
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(binding.issuer(), "https://idp.example.com");
        assert_eq!(binding.userinfo_url().as_str(), "https://idp.example.com/userinfo");
        assert_eq!(
            binding.introspection_url().unwrap().url().as_str(),
            "https://idp.example.com/token/introspect"
        );
        assert_eq!(
            binding.client().token_url.url().as_str(),
            "https://idp.example.com/token"
        );
        assert_eq!(binding.verification(), VerificationMode::Introspection);
    }

    #[test]
    fn missing_userinfo_endpoint_is_fatal() {
        let mut meta = metadata();
        meta.userinfo_endpoint = None;
        let err = ProviderBinding::from_metadata(
            meta,
            &config(VerificationMode::UserInfo, false),
            reqwest::Client::new(),
        )
        .unwrap_err();
        assert!(matches!(err, StartupError::Discovery(_)));
    }

    #[test]
    fn introspection_mode_needs_an_introspection_endpoint() {
        let mut meta = metadata();
        meta.introspection_endpoint = None;
        let err = ProviderBinding::from_metadata(
            meta,
            &config(VerificationMode::Introspection, true),
            reqwest::Client::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("introspection_endpoint"));
    }

    #[test]
    fn userinfo_mode_does_not_need_introspection() {
        let mut meta = metadata();
        meta.introspection_endpoint = None;
        let binding = ProviderBinding::from_metadata(
            meta,
            &config(VerificationMode::UserInfo, false),
            reqwest::Client::new(),
        )
        .unwrap();
        assert!(binding.introspection_url().is_none());
        assert!(binding.client().credentials.is_none());
    }

    #[test]
    fn invalid_endpoint_url_is_fatal() {
        let mut meta = metadata();
        meta.token_endpoint = "not a url".to_string();
        let err = ProviderBinding::from_metadata(
            meta,
            &config(VerificationMode::UserInfo, false),
            reqwest::Client::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("token_endpoint"));
    }
}
