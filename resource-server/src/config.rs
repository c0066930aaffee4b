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

//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use oauth2::{ClientId, ClientSecret, Scope};

use crate::claims::DEFAULT_ROLE_CLIENT;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CLIENT_NAME: &str = "example-resource";
const DEFAULT_SCOPES: &str = "openid";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// How a bearer token is confirmed with the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
    /// RFC 7662 token introspection, authenticated with the client credentials.
    Introspection,
    /// The userinfo endpoint itself accepts or refuses the token.
    UserInfo,
}

impl VerificationMode {
    fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "introspection" => Ok(Self::Introspection),
            "userinfo" => Ok(Self::UserInfo),
            other => Err(format!(
                "VERIFICATION_MODE must be \"introspection\" or \"userinfo\", got \"{other}\""
            )),
        }
    }
}

/// Credentials this resource server uses to authenticate to the provider.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
}

/// Configuration for the resource server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server (e.g. "0.0.0.0:8080").
    pub listen_addr: String,
    /// Issuer base URL used for OIDC discovery.
    pub provider_url: String,
    /// Deployment name printed in the success banner.
    pub client_name: String,
    /// `None` when `OAUTH_CLIENT_ID` is unset or empty.
    pub credentials: Option<ClientCredentials>,
    /// Scopes every accepted token must carry.
    pub scopes: Vec<Scope>,
    pub verification: VerificationMode,
    /// Client ids whose `resource_access` roles are kept in the claims.
    pub role_clients: Vec<String>,
    /// Bound on every outbound provider call.
    pub provider_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Required
    /// - `PROVIDER_URL`
    ///
    /// # Optional
    /// - `LISTEN_ADDR` (default: `"0.0.0.0:8080"`)
    /// - `CLIENT_NAME` (default: `"example-resource"`)
    /// - `OAUTH_CLIENT_ID`, `OAUTH_SECRET` (the secret is required once the id is set)
    /// - `OAUTH_SCOPES` (default: `"openid"`, space separated)
    /// - `VERIFICATION_MODE` (`introspection` | `userinfo`)
    /// - `CLAIMS_ROLE_CLIENTS` (comma separated, default: `"example-frontend"`; set empty to keep none)
    /// - `PROVIDER_TIMEOUT_SECS` (default: `"10"`)
    pub fn from_env() -> Result<Self, String> {
        let provider_url = env::var("PROVIDER_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or("PROVIDER_URL environment variable is required")?;
        url::Url::parse(&provider_url).map_err(|e| format!("PROVIDER_URL is not a valid URL: {e}"))?;

        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let client_name = env::var("CLIENT_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());

        let credentials = env::var("OAUTH_CLIENT_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|client_id| {
                Ok::<_, String>(ClientCredentials {
                    client_id: ClientId::new(client_id),
                    client_secret: ClientSecret::new(
                        env::var("OAUTH_SECRET")
                            .map_err(|_| "OAUTH_SECRET required when OAUTH_CLIENT_ID is set")?,
                    ),
                })
            })
            .transpose()?;

        let scopes = env::var("OAUTH_SCOPES")
            .unwrap_or_else(|_| DEFAULT_SCOPES.to_string())
            .split_whitespace()
            .map(|s| Scope::new(s.to_string()))
            .collect();

        let verification = match env::var("VERIFICATION_MODE").ok().filter(|s| !s.is_empty()) {
            Some(mode) => VerificationMode::parse(&mode)?,
            None if credentials.is_some() => VerificationMode::Introspection,
            None => VerificationMode::UserInfo,
        };
        if verification == VerificationMode::Introspection && credentials.is_none() {
            return Err("VERIFICATION_MODE=introspection requires OAUTH_CLIENT_ID and OAUTH_SECRET".into());
        }

        let role_clients = env::var("CLAIMS_ROLE_CLIENTS")
            .unwrap_or_else(|_| DEFAULT_ROLE_CLIENT.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let timeout_secs = env::var("PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_PROVIDER_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or("PROVIDER_TIMEOUT_SECS must be a positive integer")?;

        Ok(Self {
            listen_addr,
            provider_url,
            client_name,
            credentials,
            scopes,
            verification,
            role_clients,
            provider_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
