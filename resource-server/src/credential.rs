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

//! Bearer credential extraction from the `Authorization` header.

use axum::http::{header, HeaderMap};
use oauth2::AccessToken;

use crate::error::Rejection;

const BEARER_PREFIX: &str = "Bearer ";

/// The raw access token presented by the caller.
///
/// Wraps [`AccessToken`], whose `Debug` output is redacted, so the token
/// cannot end up in a log line by accident.
#[derive(Debug, Clone)]
pub struct BearerCredential(AccessToken);

impl BearerCredential {
    /// Extract the token from `Authorization: Bearer <token>`.
    ///
    /// The scheme prefix is case-sensitive and must be followed by exactly one
    /// space; everything after it is the token.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, Rejection> {
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or(Rejection::MissingAuthorization)?;

        // A header that is present but not visible ASCII cannot be a bearer token.
        let value = value.to_str().map_err(|_| Rejection::NotBearer)?;
        if value.is_empty() {
            return Err(Rejection::MissingAuthorization);
        }

        let token = value
            .strip_prefix(BEARER_PREFIX)
            .ok_or(Rejection::NotBearer)?;

        Ok(Self(AccessToken::new(token.to_string())))
    }

    pub fn secret(&self) -> &str {
        self.0.secret()
    }
}
