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

//! UserInfo endpoint fetch.

use reqwest::StatusCode;

use crate::credential::BearerCredential;
use crate::error::{ProviderFailure, Stage};

use super::binding::ProviderBinding;

/// Why a userinfo fetch produced no payload.
#[derive(Debug)]
pub enum UserInfoError {
    /// The provider refused the token (HTTP 401 or 403).
    Refused(StatusCode),
    /// Transport error, timeout, or any other non-success status.
    Failed(ProviderFailure),
}

/// Fetch the raw claims payload from the provider's UserInfo endpoint using
/// the caller's access token.
///
/// The payload is returned undecoded; decoding belongs to the claims schema.
pub async fn fetch_userinfo(
    binding: &ProviderBinding,
    credential: &BearerCredential,
) -> Result<Vec<u8>, UserInfoError> {
    let endpoint = binding.userinfo_url();
    let resp = binding
        .http()
        .get(endpoint.as_str())
        .bearer_auth(credential.secret())
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| UserInfoError::Failed(ProviderFailure::from_transport(Stage::UserInfo, e)))?;

    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(UserInfoError::Refused(status));
    }
    if !status.is_success() {
        return Err(UserInfoError::Failed(ProviderFailure::unavailable(
            Stage::UserInfo,
            format!("{endpoint} returned HTTP {status}"),
        )));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| UserInfoError::Failed(ProviderFailure::from_transport(Stage::UserInfo, e)))?;
    Ok(bytes.to_vec())
}
