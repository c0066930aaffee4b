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

//! The per-request validation pipeline.
//!
//! `extract credential → verify with provider → fetch userinfo → decode claims`.
//! Each stage either advances or halts the request with a [`Rejection`] or a
//! [`ProviderFailure`]; nothing is retried and nothing is revisited. The
//! pipeline never touches HTTP response types, so it can be driven directly.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::claims::{ClaimsRecord, ClaimsSchema};
use crate::config::VerificationMode;
use crate::credential::BearerCredential;
use crate::error::{ProviderFailure, Rejection, Stage};
use crate::oidc::{fetch_userinfo, introspect_token, ProviderBinding, UserInfoError};

/// Result of validating one request. Claims exist only on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(ClaimsRecord),
    Rejected(Rejection),
    ProviderError(ProviderFailure),
}

enum Halt {
    Rejected(Rejection),
    Provider(ProviderFailure),
}

impl From<Rejection> for Halt {
    fn from(r: Rejection) -> Self {
        Halt::Rejected(r)
    }
}

impl From<ProviderFailure> for Halt {
    fn from(f: ProviderFailure) -> Self {
        Halt::Provider(f)
    }
}

/// Validates bearer tokens against one provider binding with one claims schema.
///
/// Cheap to clone; clones share the binding.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    binding: Arc<ProviderBinding>,
    schema: ClaimsSchema,
}

impl RequestValidator {
    pub fn new(binding: Arc<ProviderBinding>, schema: ClaimsSchema) -> Self {
        Self { binding, schema }
    }

    /// Run the full pipeline for one request's headers.
    ///
    /// Every rejection and provider failure is logged here, without the token.
    pub async fn validate(&self, headers: &HeaderMap) -> ValidationOutcome {
        match self.run(headers).await {
            Ok(claims) => {
                tracing::debug!(sub = %claims.sub, "Access token validated");
                ValidationOutcome::Valid(claims)
            }
            Err(Halt::Rejected(rejection)) => {
                tracing::warn!(reason = %rejection, "Rejected request");
                ValidationOutcome::Rejected(rejection)
            }
            Err(Halt::Provider(failure)) => {
                tracing::error!(
                    stage = %failure.stage(),
                    error = %failure,
                    "Token validation could not be completed"
                );
                ValidationOutcome::ProviderError(failure)
            }
        }
    }

    async fn run(&self, headers: &HeaderMap) -> Result<ClaimsRecord, Halt> {
        let credential = BearerCredential::from_headers(headers)?;
        if credential.secret().is_empty() {
            return Err(Rejection::InvalidToken.into());
        }

        let mode = self.binding.verification();
        let expected_sub = match mode {
            VerificationMode::Introspection => {
                let introspection = introspect_token(&self.binding, &credential).await?;
                introspection.ensure_acceptable(&self.binding.client().scopes)?;
                introspection.sub.filter(|s| !s.is_empty())
            }
            // The userinfo call below doubles as the verification.
            VerificationMode::UserInfo => None,
        };

        let payload = match fetch_userinfo(&self.binding, &credential).await {
            Ok(payload) => payload,
            Err(UserInfoError::Refused(_)) if mode == VerificationMode::UserInfo => {
                return Err(Rejection::InvalidToken.into());
            }
            Err(UserInfoError::Refused(status)) => {
                return Err(ProviderFailure::unavailable(
                    Stage::UserInfo,
                    format!("introspected token refused by userinfo endpoint (HTTP {status})"),
                )
                .into());
            }
            Err(UserInfoError::Failed(failure)) => return Err(failure.into()),
        };

        let claims = self.schema.decode(&payload)?;

        if let Some(expected) = expected_sub {
            if claims.sub != expected {
                return Err(ProviderFailure::SubjectMismatch.into());
            }
        }

        Ok(claims)
    }
}
