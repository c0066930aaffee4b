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

//! Error taxonomy for token validation.
//!
//! Per-request failures come in two families that must never be conflated:
//! a [`Rejection`] means the caller's credential is bad (HTTP 400), while a
//! [`ProviderFailure`] means validation could not be completed (HTTP 500).
//! Both render only a fixed short string; the `detail` strings are for logs.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Response body for every 400.
pub const BAD_REQUEST_BODY: &str = "Bad request";
/// Response body for every 500.
pub const INTERNAL_ERROR_BODY: &str = "Internal error";

/// Which outbound interaction with the identity provider failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovery,
    Introspection,
    UserInfo,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Discovery => write!(f, "discovery"),
            Stage::Introspection => write!(f, "introspection"),
            Stage::UserInfo => write!(f, "userinfo"),
        }
    }
}

/// The caller's credential was missing, malformed, or refused by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("missing authorization")]
    MissingAuthorization,
    #[error("not a bearer token")]
    NotBearer,
    #[error("invalid access token")]
    InvalidToken,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// The provider could not be consulted, or answered with something unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderFailure {
    /// Transport error, timeout, or an unexpected HTTP status.
    #[error("{stage} request failed: {detail}")]
    Unavailable { stage: Stage, detail: String },

    /// The payload could not be decoded into the expected shape.
    #[error("{stage} response could not be decoded: {detail}")]
    SchemaMismatch { stage: Stage, detail: String },

    /// The userinfo subject differs from the subject the token was issued to.
    #[error("userinfo subject does not match the introspected token subject")]
    SubjectMismatch,
}

impl ProviderFailure {
    pub fn unavailable(stage: Stage, detail: impl Into<String>) -> Self {
        Self::Unavailable {
            stage,
            detail: detail.into(),
        }
    }

    pub fn schema_mismatch(stage: Stage, detail: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            stage,
            detail: detail.into(),
        }
    }

    /// Map a `reqwest` transport error. `reqwest` errors carry the URL but
    /// never request headers or bodies, so the bearer token stays out of them.
    pub fn from_transport(stage: Stage, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let endpoint = err.url().map(|u| u.to_string()).unwrap_or_default();
            Self::unavailable(stage, format!("timed out waiting for {endpoint}"))
        } else {
            Self::unavailable(stage, err.to_string())
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Unavailable { stage, .. } | Self::SchemaMismatch { stage, .. } => *stage,
            Self::SubjectMismatch => Stage::UserInfo,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Errors that stop the process before it serves any traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("provider discovery failed: {0}")]
    Discovery(#[from] ProviderFailure),
    #[error("failed to bind listener: {0}")]
    Bind(#[from] std::io::Error),
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status(), BAD_REQUEST_BODY).into_response()
    }
}

impl IntoResponse for ProviderFailure {
    fn into_response(self) -> Response {
        (self.status(), INTERNAL_ERROR_BODY).into_response()
    }
}
