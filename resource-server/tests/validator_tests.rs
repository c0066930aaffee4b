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

//! Tests for `RequestValidator::validate` driven directly, without the router.


use axum::http::{header, HeaderMap, HeaderValue};
use resource_server::config::VerificationMode;
use resource_server::error::{ProviderFailure, Rejection, Stage};
use resource_server::validator::ValidationOutcome;
use test_helpers::*;

const MODES: [VerificationMode; 2] = [VerificationMode::Introspection, VerificationMode::UserInfo];

fn headers(authorization: Option<&'static str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(value) = authorization {
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
    }
    headers
}

async fn validate(mode: VerificationMode, authorization: Option<&'static str>) -> ValidationOutcome {
    let provider = start_mock_provider(MockOptions::default()).await;
    let validator = build_validator(&test_config(&provider.url, mode)).await;
    validator.validate(&headers(authorization)).await
}

#[tokio::test]
async fn test_missing_header_is_missing_authorization() {
    for mode in MODES {
        assert_eq!(
            validate(mode, None).await,
            ValidationOutcome::Rejected(Rejection::MissingAuthorization)
        );
    }
}

#[tokio::test]
async fn test_other_scheme_is_not_bearer() {
    assert_eq!(
        validate(VerificationMode::Introspection, Some("Basic xyz")).await,
        ValidationOutcome::Rejected(Rejection::NotBearer)
    );
}

#[tokio::test]
async fn test_unknown_token_is_invalid() {
    for mode in MODES {
        assert_eq!(
            validate(mode, Some("Bearer bad")).await,
            ValidationOutcome::Rejected(Rejection::InvalidToken),
            "mode {mode:?}"
        );
    }
}

#[tokio::test]
async fn test_valid_token_yields_claims() {
    for mode in MODES {
        match validate(mode, Some("Bearer tok123")).await {
            ValidationOutcome::Valid(claims) => {
                assert_eq!(claims.sub, "u1");
                assert_eq!(claims.email, "a@b.com");
                assert!(claims.email_verified);
            }
            other => panic!("expected Valid for {mode:?}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_role_grants_survive_validation() {
    match validate(VerificationMode::UserInfo, Some("Bearer roles")).await {
        ValidationOutcome::Valid(claims) => {
            assert_eq!(claims.roles_for(ROLE_CLIENT), ["viewer", "editor"]);
            assert!(claims.roles_for("account").is_empty());
        }
        other => panic!("expected Valid, got {other:?}"),
    }
}

#[tokio::test]
async fn test_userinfo_outage_is_unavailable_at_userinfo_stage() {
    for mode in MODES {
        let outcome = validate(mode, Some("Bearer nouserinfo")).await;
        assert!(
            matches!(
                outcome,
                ValidationOutcome::ProviderError(ProviderFailure::Unavailable {
                    stage: Stage::UserInfo,
                    ..
                })
            ),
            "mode {mode:?}: {outcome:?}"
        );
    }
}

#[tokio::test]
async fn test_introspection_timeout_is_unavailable_at_introspection_stage() {
    let outcome = validate(VerificationMode::Introspection, Some("Bearer slow-introspect")).await;
    assert!(
        matches!(
            outcome,
            ValidationOutcome::ProviderError(ProviderFailure::Unavailable {
                stage: Stage::Introspection,
                ..
            })
        ),
        "{outcome:?}"
    );
}

#[tokio::test]
async fn test_non_object_claims_are_a_schema_mismatch() {
    let outcome = validate(VerificationMode::UserInfo, Some("Bearer garbage")).await;
    assert!(
        matches!(
            outcome,
            ValidationOutcome::ProviderError(ProviderFailure::SchemaMismatch {
                stage: Stage::UserInfo,
                ..
            })
        ),
        "{outcome:?}"
    );
}

#[tokio::test]
async fn test_foreign_subject_is_a_subject_mismatch() {
    assert_eq!(
        validate(VerificationMode::Introspection, Some("Bearer impostor")).await,
        ValidationOutcome::ProviderError(ProviderFailure::SubjectMismatch)
    );
}
