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

//! Axum router and response rendering.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};

use crate::claims::ClaimsRecord;
use crate::error::INTERNAL_ERROR_BODY;
use crate::state::AppState;
use crate::validator::ValidationOutcome;

/// Build the application router: one endpoint, any method, path `/`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", any(validate_request))
}

/// ANY / -- validates the bearer token and echoes the caller's claims.
pub async fn validate_request(State(state): State<AppState>, headers: HeaderMap) -> Response {
    render(&state.client_name, state.validator.validate(&headers).await)
}

/// Turn a [`ValidationOutcome`] into the HTTP response.
pub fn render(client_name: &str, outcome: ValidationOutcome) -> Response {
    match outcome {
        ValidationOutcome::Valid(claims) => match render_claims(client_name, &claims) {
            Ok(body) => (StatusCode::OK, body).into_response(),
            Err(e) => {
                tracing::error!("Failed to encode claims: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
            }
        },
        ValidationOutcome::Rejected(rejection) => rejection.into_response(),
        ValidationOutcome::ProviderError(failure) => failure.into_response(),
    }
}

/// The success body: a banner naming the deployment, then the claims document.
pub fn render_claims(client_name: &str, claims: &ClaimsRecord) -> Result<String, serde_json::Error> {
    let json = claims.to_pretty_json()?;
    Ok(format!(
        "--------{client_name}--------\r\nParsed userinfo claims: {json}\r\n"
    ))
}
