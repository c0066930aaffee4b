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

//! Shared application state passed to every Axum handler via `State`.

use std::sync::Arc;

use crate::claims::ClaimsSchema;
use crate::config::Config;
use crate::oidc::ProviderBinding;
use crate::validator::RequestValidator;

/// Application state shared across all request handlers. Read-only.
#[derive(Clone)]
pub struct AppState {
    pub validator: RequestValidator,
    /// Deployment name printed in the success banner.
    pub client_name: Arc<str>,
}

impl AppState {
    pub fn new(binding: Arc<ProviderBinding>, config: &Config) -> Self {
        Self {
            validator: RequestValidator::new(
                binding,
                ClaimsSchema::new(config.role_clients.clone()),
            ),
            client_name: Arc::from(config.client_name.as_str()),
        }
    }
}
