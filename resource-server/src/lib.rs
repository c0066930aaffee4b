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

//! OAuth2/OIDC resource server library.
//!
//! Validates inbound bearer tokens against an identity provider and returns
//! the caller's UserInfo claims. The binary entry point (`main.rs`) loads
//! configuration, binds to the provider once, and serves the router.

pub mod claims;
pub mod config;
pub mod credential;
pub mod error;
pub mod oidc;
pub mod routes;
pub mod state;
pub mod validator;
