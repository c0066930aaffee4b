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

//! Identity provider plumbing: OIDC discovery, the provider binding, token
//! introspection, and the UserInfo endpoint.

pub mod binding;
pub mod discovery;
pub mod introspection;
pub mod userinfo;

pub use binding::{OAuthClientConfig, ProviderBinding};
pub use discovery::{discover_provider_metadata, discovery_url, ProviderMetadata};
pub use introspection::{introspect_token, IntrospectionResponse};
pub use userinfo::{fetch_userinfo, UserInfoError};
