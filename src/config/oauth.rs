// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! OAuth 2.0 flow configuration
//!
//! This module defines the structures describing the registered OAuth
//! clients and the lifetimes of the artifacts minted during the
//! authorization flow.

use serde::{Deserialize, Serialize};

/// OAuth2 client registration for the authorization code flow
///
/// This structure represents an OAuth2 client that is allowed to use the
/// authorization code flow with this server. A single voice-assistant
/// client is registered by default; the list form keeps the interface open
/// to additional clients without requiring them.
///
/// # Example
///
/// ```
/// use tomora_api::config::RegisteredClient;
///
/// let client = RegisteredClient {
///     client_id: "tomora-skill-client-2024".to_string(),
///     client_secret: "x9kPqW7mZ3tR8vY2nJ5bL6cF4hT1rQ8w".to_string(),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredClient {
    /// The unique identifier for the OAuth2 client
    pub client_id: String,

    /// The shared secret presented by the client at the token endpoint
    pub client_secret: String,
}

/// Configuration for the OAuth 2.0 authorization flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Registered OAuth2 clients. Requests naming any other client id are
    /// rejected.
    #[serde(default = "default_clients")]
    pub clients: Vec<RegisteredClient>,

    /// HMAC secret used to sign access tokens (HS256).
    ///
    /// Override the default on every deployment, via the configuration file
    /// or the `JWT_SECRET` environment variable.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Authorization code lifetime in seconds (default 5 minutes)
    #[serde(default = "default_auth_code_ttl")]
    pub auth_code_ttl_seconds: i64,

    /// Access token lifetime in seconds (default 30 days)
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_seconds: i64,

    /// Refresh token lifetime in seconds (default 365 days)
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_seconds: i64,
}

fn default_clients() -> Vec<RegisteredClient> {
    vec![RegisteredClient {
        client_id: "tomora-skill-client-2024".to_string(),
        client_secret: "x9kPqW7mZ3tR8vY2nJ5bL6cF4hT1rQ8w".to_string(),
    }]
}

fn default_jwt_secret() -> String {
    "s3cr3t_t0m0r4_2024".to_string()
}

fn default_auth_code_ttl() -> i64 {
    5 * 60
}

fn default_access_token_ttl() -> i64 {
    30 * 24 * 60 * 60
}

fn default_refresh_token_ttl() -> i64 {
    365 * 24 * 60 * 60
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            clients: default_clients(),
            jwt_secret: default_jwt_secret(),
            auth_code_ttl_seconds: default_auth_code_ttl(),
            access_token_ttl_seconds: default_access_token_ttl(),
            refresh_token_ttl_seconds: default_refresh_token_ttl(),
        }
    }
}
