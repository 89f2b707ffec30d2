// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! OAuth state management
//!
//! [`OAuthState`] bundles everything the authorization flow needs: the
//! registered clients, the two grant ledgers, and the token issuer. It is
//! managed by Rocket and shared across all request handlers.
//!
//! The ledgers are held behind the [`Ledger`] trait so the in-memory
//! implementations can be replaced by an external TTL-capable store without
//! touching the endpoints.

use chrono::Duration;

use crate::config::{OAuthConfig, RegisteredClient};
use crate::oauth::issuer::TokenIssuer;
use crate::oauth::ledger::{AuthorizationGrant, Ledger, MemoryLedger, RefreshGrant};

/// Shared state for the OAuth 2.0 endpoints
pub struct OAuthState {
    clients: Vec<RegisteredClient>,

    /// Pending authorization codes
    pub auth_codes: Box<dyn Ledger<AuthorizationGrant>>,

    /// Outstanding refresh tokens
    pub refresh_grants: Box<dyn Ledger<RefreshGrant>>,

    /// Access token minting and verification
    pub issuer: TokenIssuer,

    /// Authorization code lifetime
    pub auth_code_ttl: Duration,

    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
}

impl OAuthState {
    /// Build state with in-memory ledgers from the configuration
    pub fn in_memory(config: &OAuthConfig) -> Self {
        OAuthState {
            clients: config.clients.clone(),
            auth_codes: Box::new(MemoryLedger::new()),
            refresh_grants: Box::new(MemoryLedger::new()),
            issuer: TokenIssuer::new(
                config.jwt_secret.as_bytes(),
                Duration::seconds(config.access_token_ttl_seconds),
            ),
            auth_code_ttl: Duration::seconds(config.auth_code_ttl_seconds),
            refresh_token_ttl: Duration::seconds(config.refresh_token_ttl_seconds),
        }
    }

    /// Look up a registered client by id
    pub fn client(&self, client_id: &str) -> Option<&RegisteredClient> {
        self.clients.iter().find(|c| c.client_id == client_id)
    }

    /// The client used for discovery responses
    pub fn default_client(&self) -> &RegisteredClient {
        // Config validation guarantees at least one registered client
        &self.clients[0]
    }

    /// Check a client id/secret pair against the registration
    pub fn authenticate_client(&self, client_id: &str, client_secret: &str) -> bool {
        self.client(client_id)
            .map(|c| c.client_secret == client_secret)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthConfig;

    #[test]
    fn test_client_authentication() {
        let config = OAuthConfig::default();
        let state = OAuthState::in_memory(&config);
        let client = config.clients.first().unwrap();

        assert!(state.authenticate_client(&client.client_id, &client.client_secret));
        assert!(!state.authenticate_client(&client.client_id, "wrong-secret"));
        assert!(!state.authenticate_client("unknown-client", &client.client_secret));
        assert!(state.client("unknown-client").is_none());
    }
}
