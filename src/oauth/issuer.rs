// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Access token issuance and verification
//!
//! Access tokens are self-contained HS256 JWTs; validity is decided by
//! signature and expiry alone, never by a server-side lookup. Refresh
//! tokens and authorization codes are opaque random strings drawn from the
//! thread-local CSPRNG.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user id
    pub sub: String,

    /// Email of the user the token was issued for
    pub email: String,

    /// Token discriminator, always `"access"`
    #[serde(rename = "type")]
    pub token_type: String,

    /// Issued-at, Unix seconds
    pub iat: i64,

    /// Expiry, Unix seconds
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

/// Why an access token was rejected
///
/// Expiry is distinguished from other invalidity so clients know whether to
/// refresh or re-authenticate.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// Length of generated authorization codes
const AUTH_CODE_LENGTH: usize = 32;

/// Length of generated refresh tokens
const REFRESH_TOKEN_LENGTH: usize = 48;

/// Mints and verifies the artifacts of the token flow
pub struct TokenIssuer {
    signing_key: EncodingKey,
    verification_key: DecodingKey,
    issuer: String,
    access_token_ttl: Duration,
    algorithm: Algorithm,
}

impl TokenIssuer {
    /// Create a new issuer with the given HMAC secret and access-token
    /// lifetime
    pub fn new(secret: &[u8], access_token_ttl: Duration) -> Self {
        TokenIssuer {
            signing_key: EncodingKey::from_secret(secret),
            verification_key: DecodingKey::from_secret(secret),
            issuer: "tomora-api".to_string(),
            access_token_ttl,
            algorithm: Algorithm::HS256,
        }
    }

    /// Sets the issuer name used in JWT claims
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Lifetime of issued access tokens, in seconds
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl.num_seconds()
    }

    /// Mint a signed access token for the given user
    pub fn issue_access_token(&self, user_id: i64, email: &str) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type: "access".to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_token_ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.signing_key)
            .map_err(|e| anyhow::anyhow!("failed to sign access token: {}", e))
    }

    /// Mint an opaque refresh token
    pub fn issue_refresh_token(&self) -> String {
        random_token(REFRESH_TOKEN_LENGTH)
    }

    /// Mint an opaque authorization code
    pub fn issue_authorization_code(&self) -> String {
        random_token(AUTH_CODE_LENGTH)
    }

    /// Verify signature and expiry and return the embedded claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        // No clock-skew allowance; expiry is exact
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);

        let token_data =
            decode::<AccessClaims>(token, &self.verification_key, &validation).map_err(|e| {
                log::debug!("JWT validation failed: {:?}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        if token_data.claims.token_type != "access" {
            return Err(TokenError::Invalid);
        }

        Ok(token_data.claims)
    }
}

/// Random alphanumeric string from the thread-local CSPRNG
pub fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer_with_ttl(seconds: i64) -> TokenIssuer {
        TokenIssuer::new(b"unit-test-secret", Duration::seconds(seconds))
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let issuer = issuer_with_ttl(3600);
        let token = issuer.issue_access_token(42, "alice@example.com").unwrap();

        let claims = issuer.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.token_type, "access");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_distinguished_from_invalid() {
        let issuer = issuer_with_ttl(-10);
        let token = issuer.issue_access_token(42, "alice@example.com").unwrap();
        assert!(matches!(
            issuer.verify_access_token(&token),
            Err(TokenError::Expired)
        ));

        let other = TokenIssuer::new(b"another-secret", Duration::seconds(3600));
        let forged = other.issue_access_token(42, "alice@example.com").unwrap();
        let issuer = issuer_with_ttl(3600);
        assert!(matches!(
            issuer.verify_access_token(&forged),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let issuer = issuer_with_ttl(3600);
        let a = issuer.issue_refresh_token();
        let b = issuer.issue_refresh_token();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }
}
