// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Bearer token request guard
//!
//! Routes that take a [`BearerUser`] parameter are only reached with a
//! valid `Authorization: Bearer` access token whose subject still resolves
//! to an account. Failures are cached on the request so the 401 catcher can
//! emit the precise error code (`missing_token`, `token_expired`,
//! `invalid_token`, `user_not_found`).

use std::sync::Arc;

use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;

use crate::oauth::error::ApiError;
use crate::oauth::issuer::TokenError;
use crate::oauth::state::OAuthState;
use crate::store::DataStore;

/// User identity resolved from a validated access token
pub struct BearerUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Record the failure for the 401 catcher and fail the guard
fn deny(request: &Request<'_>, error: ApiError) -> Outcome<BearerUser, ApiError> {
    let status = error.status();
    let cached = error.clone();
    request.local_cache(|| cached);
    Outcome::Error((status, error))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BearerUser {
    type Error = ApiError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Get authorization header
        let auth_header = match request.headers().get_one("Authorization") {
            Some(header) => header,
            None => return deny(request, ApiError::MissingToken),
        };

        // Check it's a bearer token
        let token = match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.is_empty() => token,
            _ => return deny(request, ApiError::MissingToken),
        };

        let oauth = match request.guard::<&State<OAuthState>>().await {
            Outcome::Success(state) => state,
            _ => return deny(request, ApiError::ServerError),
        };

        let claims = match oauth.issuer.verify_access_token(token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => return deny(request, ApiError::TokenExpired),
            Err(TokenError::Invalid) => return deny(request, ApiError::InvalidToken),
        };

        let user_id: i64 = match claims.sub.parse() {
            Ok(id) => id,
            Err(_) => return deny(request, ApiError::InvalidToken),
        };

        // Re-resolve the user so tokens of deleted accounts stop working
        let store = match request.guard::<&State<Arc<dyn DataStore>>>().await {
            Outcome::Success(store) => store,
            _ => return deny(request, ApiError::ServerError),
        };

        let user = match store.find_user_by_id(user_id) {
            Ok(Some(user)) => user,
            Ok(None) => return deny(request, ApiError::UserNotFound),
            Err(e) => return deny(request, ApiError::from(e)),
        };

        Outcome::Success(BearerUser {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }
}
