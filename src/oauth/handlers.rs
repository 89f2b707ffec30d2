// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! OAuth 2.0 endpoint handlers
//!
//! This module contains the Rocket route handlers for the authorization
//! flow: the authorization endpoint serving the login form, the login
//! handler issuing authorization codes, the token endpoint exchanging codes
//! and refresh tokens, and the discovery endpoint.

use std::sync::Arc;

use chrono::Utc;
use log::debug;
use rocket::get;
use rocket::post;
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::oauth::error::ApiError;
use crate::oauth::forms::login_page_html;
use crate::oauth::ledger::{AuthorizationGrant, Ledger, RefreshGrant};
use crate::oauth::state::OAuthState;
use crate::server::ConnectionInfo;
use crate::store::{verify_password, DataStore};

/// OAuth 2.0 authorization endpoint
///
/// Entry point of the authorization code flow. Validates the request and
/// serves the login form; this step is purely a gate plus UI and carries no
/// state of its own.
///
/// # URL
///
/// `GET /auth`
///
/// # Query Parameters
///
/// - `response_type`: must be `code`
/// - `client_id`: must name a registered client
/// - `state`: opaque client value, echoed on the redirect
/// - `redirect_uri`: where the authorization code will be sent
#[get("/auth?<response_type>&<client_id>&<state>&<redirect_uri>")]
pub fn authorize(
    response_type: Option<String>,
    client_id: Option<String>,
    state: Option<String>,
    redirect_uri: Option<String>,
    oauth: &State<OAuthState>,
) -> Result<RawHtml<String>, ApiError> {
    if response_type.as_deref() != Some("code") {
        return Err(ApiError::InvalidRequest(
            "response_type must be \"code\"".to_string(),
        ));
    }

    let client_id = match client_id {
        Some(id) if oauth.client(&id).is_some() => id,
        _ => return Err(ApiError::InvalidRequest("invalid client_id".to_string())),
    };

    let (state, redirect_uri) = match (state, redirect_uri) {
        (Some(state), Some(redirect_uri)) => (state, redirect_uri),
        _ => {
            return Err(ApiError::InvalidRequest(
                "state and redirect_uri are required".to_string(),
            ))
        }
    };

    Ok(RawHtml(login_page_html(&client_id, &state, &redirect_uri)))
}

/// Credentials posted by the login page
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub state: String,
    pub redirect_uri: String,
    pub client_id: String,
}

/// Successful login response; the caller performs the browser redirect
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(rename = "redirectUrl")]
    pub redirect_url: String,
}

/// Login handler
///
/// Authenticates the end user and issues a single-use authorization code
/// bound to the requesting client and redirect target. One authorization
/// grant is created per successful login; none on failure. The grant is in
/// the ledger before the redirect URL leaves this function.
///
/// # URL
///
/// `POST /auth/login`
#[post("/auth/login", format = "json", data = "<body>")]
pub fn login(
    body: Json<LoginRequest>,
    oauth: &State<OAuthState>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let body = body.into_inner();

    if oauth.client(&body.client_id).is_none() {
        return Err(ApiError::UnauthorizedClient);
    }

    let user = store
        .find_user_by_email(&body.email)?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let mut redirect_url =
        Url::parse(&body.redirect_uri).map_err(|_| {
            ApiError::InvalidRequest("redirect_uri is not a valid URL".to_string())
        })?;

    let code = oauth.issuer.issue_authorization_code();
    let now = Utc::now();
    oauth.auth_codes.put(
        code.clone(),
        AuthorizationGrant {
            user_id: user.id,
            email: user.email.clone(),
            client_id: body.client_id,
            redirect_uri: body.redirect_uri.clone(),
            created_at: now,
            expires_at: now + oauth.auth_code_ttl,
        },
    );
    debug!("Issued authorization code for user {}", user.id);

    redirect_url
        .query_pairs_mut()
        .append_pair("code", &code)
        .append_pair("state", &body.state);

    Ok(Json(LoginResponse {
        success: true,
        redirect_url: redirect_url.to_string(),
    }))
}

/// Token exchange request body
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub code: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: String,
    pub client_secret: String,
}

/// Standard OAuth 2.0 token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// OAuth 2.0 token endpoint
///
/// Exchanges an authorization code or a refresh token for a fresh
/// access/refresh pair. Client authentication is unconditional and precedes
/// grant-type dispatch. Every successful exchange rotates the refresh
/// token: the presented grant is consumed atomically, so a replay of the
/// same code or refresh token fails even under concurrent attempts.
///
/// # URL
///
/// `POST /token`
///
/// # Returns
///
/// - On success: `{access_token, refresh_token, token_type, expires_in}`
/// - On error: 401 `invalid_client`, 400 `invalid_grant` /
///   `unsupported_grant_type`
#[post("/token", format = "json", data = "<body>")]
pub fn token(
    body: Json<TokenRequest>,
    oauth: &State<OAuthState>,
) -> Result<Json<TokenResponse>, ApiError> {
    let body = body.into_inner();

    if !oauth.authenticate_client(&body.client_id, &body.client_secret) {
        return Err(ApiError::InvalidClient);
    }

    let (user_id, email) = match body.grant_type.as_str() {
        "authorization_code" => {
            let code = body
                .code
                .ok_or_else(|| ApiError::InvalidRequest("code is required".to_string()))?;
            let grant = oauth
                .auth_codes
                .take_if_valid(&code)
                .ok_or_else(|| ApiError::InvalidGrant("invalid or expired code".to_string()))?;
            if grant.client_id != body.client_id {
                return Err(ApiError::InvalidGrant(
                    "code was issued to another client".to_string(),
                ));
            }
            debug!("Authorization code redeemed for user {}", grant.user_id);
            (grant.user_id, grant.email)
        }
        "refresh_token" => {
            let refresh_token = body.refresh_token.ok_or_else(|| {
                ApiError::InvalidRequest("refresh_token is required".to_string())
            })?;
            let grant = oauth.refresh_grants.take_if_valid(&refresh_token).ok_or_else(
                || ApiError::InvalidGrant("invalid or expired refresh token".to_string()),
            )?;
            debug!("Refresh token rotated for user {}", grant.user_id);
            (grant.user_id, grant.email)
        }
        other => return Err(ApiError::UnsupportedGrantType(other.to_string())),
    };

    let access_token = oauth
        .issuer
        .issue_access_token(user_id, &email)
        .map_err(|_| ApiError::ServerError)?;

    let refresh_token = oauth.issuer.issue_refresh_token();
    let now = Utc::now();
    oauth.refresh_grants.put(
        refresh_token.clone(),
        RefreshGrant {
            user_id,
            email,
            created_at: now,
            expires_at: now + oauth.refresh_token_ttl,
        },
    );

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: oauth.issuer.access_token_ttl_seconds(),
    }))
}

/// Endpoint URLs published for skill configuration
#[derive(Debug, Serialize, JsonSchema)]
pub struct OAuthEndpoints {
    pub authorization: String,
    pub token: String,
}

/// Discovery response for `GET /oauth/info`
#[derive(Debug, Serialize, JsonSchema)]
pub struct OAuthInfoResponse {
    pub message: String,
    pub endpoints: OAuthEndpoints,
    pub client_id: String,
    pub note: String,
}

/// # OAuth configuration info
///
/// Exposes the absolute authorization and token endpoint URLs plus the
/// registered client id, for pasting into the skill console.
#[openapi(tag = "OAuth")]
#[get("/oauth/info")]
pub fn oauth_info(conn: ConnectionInfo, oauth: &State<OAuthState>) -> Json<OAuthInfoResponse> {
    Json(OAuthInfoResponse {
        message: "OAuth 2.0 configured for voice assistant account linking".to_string(),
        endpoints: OAuthEndpoints {
            authorization: format!("{}/auth", conn.base_url),
            token: format!("{}/token", conn.base_url),
        },
        client_id: oauth.default_client().client_id.clone(),
        note: "Configure these endpoints in the skill developer console".to_string(),
    })
}
