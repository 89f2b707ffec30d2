// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! API error taxonomy
//!
//! Every failure a handler can produce maps to one stable error code and
//! HTTP status. Responses carry the standard OAuth error shape
//! `{"error": "...", "error_description": "..."}` so clients can branch on
//! `error` without parsing prose.

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::json::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// A terminal per-request failure. Nothing here is retried server-side.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Malformed or missing request parameters
    #[error("{0}")]
    InvalidRequest(String),

    /// Client id/secret pair did not match a registered client
    #[error("client authentication failed")]
    InvalidClient,

    /// Client id presented at login is not registered
    #[error("client is not authorized to request authorization codes")]
    UnauthorizedClient,

    /// End-user email or password did not match
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// Expired, unknown, or already-consumed code or refresh token
    #[error("{0}")]
    InvalidGrant(String),

    /// A grant_type other than authorization_code or refresh_token
    #[error("unsupported grant_type '{0}'")]
    UnsupportedGrantType(String),

    /// No bearer token on a protected request
    #[error("no bearer token provided")]
    MissingToken,

    /// The access token signature is valid but the token is past expiry
    #[error("access token has expired")]
    TokenExpired,

    /// The access token is malformed or carries a bad signature
    #[error("access token is invalid")]
    InvalidToken,

    /// The token subject no longer resolves to an account
    #[error("user no longer exists")]
    UserNotFound,

    /// The referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// The data store could not serve the request
    #[error("data store unavailable")]
    StoreUnavailable,

    /// Unexpected internal failure
    #[error("error while processing the request")]
    ServerError,
}

/// Wire shape of an error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub error_description: String,
}

impl ApiError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::InvalidClient => "invalid_client",
            ApiError::UnauthorizedClient => "unauthorized_client",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::InvalidGrant(_) => "invalid_grant",
            ApiError::UnsupportedGrantType(_) => "unsupported_grant_type",
            ApiError::MissingToken => "missing_token",
            ApiError::TokenExpired => "token_expired",
            ApiError::InvalidToken => "invalid_token",
            ApiError::UserNotFound => "user_not_found",
            ApiError::NotFound(_) => "not_found",
            ApiError::StoreUnavailable => "store_unavailable",
            ApiError::ServerError => "server_error",
        }
    }

    /// HTTP status mandated for this failure
    pub fn status(&self) -> Status {
        match self {
            ApiError::InvalidRequest(_)
            | ApiError::InvalidGrant(_)
            | ApiError::UnsupportedGrantType(_) => Status::BadRequest,
            ApiError::InvalidClient
            | ApiError::UnauthorizedClient
            | ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::TokenExpired
            | ApiError::InvalidToken
            | ApiError::UserNotFound => Status::Unauthorized,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::StoreUnavailable | ApiError::ServerError => Status::InternalServerError,
        }
    }

    /// Response body for this failure
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code(),
            error_description: self.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("record not found".to_string()),
            StoreError::EmailTaken => {
                ApiError::InvalidRequest("email already registered".to_string())
            }
            StoreError::Unavailable => ApiError::StoreUnavailable,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = self.status();
        let mut response = Json(self.body()).respond_to(request)?;
        response.set_status(status);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        assert_eq!(ApiError::MissingToken.code(), "missing_token");
        assert_eq!(ApiError::MissingToken.status(), Status::Unauthorized);
        assert_eq!(
            ApiError::InvalidGrant("consumed".to_string()).status(),
            Status::BadRequest
        );
        assert_eq!(ApiError::StoreUnavailable.status(), Status::InternalServerError);
        assert_ne!(ApiError::TokenExpired.code(), ApiError::InvalidToken.code());
    }
}
