// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! OAuth 2.0 authorization-code flow
//!
//! This module implements the account-linking subsystem used by the voice
//! assistant skill:
//!
//! - [`handlers`]: the `/auth`, `/auth/login`, `/token` and `/oauth/info`
//!   endpoints
//! - [`ledger`]: single-use stores for authorization codes and refresh
//!   tokens
//! - [`issuer`]: JWT access-token minting and verification
//! - [`guard`]: the request guard protecting resource endpoints
//!
//! Authorization codes live for five minutes and are consumed exactly once.
//! Refresh tokens rotate on every exchange. Access tokens are
//! self-contained HS256 JWTs and are never stored server-side.

pub mod error;
pub mod forms;
pub mod guard;
pub mod handlers;
pub mod issuer;
pub mod ledger;
pub mod state;

pub use error::ApiError;
pub use guard::BearerUser;
pub use issuer::{AccessClaims, TokenError, TokenIssuer};
pub use ledger::{AuthorizationGrant, Ledger, MemoryLedger, RefreshGrant};
pub use state::OAuthState;
