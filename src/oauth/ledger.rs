// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Single-use grant ledgers
//!
//! Authorization codes and refresh tokens are both transient keys mapping to
//! a pending grant, and both must be redeemable at most once. The
//! [`Ledger`] trait is the seam between the flow and the storage: the
//! in-process [`MemoryLedger`] is the reference implementation, and a
//! TTL-capable external cache can implement the same trait to survive
//! restarts.
//!
//! `take_if_valid` is one atomic read-and-delete. Two concurrent exchange
//! attempts on the same key race on a single critical section, so exactly
//! one of them observes the grant.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// A grant with an absolute expiry
pub trait ExpiringGrant {
    fn expires_at(&self) -> DateTime<Utc>;
}

/// Pending grant behind an authorization code
#[derive(Debug, Clone)]
pub struct AuthorizationGrant {
    pub user_id: i64,
    pub email: String,
    /// Client the code was issued to; must match at exchange time
    pub client_id: String,
    /// Redirect target echoed from the authorization request
    pub redirect_uri: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ExpiringGrant for AuthorizationGrant {
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Renewable grant behind a refresh token
#[derive(Debug, Clone)]
pub struct RefreshGrant {
    pub user_id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ExpiringGrant for RefreshGrant {
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Key → grant store with single-use take semantics
pub trait Ledger<G: ExpiringGrant>: Send + Sync {
    /// Store a grant under a freshly generated key
    fn put(&self, key: String, grant: G);

    /// Atomically remove and return the grant for `key`.
    ///
    /// Returns `None` when the key is unknown or the grant is past expiry;
    /// an expired entry is deleted as part of the same operation.
    fn take_if_valid(&self, key: &str) -> Option<G>;

    /// Drop a grant without redeeming it
    fn invalidate(&self, key: &str);
}

/// Process-lifetime ledger backed by a mutex-protected map
pub struct MemoryLedger<G> {
    entries: Mutex<HashMap<String, G>>,
}

impl<G> MemoryLedger<G> {
    pub fn new() -> Self {
        MemoryLedger {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<G> Default for MemoryLedger<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: ExpiringGrant + Send> Ledger<G> for MemoryLedger<G> {
    fn put(&self, key: String, grant: G) {
        self.entries.lock().unwrap().insert(key, grant);
    }

    fn take_if_valid(&self, key: &str) -> Option<G> {
        // Removal and expiry check happen under one lock; a concurrent
        // taker of the same key sees an empty slot.
        let mut entries = self.entries.lock().unwrap();
        let grant = entries.remove(key)?;
        if Utc::now() > grant.expires_at() {
            return None;
        }
        Some(grant)
    }

    fn invalidate(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}
