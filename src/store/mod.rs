// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Data store abstraction
//!
//! The CRUD layer and the OAuth flow both talk to the store through the
//! [`DataStore`] trait so the backing implementation can be swapped without
//! touching the handlers. The in-process [`MemoryStore`] is the reference
//! implementation; a relational backend implements the same trait.
//!
//! Every operation may fail with [`StoreError::Unavailable`], which the API
//! layer surfaces as a 500 `store_unavailable` response without retrying.

pub mod memory;
pub mod models;

use thiserror::Error;

pub use memory::MemoryStore;
pub use models::{
    History, NewHistory, NewReminder, NewUser, Reminder, ReminderPatch, User,
};

/// Errors reported by [`DataStore`] implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced record does not exist
    #[error("record not found")]
    NotFound,

    /// The email address is already registered to another user
    #[error("email already registered")]
    EmailTaken,

    /// The backing store could not be reached or is corrupted
    #[error("data store unavailable")]
    Unavailable,
}

/// Synchronous lookups against the user, reminder, and history tables.
///
/// Implementations must be safe to share across request handlers.
pub trait DataStore: Send + Sync {
    fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    /// Link one account to another (auxiliary/medicated pairing)
    fn link_users(&self, user_id: i64, linked_id: i64) -> Result<User, StoreError>;

    fn create_reminder(&self, new: NewReminder) -> Result<Reminder, StoreError>;
    /// All reminders of a user, newest first
    fn reminders_for_user(&self, user_id: i64) -> Result<Vec<Reminder>, StoreError>;
    /// Active reminders of a user sorted by hour, capped at `limit`
    fn active_reminders(&self, user_id: i64, limit: usize) -> Result<Vec<Reminder>, StoreError>;
    fn update_reminder(&self, id: i64, patch: ReminderPatch) -> Result<Reminder, StoreError>;
    fn delete_reminder(&self, id: i64) -> Result<(), StoreError>;

    fn create_history(&self, new: NewHistory) -> Result<History, StoreError>;
    /// History records of a user, newest first
    fn history_for_user(&self, user_id: i64) -> Result<Vec<History>, StoreError>;
}

/// Hash a password with salted sha512-crypt.
///
/// The stored value is in the Unix `$6$salt$hash` format so it can be
/// verified with [`verify_password`].
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    pwhash::sha512_crypt::hash(password)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))
}

/// Verify a password against a stored `$algo$salt$hash` value.
///
/// The comparison inside `pwhash` is constant-time; a malformed stored hash
/// verifies as false rather than erroring.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    pwhash::unix::verify(password, stored_hash)
}
