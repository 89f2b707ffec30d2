// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! CRUD endpoints over users, reminders, and history
//!
//! Thin pass-throughs to the data store; the route paths keep the wire
//! contract the mobile app already uses. The `alexa` module holds the
//! bearer-protected endpoints consumed by the voice assistant skill.

pub mod alexa;
pub mod history;
pub mod reminders;
pub mod users;

use serde::Serialize;

/// Simple confirmation body for delete-style operations
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
