// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Store record types
//!
//! Serialized field names keep the camelCase wire format the mobile app and
//! the skill already consume (`isMedicado`, `linkedId`, ...). The password
//! hash is never serialized.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered end user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,

    /// Salted sha512-crypt hash of the user's password
    #[serde(skip_serializing)]
    pub password: String,

    /// Whether this account belongs to the person taking the medication
    #[serde(rename = "isMedicado")]
    pub is_medicado: bool,

    /// Whether this account belongs to a caretaker
    #[serde(rename = "isAuxiliar")]
    pub is_auxiliar: bool,

    /// Id of the paired account, if any
    #[serde(rename = "linkedId")]
    pub linked_id: Option<i64>,
}

/// Input for [`super::DataStore::create_user`]
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    /// Already-hashed password (see [`super::hash_password`])
    pub password: String,
    pub is_medicado: bool,
    pub is_auxiliar: bool,
}

/// A medication reminder
#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub name: String,
    pub dosage: Option<String>,
    pub desc: Option<String>,
    /// Time of day in `HH:MM`
    pub hour: String,
    /// Recurrence rule, `"none"` when one-shot
    pub recurring: String,
    pub active: bool,
    /// Which surface created the reminder (`"app"` or `"alexa"`)
    pub source: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Input for [`super::DataStore::create_reminder`]
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub user_id: i64,
    pub name: String,
    pub dosage: Option<String>,
    pub desc: Option<String>,
    pub hour: String,
    pub recurring: String,
    pub active: bool,
    pub source: String,
}

/// Partial update for a reminder; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ReminderPatch {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub desc: Option<String>,
    pub hour: Option<String>,
}

impl ReminderPatch {
    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.dosage.is_none() && self.desc.is_none() && self.hour.is_none()
    }
}

/// A medication intake record
#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "reminderId")]
    pub reminder_id: i64,
    pub name: String,
    pub hour: String,
    /// Whether the dose was actually taken
    pub taken: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Input for [`super::DataStore::create_history`]
#[derive(Debug, Clone)]
pub struct NewHistory {
    pub user_id: i64,
    pub reminder_id: i64,
    pub name: String,
    pub hour: String,
    pub taken: bool,
}
