// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Bearer-protected endpoints for the voice assistant skill
//!
//! Every route here takes a [`BearerUser`] guard, so only requests carrying
//! a valid access token reach the handlers, and each caller only ever sees
//! their own reminders.

use std::sync::Arc;

use rocket::{get, post};
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::oauth::error::ApiError;
use crate::oauth::guard::BearerUser;
use crate::store::{DataStore, NewReminder};

/// Reminders returned to the skill are limited to the next few entries
const SKILL_REMINDER_LIMIT: usize = 10;

/// Reminder projection consumed by the skill
#[derive(Debug, Serialize)]
pub struct SkillReminder {
    pub id: i64,
    pub name: String,
    pub hour: String,
    pub recurring: String,
}

#[derive(Debug, Serialize)]
pub struct SkillRemindersResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub reminders: Vec<SkillReminder>,
}

/// List the caller's active reminders, soonest first
#[get("/alexa/reminders")]
pub fn alexa_reminders_list(
    user: BearerUser,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<SkillRemindersResponse>, ApiError> {
    let reminders = store.active_reminders(user.id, SKILL_REMINDER_LIMIT)?;

    Ok(Json(SkillRemindersResponse {
        user_id: user.id,
        user_name: user.name,
        reminders: reminders
            .into_iter()
            .map(|r| SkillReminder {
                id: r.id,
                name: r.name,
                hour: r.hour,
                recurring: r.recurring,
            })
            .collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SkillCreateReminderRequest {
    pub name: String,
    pub hour: String,
    pub recurring: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SkillCreateReminderResponse {
    pub success: bool,
    pub reminder: SkillReminder,
}

/// Create a reminder for the caller on behalf of the skill
#[post("/alexa/reminders", format = "json", data = "<body>")]
pub fn alexa_reminders_create(
    user: BearerUser,
    body: Json<SkillCreateReminderRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<SkillCreateReminderResponse>, ApiError> {
    let body = body.into_inner();
    let reminder = store.create_reminder(NewReminder {
        user_id: user.id,
        name: body.name,
        dosage: None,
        desc: None,
        hour: body.hour,
        recurring: body.recurring.unwrap_or_else(|| "none".to_string()),
        active: true,
        source: "alexa".to_string(),
    })?;

    Ok(Json(SkillCreateReminderResponse {
        success: true,
        reminder: SkillReminder {
            id: reminder.id,
            name: reminder.name,
            hour: reminder.hour,
            recurring: reminder.recurring,
        },
    }))
}
