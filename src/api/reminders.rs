// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Reminder endpoints

use std::sync::Arc;

use chrono::NaiveTime;
use rocket::http::Status;
use rocket::post;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;

use super::MessageResponse;
use crate::oauth::error::ApiError;
use crate::store::{DataStore, NewReminder, Reminder, ReminderPatch};

/// Strict `HH:MM` check (two-digit fields, 00-23 hours)
fn is_valid_hour(hour: &str) -> bool {
    hour.len() == 5 && NaiveTime::parse_from_str(hour, "%H:%M").is_ok()
}

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub name: String,
    pub dosage: Option<String>,
    pub desc: Option<String>,
    pub hour: String,
}

#[post("/remindersCreate", format = "json", data = "<body>")]
pub fn reminders_create(
    body: Json<CreateReminderRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<(Status, Json<Reminder>), ApiError> {
    let body = body.into_inner();
    let reminder = store.create_reminder(NewReminder {
        user_id: body.user_id,
        name: body.name,
        dosage: body.dosage,
        desc: body.desc,
        hour: body.hour,
        recurring: "none".to_string(),
        active: true,
        source: "app".to_string(),
    })?;
    Ok((Status::Created, Json(reminder)))
}

#[derive(Debug, Deserialize)]
pub struct SearchRemindersRequest {
    #[serde(rename = "searchId")]
    pub search_id: i64,
}

/// All reminders of a user, newest first
#[post("/remindersSearch", format = "json", data = "<body>")]
pub fn reminders_search(
    body: Json<SearchRemindersRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<Vec<Reminder>>, ApiError> {
    let reminders = store.reminders_for_user(body.search_id)?;
    Ok(Json(reminders))
}

#[derive(Debug, Deserialize)]
pub struct NearestReminderRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
    pub hour: Option<String>,
}

/// The reminder closest to the given time of day.
///
/// Returns the first reminder at or after `hour`; when none is later in the
/// day, wraps around to the earliest one.
#[post("/reminderNearest", format = "json", data = "<body>")]
pub fn reminder_nearest(
    body: Json<NearestReminderRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<Reminder>, ApiError> {
    let body = body.into_inner();
    let user_id = body
        .user_id
        .ok_or_else(|| ApiError::InvalidRequest("userId is required".to_string()))?;
    let hour = match body.hour {
        Some(ref hour) if is_valid_hour(hour) => hour.clone(),
        _ => {
            return Err(ApiError::InvalidRequest(
                "hour must be in HH:MM format".to_string(),
            ))
        }
    };

    let mut reminders = store.reminders_for_user(user_id)?;
    if reminders.is_empty() {
        return Err(ApiError::NotFound("no reminders registered".to_string()));
    }
    reminders.sort_by(|a, b| a.hour.cmp(&b.hour));

    let nearest = reminders
        .iter()
        .find(|r| r.hour >= hour)
        .unwrap_or(&reminders[0])
        .clone();

    Ok(Json(nearest))
}

#[derive(Debug, Deserialize)]
pub struct UpdateReminderRequest {
    pub id: i64,
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub desc: Option<String>,
    pub hour: Option<String>,
}

/// Partial update; at least one field must be provided
#[post("/remindersUpdate", format = "json", data = "<body>")]
pub fn reminders_update(
    body: Json<UpdateReminderRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<Reminder>, ApiError> {
    let body = body.into_inner();
    let patch = ReminderPatch {
        name: body.name,
        dosage: body.dosage,
        desc: body.desc,
        hour: body.hour,
    };
    if patch.is_empty() {
        return Err(ApiError::InvalidRequest(
            "at least one field must be provided".to_string(),
        ));
    }
    let reminder = store.update_reminder(body.id, patch)?;
    Ok(Json(reminder))
}

#[derive(Debug, Deserialize)]
pub struct DeleteReminderRequest {
    pub id: i64,
}

#[post("/remindersDelete", format = "json", data = "<body>")]
pub fn reminders_delete(
    body: Json<DeleteReminderRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<MessageResponse>, ApiError> {
    store.delete_reminder(body.id)?;
    Ok(Json(MessageResponse {
        message: "Reminder deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_validation() {
        assert!(is_valid_hour("08:30"));
        assert!(is_valid_hour("23:59"));
        assert!(!is_valid_hour("8:30"));
        assert!(!is_valid_hour("24:00"));
        assert!(!is_valid_hour("08:60"));
        assert!(!is_valid_hour("0830"));
        assert!(!is_valid_hour("morning"));
    }
}
