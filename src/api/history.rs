// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Medication intake history endpoints

use std::sync::Arc;

use rocket::http::Status;
use rocket::post;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;

use crate::oauth::error::ApiError;
use crate::store::{DataStore, History, NewHistory};

#[derive(Debug, Deserialize)]
pub struct CreateHistoryRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "reminderId")]
    pub reminder_id: i64,
    pub name: String,
    pub hour: String,
    pub taken: bool,
}

/// Record a dose as taken or skipped; the store stamps `createdAt`
#[post("/historyCreate", format = "json", data = "<body>")]
pub fn history_create(
    body: Json<CreateHistoryRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<(Status, Json<History>), ApiError> {
    let body = body.into_inner();
    let record = store.create_history(NewHistory {
        user_id: body.user_id,
        reminder_id: body.reminder_id,
        name: body.name,
        hour: body.hour,
        taken: body.taken,
    })?;
    Ok((Status::Created, Json(record)))
}

#[derive(Debug, Deserialize)]
pub struct SearchHistoryRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// A user's history, newest first
#[post("/historySearch", format = "json", data = "<body>")]
pub fn history_search(
    body: Json<SearchHistoryRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<Vec<History>>, ApiError> {
    let records = store.history_for_user(body.user_id)?;
    Ok(Json(records))
}
