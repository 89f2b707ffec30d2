// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! User endpoints: registration, app login, account linking

use std::sync::Arc;

use rocket::http::Status;
use rocket::post;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;

use crate::oauth::error::ApiError;
use crate::store::{hash_password, verify_password, DataStore, NewUser, User};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(rename = "isMedicado", default)]
    pub is_medicado: bool,
    #[serde(rename = "isAuxiliar", default)]
    pub is_auxiliar: bool,
}

/// Create a user. The password is stored as a salted sha512-crypt hash.
#[post("/usersCreate", format = "json", data = "<body>")]
pub fn users_create(
    body: Json<CreateUserRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<(Status, Json<User>), ApiError> {
    let body = body.into_inner();
    let password = hash_password(&body.password).map_err(|_| ApiError::ServerError)?;
    let user = store.create_user(NewUser {
        email: body.email,
        name: body.name,
        password,
        is_medicado: body.is_medicado,
        is_auxiliar: body.is_auxiliar,
    })?;
    Ok((Status::Created, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct UserLoginRequest {
    pub email: String,
    pub password: String,
}

/// App login: resolve by email, verify the password hash, return the
/// profile
#[post("/usersLogin", format = "json", data = "<body>")]
pub fn users_login(
    body: Json<UserLoginRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<User>, ApiError> {
    let body = body.into_inner();
    let user = store
        .find_user_by_email(&body.email)?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password) {
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct LinkUsersRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "linkedId")]
    pub linked_id: i64,
}

/// Pair two accounts (medicated user and caretaker)
#[post("/usersLink", format = "json", data = "<body>")]
pub fn users_link(
    body: Json<LinkUsersRequest>,
    store: &State<Arc<dyn DataStore>>,
) -> Result<Json<User>, ApiError> {
    let body = body.into_inner();
    let user = store.link_users(body.user_id, body.linked_id)?;
    Ok(Json(user))
}
