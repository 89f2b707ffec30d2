// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Bearer guard tests: expired tokens are distinguished from invalid ones,
// and tokens of deleted accounts stop working.

use std::sync::Arc;

use chrono::Duration;
use rocket::config::LogLevel;
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

use tomora_api::config::Config;
use tomora_api::oauth::TokenIssuer;
use tomora_api::server::build_rocket;
use tomora_api::store::{DataStore, MemoryStore};

fn get_figment() -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("port", 0))
        .merge(("address", "127.0.0.1"))
        .merge(("log_level", LogLevel::Off))
}

async fn test_client() -> Client {
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let rocket = build_rocket(get_figment(), Config::default(), store).await;
    Client::tracked(rocket).await.expect("valid rocket instance")
}

async fn create_user(client: &Client, email: &str) -> i64 {
    let response = client
        .post("/usersCreate")
        .header(ContentType::JSON)
        .body(
            json!({
                "email": email,
                "name": "Alice",
                "password": "hunter22",
                "isMedicado": true,
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let body: Value =
        serde_json::from_str(&response.into_string().await.expect("body")).expect("valid JSON");
    body["id"].as_i64().expect("user id")
}

async fn protected_error(client: &Client, authorization: Option<String>) -> (Status, String) {
    let mut request = client.get("/alexa/reminders");
    if let Some(value) = authorization {
        request = request.header(Header::new("Authorization", value));
    }
    let response = request.dispatch().await;
    let status = response.status();
    let body: Value =
        serde_json::from_str(&response.into_string().await.expect("body")).expect("valid JSON");
    (status, body["error"].as_str().expect("error").to_string())
}

/// Issuer producing tokens the server will accept (same secret and issuer
/// name, custom lifetime)
fn issuer_with_ttl(seconds: i64) -> TokenIssuer {
    let config = Config::default();
    TokenIssuer::new(
        config.oauth.jwt_secret.as_bytes(),
        Duration::seconds(seconds),
    )
}

#[rocket::async_test]
async fn test_missing_or_malformed_header() {
    let client = test_client().await;

    let (status, code) = protected_error(&client, None).await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(code, "missing_token");

    let (status, code) = protected_error(&client, Some("Basic abc123".to_string())).await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(code, "missing_token");

    let (status, code) = protected_error(&client, Some("Bearer ".to_string())).await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(code, "missing_token");
}

#[rocket::async_test]
async fn test_expired_token_distinguished_from_invalid() {
    let client = test_client().await;
    let user_id = create_user(&client, "alice@example.com").await;

    // Expired but correctly signed
    let expired = issuer_with_ttl(-600)
        .issue_access_token(user_id, "alice@example.com")
        .unwrap();
    let (status, code) = protected_error(&client, Some(format!("Bearer {}", expired))).await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(code, "token_expired");

    // Signed with the wrong secret
    let forged = TokenIssuer::new(b"not-the-server-secret", Duration::seconds(600))
        .issue_access_token(user_id, "alice@example.com")
        .unwrap();
    let (status, code) = protected_error(&client, Some(format!("Bearer {}", forged))).await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(code, "invalid_token");

    // Not a JWT at all
    let (status, code) =
        protected_error(&client, Some("Bearer not.a.token".to_string())).await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(code, "invalid_token");
}

#[rocket::async_test]
async fn test_token_for_unknown_user_is_rejected() {
    let client = test_client().await;

    // Valid token whose subject never existed in the store
    let token = issuer_with_ttl(600)
        .issue_access_token(9999, "ghost@example.com")
        .unwrap();
    let (status, code) = protected_error(&client, Some(format!("Bearer {}", token))).await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(code, "user_not_found");
}

#[rocket::async_test]
async fn test_valid_token_passes() {
    let client = test_client().await;
    let user_id = create_user(&client, "alice@example.com").await;

    let token = issuer_with_ttl(600)
        .issue_access_token(user_id, "alice@example.com")
        .unwrap();
    let response = client
        .get("/alexa/reminders")
        .header(Header::new("Authorization", format!("Bearer {}", token)))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value =
        serde_json::from_str(&response.into_string().await.expect("body")).expect("valid JSON");
    assert_eq!(body["userId"].as_i64(), Some(user_id));
    assert_eq!(body["reminders"].as_array().map(Vec::len), Some(0));
}
