// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Token endpoint tests: client authentication, code single-use (including
// under concurrent redemption), expiry, and refresh token rotation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rocket::config::LogLevel;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use url::Url;

use tomora_api::config::{Config, RegisteredClient};
use tomora_api::oauth::{AuthorizationGrant, Ledger, OAuthState};
use tomora_api::server::build_rocket;
use tomora_api::store::{DataStore, MemoryStore};

const CLIENT_ID: &str = "tomora-skill-client-2024";
const CLIENT_SECRET: &str = "x9kPqW7mZ3tR8vY2nJ5bL6cF4hT1rQ8w";
const REDIRECT_URI: &str = "https://layla.amazon.com/api/skill/link/M2ABCDE";

fn get_figment() -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("port", 0))
        .merge(("address", "127.0.0.1"))
        .merge(("log_level", LogLevel::Off))
}

async fn test_client_with(config: Config) -> Client {
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let rocket = build_rocket(get_figment(), config, store).await;
    Client::tracked(rocket).await.expect("valid rocket instance")
}

async fn test_client() -> Client {
    test_client_with(Config::default()).await
}

/// Register a user and run the login step, returning a fresh code
async fn obtain_code(client: &Client, email: &str) -> String {
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

    let response = client
        .post("/auth/login")
        .header(ContentType::JSON)
        .body(
            json!({
                "email": email,
                "password": "hunter22",
                "state": "s",
                "redirect_uri": REDIRECT_URI,
                "client_id": CLIENT_ID,
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value =
        serde_json::from_str(&response.into_string().await.expect("body")).expect("valid JSON");

    let redirect_url = Url::parse(body["redirectUrl"].as_str().unwrap()).expect("valid URL");
    let params: HashMap<String, String> = redirect_url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    params.get("code").expect("code").clone()
}

fn exchange_body(code: &str) -> String {
    json!({
        "grant_type": "authorization_code",
        "code": code,
        "client_id": CLIENT_ID,
        "client_secret": CLIENT_SECRET,
    })
    .to_string()
}

async fn error_code(response: rocket::local::asynchronous::LocalResponse<'_>) -> String {
    let body: Value =
        serde_json::from_str(&response.into_string().await.expect("body")).expect("valid JSON");
    body["error"].as_str().expect("error code").to_string()
}

#[rocket::async_test]
async fn test_client_authentication_precedes_dispatch() {
    let client = test_client().await;

    // Wrong secret fails even with a nonsense grant type
    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(
            json!({
                "grant_type": "password",
                "client_id": CLIENT_ID,
                "client_secret": "wrong",
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    assert_eq!(error_code(response).await, "invalid_client");

    // Correct credentials with an unknown grant type
    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(
            json!({
                "grant_type": "password",
                "client_id": CLIENT_ID,
                "client_secret": CLIENT_SECRET,
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(error_code(response).await, "unsupported_grant_type");
}

#[rocket::async_test]
async fn test_code_is_single_use() {
    let client = test_client().await;
    let code = obtain_code(&client, "alice@example.com").await;

    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(exchange_body(&code))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // Replaying the same code must fail
    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(exchange_body(&code))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(error_code(response).await, "invalid_grant");
}

#[rocket::async_test]
async fn test_concurrent_redemption_exactly_one_succeeds() {
    let client = test_client().await;
    let code = obtain_code(&client, "alice@example.com").await;

    let body = exchange_body(&code);
    let dispatches = (0..5).map(|_| {
        client
            .post("/token")
            .header(ContentType::JSON)
            .body(body.clone())
            .dispatch()
    });
    let responses = futures::future::join_all(dispatches).await;

    let mut ok = 0;
    let mut rejected = 0;
    for response in responses {
        let status = response.status();
        if status == Status::Ok {
            ok += 1;
        } else if status == Status::BadRequest {
            assert_eq!(error_code(response).await, "invalid_grant");
            rejected += 1;
        } else {
            panic!("unexpected status {}", status);
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(rejected, 4);
}

#[rocket::async_test]
async fn test_expired_code_is_rejected() {
    let client = test_client().await;

    // Plant an already-expired grant directly in the ledger
    let now = Utc::now();
    let oauth = client
        .rocket()
        .state::<OAuthState>()
        .expect("OAuthState managed");
    oauth.auth_codes.put(
        "stale-code".to_string(),
        AuthorizationGrant {
            user_id: 1,
            email: "alice@example.com".to_string(),
            client_id: CLIENT_ID.to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            created_at: now - Duration::minutes(10),
            expires_at: now - Duration::minutes(5),
        },
    );

    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(exchange_body("stale-code"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(error_code(response).await, "invalid_grant");
}

#[rocket::async_test]
async fn test_code_bound_to_issuing_client() {
    let mut config = Config::default();
    config.oauth.clients.push(RegisteredClient {
        client_id: "second-client".to_string(),
        client_secret: "second-secret-0123456789".to_string(),
    });
    let client = test_client_with(config).await;
    let code = obtain_code(&client, "alice@example.com").await;

    // A different (validly authenticated) client cannot redeem the code
    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(
            json!({
                "grant_type": "authorization_code",
                "code": code,
                "client_id": "second-client",
                "client_secret": "second-secret-0123456789",
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(error_code(response).await, "invalid_grant");
}

#[rocket::async_test]
async fn test_refresh_token_rotation() {
    let client = test_client().await;
    let code = obtain_code(&client, "alice@example.com").await;

    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(exchange_body(&code))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let tokens: Value =
        serde_json::from_str(&response.into_string().await.expect("body")).expect("valid JSON");
    let r1 = tokens["refresh_token"].as_str().unwrap().to_string();

    // Redeem R1: a new pair comes back with a different refresh token
    let refresh_body = |token: &str| {
        json!({
            "grant_type": "refresh_token",
            "refresh_token": token,
            "client_id": CLIENT_ID,
            "client_secret": CLIENT_SECRET,
        })
        .to_string()
    };

    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(refresh_body(&r1))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let tokens: Value =
        serde_json::from_str(&response.into_string().await.expect("body")).expect("valid JSON");
    let r2 = tokens["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(r1, r2);
    assert!(tokens["access_token"].as_str().is_some());

    // R1 was invalidated by the rotation
    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(refresh_body(&r1))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(error_code(response).await, "invalid_grant");

    // R2 is still usable
    let response = client
        .post("/token")
        .header(ContentType::JSON)
        .body(refresh_body(&r2))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

#[rocket::async_test]
async fn test_missing_grant_parameters() {
    let client = test_client().await;

    for grant_type in ["authorization_code", "refresh_token"] {
        let response = client
            .post("/token")
            .header(ContentType::JSON)
            .body(
                json!({
                    "grant_type": grant_type,
                    "client_id": CLIENT_ID,
                    "client_secret": CLIENT_SECRET,
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(error_code(response).await, "invalid_request");
    }
}
