// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server assembly
//!
//! Builds the Rocket instance: routes, CORS fairing, error catchers, and
//! managed state (configuration, OAuth state, data store).

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;

use rocket::catch;
use rocket::catchers;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::uri::Host;
use rocket::http::{Header, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{options, routes, Build, Response, Rocket};
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use rocket_okapi::{openapi, openapi_get_routes, rapidoc::*, settings::UrlObject};

use crate::api::{alexa, history, reminders, users};
use crate::config::Config;
use crate::oauth::error::{ApiError, ErrorBody};
use crate::oauth::handlers::*;
use crate::oauth::state::OAuthState;
use crate::store::DataStore;

/// Fairing adding permissive CORS headers to every response
pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/// # Answers to OPTIONS requests
#[openapi(tag = "Cors")]
#[options("/<_path..>")]
async fn options(_path: PathBuf) -> Result<(), std::io::Error> {
    Ok(())
}

/// Request guard for accessing connection information
///
/// Provides the host, scheme, and base URL of the incoming request, used to
/// derive the absolute endpoint URLs published by the discovery endpoint.
/// NOTE: if the host is not set in the request, the `HOST` environment
/// variable is consulted, falling back to `localhost:3000`.
pub struct ConnectionInfo {
    pub host_port: String,
    pub ip: IpAddr,
    pub scheme: String,
    pub base_url: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ConnectionInfo {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let default_host_string = env::var("HOST").unwrap_or_else(|_| "localhost:3000".to_string());
        let default_host = Host::parse(default_host_string.as_str()).expect("valid host");
        let host_port = req.host().unwrap_or(&default_host);
        let port = host_port.port().unwrap_or(80);
        let host: &str = host_port.domain().as_str();
        let ip = req
            .client_ip()
            .unwrap_or(Ipv4Addr::new(127, 0, 0, 1).into());
        let scheme = if req.rocket().config().tls_enabled() {
            "https".to_string()
        } else {
            "http".to_string()
        };
        let base_url = if port == 80 || port == 443 {
            format!("{}://{}", scheme, host)
        } else {
            format!("{}://{}:{}", scheme, host, port)
        };
        Outcome::Success(ConnectionInfo {
            host_port: host_port.to_string(),
            ip,
            scheme,
            base_url,
        })
    }
}

impl<'r> OpenApiFromRequest<'r> for ConnectionInfo {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

/// Guard failures cache their [`ApiError`] on the request; emit it so the
/// client sees the precise code (`missing_token`, `token_expired`, ...)
#[catch(401)]
fn unauthorized(request: &Request<'_>) -> Json<ErrorBody> {
    let error: &ApiError = request.local_cache(|| ApiError::MissingToken);
    Json(error.body())
}

#[catch(404)]
fn not_found() -> Json<ErrorBody> {
    Json(ApiError::NotFound("resource not found".to_string()).body())
}

/// Malformed JSON bodies surface as `invalid_request`
#[catch(422)]
fn unprocessable() -> status::Custom<Json<ErrorBody>> {
    status::Custom(
        Status::BadRequest,
        Json(ApiError::InvalidRequest("malformed request body".to_string()).body()),
    )
}

#[catch(500)]
fn internal_error(request: &Request<'_>) -> Json<ErrorBody> {
    let error: &ApiError = request.local_cache(|| ApiError::ServerError);
    Json(error.body())
}

/// Build the Rocket instance with all routes and managed state
pub async fn build_rocket(
    figment: Figment,
    config: Config,
    store: Arc<dyn DataStore>,
) -> Rocket<Build> {
    // Create OAuth2 state with in-memory ledgers
    let oauth_state = OAuthState::in_memory(&config.oauth);

    rocket::custom(figment)
        .attach(CORS)
        .mount("/", openapi_get_routes![oauth_info, options])
        .mount("/", routes![authorize, login, token])
        .mount(
            "/",
            routes![
                users::users_create,
                users::users_login,
                users::users_link,
                reminders::reminders_create,
                reminders::reminders_search,
                reminders::reminder_nearest,
                reminders::reminders_update,
                reminders::reminders_delete,
                history::history_create,
                history::history_search,
                alexa::alexa_reminders_list,
                alexa::alexa_reminders_create,
            ],
        )
        .mount(
            "/api/doc",
            make_rapidoc(&RapiDocConfig {
                title: Some("Tomora API Doc".to_owned()),
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("General", "../../openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
        .register(
            "/",
            catchers![unauthorized, not_found, unprocessable, internal_error],
        )
        .manage(config)
        .manage(oauth_state)
        .manage(store)
}
