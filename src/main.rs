// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the Tomora reminder API server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rocket::{
    config::LogLevel,
    data::{Limits, ToByteUnit},
};

use tomora_api::config::Config;
use tomora_api::server::build_rocket;
use tomora_api::store::{DataStore, MemoryStore};

/// Medication reminder backend with OAuth 2.0 account linking
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Web server port, overrides the configuration file
    #[arg(short, long)]
    port: Option<u16>,

    /// Web server bind address, overrides the configuration file
    #[arg(long)]
    address: Option<String>,

    /// Access-token signing secret, overrides the configuration file
    #[arg(long)]
    jwt_secret: Option<String>,
}

#[rocket::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = Config::from_file(&args.config)?;
    config.apply_env();
    config.apply_args(args.port, args.address, args.jwt_secret);

    log::info!(
        "Starting {} on {}:{}",
        config.server.name,
        config.server.address,
        config.server.port
    );

    let figment = rocket::Config::figment()
        .merge((
            "ident",
            format!("{}/{}", config.server.name, env!("CARGO_PKG_VERSION")),
        ))
        .merge(("limits", Limits::new().limit("json", 2.mebibytes())))
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port))
        .merge(("log_level", LogLevel::Normal));

    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let rocket = build_rocket(figment, config, store).await;
    rocket.launch().await?;

    Ok(())
}
