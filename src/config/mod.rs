// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the Tomora API
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings for the reminder backend. The configuration is
//! backed by a YAML file and validated against a JSON schema for robustness.
//!
//! ## Configuration Structure
//!
//! The application's configuration is organized as a nested structure with sections:
//! - `server`: Settings for the web server (bind address, port, identity)
//! - `oauth`: Settings for the OAuth 2.0 authorization flow (registered
//!   clients, token signing secret, artifact lifetimes)
//!
//! ## Usage
//!
//! ```no_run
//! use tomora_api::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply environment and command line overrides if needed
//! config.apply_env();
//! config.apply_args(
//!     Some(8081),                     // Web port
//!     Some("0.0.0.0".to_string()),    // Web address
//!     Some("new_secret".to_string()), // JWT signing secret
//! );
//!
//! // Access configuration values
//! println!("Server port: {}", config.server.port);
//! ```

pub mod oauth;
pub mod server;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

// Re-export all types for public API
pub use oauth::{OAuthConfig, RegisteredClient};
pub use server::ServerConfig;

/// Root configuration structure for the Tomora API.
///
/// This structure serves as the main container for all configuration
/// sections of the application. The configuration is designed to be
/// deserialized from and serialized to YAML using the serde framework, and
/// is validated against a JSON schema to ensure all fields have valid
/// values.
///
/// # Default Values
///
/// Each section uses default values when not explicitly specified in the
/// configuration file, allowing for minimal configuration when custom
/// settings are not required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Settings for the web server component.
    ///
    /// These settings control how the API server behaves, including network
    /// binding and the server identity string.
    #[serde(default)]
    pub server: ServerConfig,

    /// Settings for the OAuth 2.0 authorization flow.
    ///
    /// This section holds the registered clients that may request delegated
    /// access, the access-token signing secret, and the lifetimes of the
    /// time-bounded artifacts (authorization codes, access tokens, refresh
    /// tokens). If not specified, default values will be used.
    #[serde(default)]
    pub oauth: OAuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            oauth: OAuthConfig::default(),
        }
    }
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("Creating sample configuration file at {:?}", path);
        let sample_path = path.with_extension("sample.yaml");

        // Create parent directories if they don't exist
        if let Some(parent) = sample_path.parent() {
            if !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                std::fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        let sample_config = Self::default();
        sample_config
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// If the file does not exist a default configuration is written there
    /// and returned. The YAML content is validated against the embedded JSON
    /// schema before deserialization; on validation failure a
    /// `*.sample.yaml` file with default values is emitted next to the
    /// original so the user has a valid starting point.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        // First step: convert YAML to a generic Value
        let yaml_value: serde_yml::Value = serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;

        // Convert to JSON Value for validation
        let json_value = serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })?;

        // Load and validate with the schema
        let schema_str = include_str!("../../resources/config.schema.json");
        let schema: serde_json::Value =
            serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

        // Create the validator
        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        // Validate before deserializing to Config
        debug!("Validating {} configuration against schema", path.display());
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            // We generate a config.sample.yaml file with the default values
            // for the user to edit
            Self::create_sample_config(path)?;
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        // Now that YAML has been validated, deserialize to Config
        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = match serde_yml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                match Self::create_sample_config(path) {
                    Ok(_) => debug!("Successfully created sample config"),
                    Err(e) => error!("Failed to create sample config: {}", e),
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        // Perform additional specific validations
        if let Err(err) = utils::validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Secrets are typically not stored in the configuration file on
    /// deployed instances; these variables take precedence when set:
    ///
    /// * `ALEXA_CLIENT_ID` - client id of the first registered client
    /// * `ALEXA_CLIENT_SECRET` - client secret of the first registered client
    /// * `JWT_SECRET` - access-token signing secret
    /// * `PORT` - TCP port for the web server
    pub fn apply_env(&mut self) {
        if let Ok(client_id) = std::env::var("ALEXA_CLIENT_ID") {
            debug!("Overriding client id from environment");
            if let Some(client) = self.oauth.clients.first_mut() {
                client.client_id = client_id;
            }
        }

        if let Ok(client_secret) = std::env::var("ALEXA_CLIENT_SECRET") {
            debug!("Overriding client secret from environment");
            if let Some(client) = self.oauth.clients.first_mut() {
                client.client_secret = client_secret;
            }
        }

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            debug!("Overriding JWT secret from environment");
            self.oauth.jwt_secret = secret;
        }

        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(port) => {
                    debug!("Overriding port from environment: {}", port);
                    self.server.port = port;
                }
                Err(_) => error!("Ignoring non-numeric PORT environment variable"),
            }
        }
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided will override the existing
    /// configuration.
    ///
    /// # Parameters
    ///
    /// * `port` - TCP port for the web server
    /// * `address` - Network address for the web server to bind to
    /// * `jwt_secret` - Optional secret for access-token signing
    pub fn apply_args(
        &mut self,
        port: Option<u16>,
        address: Option<String>,
        jwt_secret: Option<String>,
    ) {
        // Only override if command-line arguments are provided
        if let Some(port) = port {
            debug!("Overriding port from command line: {}", port);
            self.server.port = port;
        }

        if let Some(address) = address {
            debug!("Overriding address from command line: {}", address);
            self.server.address = address;
        }

        if let Some(secret) = jwt_secret {
            debug!("Overriding JWT secret from command line");
            self.oauth.jwt_secret = secret;
        }
    }
}
