// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web server configuration

use serde::{Deserialize, Serialize};

/// Settings for the HTTP server component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Network address the server binds to
    #[serde(default = "default_address")]
    pub address: String,

    /// TCP port for the server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Server identification string, reported in the `Server` header
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_name() -> String {
    "TomoraApiServer".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            name: default_name(),
        }
    }
}
