// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration validation helpers
//!
//! Rules that are awkward to express in the JSON schema live here and run
//! after schema validation.

use std::collections::HashSet;
use std::net::IpAddr;
use std::str::FromStr;

use anyhow::Result;

use super::Config;

/// Check whether a string is a valid IPv4 or IPv6 address
pub fn is_valid_ip_address(address: &str) -> bool {
    IpAddr::from_str(address).is_ok()
}

/// Validate rules the JSON schema cannot express
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    if !is_valid_ip_address(&config.server.address) {
        anyhow::bail!(
            "server.address must be a valid IP address, got '{}'",
            config.server.address
        );
    }

    if config.oauth.clients.is_empty() {
        anyhow::bail!("oauth.clients must contain at least one registered client");
    }

    let mut seen = HashSet::new();
    for client in &config.oauth.clients {
        if !seen.insert(client.client_id.as_str()) {
            anyhow::bail!("duplicate oauth client id '{}'", client.client_id);
        }
    }

    if config.oauth.jwt_secret.len() < 8 {
        anyhow::bail!("oauth.jwt_secret must be at least 8 characters long");
    }

    Ok(())
}
