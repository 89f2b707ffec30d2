// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the tomora-api project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Login form rendering
//!
//! The authorization endpoint serves an interactive login page that carries
//! the OAuth parameters through to the login handler in hidden fields. The
//! page posts credentials as JSON to `/auth/login` and follows the returned
//! `redirectUrl`.

use handlebars::Handlebars;
use serde_json::json;

/// Render the login page for an authorization request
pub fn login_page_html(client_id: &str, state: &str, redirect_uri: &str) -> String {
    let mut handlebars = Handlebars::new();

    // Register the template
    handlebars
        .register_template_string("login", include_str!("../../resources/forms/login.hbs"))
        .expect("Failed to register login template");

    let data = json!({
        "client_id": client_id,
        "state": state,
        "redirect_uri": redirect_uri,
    });

    handlebars
        .render("login", &data)
        .expect("Failed to render login template")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_carries_oauth_parameters() {
        let html = login_page_html("client-1", "xyzzy", "https://example.com/cb");
        assert!(html.contains(r#"value="client-1""#));
        assert!(html.contains(r#"value="xyzzy""#));
        assert!(html.contains("https://example.com/cb"));
    }

    #[test]
    fn test_login_page_escapes_values() {
        let html = login_page_html("<script>", "s", "https://example.com/cb");
        assert!(!html.contains(r#"value="<script>""#));
    }
}
