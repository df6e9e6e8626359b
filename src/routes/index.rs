// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Landing page listing the API's routes.

use axum::response::Html;
use std::fmt::Write;

/// One documented endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    pub requires_auth: bool,
}

const fn route(
    method: &'static str,
    path: &'static str,
    description: &'static str,
    requires_auth: bool,
) -> RouteInfo {
    RouteInfo {
        method,
        path,
        description,
        requires_auth,
    }
}

/// Every endpoint the service exposes, in display order.
pub const ROUTES: &[RouteInfo] = &[
    route("GET", "/", "This page", false),
    route("GET", "/health", "Service health and build id", false),
    route("POST", "/users/login", "Log in and receive tokens", false),
    route("POST", "/users/register", "Create an account", false),
    route("GET", "/users/", "List all users", true),
    route("GET", "/users/id/{_id}", "Get a user by id", true),
    route("PUT", "/users/id/{_id}", "Replace a user by id", false),
    route("DELETE", "/users/id/{_id}", "Delete a user by id", true),
    route("GET", "/holdings/", "List holdings with a summary", true),
    route("POST", "/holdings/", "Add a holding", true),
    route("GET", "/holdings/id/{_id}", "Get a holding by id", true),
    route("PUT", "/holdings/id/{_id}", "Replace a holding by id", true),
    route("DELETE", "/holdings/id/{_id}", "Delete a holding by id", true),
    route(
        "GET",
        "/holdings/ticker/{ticker}",
        "Holdings with an exact ticker",
        true,
    ),
    route(
        "GET",
        "/holdings/account/{account}",
        "Holdings whose account matches a pattern, with a summary",
        true,
    ),
];

/// Render the route catalog as an HTML page.
pub fn render_index(routes: &[RouteInfo]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Stock Service</title>\n\
         <link rel=\"stylesheet\" href=\"/css/style.css\">\n</head>\n<body>\n\
         <h1>Stock Service API</h1>\n<table>\n\
         <tr><th>Method</th><th>Path</th><th>Description</th><th>Auth</th></tr>\n",
    );

    for r in routes {
        // Writing to a String cannot fail.
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td><code>{}</code></td><td>{}</td><td>{}</td></tr>",
            r.method,
            escape(r.path),
            escape(r.description),
            if r.requires_auth { "Bearer token" } else { "None" },
        );
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `GET /`
pub async fn index() -> Html<String> {
    Html(render_index(ROUTES))
}
