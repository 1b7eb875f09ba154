//! Local HTTP server receiving the OAuth redirect.

use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use reqwest::Url;
use tokio::sync::Mutex;

use crate::{api, types::AuthState};

/// Socket address and callback path derived from a redirect URI.
///
/// `http://localhost:8080` listens on `127.0.0.1:8080` and serves the
/// callback at `/`.
pub fn callback_location(redirect_uri: &str) -> Result<(SocketAddr, String), String> {
    let url = Url::parse(redirect_uri).map_err(|e| format!("invalid redirect URI: {e}"))?;

    let host = match url.host_str() {
        Some("localhost") | None => "127.0.0.1",
        Some(host) => host,
    };
    let port = url.port_or_known_default().unwrap_or(8080);

    let addr = format!("{host}:{port}")
        .parse::<SocketAddr>()
        .map_err(|e| format!("invalid callback address {host}:{port}: {e}"))?;

    Ok((addr, url.path().to_string()))
}

/// Serves the OAuth callback and a health endpoint until the process exits.
pub async fn start_api_server(
    state: Arc<Mutex<Option<AuthState>>>,
    redirect_uri: &str,
) -> Result<(), String> {
    let (addr, path) = callback_location(redirect_uri)?;

    let mut app = Router::new().route("/health", get(api::health));
    if path != "/health" {
        app = app.route(&path, get(api::callback));
    }
    let app = app.layer(Extension(state));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server error: {e}"))
}
