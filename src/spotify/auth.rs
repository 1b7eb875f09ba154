use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::{Client, Url, header};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config::Config,
    server::start_api_server,
    types::{AuthState, Credentials, Token},
    utils, warning,
};

use super::SpotifyError;

const AUTH_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
    expires_in: u64,
}

/// Runs the OAuth authorization-code flow and returns the granted token.
///
/// 1. A random `state` is generated and a local callback server is started
///    on the host and port of the redirect URI
/// 2. The authorization URL is opened in the browser (or printed if that fails)
/// 3. The callback handler checks `state`, exchanges the code and stores the
///    token in the shared [`AuthState`]
///
/// Persisting the token is left to the caller.
pub async fn authorize(config: &Config, credentials: Credentials) -> Result<Token, SpotifyError> {
    let state = utils::generate_state();
    let auth_url = authorize_url(config, &credentials, &state)?;

    let shared_state = Arc::new(Mutex::new(Some(AuthState {
        state,
        credentials: credentials.clone(),
        token_url: config.token_url.clone(),
        token: None,
    })));

    let server_state = Arc::clone(&shared_state);
    let redirect_uri = credentials.redirect_uri.clone();
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state, &redirect_uri).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    }

    wait_for_token(shared_state, AUTH_TIMEOUT)
        .await
        .ok_or_else(|| SpotifyError::Auth("authentication failed or timed out".to_string()))
}

/// The URL the user has to visit to grant access.
pub fn authorize_url(
    config: &Config,
    credentials: &Credentials,
    state: &str,
) -> Result<String, SpotifyError> {
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("state", state),
            ("scope", config.scope.as_str()),
        ],
    )
    .map_err(|e| SpotifyError::Auth(format!("invalid authorization URL: {e}")))?;

    Ok(url.to_string())
}

/// Polls the shared state until the callback stored a token or `max_wait` elapses.
pub async fn wait_for_token(
    shared_state: Arc<Mutex<Option<AuthState>>>,
    max_wait: Duration,
) -> Option<Token> {
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|s| s.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code for a token.
pub async fn exchange_code(
    client: &Client,
    token_url: &str,
    credentials: &Credentials,
    code: &str,
) -> Result<Token, SpotifyError> {
    let res = client
        .post(token_url)
        .header(header::AUTHORIZATION, basic_auth(credentials))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ])
        .send()
        .await?;

    let token = read_token_response(res).await?;
    let refresh_token = token
        .refresh_token
        .ok_or_else(|| SpotifyError::Auth("token response without refresh token".to_string()))?;

    Ok(Token {
        access_token: token.access_token,
        refresh_token,
        scope: token.scope,
        expires_in: token.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    })
}

/// Exchanges a refresh token for a fresh access token.
///
/// Spotify may or may not rotate the refresh token; when it does not, the
/// old one is kept.
pub async fn refresh_token(
    client: &Client,
    token_url: &str,
    credentials: &Credentials,
    refresh_token: &str,
) -> Result<Token, SpotifyError> {
    let res = client
        .post(token_url)
        .header(header::AUTHORIZATION, basic_auth(credentials))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    let token = read_token_response(res).await?;

    Ok(Token {
        access_token: token.access_token,
        refresh_token: token
            .refresh_token
            .unwrap_or_else(|| refresh_token.to_string()),
        scope: token.scope,
        expires_in: token.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    })
}

async fn read_token_response(res: reqwest::Response) -> Result<TokenResponse, SpotifyError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(SpotifyError::Auth(format!(
            "token endpoint returned {status}: {body}"
        )));
    }
    Ok(res.json::<TokenResponse>().await?)
}

fn basic_auth(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(raw))
}
