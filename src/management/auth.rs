use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;

use crate::{
    spotify::{SpotifyError, auth},
    types::{Credentials, Token},
};

/// Seconds before the real expiry at which a token is considered stale.
const EXPIRY_MARGIN_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
    path: PathBuf,
    credentials: Credentials,
    token_url: String,
}

impl TokenManager {
    pub fn new(token: Token, path: PathBuf, credentials: Credentials, token_url: String) -> Self {
        TokenManager {
            token,
            path,
            credentials,
            token_url,
        }
    }

    pub async fn load(
        path: PathBuf,
        credentials: Credentials,
        token_url: String,
    ) -> Result<Self, SpotifyError> {
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|source| SpotifyError::Io {
                path: path.clone(),
                source,
            })?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self::new(token, path, credentials, token_url))
    }

    pub async fn persist(&self) -> Result<(), SpotifyError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|source| SpotifyError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|source| SpotifyError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Returns an access token, refreshing and persisting it first when it is about to expire.
    ///
    /// A failed refresh keeps the old token; the next API call then fails
    /// with an authorization error that names the real problem.
    pub async fn get_valid_token(&mut self) -> String {
        if self.is_expired() {
            let client = Client::new();
            if let Ok(new_token) = auth::refresh_token(
                &client,
                &self.token_url,
                &self.credentials,
                &self.token.refresh_token,
            )
            .await
            {
                self.token = new_token;
                let _ = self.persist().await;
            }
        }

        self.token.access_token.clone()
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
