use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::sleep};

use crate::{
    config::Config,
    management::{CredentialsManager, TokenManager},
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest, FullArtist,
        Page, Playlist, PlaylistItem, SavedTrack, SearchResponse, TrackObject, User,
    },
    warning,
};

use super::{CatalogClient, SpotifyError};

const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 120;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);
const PLAYLIST_PAGE_SIZE: u32 = 50;

/// Authenticated Spotify Web API client.
///
/// The access token is refreshed transparently before it expires; the
/// refreshed token is written back to the token cache.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>, tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
            tokens: Mutex::new(tokens),
        }
    }

    /// Builds a client from the stored credentials and the cached token.
    ///
    /// # Errors
    ///
    /// Fails when no credentials are stored or no token has been cached yet,
    /// i.e. `spotiply auth` has not been run.
    pub async fn connect(config: &Config) -> Result<Self, SpotifyError> {
        let credentials = CredentialsManager::new(config.credentials_path.clone())
            .load()
            .await?;

        let tokens = TokenManager::load(config.token_path(), credentials, config.token_url.clone())
            .await
            .map_err(|e| {
                SpotifyError::Auth(format!(
                    "no usable cached token ({e}), please run `spotiply auth`"
                ))
            })?;

        Ok(Self::new(config.api_url.clone(), tokens))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Sends a request built by `build`, retrying on 429 and 502.
    async fn send<F>(&self, build: F) -> Result<Response, SpotifyError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        for attempt in 1..=MAX_ATTEMPTS {
            let token = self.tokens.lock().await.get_valid_token().await;
            let response = build(&self.http).bearer_auth(token).send().await?;

            match response.status() {
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(1);

                    if retry_after > MAX_RETRY_AFTER_SECS {
                        warning!(
                            "Retry after has reached an abnormal high of {} seconds. Try again later.",
                            retry_after
                        );
                        return Err(SpotifyError::RateLimited(retry_after));
                    }
                    if attempt == MAX_ATTEMPTS {
                        return Err(SpotifyError::RateLimited(retry_after));
                    }
                    sleep(Duration::from_secs(retry_after)).await;
                }
                StatusCode::BAD_GATEWAY if attempt < MAX_ATTEMPTS => {
                    sleep(BAD_GATEWAY_DELAY).await;
                }
                _ => return Ok(response.error_for_status()?),
            }
        }

        Err(SpotifyError::Unexpected(format!(
            "request failed after {MAX_ATTEMPTS} attempts"
        )))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SpotifyError> {
        let url = self.url(path);
        let response = self.send(|http| http.get(&url).query(query)).await?;
        Ok(response.json::<T>().await?)
    }
}

impl CatalogClient for SpotifyClient {
    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackObject>, SpotifyError> {
        let res: SearchResponse = self
            .get_json(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", "track".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(res.tracks.items)
    }

    async fn current_user(&self) -> Result<User, SpotifyError> {
        self.get_json("/me", &[]).await
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<Playlist, SpotifyError> {
        let url = self.url(&format!("/users/{user_id}/playlists"));
        let response = self.send(|http| http.post(&url).json(request)).await?;
        Ok(response.json::<Playlist>().await?)
    }

    async fn current_user_playlists(&self) -> Result<Vec<Playlist>, SpotifyError> {
        let mut playlists = Vec::new();
        let mut offset = 0;

        loop {
            let page: Page<Playlist> = self
                .get_json(
                    "/me/playlists",
                    &[
                        ("limit", PLAYLIST_PAGE_SIZE.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;

            let count = page.items.len() as u32;
            playlists.extend(page.items);
            if page.next.is_none() || count == 0 {
                break;
            }
            offset += count;
        }

        Ok(playlists)
    }

    async fn add_items_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError> {
        let url = self.url(&format!("/playlists/{playlist_id}/tracks"));
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };
        let response = self.send(|http| http.post(&url).json(&body)).await?;
        response.json::<AddTrackToPlaylistResponse>().await?;
        Ok(())
    }

    async fn saved_tracks(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Page<SavedTrack>, SpotifyError> {
        self.get_json(
            "/me/tracks",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<PlaylistItem>, SpotifyError> {
        self.get_json(
            &format!("/playlists/{playlist_id}/tracks"),
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    async fn track(&self, id: &str) -> Result<TrackObject, SpotifyError> {
        self.get_json(&format!("/tracks/{id}"), &[]).await
    }

    async fn artist(&self, id: &str) -> Result<FullArtist, SpotifyError> {
        self.get_json(&format!("/artists/{id}"), &[]).await
    }
}
