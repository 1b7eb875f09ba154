//! # Spotify Integration Module
//!
//! Interface to the Spotify Web API: the OAuth authorization-code flow in
//! [`auth`] and the authenticated HTTP client in [`client`].
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (matcher, builder, exports, side table refresh)
//!          ↓
//! CatalogClient trait
//!          ↓
//! SpotifyClient (reqwest, token refresh, retries)
//!          ↓
//! Spotify Web API
//! ```
//!
//! Everything above the trait is generic over [`CatalogClient`], so the
//! matching and playlist logic runs unchanged against an in-memory fake.
//!
//! ## Rate Limiting
//!
//! - `429 Too Many Requests` waits for the `Retry-After` header (up to 120
//!   seconds) and retries
//! - `502 Bad Gateway` waits ten seconds and retries
//! - a request is attempted at most three times
//!
//! ## API Coverage
//!
//! - `GET /search` - track search
//! - `GET /me`, `GET /me/playlists`, `GET /me/tracks`
//! - `POST /users/{user_id}/playlists` - create a playlist
//! - `POST /playlists/{playlist_id}/tracks` - add tracks
//! - `GET /playlists/{playlist_id}/tracks`
//! - `GET /tracks/{id}`, `GET /artists/{id}`

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    management::CredentialsError,
    types::{
        CreatePlaylistRequest, FullArtist, Page, Playlist, PlaylistItem, SavedTrack, TrackObject,
        User,
    },
};

pub mod auth;
pub mod client;

pub use client::SpotifyClient;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error("rate limited for {0} seconds")]
    RateLimited(u64),
    #[error("{0}")]
    Unexpected(String),
}

/// The catalog operations the rest of the crate needs.
#[allow(async_fn_in_trait)]
pub trait CatalogClient {
    /// Searches tracks, best matches first.
    async fn search_tracks(&self, query: &str, limit: u32)
    -> Result<Vec<TrackObject>, SpotifyError>;

    async fn current_user(&self) -> Result<User, SpotifyError>;

    async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<Playlist, SpotifyError>;

    /// Every playlist of the current user, all pages.
    async fn current_user_playlists(&self) -> Result<Vec<Playlist>, SpotifyError>;

    async fn add_items_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError>;

    async fn saved_tracks(&self, limit: u32, offset: u32)
    -> Result<Page<SavedTrack>, SpotifyError>;

    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<PlaylistItem>, SpotifyError>;

    async fn track(&self, id: &str) -> Result<TrackObject, SpotifyError>;

    async fn artist(&self, id: &str) -> Result<FullArtist, SpotifyError>;
}
