//! Playlist creation from a matched track list.

use std::{collections::HashSet, time::Duration};

use indicatif::ProgressBar;
use thiserror::Error;
use tokio::time::sleep;

use crate::{
    config::Config,
    spotify::{CatalogClient, SpotifyError},
    types::{CreatePlaylistRequest, Playlist, Track},
};

const PLAYLIST_DESCRIPTION: &str = "Created by spotiply";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Spotify(#[from] SpotifyError),
    #[error("playlist '{0}' not found after creating it")]
    PlaylistNotFound(String),
}

/// Counts reported before a playlist is modified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaylistStats {
    pub tracks: usize,
    pub matched: usize,
    pub unique: usize,
}

/// Matched track ids in first-seen order, without duplicates.
pub fn collect_track_ids(tracks: &[Track]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ids: Vec<String> = Vec::new();
    for found in tracks.iter().filter_map(|t| t.matched.as_ref()) {
        if seen.insert(found.external_id.as_str()) {
            ids.push(found.external_id.clone());
        }
    }
    ids
}

pub fn playlist_stats(tracks: &[Track]) -> PlaylistStats {
    PlaylistStats {
        tracks: tracks.len(),
        matched: tracks.iter().filter(|t| t.matched.is_some()).count(),
        unique: collect_track_ids(tracks).len(),
    }
}

pub fn track_uri(id: &str) -> String {
    format!("spotify:track:{id}")
}

pub struct PlaylistBuilder<'a, C: CatalogClient> {
    client: &'a C,
    batch_size: usize,
    delay: Duration,
}

impl<'a, C: CatalogClient> PlaylistBuilder<'a, C> {
    pub fn new(client: &'a C, batch_size: usize, delay: Duration) -> Self {
        Self {
            client,
            batch_size: batch_size.max(1),
            delay,
        }
    }

    pub fn from_config(client: &'a C, config: &Config) -> Self {
        Self::new(client, config.playlist_batch_size, config.rate_limit_delay)
    }

    /// Creates a private playlist named `name` and adds every matched track.
    ///
    /// Creating is not idempotent: an existing playlist with the same name is
    /// left alone and a second one is created. Tracks are added in batches
    /// with a pause before each batch. A failing batch aborts the run; the
    /// batches added before it stay in the playlist.
    pub async fn build(
        &self,
        name: &str,
        tracks: &[Track],
        progress: &ProgressBar,
    ) -> Result<String, BuildError> {
        let ids = collect_track_ids(tracks);

        let user = self.client.current_user().await?;
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: PLAYLIST_DESCRIPTION.to_string(),
            public: false,
            collaborative: false,
        };
        let created = self.client.create_playlist(&user.id, &request).await?;
        let playlist_id = self.resolve_playlist_id(&created, name).await?;

        let batches: Vec<&[String]> = ids.chunks(self.batch_size).collect();
        progress.set_length(batches.len() as u64);

        for batch in batches {
            sleep(self.delay).await;
            let uris: Vec<String> = batch.iter().map(|id| track_uri(id)).collect();
            self.client
                .add_items_to_playlist(&playlist_id, &uris)
                .await?;
            progress.inc(1);
        }

        Ok(playlist_id)
    }

    /// Id of the created playlist; falls back to the first listed playlist
    /// with the same name when the create response carries no id.
    async fn resolve_playlist_id(
        &self,
        created: &Playlist,
        name: &str,
    ) -> Result<String, BuildError> {
        if !created.id.is_empty() {
            return Ok(created.id.clone());
        }

        self.client
            .current_user_playlists()
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
            .ok_or_else(|| BuildError::PlaylistNotFound(name.to_string()))
    }
}
