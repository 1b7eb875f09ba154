//! Tab-separated exports of liked songs and playlists.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use thiserror::Error;

use crate::{
    spotify::{CatalogClient, SpotifyError},
    types::ExportedTrack,
};

/// Largest page the Web API returns for saved and playlist tracks.
pub const EXPORT_PAGE_SIZE: u32 = 50;
pub const LIKED_SONGS_FILE: &str = "liked_songs.tsv";
const FALLBACK_PLAYLIST_FILE: &str = "playlist.tsv";
const HEADER: &str = "Num\tTitle\tArtists\tTrackID\tURL";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Spotify(#[from] SpotifyError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// All saved tracks of the current user, fetched page by page until an empty page.
pub async fn fetch_saved_tracks<C: CatalogClient>(
    client: &C,
    progress: &ProgressBar,
) -> Result<Vec<ExportedTrack>, SpotifyError> {
    let mut exported = Vec::new();
    let mut offset = 0;

    loop {
        let page = client.saved_tracks(EXPORT_PAGE_SIZE, offset).await?;
        if page.items.is_empty() {
            break;
        }
        if let Some(total) = page.total {
            progress.set_length(total);
        }

        offset += page.items.len() as u32;
        for saved in page.items {
            exported.push(ExportedTrack::from_track(exported.len() + 1, &saved.track));
            progress.inc(1);
        }
    }

    Ok(exported)
}

/// All tracks of a playlist. Local files and removed tracks without data are skipped.
pub async fn fetch_playlist_tracks<C: CatalogClient>(
    client: &C,
    playlist_id: &str,
    progress: &ProgressBar,
) -> Result<Vec<ExportedTrack>, SpotifyError> {
    let mut exported = Vec::new();
    let mut offset = 0;

    loop {
        let page = client
            .playlist_items(playlist_id, EXPORT_PAGE_SIZE, offset)
            .await?;
        if page.items.is_empty() {
            break;
        }
        if let Some(total) = page.total {
            progress.set_length(total);
        }

        offset += page.items.len() as u32;
        for track in page.items.into_iter().filter_map(|item| item.track) {
            exported.push(ExportedTrack::from_track(exported.len() + 1, &track));
            progress.inc(1);
        }
    }

    Ok(exported)
}

pub fn format_tsv(tracks: &[ExportedTrack]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for t in tracks {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            t.num,
            clean_field(&t.title),
            clean_field(&t.artists),
            t.track_id,
            t.url
        ));
    }
    out
}

pub async fn write_tsv(path: &Path, tracks: &[ExportedTrack]) -> Result<(), ExportError> {
    async_fs::write(path, format_tsv(tracks))
        .await
        .map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// `<playlist id>.tsv`, or `playlist.tsv` when the id is empty.
pub fn playlist_export_file_name(playlist_id: &str) -> String {
    if playlist_id.is_empty() {
        FALLBACK_PLAYLIST_FILE.to_string()
    } else {
        format!("{playlist_id}.tsv")
    }
}

fn clean_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
