use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

pub const SPOTIFY_TRACK_URL: &str = "https://open.spotify.com/track/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// OAuth application credentials, stored as `credentials.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// State shared between the authorization flow and the callback handler.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub state: String,
    pub credentials: Credentials,
    pub token_url: String,
    pub token: Option<Token>,
}

/// One local song reference, as stored in a track list file.
///
/// `artist` and `title` are kept exactly as read from the source; either may
/// be missing when the source tag was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub artist: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "spotify", default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<SpotifyMatch>,
}

impl Track {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            title: Some(title.into()),
            matched: None,
        }
    }

    /// `"Artist - Title"` as written to the not-found log.
    pub fn display_name(&self) -> String {
        format!(
            "{} - {}",
            self.artist.as_deref().unwrap_or("None"),
            self.title.as_deref().unwrap_or("None")
        )
    }
}

/// The catalog entry selected for a [`Track`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyMatch {
    #[serde(rename = "id")]
    pub external_id: String,
    #[serde(rename = "artist")]
    pub matched_artist: String,
    #[serde(rename = "title")]
    pub matched_title: String,
    pub url: String,
}

/// A subgenre and its parent genre in the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreEntry {
    pub subgenre: String,
    pub parent_genre: String,
}

/// One row of the artist/genre side table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistGenreEntry {
    pub artist_id: String,
    pub artist_name: String,
    pub genres: BTreeSet<String>,
}

#[derive(Tabled)]
pub struct TagTableRow {
    pub field: String,
    pub value: String,
}

#[derive(Tabled)]
pub struct SummaryTableRow {
    pub item: String,
    pub count: usize,
}

// Spotify Web API payloads

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: Page<TrackObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub track: TrackObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub collaborative: bool,
    pub snapshot_id: String,
}

/// Flattened view of a catalog track, as exported to tab-separated files.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedTrack {
    pub num: usize,
    pub title: String,
    pub artists: String,
    pub track_id: String,
    pub url: String,
}

impl ExportedTrack {
    pub fn from_track(num: usize, track: &TrackObject) -> Self {
        let track_id = track.id.clone().unwrap_or_default();
        Self {
            num,
            title: track.name.clone(),
            artists: track
                .artists
                .iter()
                .map(|a| a.name.clone())
                .collect::<Vec<String>>()
                .join(", "),
            url: format!("{SPOTIFY_TRACK_URL}{track_id}"),
            track_id,
        }
    }
}
