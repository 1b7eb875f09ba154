#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use spotiply::{
    spotify::{CatalogClient, SpotifyError},
    tags::{TagError, TagFields, TagStore},
    types::{
        CreatePlaylistRequest, FullArtist, Page, Playlist, PlaylistItem, SavedTrack,
        SimplifiedArtist, TrackObject, User,
    },
};

pub fn catalog_track(id: &str, artist: &str, title: &str) -> TrackObject {
    TrackObject {
        id: Some(id.to_string()),
        name: title.to_string(),
        artists: vec![SimplifiedArtist {
            id: Some(format!("{id}-artist")),
            name: artist.to_string(),
        }],
    }
}

pub fn playlist(id: &str, name: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        public: Some(false),
        collaborative: false,
        snapshot_id: "snapshot".to_string(),
    }
}

/// In-memory catalog recording every mutating call.
#[derive(Default)]
pub struct FakeCatalog {
    /// Search results by exact query; unknown queries return nothing.
    pub results: HashMap<String, Vec<TrackObject>>,
    /// Queries whose search fails.
    pub failing_queries: Vec<String>,
    /// Id returned by `create_playlist`.
    pub created_id: String,
    pub existing_playlists: Vec<Playlist>,
    pub saved: Vec<TrackObject>,
    pub playlist_tracks: Vec<Option<TrackObject>>,
    pub tracks: HashMap<String, TrackObject>,
    pub artists: HashMap<String, FullArtist>,
    /// Number of successful add calls before every further one fails.
    pub fail_adds_after: Option<usize>,

    pub searches: Mutex<Vec<String>>,
    pub created: Mutex<Vec<CreatePlaylistRequest>>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
    pub track_lookups: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_result(mut self, query: &str, track: TrackObject) -> Self {
        self.results.insert(query.to_string(), vec![track]);
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn added(&self) -> Vec<(String, Vec<String>)> {
        self.added.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<CreatePlaylistRequest> {
        self.created.lock().unwrap().clone()
    }
}

fn page<T: Clone>(items: &[T], limit: u32, offset: u32) -> Page<T> {
    let start = (offset as usize).min(items.len());
    let end = (start + limit as usize).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        next: if end < items.len() {
            Some(format!("offset={end}"))
        } else {
            None
        },
        total: Some(items.len() as u64),
    }
}

impl CatalogClient for FakeCatalog {
    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackObject>, SpotifyError> {
        self.searches.lock().unwrap().push(query.to_string());
        if self.failing_queries.iter().any(|q| q == query) {
            return Err(SpotifyError::Unexpected("search unavailable".to_string()));
        }
        Ok(self
            .results
            .get(query)
            .map(|r| r.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn current_user(&self) -> Result<User, SpotifyError> {
        Ok(User {
            id: "me".to_string(),
            display_name: Some("Me".to_string()),
        })
    }

    async fn create_playlist(
        &self,
        _user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<Playlist, SpotifyError> {
        self.created.lock().unwrap().push(request.clone());
        Ok(playlist(&self.created_id, &request.name))
    }

    async fn current_user_playlists(&self) -> Result<Vec<Playlist>, SpotifyError> {
        Ok(self.existing_playlists.clone())
    }

    async fn add_items_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError> {
        let mut added = self.added.lock().unwrap();
        if self.fail_adds_after.is_some_and(|n| added.len() >= n) {
            return Err(SpotifyError::Unexpected("add failed".to_string()));
        }
        added.push((playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }

    async fn saved_tracks(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Page<SavedTrack>, SpotifyError> {
        let saved: Vec<SavedTrack> = self
            .saved
            .iter()
            .cloned()
            .map(|track| SavedTrack { track })
            .collect();
        Ok(page(&saved, limit, offset))
    }

    async fn playlist_items(
        &self,
        _playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<PlaylistItem>, SpotifyError> {
        let items: Vec<PlaylistItem> = self
            .playlist_tracks
            .iter()
            .cloned()
            .map(|track| PlaylistItem { track })
            .collect();
        Ok(page(&items, limit, offset))
    }

    async fn track(&self, id: &str) -> Result<TrackObject, SpotifyError> {
        self.track_lookups.lock().unwrap().push(id.to_string());
        self.tracks
            .get(id)
            .cloned()
            .ok_or_else(|| SpotifyError::Unexpected(format!("unknown track {id}")))
    }

    async fn artist(&self, id: &str) -> Result<FullArtist, SpotifyError> {
        self.artists
            .get(id)
            .cloned()
            .ok_or_else(|| SpotifyError::Unexpected(format!("unknown artist {id}")))
    }
}

/// Tag store backed by a map, applying writes the way the id3 store does.
#[derive(Default)]
pub struct MemoryTagStore {
    pub files: RefCell<HashMap<PathBuf, TagFields>>,
    pub writes: Cell<usize>,
}

impl MemoryTagStore {
    pub fn with_file(self, path: &str, fields: TagFields) -> Self {
        self.files.borrow_mut().insert(PathBuf::from(path), fields);
        self
    }

    pub fn fields(&self, path: &str) -> TagFields {
        self.files.borrow()[Path::new(path)].clone()
    }
}

impl TagStore for MemoryTagStore {
    fn read(&self, path: &Path) -> Result<TagFields, TagError> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| TagError::NoTag(path.to_path_buf()))
    }

    fn write(&self, path: &Path, fields: &TagFields) -> Result<(), TagError> {
        let mut files = self.files.borrow_mut();
        let current = files
            .get_mut(path)
            .ok_or_else(|| TagError::NoTag(path.to_path_buf()))?;

        let set = |target: &mut Option<String>, value: &Option<String>| {
            if value.is_some() {
                *target = value.clone();
            }
        };
        set(&mut current.artist, &fields.artist);
        set(&mut current.album_artist, &fields.album_artist);
        set(&mut current.album, &fields.album);
        set(&mut current.title, &fields.title);
        set(&mut current.genre, &fields.genre);
        set(&mut current.recording_date, &fields.recording_date);
        set(
            &mut current.original_release_date,
            &fields.original_release_date,
        );
        for comment in &fields.comments {
            if current.comment(&comment.description).is_none() {
                current.comments.push(comment.clone());
            }
        }

        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
