use std::path::{Path, PathBuf};

use futures::AsyncWriteExt;
use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::{
    tags::{TagError, TagStore},
    types::Track,
    warning,
};

#[derive(Debug, Error)]
pub enum TrackListError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed track list: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("cannot scan {path}: {message}")]
    Scan { path: PathBuf, message: String },
    #[error("rekordbox export is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("rekordbox export is not valid text")]
    Encoding,
}

/// Loads and writes a track list JSON file and its not-found companion log.
pub struct TrackListManager {
    path: PathBuf,
}

impl TrackListManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<dir>/<stem>-not_found.txt` next to the track list.
    pub fn not_found_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!("{stem}-not_found.txt"))
    }

    pub async fn load(&self) -> Result<Vec<Track>, TrackListError> {
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|source| TrackListError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Rewrites the whole file, pretty-printed with a four space indent.
    pub async fn persist(&self, tracks: &[Track]) -> Result<(), TrackListError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|source| TrackListError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut json = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        tracks.serialize(&mut serializer)?;

        async_fs::write(&self.path, json)
            .await
            .map_err(|source| TrackListError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Appends one `Artist - Title` line to the not-found log.
    pub async fn log_not_found(&self, track: &Track) -> Result<(), TrackListError> {
        let path = self.not_found_path();
        let io_err = |source| TrackListError::Io {
            path: path.clone(),
            source,
        };

        let mut file = async_fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(io_err)?;
        file.write_all(format!("{}\n", track.display_name()).as_bytes())
            .await
            .map_err(io_err)?;
        file.flush().await.map_err(io_err)
    }
}

/// Reads artist and title of every `*.mp3` directly inside `dir`, sorted by file name.
///
/// Files without a tag become tracks with no artist and title. Files whose
/// tag cannot be read are skipped with a warning.
pub fn scan_directory<S: TagStore>(store: &S, dir: &Path) -> Result<Vec<Track>, TrackListError> {
    let mut tracks = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| TrackListError::Scan {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let is_mp3 = entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(".mp3");
        if !is_mp3 {
            continue;
        }

        match store.read(entry.path()) {
            Ok(fields) => tracks.push(Track {
                artist: fields.artist,
                title: fields.title,
                matched: None,
            }),
            Err(TagError::NoTag(_)) => tracks.push(Track {
                artist: None,
                title: None,
                matched: None,
            }),
            Err(e) => warning!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    Ok(tracks)
}

pub async fn read_rekordbox_export(path: &Path) -> Result<Vec<Track>, TrackListError> {
    let bytes = async_fs::read(path)
        .await
        .map_err(|source| TrackListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_rekordbox_export(&bytes)
}

/// Parses a rekordbox playlist export: tab separated, usually UTF-16 with a BOM.
///
/// Only the first artist of a `", "` separated artist list is kept.
pub fn parse_rekordbox_export(bytes: &[u8]) -> Result<Vec<Track>, TrackListError> {
    let text = decode_text(bytes)?;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header: Vec<&str> = match lines.next() {
        Some(line) => line.split('\t').map(str::trim).collect(),
        None => return Ok(Vec::new()),
    };
    let artist_col = header
        .iter()
        .position(|h| *h == "Artist")
        .ok_or(TrackListError::MissingColumn("Artist"))?;
    let title_col = header
        .iter()
        .position(|h| *h == "Track Title")
        .ok_or(TrackListError::MissingColumn("Track Title"))?;

    Ok(lines
        .map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            let artist = fields
                .get(artist_col)
                .and_then(|a| a.split(", ").next())
                .map(|a| a.trim().to_string());
            let title = fields.get(title_col).map(|t| t.trim().to_string());
            Track {
                artist,
                title,
                matched: None,
            }
        })
        .collect())
}

fn decode_text(bytes: &[u8]) -> Result<String, TrackListError> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => {
            String::from_utf8(rest.to_vec()).map_err(|_| TrackListError::Encoding)
        }
        _ => String::from_utf8(bytes.to_vec()).map_err(|_| TrackListError::Encoding),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String, TrackListError> {
    if bytes.len() % 2 != 0 {
        return Err(TrackListError::Encoding);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| TrackListError::Encoding)
}
