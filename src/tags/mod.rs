//! # Tags Module
//!
//! Reading and writing the handful of ID3 fields Spotiply cares about, and
//! the [`TagCleaner`] that normalizes them in place.
//!
//! Tag access goes through the [`TagStore`] trait so the cleaning rules can
//! be exercised without real mp3 files. [`Id3TagStore`] is the production
//! implementation on top of the `id3` crate.

mod cleaner;
mod rename;
mod store;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use cleaner::{
    CleanOutcome, CleanSummary, GENRE_BACKUP_DESCRIPTION, TagChange, TagCleaner, collect_mp3_files,
};
pub use rename::{RenameOutcome, rename_mp3_files, target_file_name};
pub use store::Id3TagStore;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("{0} has no tag")]
    NoTag(PathBuf),
    #[error("cannot read tag of {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("cannot write tag of {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("cannot restore file times of {path}: {source}")]
    Times {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A keyed comment frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagComment {
    pub description: String,
    pub text: String,
}

/// The tag fields of one audio file.
///
/// Dates are kept in their textual ID3 form (`YYYY`, `YYYY-MM-DD`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub comments: Vec<TagComment>,
    pub recording_date: Option<String>,
    pub original_release_date: Option<String>,
}

impl TagFields {
    /// Text of the comment with the given description.
    pub fn comment(&self, description: &str) -> Option<&str> {
        self.comments
            .iter()
            .find(|c| c.description == description)
            .map(|c| c.text.as_str())
    }

    /// Every field in display order, rendered as text.
    pub fn printable_fields(&self) -> Vec<(&'static str, String)> {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        vec![
            ("artist", text(&self.artist)),
            ("album_artist", text(&self.album_artist)),
            ("album", text(&self.album)),
            ("title", text(&self.title)),
            ("genre", text(&self.genre)),
            (
                "comments",
                self.comments
                    .iter()
                    .map(|c| format!("{}: {}", c.description, c.text))
                    .collect::<Vec<String>>()
                    .join("; "),
            ),
            ("recording_date", text(&self.recording_date)),
            ("original_release_date", text(&self.original_release_date)),
        ]
    }
}

/// Reads and persists [`TagFields`] for a single file.
pub trait TagStore {
    fn read(&self, path: &Path) -> Result<TagFields, TagError>;

    /// Saves `fields`, keeping the file's modification time.
    ///
    /// `None` fields are left as they are on disk; comments are added when
    /// no comment with the same description exists yet.
    fn write(&self, path: &Path, fields: &TagFields) -> Result<(), TagError>;
}
