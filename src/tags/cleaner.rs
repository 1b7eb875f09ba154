use std::{
    fmt,
    path::{Path, PathBuf},
};

use indicatif::ProgressBar;
use walkdir::WalkDir;

use crate::{
    genres::{ArtistGenreTable, GenreTaxonomy, artist_key},
    utils, warning,
};

use super::{TagComment, TagFields, TagStore};

/// Description of the comment frame that keeps the original genre.
pub const GENRE_BACKUP_DESCRIPTION: &str = "genre";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagChange {
    RecordingDate { from: Option<String>, to: String },
    StripDiacritics { field: &'static str, from: String, to: String },
    Genre { from: String, to: String },
    GenreBackup { original: String },
}

impl fmt::Display for TagChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagChange::RecordingDate { from, to } => write!(
                f,
                "recording date {} -> {}",
                from.as_deref().unwrap_or("none"),
                to
            ),
            TagChange::StripDiacritics { field, from, to } => {
                write!(f, "{field} {from} -> {to}")
            }
            TagChange::Genre { from, to } => write!(f, "genre {from} -> {to}"),
            TagChange::GenreBackup { original } => write!(f, "genre backup '{original}'"),
        }
    }
}

/// Result of cleaning a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    /// Something changed; in dry-run mode nothing was written.
    Updated(Vec<TagChange>),
    Unchanged,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub files: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Normalizes recording date, diacritics and genre of audio files in place.
pub struct TagCleaner<'a, S: TagStore> {
    store: S,
    taxonomy: &'a GenreTaxonomy,
    artist_genres: Option<&'a ArtistGenreTable>,
    dry_run: bool,
}

impl<'a, S: TagStore> TagCleaner<'a, S> {
    pub fn new(store: S, taxonomy: &'a GenreTaxonomy) -> Self {
        Self {
            store,
            taxonomy,
            artist_genres: None,
            dry_run: false,
        }
    }

    /// Derive genres from the file's artist instead of its genre tag.
    pub fn with_artist_genres(mut self, table: &'a ArtistGenreTable) -> Self {
        self.artist_genres = Some(table);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cleans a single file or every mp3 below a directory.
    pub fn clean(&self, path: &Path, progress: &ProgressBar) -> CleanSummary {
        let files = if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            collect_mp3_files(path)
        };

        progress.set_length(files.len() as u64);
        let mut summary = CleanSummary::default();

        for file in files {
            summary.files += 1;
            match self.clean_file(&file) {
                CleanOutcome::Updated(changes) => {
                    summary.updated += 1;
                    if self.dry_run {
                        progress.suspend(|| {
                            println!("{}", file.display());
                            for change in &changes {
                                println!("    {change}");
                            }
                        });
                    }
                }
                CleanOutcome::Unchanged => summary.unchanged += 1,
                CleanOutcome::Failed(reason) => {
                    summary.failed += 1;
                    progress.suspend(|| warning!("Skipping {}: {}", file.display(), reason));
                }
            }
            progress.inc(1);
        }

        summary
    }

    /// Reads, plans and (unless dry-running) saves one file.
    ///
    /// The file is only written when at least one change applies.
    pub fn clean_file(&self, path: &Path) -> CleanOutcome {
        let fields = match self.store.read(path) {
            Ok(fields) => fields,
            Err(e) => return CleanOutcome::Failed(e.to_string()),
        };

        let (updates, changes) = self.plan(&fields);
        if changes.is_empty() {
            return CleanOutcome::Unchanged;
        }

        if !self.dry_run {
            if let Err(e) = self.store.write(path, &updates) {
                return CleanOutcome::Failed(e.to_string());
            }
        }

        CleanOutcome::Updated(changes)
    }

    /// Decides the updates for a set of tag fields without touching any file.
    ///
    /// Returns the fields to write (only changed ones are set) and the list of
    /// changes.
    pub fn plan(&self, fields: &TagFields) -> (TagFields, Vec<TagChange>) {
        let mut updates = TagFields::default();
        let mut changes = Vec::new();

        if let Some(original) = &fields.original_release_date {
            if fields.recording_date.as_ref() != Some(original) {
                changes.push(TagChange::RecordingDate {
                    from: fields.recording_date.clone(),
                    to: original.clone(),
                });
                updates.recording_date = Some(original.clone());
            }
        }

        let artist = strip_field("artist", &fields.artist, &mut updates.artist, &mut changes);
        strip_field(
            "album_artist",
            &fields.album_artist,
            &mut updates.album_artist,
            &mut changes,
        );
        strip_field("title", &fields.title, &mut updates.title, &mut changes);

        let current = fields
            .genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty());

        if let Some(current) = current {
            if let Some(genre) = self.replacement_genre(current, artist.as_deref()) {
                if genre.to_lowercase() != current.to_lowercase() {
                    if fields.comment(GENRE_BACKUP_DESCRIPTION).is_none() {
                        updates.comments.push(TagComment {
                            description: GENRE_BACKUP_DESCRIPTION.to_string(),
                            text: current.to_string(),
                        });
                        changes.push(TagChange::GenreBackup {
                            original: current.to_string(),
                        });
                    }

                    changes.push(TagChange::Genre {
                        from: current.to_string(),
                        to: genre.clone(),
                    });
                    updates.genre = Some(genre);
                }
            }
        }

        (updates, changes)
    }

    fn replacement_genre(&self, current: &str, artist: Option<&str>) -> Option<String> {
        match self.artist_genres {
            Some(table) => {
                let key = artist_key(artist?)?;
                let genres = table.genres_for(&key)?;
                let parents: Vec<String> = genres
                    .iter()
                    .filter_map(|g| self.taxonomy.lookup(g))
                    .collect();
                utils::most_frequent(&parents)
            }
            None => {
                // already a canonical parent genre, nothing to map
                if self.taxonomy.is_parent(current) {
                    return None;
                }
                self.taxonomy.lookup(current)
            }
        }
    }
}

/// Strips diacritics of one field, recording the change. Returns the resulting value.
fn strip_field(
    name: &'static str,
    value: &Option<String>,
    update: &mut Option<String>,
    changes: &mut Vec<TagChange>,
) -> Option<String> {
    let value = value.as_ref()?;
    let stripped = utils::strip_diacritics(value);

    if stripped != *value {
        changes.push(TagChange::StripDiacritics {
            field: name,
            from: value.clone(),
            to: stripped.clone(),
        });
        *update = Some(stripped.clone());
    }

    Some(stripped)
}

/// Every `*.mp3` below `dir`, recursively, sorted by path.
pub fn collect_mp3_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}
