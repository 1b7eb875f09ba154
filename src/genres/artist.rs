use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
    time::Duration,
};

use futures::AsyncWriteExt;
use indicatif::ProgressBar;
use tokio::time::sleep;

use crate::{spotify::CatalogClient, types::ArtistGenreEntry, utils, warning};

use super::TaxonomyError;

pub const ARTIST_TABLE_HEADER: &str = "artist_id|artist|genres";
const DELIMITER: char = '|';

/// Key under which an artist is stored and looked up.
///
/// Diacritics are removed before normalizing, so "Björk" and "Bjork" share a key.
pub fn artist_key(name: &str) -> Option<String> {
    utils::normalize_artist(Some(&utils::strip_diacritics(name)))
}

/// Artist to genre-list side table, read from a `|`-separated file.
#[derive(Debug, Clone)]
pub struct ArtistGenreTable {
    entries: BTreeMap<String, ArtistGenreEntry>,
    threshold: u8,
}

impl ArtistGenreTable {
    pub fn new(threshold: u8) -> Self {
        Self {
            entries: BTreeMap::new(),
            threshold,
        }
    }

    /// Builds a table from rows; on duplicate artist keys the first row wins.
    pub fn from_entries<I>(entries: I, threshold: u8) -> Self
    where
        I: IntoIterator<Item = ArtistGenreEntry>,
    {
        let mut table = Self::new(threshold);
        for entry in entries {
            table.insert(entry);
        }
        table
    }

    pub fn parse(content: &str, threshold: u8) -> Self {
        Self::from_entries(content.lines().filter_map(parse_row), threshold)
    }

    /// Loads the table from `path`. A missing file yields an empty table.
    pub async fn load(path: &Path, threshold: u8) -> Result<Self, TaxonomyError> {
        if !path.exists() {
            return Ok(Self::new(threshold));
        }

        let content = async_fs::read_to_string(path)
            .await
            .map_err(|source| TaxonomyError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::parse(&content, threshold))
    }

    /// Inserts an entry unless its artist is already present. Returns whether it was added.
    pub fn insert(&mut self, entry: ArtistGenreEntry) -> bool {
        let Some(key) = artist_key(&entry.artist_name) else {
            return false;
        };
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_artist(&self, name: &str) -> bool {
        artist_key(name).is_some_and(|key| self.entries.contains_key(&key))
    }

    pub fn entry(&self, key: &str) -> Option<&ArtistGenreEntry> {
        self.entries.get(key)
    }

    /// Genres of the artist stored under `key`, or of the most similar
    /// artist key scoring at least the threshold.
    pub fn genres_for(&self, key: &str) -> Option<&BTreeSet<String>> {
        if let Some(entry) = self.entries.get(key) {
            return Some(&entry.genres);
        }

        let mut best: Option<(u8, &ArtistGenreEntry)> = None;
        for (candidate, entry) in &self.entries {
            let score = utils::similarity(key, candidate);
            if score >= self.threshold && best.is_none_or(|(top, _)| score > top) {
                best = Some((score, entry));
            }
        }

        best.map(|(_, entry)| &entry.genres)
    }
}

/// Parses one `artist_id|artist|genres` row. The header and malformed rows yield `None`.
pub fn parse_row(line: &str) -> Option<ArtistGenreEntry> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line == ARTIST_TABLE_HEADER {
        return None;
    }

    let [artist_id, artist_name, genres] = split_row(line)[..] else {
        return None;
    };
    let artist_id = artist_id.trim().to_string();
    let artist_name = unquote(artist_name.trim());
    let genres = parse_genres_list(genres);

    if artist_id.is_empty() || artist_name.is_empty() {
        return None;
    }

    Some(ArtistGenreEntry {
        artist_id,
        artist_name,
        genres,
    })
}

/// Parses a list literal such as `['deep house', "drum'n'bass"]`.
pub fn parse_genres_list(raw: &str) -> BTreeSet<String> {
    let raw = unquote(raw.trim());
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');

    inner
        .split(", ")
        .map(|g| g.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Formats an entry as a table row (without line terminator).
pub fn format_row(entry: &ArtistGenreEntry) -> String {
    let genres = entry
        .genres
        .iter()
        .map(|g| {
            if g.contains('\'') && !g.contains('"') {
                format!("\"{g}\"")
            } else {
                format!("'{g}'")
            }
        })
        .collect::<Vec<String>>()
        .join(", ");

    format!(
        "{}{DELIMITER}{}{DELIMITER}{}",
        entry.artist_id,
        quote(&entry.artist_name),
        quote(&format!("[{genres}]"))
    )
}

/// Appends one row to the table file, writing the header first if the file is new.
pub async fn append_entry(path: &Path, entry: &ArtistGenreEntry) -> Result<(), TaxonomyError> {
    let io_err = |source| TaxonomyError::Io {
        path: path.to_path_buf(),
        source,
    };

    let is_new = !path.exists();
    let mut file = async_fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_err)?;

    let mut content = String::new();
    if is_new {
        content.push_str(ARTIST_TABLE_HEADER);
        content.push('\n');
    }
    content.push_str(&format_row(entry));
    content.push('\n');

    file.write_all(content.as_bytes()).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub rows: usize,
    pub added: usize,
    pub known: usize,
    pub failed: usize,
}

/// Looks up every artist of a song archive that the table does not know yet
/// and appends it with its catalog genres.
///
/// Archive lines are tab-separated with the track id in the first and the
/// artist name in the third column. Lookup failures are reported and skipped.
pub async fn refresh_from_archive<C: CatalogClient>(
    client: &C,
    table: &mut ArtistGenreTable,
    table_path: &Path,
    archive_path: &Path,
    delay: Duration,
    progress: &ProgressBar,
) -> Result<RefreshSummary, TaxonomyError> {
    let archive = async_fs::read_to_string(archive_path)
        .await
        .map_err(|source| TaxonomyError::Io {
            path: archive_path.to_path_buf(),
            source,
        })?;

    let rows: Vec<(&str, &str)> = archive
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            match *fields.as_slice() {
                [track_id, _, artist, ..] if !track_id.trim().is_empty() => {
                    Some((track_id.trim(), artist.trim()))
                }
                _ => None,
            }
        })
        .collect();

    progress.set_length(rows.len() as u64);
    let mut summary = RefreshSummary::default();

    for (track_id, artist) in rows {
        summary.rows += 1;
        progress.inc(1);

        if table.contains_artist(artist) {
            summary.known += 1;
            continue;
        }

        match lookup_artist(client, track_id, delay).await {
            Ok(entry) => {
                if table.insert(entry.clone()) {
                    append_entry(table_path, &entry).await?;
                    summary.added += 1;
                } else {
                    summary.known += 1;
                }
            }
            Err(e) => {
                summary.failed += 1;
                progress.suspend(|| warning!("Skipping {} ({}): {}", artist, track_id, e));
            }
        }
    }

    Ok(summary)
}

async fn lookup_artist<C: CatalogClient>(
    client: &C,
    track_id: &str,
    delay: Duration,
) -> Result<ArtistGenreEntry, crate::spotify::SpotifyError> {
    let track = client.track(track_id).await?;
    let artist_id = track
        .artists
        .first()
        .and_then(|a| a.id.clone())
        .ok_or_else(|| {
            crate::spotify::SpotifyError::Unexpected(format!("track {track_id} has no artist id"))
        })?;

    sleep(delay).await;
    let artist = client.artist(&artist_id).await?;

    Ok(ArtistGenreEntry {
        artist_id: artist.id,
        artist_name: artist.name,
        genres: artist.genres.into_iter().collect(),
    })
}

/// Splits a row into its three raw fields. Delimiters inside `"..."` do not
/// split, and everything after the second delimiter is the last field.
fn split_row(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(3);
    let mut start = 0;
    let mut in_quotes = false;

    for (idx, c) in line.char_indices() {
        if fields.len() == 2 {
            break;
        }
        match c {
            '"' => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => {
                fields.push(&line[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }

    fields.push(&line[start..]);
    fields
}

fn quote(field: &str) -> String {
    if field.contains(DELIMITER) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn unquote(field: &str) -> String {
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        field[1..field.len() - 1].replace("\"\"", "\"")
    } else {
        field.to_string()
    }
}
