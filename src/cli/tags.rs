use std::path::Path;

use tabled::Table;

use crate::{
    config::Config,
    error,
    genres::{ArtistGenreTable, GenreTaxonomy},
    info, success,
    tags::{Id3TagStore, RenameOutcome, TagCleaner, TagStore, rename_mp3_files},
    types::{SummaryTableRow, TagTableRow},
    warning,
};

use super::progress_bar;

/// Cleans recording date, diacritics and genre of a file or directory.
///
/// With `by_artist` the genre follows the artist side table instead of the
/// file's genre tag.
pub async fn clean_tags(config: &Config, path: &Path, by_artist: bool, dry_run: bool) {
    let taxonomy =
        match GenreTaxonomy::load(&config.genre_taxonomy_path, config.fuzzy_match_threshold).await
        {
            Ok(t) => t,
            Err(e) => error!(
                "Failed to load genre taxonomy, run `spotiply update-genres` first: {}",
                e
            ),
        };

    let artist_table = if by_artist {
        match ArtistGenreTable::load(
            &config.artist_genre_table_path,
            config.artist_match_threshold,
        )
        .await
        {
            Ok(table) if table.is_empty() => error!(
                "Artist genre table {} is empty, run `spotiply refresh-artist-genres` first",
                config.artist_genre_table_path.display()
            ),
            Ok(table) => Some(table),
            Err(e) => error!("Failed to load artist genre table: {}", e),
        }
    } else {
        None
    };

    let mut cleaner = TagCleaner::new(Id3TagStore::new(), &taxonomy).dry_run(dry_run);
    if let Some(table) = &artist_table {
        cleaner = cleaner.with_artist_genres(table);
    }

    if dry_run {
        info!("Dry run, no file will be changed");
    }

    let pb = progress_bar("Cleaning tags");
    let summary = cleaner.clean(path, &pb);
    pb.finish_and_clear();

    let rows = vec![
        SummaryTableRow {
            item: "files".to_string(),
            count: summary.files,
        },
        SummaryTableRow {
            item: "updated".to_string(),
            count: summary.updated,
        },
        SummaryTableRow {
            item: "unchanged".to_string(),
            count: summary.unchanged,
        },
        SummaryTableRow {
            item: "failed".to_string(),
            count: summary.failed,
        },
    ];
    println!("{}", Table::new(rows));
}

/// Prints the tag fields of a single file.
pub fn show_tags(file: &Path) {
    let fields = match Id3TagStore::new().read(file) {
        Ok(fields) => fields,
        Err(e) => error!("{}", e),
    };

    let rows: Vec<TagTableRow> = fields
        .printable_fields()
        .into_iter()
        .map(|(field, value)| TagTableRow {
            field: field.to_string(),
            value,
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Renames mp3 files to `"<artist> - <title>.mp3"`.
pub fn rename(dir: &Path, dry_run: bool) {
    let outcomes = rename_mp3_files(&Id3TagStore::new(), dir, dry_run);

    let mut renamed = 0;
    for outcome in &outcomes {
        match outcome {
            RenameOutcome::Renamed { from, to } => {
                renamed += 1;
                if dry_run {
                    info!("{} -> {}", from.display(), to.display());
                }
            }
            RenameOutcome::Skipped { path, reason } => {
                warning!("Skipping {}: {}", path.display(), reason)
            }
        }
    }

    if dry_run {
        success!("{} of {} files would be renamed", renamed, outcomes.len());
    } else {
        success!("{} of {} files renamed", renamed, outcomes.len());
    }
}
