//! Genre knowledge used by the tag cleaner.
//!
//! - [`taxonomy`] maps subgenres to a parent genre. It is built once from a
//!   scraped web page and stored as JSON.
//! - [`artist`] is an append-only side table of artists and their catalog
//!   genres, used when the genre of a file should follow its artist.

use std::path::PathBuf;

use thiserror::Error;

pub mod artist;
pub mod scrape;
pub mod taxonomy;

pub use artist::{
    ARTIST_TABLE_HEADER, ArtistGenreTable, RefreshSummary, append_entry, artist_key, format_row,
    parse_genres_list, parse_row, refresh_from_archive,
};
pub use scrape::{ScrapedTaxonomy, TAXONOMY_URL, fetch_taxonomy_page, parse_taxonomy_page};
pub use taxonomy::GenreTaxonomy;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid genre data: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("failed to fetch taxonomy page: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid selector: {0}")]
    Selector(String),
    #[error("taxonomy page contained no genres")]
    EmptyPage,
}
