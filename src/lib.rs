//! Spotiply Library
//!
//! This library turns a local collection of mp3 files (or an exported track
//! list) into a Spotify playlist, and cleans up mp3 tags with the help of a
//! scraped genre taxonomy. It includes modules for API communication, CLI
//! operations, configuration management, flat-file persistence and the
//! matching engine itself.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `builder` - Playlist creation from a matched track list
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration object and environment loading
//! - `export` - Tab-separated exports of liked songs and playlists
//! - `genres` - Genre taxonomy and the artist/genre side table
//! - `management` - Track lists, credentials and token persistence
//! - `matcher` - Track matching against the Spotify catalog
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `tags` - mp3 tag I/O and tag cleaning
//! - `types` - Data structures and type definitions
//! - `utils` - String normalization and small helpers

pub mod api;
pub mod builder;
pub mod cli;
pub mod config;
pub mod export;
pub mod genres;
pub mod management;
pub mod matcher;
pub mod server;
pub mod spotify;
pub mod tags;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```ignore
/// info!("Searching {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```ignore
/// success!("Playlist {} created", name);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for fatal conditions in the CLI layer: the process terminates
/// with exit code 1 right after printing.
///
/// # Example
///
/// ```ignore
/// error!("Failed to write track list: {}", e);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues: a track that could not be matched, a file
/// whose tags could not be read, a side table row that failed to parse.
///
/// # Example
///
/// ```ignore
/// warning!("Skipping {}: {}", path.display(), e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
