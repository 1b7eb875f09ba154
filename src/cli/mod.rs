//! Command handlers of the `spotiply` binary.
//!
//! Each handler receives the loaded [`Config`](crate::config::Config), drives
//! one library component and reports through the console macros. Fatal
//! conditions end the process via `error!`; per-item problems are reported
//! as warnings and counted in the final summary.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{config::Config, error, spotify::SpotifyClient};

mod auth;
mod export;
mod genres;
mod playlist;
mod tags;

pub use auth::{auth, credentials};
pub use export::{liked_songs, playlist_tracks};
pub use genres::{refresh_artist_genres, update_genres};
pub use playlist::{from_dir, from_json, from_rekordbox};
pub use tags::{clean_tags, rename, show_tags};

/// Count-based progress bar with a message prefix.
fn progress_bar(message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{msg} [{bar:40.blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

    let pb = ProgressBar::new(0);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

fn spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn connect(config: &Config) -> SpotifyClient {
    match SpotifyClient::connect(config).await {
        Ok(client) => client,
        Err(e) => error!("Cannot connect to Spotify: {}", e),
    }
}
