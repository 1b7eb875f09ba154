use std::path::Path;

use tabled::Table;

use crate::{
    builder::{PlaylistBuilder, playlist_stats},
    config::Config,
    error, info,
    management::{TrackListManager, read_rekordbox_export, scan_directory},
    matcher::{MatchSummary, TrackMatcher},
    spotify::SpotifyClient,
    success,
    tags::Id3TagStore,
    types::{SummaryTableRow, Track},
    utils, warning,
};

use super::{connect, progress_bar};

/// Scans a directory of mp3 files, matches them and builds a playlist.
pub async fn from_dir(
    config: &Config,
    dir: &Path,
    name: Option<String>,
    disable_playlist: bool,
    resume: bool,
) {
    let name = name.unwrap_or_else(utils::random_playlist_name);
    let manager = TrackListManager::new(config.track_list_path(&name));

    let tracks = if resume && manager.path().exists() {
        match manager.load().await {
            Ok(tracks) => {
                info!("Resuming {} from {}", name, manager.path().display());
                tracks
            }
            Err(e) => error!("Failed to read track list: {}", e),
        }
    } else {
        info!("Scanning {}", dir.display());
        match scan_directory(&Id3TagStore::new(), dir) {
            Ok(tracks) => tracks,
            Err(e) => error!("Failed to scan {}: {}", dir.display(), e),
        }
    };

    match_and_build(config, &manager, tracks, &name, disable_playlist, resume).await;
}

/// Builds a playlist named after the file stem from an already matched track list.
pub async fn from_json(config: &Config, file: &Path) {
    let name = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(utils::random_playlist_name);

    let manager = TrackListManager::new(file.to_path_buf());
    let tracks = match manager.load().await {
        Ok(tracks) => tracks,
        Err(e) => error!("Failed to read {}: {}", file.display(), e),
    };

    let client = connect(config).await;
    build(config, &client, &name, &tracks).await;
}

/// Matches the tracks of a rekordbox playlist export and builds a playlist.
pub async fn from_rekordbox(
    config: &Config,
    file: &Path,
    name: Option<String>,
    disable_playlist: bool,
) {
    let name = name.unwrap_or_else(utils::random_playlist_name);
    let manager = TrackListManager::new(config.track_list_path(&name));

    let tracks = match read_rekordbox_export(file).await {
        Ok(tracks) => tracks,
        Err(e) => error!("Failed to read {}: {}", file.display(), e),
    };

    match_and_build(config, &manager, tracks, &name, disable_playlist, false).await;
}

async fn match_and_build(
    config: &Config,
    manager: &TrackListManager,
    mut tracks: Vec<Track>,
    name: &str,
    disable_playlist: bool,
    resume: bool,
) {
    if tracks.is_empty() {
        warning!("No tracks found, nothing to do.");
        return;
    }

    if let Err(e) = manager.persist(&tracks).await {
        error!("Failed to write track list: {}", e);
    }

    let client = connect(config).await;
    let matcher = TrackMatcher::new(&client, manager)
        .checkpoint_every(config.checkpoint_every)
        .resume(resume);

    let pb = progress_bar("Searching tracks");
    let summary = match matcher.match_all(&mut tracks, &pb).await {
        Ok(summary) => summary,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to write track list: {}", e)
        }
    };
    pb.finish_and_clear();

    print_match_summary(&summary);
    if summary.unmatched() > 0 {
        warning!(
            "{} tracks not found, see {}",
            summary.unmatched(),
            manager.not_found_path().display()
        );
    }
    success!("Track list written to {}", manager.path().display());

    if !disable_playlist {
        build(config, &client, name, &tracks).await;
    }
}

async fn build(config: &Config, client: &SpotifyClient, name: &str, tracks: &[Track]) {
    let stats = playlist_stats(tracks);
    info!("no of songs {}", stats.tracks);
    info!("no of song ids {}", stats.matched);
    info!("no of unique song ids {}", stats.unique);

    let builder = PlaylistBuilder::from_config(client, config);

    info!("Adding songs to playlist {}...", name);
    let pb = progress_bar("Adding batches");
    match builder.build(name, tracks, &pb).await {
        Ok(id) => {
            pb.finish_and_clear();
            success!("Playlist {} ({}) created with {} tracks", name, id, stats.unique);
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to build playlist {}: {}", name, e);
        }
    }
}

fn print_match_summary(summary: &MatchSummary) {
    let rows = vec![
        SummaryTableRow {
            item: "tracks".to_string(),
            count: summary.total,
        },
        SummaryTableRow {
            item: "matched".to_string(),
            count: summary.matched,
        },
        SummaryTableRow {
            item: "already matched".to_string(),
            count: summary.already_matched,
        },
        SummaryTableRow {
            item: "not found".to_string(),
            count: summary.not_found,
        },
        SummaryTableRow {
            item: "skipped".to_string(),
            count: summary.skipped,
        },
        SummaryTableRow {
            item: "failed".to_string(),
            count: summary.failed,
        },
    ];
    println!("{}", Table::new(rows));
}
