use crate::{
    config::Config,
    error,
    export::{
        LIKED_SONGS_FILE, fetch_playlist_tracks, fetch_saved_tracks, playlist_export_file_name,
        write_tsv,
    },
    success, utils,
};

use super::{connect, progress_bar};

/// Exports the saved tracks of the current user to `liked_songs.tsv`.
pub async fn liked_songs(config: &Config) {
    let client = connect(config).await;

    let pb = progress_bar("Fetching liked songs");
    let tracks = match fetch_saved_tracks(&client, &pb).await {
        Ok(tracks) => tracks,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch liked songs: {}", e)
        }
    };
    pb.finish_and_clear();

    let path = config.data_dir.join(LIKED_SONGS_FILE);
    if let Err(e) = write_tsv(&path, &tracks).await {
        error!("{}", e);
    }
    success!("{} liked songs written to {}", tracks.len(), path.display());
}

/// Exports the tracks of a playlist given by URL, URI or id.
pub async fn playlist_tracks(config: &Config, reference: &str) {
    let playlist_id = utils::playlist_id_from_reference(reference);
    let client = connect(config).await;

    let pb = progress_bar("Fetching playlist tracks");
    let tracks = match fetch_playlist_tracks(&client, &playlist_id, &pb).await {
        Ok(tracks) => tracks,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch playlist {}: {}", reference, e)
        }
    };
    pb.finish_and_clear();

    let path = config
        .data_dir
        .join(playlist_export_file_name(&playlist_id));
    if let Err(e) = write_tsv(&path, &tracks).await {
        error!("{}", e);
    }
    success!("{} tracks written to {}", tracks.len(), path.display());
}
