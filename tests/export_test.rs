mod common;

use std::fs;

use indicatif::ProgressBar;
use spotiply::{export::*, types::ExportedTrack};
use tempfile::tempdir;

use common::{FakeCatalog, catalog_track};

#[tokio::test]
async fn test_fetch_saved_tracks_pages_until_empty() {
    let saved = (0..120)
        .map(|i| catalog_track(&format!("t{i}"), "Artist", &format!("Song {i}")))
        .collect();
    let catalog = FakeCatalog {
        saved,
        ..FakeCatalog::default()
    };

    let tracks = fetch_saved_tracks(&catalog, &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(tracks.len(), 120);
    assert_eq!(tracks[0].num, 1);
    assert_eq!(tracks[119].num, 120);
    assert_eq!(tracks[119].track_id, "t119");
}

#[tokio::test]
async fn test_fetch_playlist_tracks_skips_missing_tracks() {
    let catalog = FakeCatalog {
        playlist_tracks: vec![
            Some(catalog_track("a", "Daft Punk", "Aerodynamic")),
            None,
            Some(catalog_track("b", "Justice", "D.A.N.C.E.")),
        ],
        ..FakeCatalog::default()
    };

    let tracks = fetch_playlist_tracks(&catalog, "pl", &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(
        tracks,
        vec![
            ExportedTrack {
                num: 1,
                title: "Aerodynamic".to_string(),
                artists: "Daft Punk".to_string(),
                track_id: "a".to_string(),
                url: "https://open.spotify.com/track/a".to_string(),
            },
            ExportedTrack {
                num: 2,
                title: "D.A.N.C.E.".to_string(),
                artists: "Justice".to_string(),
                track_id: "b".to_string(),
                url: "https://open.spotify.com/track/b".to_string(),
            },
        ]
    );
}

#[test]
fn test_format_tsv() {
    let mut track = catalog_track("x1", "Simon & Garfunkel", "The Boxer\t(Live)");
    track.artists.push(catalog_track("x2", "Guest", "").artists[0].clone());
    let exported = ExportedTrack::from_track(1, &track);

    assert_eq!(
        format_tsv(&[exported]),
        "Num\tTitle\tArtists\tTrackID\tURL\n\
         1\tThe Boxer (Live)\tSimon & Garfunkel, Guest\tx1\thttps://open.spotify.com/track/x1\n"
    );
}

#[test]
fn test_format_tsv_empty() {
    assert_eq!(format_tsv(&[]), "Num\tTitle\tArtists\tTrackID\tURL\n");
}

#[tokio::test]
async fn test_write_tsv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(LIKED_SONGS_FILE);
    let track = ExportedTrack::from_track(1, &catalog_track("id", "Artist", "Title"));

    write_tsv(&path, &[track]).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.ends_with("https://open.spotify.com/track/id\n"));
}

#[test]
fn test_playlist_export_file_name() {
    assert_eq!(playlist_export_file_name("abc"), "abc.tsv");
    assert_eq!(playlist_export_file_name(""), "playlist.tsv");
}
