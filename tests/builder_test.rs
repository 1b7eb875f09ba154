mod common;

use std::time::Duration;

use indicatif::ProgressBar;
use spotiply::{
    builder::*,
    management::TrackListManager,
    matcher::TrackMatcher,
    types::{SpotifyMatch, Track},
};
use tempfile::tempdir;

use common::{FakeCatalog, catalog_track, playlist};

fn matched(id: &str) -> Track {
    let mut track = Track::new("Artist", id);
    track.matched = Some(SpotifyMatch {
        external_id: id.to_string(),
        matched_artist: "Artist".to_string(),
        matched_title: id.to_string(),
        url: format!("https://open.spotify.com/track/{id}"),
    });
    track
}

fn matched_tracks(count: usize) -> Vec<Track> {
    (0..count).map(|i| matched(&format!("id{i:02}"))).collect()
}

#[test]
fn test_collect_track_ids_dedupes_in_order() {
    let tracks = vec![
        matched("b"),
        Track::new("Unmatched", "Song"),
        matched("a"),
        matched("b"),
    ];

    assert_eq!(collect_track_ids(&tracks), vec!["b", "a"]);
    assert_eq!(
        playlist_stats(&tracks),
        PlaylistStats {
            tracks: 4,
            matched: 3,
            unique: 2,
        }
    );
}

#[test]
fn test_track_uri() {
    assert_eq!(track_uri("abc"), "spotify:track:abc");
}

#[tokio::test]
async fn test_build_adds_tracks_in_batches() {
    let catalog = FakeCatalog {
        created_id: "pl1".to_string(),
        ..FakeCatalog::default()
    };
    let builder = PlaylistBuilder::new(&catalog, 10, Duration::ZERO);

    let id = builder
        .build("mix", &matched_tracks(25), &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(id, "pl1");

    let created = catalog.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "mix");
    assert!(!created[0].public);

    let added = catalog.added();
    let sizes: Vec<usize> = added.iter().map(|(_, uris)| uris.len()).collect();
    assert_eq!(sizes, vec![10, 10, 5]);
    assert!(added.iter().all(|(playlist, _)| playlist == "pl1"));
    assert_eq!(added[0].1[0], "spotify:track:id00");
    assert_eq!(added[2].1[4], "spotify:track:id24");
}

#[tokio::test]
async fn test_build_without_matches_creates_empty_playlist() {
    let catalog = FakeCatalog {
        created_id: "pl1".to_string(),
        ..FakeCatalog::default()
    };
    let builder = PlaylistBuilder::new(&catalog, 10, Duration::ZERO);

    let tracks = vec![Track::new("Nobody", "Nothing")];
    builder
        .build("empty", &tracks, &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(catalog.created().len(), 1);
    assert!(catalog.added().is_empty());
}

#[tokio::test]
async fn test_build_falls_back_to_playlist_name() {
    let catalog = FakeCatalog {
        existing_playlists: vec![
            playlist("other", "something else"),
            playlist("first", "mix"),
            playlist("second", "mix"),
        ],
        ..FakeCatalog::default()
    };
    let builder = PlaylistBuilder::new(&catalog, 10, Duration::ZERO);

    let id = builder
        .build("mix", &matched_tracks(1), &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(id, "first");
    assert_eq!(catalog.added()[0].0, "first");
}

#[tokio::test]
async fn test_build_reports_missing_playlist() {
    let catalog = FakeCatalog::default();
    let builder = PlaylistBuilder::new(&catalog, 10, Duration::ZERO);

    let result = builder
        .build("mix", &matched_tracks(1), &ProgressBar::hidden())
        .await;

    assert!(matches!(result, Err(BuildError::PlaylistNotFound(name)) if name == "mix"));
}

#[tokio::test]
async fn test_build_stops_at_failing_batch() {
    let catalog = FakeCatalog {
        created_id: "pl1".to_string(),
        fail_adds_after: Some(1),
        ..FakeCatalog::default()
    };
    let builder = PlaylistBuilder::new(&catalog, 10, Duration::ZERO);

    let result = builder
        .build("mix", &matched_tracks(25), &ProgressBar::hidden())
        .await;

    assert!(matches!(result, Err(BuildError::Spotify(_))));
    assert_eq!(catalog.added().len(), 1);
}

#[tokio::test]
async fn test_batch_size_is_at_least_one() {
    let catalog = FakeCatalog {
        created_id: "pl1".to_string(),
        ..FakeCatalog::default()
    };
    let builder = PlaylistBuilder::new(&catalog, 0, Duration::ZERO);

    builder
        .build("mix", &matched_tracks(2), &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(catalog.added().len(), 2);
}

#[tokio::test]
async fn test_match_then_build() {
    let dir = tempdir().unwrap();
    let list = TrackListManager::new(dir.path().join("daft.json"));
    let catalog = FakeCatalog {
        created_id: "daft".to_string(),
        ..FakeCatalog::default()
    }
    .with_result(
        "one more time artist:daft punk",
        catalog_track("omt", "Daft Punk", "One More Time"),
    )
    .with_result(
        "around the world artist:daft punk",
        catalog_track("atw", "Daft Punk", "Around the World"),
    );

    let mut tracks = vec![
        Track::new("Daft Punk", "One More Time (Radio Edit)"),
        Track::new("Daft Punk", "Unreleased Demo"),
        Track::new("Daft Punk feat. Romanthony", "One More Time"),
        Track::new("Daft Punk", "Around the World [Live]"),
    ];

    let summary = TrackMatcher::new(&catalog, &list)
        .match_all(&mut tracks, &ProgressBar::hidden())
        .await
        .unwrap();
    assert_eq!(summary.matched, 3);
    assert_eq!(summary.not_found, 1);

    PlaylistBuilder::new(&catalog, 10, Duration::ZERO)
        .build("daft", &tracks, &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(
        catalog.added(),
        vec![(
            "daft".to_string(),
            vec![
                "spotify:track:omt".to_string(),
                "spotify:track:atw".to_string(),
            ],
        )]
    );
}
