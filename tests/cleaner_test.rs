mod common;

use std::{collections::BTreeMap, fs, path::Path};

use indicatif::ProgressBar;
use spotiply::{
    genres::{ArtistGenreTable, GenreTaxonomy},
    tags::*,
    types::ArtistGenreEntry,
};
use tempfile::tempdir;

use common::MemoryTagStore;

const FILE: &str = "/music/track.mp3";

fn taxonomy() -> GenreTaxonomy {
    let genres: BTreeMap<String, String> = [
        ("deep house", "house"),
        ("french house", "house"),
        ("filter house", "house"),
        ("big room", "edm"),
        ("trap", "hip-hop"),
        ("top 40", "pop"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    GenreTaxonomy::new(genres, 87)
}

fn artist_table() -> ArtistGenreTable {
    ArtistGenreTable::from_entries(
        [ArtistGenreEntry {
            artist_id: "a1".to_string(),
            artist_name: "Daft Punk".to_string(),
            genres: ["filter house", "french house", "big room"]
                .iter()
                .map(|g| g.to_string())
                .collect(),
        }],
        91,
    )
}

fn fields(artist: &str, title: &str, genre: Option<&str>) -> TagFields {
    TagFields {
        artist: Some(artist.to_string()),
        title: Some(title.to_string()),
        genre: genre.map(str::to_string),
        ..TagFields::default()
    }
}

#[test]
fn test_clean_file_applies_all_rules() {
    let mut tags = fields("Beyoncé", "Déjà Vu", Some("Deep House"));
    tags.recording_date = Some("2001".to_string());
    tags.original_release_date = Some("1999-11-30".to_string());
    let store = MemoryTagStore::default().with_file(FILE, tags);
    let taxonomy = taxonomy();
    let cleaner = TagCleaner::new(store, &taxonomy);

    let outcome = cleaner.clean_file(Path::new(FILE));

    let CleanOutcome::Updated(changes) = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(changes.len(), 5);
    assert!(changes.contains(&TagChange::GenreBackup {
        original: "Deep House".to_string()
    }));

    let written = cleaner.store().fields(FILE);
    assert_eq!(written.artist.as_deref(), Some("Beyonce"));
    assert_eq!(written.title.as_deref(), Some("Deja Vu"));
    assert_eq!(written.genre.as_deref(), Some("house"));
    assert_eq!(written.recording_date.as_deref(), Some("1999-11-30"));
    assert_eq!(written.comment(GENRE_BACKUP_DESCRIPTION), Some("Deep House"));
    assert_eq!(cleaner.store().writes.get(), 1);
}

#[test]
fn test_second_clean_does_not_write() {
    let mut tags = fields("Beyoncé", "Crazy in Love", Some("Top 40"));
    tags.original_release_date = Some("2003".to_string());
    let store = MemoryTagStore::default().with_file(FILE, tags);
    let taxonomy = taxonomy();
    let cleaner = TagCleaner::new(store, &taxonomy);

    assert!(matches!(
        cleaner.clean_file(Path::new(FILE)),
        CleanOutcome::Updated(_)
    ));
    assert_eq!(cleaner.clean_file(Path::new(FILE)), CleanOutcome::Unchanged);
    assert_eq!(cleaner.store().writes.get(), 1);
}

#[test]
fn test_canonical_genre_is_left_alone() {
    let store = MemoryTagStore::default().with_file(FILE, fields("Artist", "Title", Some("House")));
    let taxonomy = taxonomy();
    let cleaner = TagCleaner::new(store, &taxonomy);

    assert_eq!(cleaner.clean_file(Path::new(FILE)), CleanOutcome::Unchanged);
    assert_eq!(cleaner.store().writes.get(), 0);
}

#[test]
fn test_unknown_genre_is_left_alone() {
    let store =
        MemoryTagStore::default().with_file(FILE, fields("Artist", "Title", Some("Zydeco")));
    let taxonomy = taxonomy();
    let cleaner = TagCleaner::new(store, &taxonomy);

    assert_eq!(cleaner.clean_file(Path::new(FILE)), CleanOutcome::Unchanged);
}

#[test]
fn test_genre_backup_is_never_overwritten() {
    let mut tags = fields("Artist", "Title", Some("Trap"));
    tags.comments.push(TagComment {
        description: GENRE_BACKUP_DESCRIPTION.to_string(),
        text: "Original".to_string(),
    });
    let store = MemoryTagStore::default().with_file(FILE, tags);
    let taxonomy = taxonomy();
    let cleaner = TagCleaner::new(store, &taxonomy);

    let outcome = cleaner.clean_file(Path::new(FILE));
    assert_eq!(
        outcome,
        CleanOutcome::Updated(vec![TagChange::Genre {
            from: "Trap".to_string(),
            to: "hip-hop".to_string(),
        }])
    );

    let written = cleaner.store().fields(FILE);
    assert_eq!(written.comment(GENRE_BACKUP_DESCRIPTION), Some("Original"));
    assert_eq!(written.comments.len(), 1);
}

#[test]
fn test_dry_run_does_not_write() {
    let store =
        MemoryTagStore::default().with_file(FILE, fields("Artist", "Title", Some("Deep House")));
    let taxonomy = taxonomy();
    let cleaner = TagCleaner::new(store, &taxonomy).dry_run(true);

    assert!(matches!(
        cleaner.clean_file(Path::new(FILE)),
        CleanOutcome::Updated(_)
    ));
    assert_eq!(cleaner.store().writes.get(), 0);
    assert_eq!(
        cleaner.store().fields(FILE).genre.as_deref(),
        Some("Deep House")
    );
}

#[test]
fn test_missing_tag_fails_the_file() {
    let taxonomy = taxonomy();
    let cleaner = TagCleaner::new(MemoryTagStore::default(), &taxonomy);

    assert!(matches!(
        cleaner.clean_file(Path::new("/music/missing.mp3")),
        CleanOutcome::Failed(_)
    ));
}

#[test]
fn test_artist_mode_uses_side_table() {
    let store = MemoryTagStore::default().with_file(
        FILE,
        fields("Daft Punk feat. Pharrell", "Get Lucky", Some("Electronic")),
    );
    let taxonomy = taxonomy();
    let table = artist_table();
    let cleaner = TagCleaner::new(store, &taxonomy).with_artist_genres(&table);

    assert!(matches!(
        cleaner.clean_file(Path::new(FILE)),
        CleanOutcome::Updated(_)
    ));
    assert_eq!(cleaner.store().fields(FILE).genre.as_deref(), Some("house"));

    assert_eq!(cleaner.clean_file(Path::new(FILE)), CleanOutcome::Unchanged);
    assert_eq!(cleaner.store().writes.get(), 1);
}

#[test]
fn test_artist_mode_unknown_artist() {
    let store = MemoryTagStore::default()
        .with_file(FILE, fields("Somebody Else", "Song", Some("Deep House")));
    let taxonomy = taxonomy();
    let table = artist_table();
    let cleaner = TagCleaner::new(store, &taxonomy).with_artist_genres(&table);

    assert_eq!(cleaner.clean_file(Path::new(FILE)), CleanOutcome::Unchanged);
}

#[test]
fn test_genre_change_is_case_insensitive() {
    let taxonomy = taxonomy();
    let table = artist_table();
    let store = MemoryTagStore::default();
    let cleaner = TagCleaner::new(store, &taxonomy).with_artist_genres(&table);

    let (_, changes) = cleaner.plan(&fields("Daft Punk", "Da Funk", Some("HOUSE")));
    assert!(changes.is_empty());
}

#[test]
fn test_clean_directory_continues_after_failures() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.mp3");
    fs::write(&a, b"").unwrap();
    fs::write(dir.path().join("b.MP3"), b"").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("c.mp3"), b"").unwrap();
    fs::write(dir.path().join("notes.txt"), b"").unwrap();

    let store = MemoryTagStore::default()
        .with_file(a.to_str().unwrap(), fields("Artist", "Title", Some("Deep House")));
    let taxonomy = taxonomy();
    let cleaner = TagCleaner::new(store, &taxonomy);

    let summary = cleaner.clean(dir.path(), &ProgressBar::hidden());

    assert_eq!(
        summary,
        CleanSummary {
            files: 3,
            updated: 1,
            unchanged: 0,
            failed: 2,
        }
    );
}

#[test]
fn test_collect_mp3_files_is_recursive_and_sorted() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("z")).unwrap();
    fs::write(dir.path().join("z").join("1.mp3"), b"").unwrap();
    fs::write(dir.path().join("b.mp3"), b"").unwrap();
    fs::write(dir.path().join("a.flac"), b"").unwrap();

    let files = collect_mp3_files(dir.path());

    assert_eq!(
        files,
        vec![dir.path().join("b.mp3"), dir.path().join("z").join("1.mp3")]
    );
}

#[test]
fn test_target_file_name() {
    assert_eq!(
        target_file_name(&fields("AC/DC", "Back: In Black", None)).as_deref(),
        Some("ACDC - Back In Black.mp3")
    );
    assert_eq!(
        target_file_name(&TagFields {
            artist: Some("Artist".to_string()),
            ..TagFields::default()
        }),
        None
    );
}

#[test]
fn test_rename_never_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.mp3");
    let b = dir.path().join("b.mp3");
    fs::write(&a, b"first").unwrap();
    fs::write(&b, b"second").unwrap();

    let store = MemoryTagStore::default()
        .with_file(a.to_str().unwrap(), fields("Daft Punk", "One More Time", None))
        .with_file(b.to_str().unwrap(), fields("Daft Punk", "One More Time", None));

    let outcomes = rename_mp3_files(&store, dir.path(), false);

    let target = dir.path().join("Daft Punk - One More Time.mp3");
    assert_eq!(
        outcomes,
        vec![
            RenameOutcome::Renamed {
                from: a,
                to: target.clone(),
            },
            RenameOutcome::Skipped {
                path: b.clone(),
                reason: "target exists".to_string(),
            },
        ]
    );
    assert_eq!(fs::read(&target).unwrap(), b"first");
    assert_eq!(fs::read(&b).unwrap(), b"second");
}

#[test]
fn test_rename_dry_run_keeps_files() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("01 track.mp3");
    fs::write(&file, b"").unwrap();
    fs::write(dir.path().join("02 track.mp3"), b"").unwrap();

    let store = MemoryTagStore::default()
        .with_file(file.to_str().unwrap(), fields("Daft Punk", "Da Funk", None));

    let outcomes = rename_mp3_files(&store, dir.path(), true);

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        outcomes[0],
        RenameOutcome::Renamed {
            from: file.clone(),
            to: dir.path().join("Daft Punk - Da Funk.mp3"),
        }
    );
    assert!(matches!(outcomes[1], RenameOutcome::Skipped { .. }));
    assert!(file.exists());

    rename_mp3_files(&store, dir.path(), false);
    assert!(dir.path().join("Daft Punk - Da Funk.mp3").exists());
    assert!(!file.exists());
}
