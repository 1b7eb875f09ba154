use std::{collections::HashMap, path::PathBuf, time::Duration};

use spotiply::config::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = Config::from_lookup(lookup(&[("SPOTIPLY_DATA_DIR", "/data")])).unwrap();

    assert_eq!(config.data_dir, PathBuf::from("/data"));
    assert_eq!(
        config.credentials_path,
        PathBuf::from("/data/credentials.json")
    );
    assert_eq!(config.genre_taxonomy_path, PathBuf::from("/data/genres.json"));
    assert_eq!(
        config.artist_genre_table_path,
        PathBuf::from("/data/artist_genres.csv")
    );
    assert_eq!(config.fuzzy_match_threshold, 87);
    assert_eq!(config.artist_match_threshold, 91);
    assert_eq!(config.playlist_batch_size, 10);
    assert_eq!(config.rate_limit_delay, Duration::from_secs(1));
    assert_eq!(config.checkpoint_every, 0);
    assert_eq!(config.api_url, "https://api.spotify.com/v1");
    assert_eq!(config.token_path(), PathBuf::from("/data/token.json"));
    assert_eq!(
        config.track_list_path("mix"),
        PathBuf::from("/data/mix.json")
    );
}

#[test]
fn test_overrides() {
    let config = Config::from_lookup(lookup(&[
        ("SPOTIPLY_DATA_DIR", "/data"),
        ("SPOTIPLY_GENRES", "/elsewhere/genres.json"),
        ("SPOTIPLY_FUZZY_THRESHOLD", "80"),
        ("SPOTIPLY_ARTIST_THRESHOLD", " 95 "),
        ("SPOTIPLY_PLAYLIST_BATCH_SIZE", "100"),
        ("SPOTIPLY_RATE_LIMIT_MS", "250"),
        ("SPOTIPLY_CHECKPOINT_EVERY", "20"),
        ("SPOTIFY_API_URL", "http://127.0.0.1:9000/v1/"),
    ]))
    .unwrap();

    assert_eq!(
        config.genre_taxonomy_path,
        PathBuf::from("/elsewhere/genres.json")
    );
    assert_eq!(
        config.credentials_path,
        PathBuf::from("/data/credentials.json")
    );
    assert_eq!(config.fuzzy_match_threshold, 80);
    assert_eq!(config.artist_match_threshold, 95);
    assert_eq!(config.playlist_batch_size, 100);
    assert_eq!(config.rate_limit_delay, Duration::from_millis(250));
    assert_eq!(config.checkpoint_every, 20);
    assert_eq!(config.api_url, "http://127.0.0.1:9000/v1");
}

#[test]
fn test_invalid_number() {
    let result = Config::from_lookup(lookup(&[("SPOTIPLY_RATE_LIMIT_MS", "fast")]));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidNumber { key, value })
            if key == "SPOTIPLY_RATE_LIMIT_MS" && value == "fast"
    ));
}

#[test]
fn test_threshold_out_of_range() {
    let result = Config::from_lookup(lookup(&[("SPOTIPLY_FUZZY_THRESHOLD", "101")]));
    assert!(matches!(
        result,
        Err(ConfigError::ThresholdOutOfRange { value: 101, .. })
    ));
}

#[test]
fn test_zero_batch_size() {
    let result = Config::from_lookup(lookup(&[("SPOTIPLY_PLAYLIST_BATCH_SIZE", "0")]));
    assert!(matches!(result, Err(ConfigError::Zero { .. })));
}

#[test]
fn test_load_env_file() {
    let dir = tempfile::tempdir().unwrap();

    assert!(!load_env_file(&dir.path().join("missing.env")));

    let malformed = dir.path().join("malformed.env");
    std::fs::write(&malformed, "this is not valid\n").unwrap();
    assert!(!load_env_file(&malformed));

    let valid = dir.path().join(".env");
    std::fs::write(&valid, "SPOTIPLY_ENV_FILE_TEST=loaded\n").unwrap();
    assert!(load_env_file(&valid));
    assert_eq!(
        std::env::var("SPOTIPLY_ENV_FILE_TEST").as_deref(),
        Ok("loaded")
    );
}
