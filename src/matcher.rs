//! Matching local tracks against the Spotify catalog.
//!
//! Every track is searched with its normalized title and artist; the first
//! search result is accepted as the match. There is no check that the result
//! really is the same song.

use indicatif::ProgressBar;

use crate::{
    management::{TrackListError, TrackListManager},
    spotify::CatalogClient,
    types::{SPOTIFY_TRACK_URL, SpotifyMatch, Track, TrackObject},
    utils, warning,
};

const SEARCH_LIMIT: u32 = 1;

/// Result of matching one track.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(SpotifyMatch),
    /// The search returned no results.
    NotFound,
    /// Artist or title normalized to nothing; no search was made.
    Skipped,
    /// The search call failed.
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub total: usize,
    pub matched: usize,
    pub not_found: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Tracks left alone because they already carried a match (resume mode).
    pub already_matched: usize,
}

impl MatchSummary {
    pub fn unmatched(&self) -> usize {
        self.not_found + self.skipped + self.failed
    }
}

/// Search query for normalized title and artist.
pub fn build_query(title: &str, artist: &str) -> String {
    format!("{title} artist:{artist}")
}

pub struct TrackMatcher<'a, C: CatalogClient> {
    client: &'a C,
    track_list: &'a TrackListManager,
    checkpoint_every: usize,
    resume: bool,
}

impl<'a, C: CatalogClient> TrackMatcher<'a, C> {
    pub fn new(client: &'a C, track_list: &'a TrackListManager) -> Self {
        Self {
            client,
            track_list,
            checkpoint_every: 0,
            resume: false,
        }
    }

    /// Persist the track list after every `n` processed tracks. 0 disables checkpoints.
    pub fn checkpoint_every(mut self, n: usize) -> Self {
        self.checkpoint_every = n;
        self
    }

    /// Skip tracks that already carry a match.
    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Searches the catalog for a single track.
    pub async fn match_track(&self, track: &Track) -> MatchOutcome {
        let artist = utils::normalize_artist(track.artist.as_deref());
        let title = utils::normalize_title(track.title.as_deref());

        let (Some(artist), Some(title)) = (artist, title) else {
            return MatchOutcome::Skipped;
        };

        let query = build_query(&title, &artist);
        match self.client.search_tracks(&query, SEARCH_LIMIT).await {
            Ok(results) => match results.first().and_then(to_match) {
                Some(found) => MatchOutcome::Matched(found),
                None => MatchOutcome::NotFound,
            },
            Err(e) => MatchOutcome::Failed(e.to_string()),
        }
    }

    /// Matches every track in order and persists the updated list.
    ///
    /// Unmatched tracks lose any previous match and are appended to the
    /// not-found log. Only writing the track list or the log is fatal.
    pub async fn match_all(
        &self,
        tracks: &mut [Track],
        progress: &ProgressBar,
    ) -> Result<MatchSummary, TrackListError> {
        progress.set_length(tracks.len() as u64);
        let mut summary = MatchSummary::default();

        for index in 0..tracks.len() {
            summary.total += 1;
            progress.inc(1);

            if self.resume && tracks[index].matched.is_some() {
                summary.already_matched += 1;
                continue;
            }

            let outcome = self.match_track(&tracks[index]).await;
            let track = &mut tracks[index];

            match outcome {
                MatchOutcome::Matched(found) => {
                    summary.matched += 1;
                    track.matched = Some(found);
                }
                MatchOutcome::NotFound => {
                    summary.not_found += 1;
                    track.matched = None;
                    self.track_list.log_not_found(track).await?;
                }
                MatchOutcome::Skipped => {
                    summary.skipped += 1;
                    track.matched = None;
                    self.track_list.log_not_found(track).await?;
                }
                MatchOutcome::Failed(reason) => {
                    summary.failed += 1;
                    track.matched = None;
                    progress.suspend(|| {
                        warning!("Search failed for {}: {}", track.display_name(), reason)
                    });
                    self.track_list.log_not_found(track).await?;
                }
            }

            if self.checkpoint_every > 0 && (index + 1) % self.checkpoint_every == 0 {
                self.track_list.persist(tracks).await?;
            }
        }

        self.track_list.persist(tracks).await?;
        Ok(summary)
    }
}

fn to_match(result: &TrackObject) -> Option<SpotifyMatch> {
    let id = result.id.clone()?;
    Some(SpotifyMatch {
        url: format!("{SPOTIFY_TRACK_URL}{id}"),
        external_id: id,
        matched_artist: result
            .artists
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_default(),
        matched_title: result.name.clone(),
    })
}
