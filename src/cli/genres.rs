use std::path::Path;

use crate::{
    config::Config,
    error,
    genres::{
        ArtistGenreTable, GenreTaxonomy, TAXONOMY_URL, fetch_taxonomy_page, parse_taxonomy_page,
        refresh_from_archive,
    },
    info, success, warning,
};

use super::{connect, progress_bar, spinner};

/// Scrapes the genre listing page and rewrites the taxonomy file.
pub async fn update_genres(config: &Config) {
    let pb = spinner("Fetching genre list...");
    let html = match fetch_taxonomy_page(TAXONOMY_URL).await {
        Ok(html) => html,
        Err(e) => {
            pb.finish_and_clear();
            error!("{}", e)
        }
    };
    pb.finish_and_clear();

    let scraped = match parse_taxonomy_page(&html) {
        Ok(scraped) => scraped,
        Err(e) => error!("{}", e),
    };
    info!(
        "Found {} top-level genres and {} subgenres",
        scraped.top_level.len(),
        scraped.subgenres.len()
    );

    let taxonomy = GenreTaxonomy::from_scraped(&scraped, config.fuzzy_match_threshold);
    if let Err(e) = taxonomy.persist(&config.genre_taxonomy_path).await {
        error!("Failed to write genre taxonomy: {}", e);
    }

    success!(
        "{} genres written to {}",
        taxonomy.len(),
        config.genre_taxonomy_path.display()
    );
}

/// Adds the artists of a song archive to the artist genre table.
pub async fn refresh_artist_genres(config: &Config, archive: &Path) {
    let path = &config.artist_genre_table_path;
    let mut table = match ArtistGenreTable::load(path, config.artist_match_threshold).await {
        Ok(table) => table,
        Err(e) => error!("Failed to load artist genre table: {}", e),
    };

    let client = connect(config).await;
    let pb = progress_bar("Looking up artists");
    let summary = match refresh_from_archive(
        &client,
        &mut table,
        path,
        archive,
        config.rate_limit_delay,
        &pb,
    )
    .await
    {
        Ok(summary) => summary,
        Err(e) => {
            pb.finish_and_clear();
            error!("{}", e)
        }
    };
    pb.finish_and_clear();

    if summary.failed > 0 {
        warning!("{} artists could not be looked up", summary.failed);
    }
    success!(
        "{} new artists added to {} ({} already known)",
        summary.added,
        path.display(),
        summary.known
    );
}
