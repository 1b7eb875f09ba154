use reqwest::{Client, header};
use scraper::{Html, Selector};

use super::TaxonomyError;

pub const TAXONOMY_URL: &str = "https://www.chosic.com/list-of-music-genres/";

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:52.0) Gecko/20100101 Firefox/52.0";

/// Genre terms as they appear on the taxonomy page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedTaxonomy {
    pub top_level: Vec<String>,
    pub subgenres: Vec<String>,
}

pub async fn fetch_taxonomy_page(url: &str) -> Result<String, TaxonomyError> {
    let client = Client::new();
    let html = client
        .get(url)
        .header(header::USER_AGENT, USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(html)
}

/// Extracts top-level genres (`li.genre-term-basic`) and subgenres
/// (the link text of `li.capital-letter.genre-term`), lower-cased.
///
/// A page without any subgenre is rejected, so a changed page layout never
/// produces an empty taxonomy.
pub fn parse_taxonomy_page(html: &str) -> Result<ScrapedTaxonomy, TaxonomyError> {
    let document = Html::parse_document(html);
    let top_selector = selector("li.genre-term-basic")?;
    let sub_selector = selector("li.capital-letter.genre-term")?;
    let link_selector = selector("a")?;

    let top_level = document
        .select(&top_selector)
        .map(|el| el.text().collect::<String>().trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect();

    let subgenres = document
        .select(&sub_selector)
        .filter_map(|el| el.select(&link_selector).next())
        .map(|a| a.text().collect::<String>().trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect();

    let scraped = ScrapedTaxonomy {
        top_level,
        subgenres,
    };
    if scraped.subgenres.is_empty() {
        return Err(TaxonomyError::EmptyPage);
    }
    Ok(scraped)
}

fn selector(css: &str) -> Result<Selector, TaxonomyError> {
    Selector::parse(css).map_err(|e| TaxonomyError::Selector(e.to_string()))
}
