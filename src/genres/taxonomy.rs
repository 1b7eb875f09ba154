use std::{collections::BTreeMap, path::Path};

use crate::{types::GenreEntry, utils};

use super::{TaxonomyError, scrape::ScrapedTaxonomy};

const ELECTRONIC: &str = "electronic";
const HIP_HOP: &str = "hip hop";
const HIP_HOP_CANONICAL: &str = "hip-hop";

/// Substring rules for subgenres of "electronic". The first rule whose
/// needle is part of the key wins.
const ELECTRONIC_RULES: &[(&str, &str)] = &[
    ("psytrance", "psytrance"),
    ("trance", "trance"),
    ("techno", "techno"),
    ("hardstyle", "hardstyle"),
    ("dance", "dance"),
    ("edm", "edm"),
    ("big room", "edm"),
    ("complextro", "edm"),
    ("brostep", "edm"),
    ("moombahton", "edm"),
];

/// Keys that the taxonomy page does not list.
const MANUAL_ENTRIES: &[(&str, &str)] = &[("top 40", "pop"), ("club", "club")];

/// Mapping from (case-folded) subgenre to parent genre.
#[derive(Debug, Clone)]
pub struct GenreTaxonomy {
    genres: BTreeMap<String, String>,
    threshold: u8,
}

impl GenreTaxonomy {
    /// Wraps an existing mapping. Keys are case-folded and trimmed.
    pub fn new(genres: BTreeMap<String, String>, threshold: u8) -> Self {
        let genres = genres
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Self { genres, threshold }
    }

    /// Builds the full taxonomy from a scraped page: parent assignment, patch
    /// rules, hip-hop spelling and the manual entries.
    pub fn from_scraped(scraped: &ScrapedTaxonomy, threshold: u8) -> Self {
        let mut genres = assign_parents(&scraped.top_level, &scraped.subgenres);
        apply_patches(&mut genres);
        finalize(&mut genres);
        Self { genres, threshold }
    }

    pub async fn load(path: &Path, threshold: u8) -> Result<Self, TaxonomyError> {
        let content = async_fs::read_to_string(path)
            .await
            .map_err(|source| TaxonomyError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let genres: BTreeMap<String, String> = serde_json::from_str(&content)?;
        Ok(Self::new(genres, threshold))
    }

    pub async fn persist(&self, path: &Path) -> Result<(), TaxonomyError> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|source| TaxonomyError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let json = serde_json::to_string_pretty(&self.genres)?;
        async_fs::write(path, json)
            .await
            .map_err(|source| TaxonomyError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn get(&self, subgenre: &str) -> Option<&str> {
        self.genres
            .get(&subgenre.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = GenreEntry> + '_ {
        self.genres.iter().map(|(k, v)| GenreEntry {
            subgenre: k.clone(),
            parent_genre: v.clone(),
        })
    }

    /// Whether `genre` is one of the parent genres the taxonomy maps to.
    pub fn is_parent(&self, genre: &str) -> bool {
        let genre = genre.trim().to_lowercase();
        !genre.is_empty() && self.genres.values().any(|v| v.to_lowercase() == genre)
    }

    /// Parent genre of `genre`.
    ///
    /// Exact key lookup first. When that misses or has no parent, every key
    /// with a similarity of at least the threshold is a candidate, and the
    /// parent shared by most candidates wins (ties go to the alphabetically
    /// first parent).
    pub fn lookup(&self, genre: &str) -> Option<String> {
        let key = genre.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        // a known subgenre without parent still gets a fuzzy parent
        if let Some(parent) = self.genres.get(&key).and_then(|p| non_empty(p)) {
            return Some(parent);
        }

        let parents: Vec<String> = self
            .genres
            .iter()
            .filter(|(candidate, _)| utils::similarity(&key, candidate) >= self.threshold)
            .filter_map(|(_, parent)| non_empty(parent))
            .collect();

        utils::most_frequent(&parents)
    }
}

fn non_empty(parent: &str) -> Option<String> {
    let parent = parent.trim();
    if parent.is_empty() {
        None
    } else {
        Some(parent.to_string())
    }
}

/// Walks the subgenres in page order; a subgenre that is itself a top-level
/// genre becomes the parent of everything after it.
fn assign_parents(top_level: &[String], subgenres: &[String]) -> BTreeMap<String, String> {
    let mut genres = BTreeMap::new();
    let mut current = String::new();

    for subgenre in subgenres {
        let subgenre = subgenre.trim().to_lowercase();
        if top_level.iter().any(|t| t.trim().to_lowercase() == subgenre) {
            current = subgenre.clone();
        }
        genres.insert(subgenre, current.clone());
    }

    genres
}

fn apply_patches(genres: &mut BTreeMap<String, String>) {
    for (key, parent) in genres.iter_mut() {
        let original = parent.trim().to_lowercase();
        let is_electronic = original == ELECTRONIC;

        if key.contains("house") && is_electronic {
            *parent = "house".to_string();
        }

        if key.contains("disco") {
            *parent = "disco".to_string();
        } else if is_electronic {
            if let Some((_, to)) = ELECTRONIC_RULES
                .iter()
                .find(|(needle, _)| key.contains(needle))
            {
                *parent = to.to_string();
            }
        }
    }
}

fn finalize(genres: &mut BTreeMap<String, String>) {
    for parent in genres.values_mut() {
        if parent == HIP_HOP {
            *parent = HIP_HOP_CANONICAL.to_string();
        }
    }

    for (key, parent) in MANUAL_ENTRIES {
        genres.insert(key.to_string(), parent.to_string());
    }
}
