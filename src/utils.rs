use std::collections::BTreeMap;

use rand::{Rng, distr::Alphanumeric};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Artist separators, applied in this order. The artist is cut at each one.
const ARTIST_SEPARATORS: [&str; 4] = [" ft ", " feat ", " & ", " vs "];

/// Characters that are not allowed in renamed file names.
const UNSAFE_FILE_NAME_CHARS: &[char] = &[
    '\0', '\\', '/', ':', '*', '"', '<', '>', '|', '`', '\'', '%', '$', '^', '&', '£',
];

/// Normalizes a track title into a comparable search key.
///
/// Removes every `(...)` span and then every `[...]` span, lower-cases the
/// rest, drops everything outside `[0-9 a-z]` and trims. Returns `None` when
/// there is no input or nothing is left after cleaning.
///
/// # Example
///
/// ```
/// use spotiply::utils::normalize_title;
///
/// let key = normalize_title(Some("One More Time (Radio Edit)"));
/// assert_eq!(key.as_deref(), Some("one more time"));
/// ```
pub fn normalize_title(raw: Option<&str>) -> Option<String> {
    let raw = raw.filter(|r| !r.is_empty())?;
    let stripped = strip_spans(&strip_spans(raw, '(', ')'), '[', ']');
    non_empty(keep_key_chars(&stripped.to_lowercase()))
}

/// Normalizes an artist into a comparable search key.
///
/// Lower-cases the input and keeps only the text before the first
/// featuring/collaboration separator (`ft`, `feat`, `&`, `vs`), then drops
/// everything outside `[0-9 a-z]` and trims. Returns `None` when there is no
/// input or nothing is left after cleaning.
pub fn normalize_artist(raw: Option<&str>) -> Option<String> {
    let raw = raw.filter(|r| !r.is_empty())?;
    let primary = truncate_at_separators(&raw.to_lowercase());
    // removing punctuation can expose a separator ("a f.t b"), cut again
    let cleaned = truncate_at_separators(&keep_key_chars(&primary));
    non_empty(cleaned.trim().to_string())
}

fn truncate_at_separators(artist: &str) -> String {
    ARTIST_SEPARATORS
        .iter()
        .fold(artist.to_string(), |acc, sep| match acc.find(sep) {
            Some(idx) => acc[..idx].to_string(),
            None => acc,
        })
}

/// Removes every `open ... close` span, leftmost first, non-greedy.
/// An opening character without a closing one is kept.
fn strip_spans(input: &str, open: char, close: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(open) {
        match rest[start + open.len_utf8()..].find(close) {
            Some(rel_end) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + open.len_utf8() + rel_end + close.len_utf8()..];
            }
            None => break,
        }
    }

    out.push_str(rest);
    out
}

fn keep_key_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_ascii_lowercase() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Similarity of two strings on a 0-100 scale (normalized Levenshtein).
pub fn similarity(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Returns the most frequent value.
///
/// Ties are broken by the natural ordering of the values (the smallest one
/// wins) so the result does not depend on input order.
pub fn most_frequent<T>(values: &[T]) -> Option<T>
where
    T: Ord + Clone,
{
    let mut counts: BTreeMap<&T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(&T, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((value, count)),
        }
    }

    best.map(|(value, _)| value.clone())
}

/// Canonical decomposition with all combining marks removed ("Beyoncé" -> "Beyonce").
pub fn strip_diacritics(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Removes characters that are unsafe in file names.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !UNSAFE_FILE_NAME_CHARS.contains(c))
        .collect()
}

/// Random token for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Random, unique playlist name used when none is given.
pub fn random_playlist_name() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Extracts the playlist id from an `open.spotify.com` URL or a `spotify:playlist:` URI.
///
/// Anything else is returned unchanged and treated as a bare id.
pub fn playlist_id_from_reference(reference: &str) -> String {
    let reference = reference.trim();

    if let Some(id) = reference.strip_prefix("spotify:playlist:") {
        return id.to_string();
    }

    if let Ok(url) = reqwest::Url::parse(reference) {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();
        if let Some(pos) = segments.iter().position(|s| *s == "playlist") {
            if let Some(id) = segments.get(pos + 1) {
                return id.to_string();
            }
        }
        if let Some(last) = segments.last() {
            return last.to_string();
        }
    }

    reference.to_string()
}
