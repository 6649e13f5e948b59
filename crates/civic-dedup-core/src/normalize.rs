//! Text normalization and hashing primitives.
//!
//! Every hash in civic-dedup is a SHA-256 hex digest over either raw bytes
//! or a normalized string. The normalizers here decide hash equality, so
//! they must stay byte-for-byte stable across releases.
//!
//! Composite hashes are computed over a sorted-key JSON rendering that
//! matches `json.dumps(obj, sort_keys=True)` output (`", "` and `": "`
//! separators, ASCII-only escapes). Only that rendering is shared with
//! fingerprint tables written by earlier ingestion tooling; a legacy
//! `content_hash` can differ from ours for the same text, because
//! [`normalize_text`] collapses whitespace a second time after stripping
//! punctuation and `\w` here is the `regex` crate's Unicode class. Tables
//! written by that tooling still load, but their content hashes should be
//! recomputed before relying on content matches against them.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());
static DATE_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}[-/]\d{1,2}[-/]\d{2,4}").unwrap());
static DOC_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(pdf|doc|docx)$").unwrap());
static STREET_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(street|st|avenue|ave|road|rd|drive|dr|lane|ln|boulevard|blvd)\b").unwrap()
});
static DIRECTIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(north|south|east|west|n|s|e|w)\b").unwrap());

/// Words ignored when fingerprinting a free-text project request.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should",
];

/// Words of this many characters or fewer are not significant.
const MIN_SIGNIFICANT_WORD_CHARS: usize = 2;

/// SHA-256 hex digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}

/// Normalize extracted text for content hashing.
///
/// Lower-cases, collapses whitespace runs, strips everything that is not a
/// word character or whitespace, then collapses and trims again so that
/// removed punctuation never leaves a double space behind. The result is a
/// fixed point: `normalize_text(normalize_text(t)) == normalize_text(t)`.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let collapsed = collapse_whitespace(&lowered);
    let stripped = NON_WORD.replace_all(&collapsed, "");
    collapse_whitespace(&stripped).trim().to_string()
}

/// Clean a title, subject, or filename for metadata hashing.
///
/// Drops date-like substrings (`3/1/2024`, `03-01-24`) and a trailing
/// `.pdf`/`.doc`/`.docx`, then turns remaining punctuation into spaces.
pub fn clean_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let undated = DATE_LIKE.replace_all(&lowered, "");
    let bare = DOC_EXTENSION.replace(&undated, "");
    let spaced = NON_WORD.replace_all(&bare, " ");
    collapse_whitespace(&spaced).trim().to_string()
}

/// Normalize a street location: no street-type suffixes, directionals,
/// punctuation, or case.
pub fn normalize_location(location: &str) -> String {
    let lowered = location.trim().to_lowercase();
    let no_suffix = STREET_SUFFIX.replace_all(&lowered, "");
    let no_direction = DIRECTIONAL.replace_all(&no_suffix, "");
    let stripped = NON_WORD.replace_all(&no_direction, "");
    collapse_whitespace(&stripped).trim().to_string()
}

/// Significant words of a request, sorted so word order never matters.
///
/// Duplicated words are kept; a request that repeats a term differs from
/// one that mentions it once.
pub fn significant_words(request: &str) -> Vec<String> {
    let lowered = request.trim().to_lowercase();
    let mut words: Vec<String> = WORD
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(w) && w.chars().count() > MIN_SIGNIFICANT_WORD_CHARS)
        .map(str::to_string)
        .collect();
    words.sort();
    words
}

/// A scalar in a sorted-key JSON object.
#[derive(Debug, Clone, Copy)]
pub(crate) enum JsonScalar<'a> {
    Str(&'a str),
    Int(u64),
    Bool(bool),
}

/// Render a flat object with sorted keys, `", "` / `": "` separators and
/// ASCII-only string escapes.
pub(crate) fn sorted_json(fields: &BTreeMap<&str, JsonScalar<'_>>) -> String {
    let body = fields
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                JsonScalar::Str(s) => quote(s),
                JsonScalar::Int(n) => n.to_string(),
                JsonScalar::Bool(b) => b.to_string(),
            };
            format!("{}: {}", quote(key), rendered)
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", body)
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
    out
}
