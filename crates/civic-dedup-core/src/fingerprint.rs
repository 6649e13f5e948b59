//! Document fingerprinting.
//!
//! A [`DocumentFingerprint`] carries four independent hashes so the
//! classifier can tell "same bytes", "same words", and "same kind of
//! document from the same meeting" apart:
//!
//! | Hash | Input |
//! |------|-------|
//! | `file_hash` | raw file bytes |
//! | `content_hash` | [`normalize_text`] of the extracted text |
//! | `structural_hash` | page count, size in whole KB, text longer than 100 chars |
//! | `metadata_hash` | department, document type, meeting date, cleaned title |
//!
//! Everything here is pure. Reading the file is the caller's job.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{DocumentFingerprint, DocumentMetadata};
use crate::normalize::{clean_title, normalize_text, sha256_hex, sorted_json, JsonScalar};

/// Extracted text longer than this counts as "has text" structurally.
pub const TEXT_LENGTH_THRESHOLD: usize = 100;

/// Hash of the normalized text, or `""` when nothing survives normalization.
pub fn content_hash(text: &str) -> String {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return String::new();
    }
    sha256_hex(normalized.as_bytes())
}

/// Hash of the coarse document shape.
pub fn structural_hash(page_count: u32, file_size: u64, text_length: usize) -> String {
    let mut fields = BTreeMap::new();
    fields.insert("page_count", JsonScalar::Int(u64::from(page_count)));
    fields.insert("file_size_kb", JsonScalar::Int(file_size / 1024));
    fields.insert("has_text", JsonScalar::Bool(text_length > TEXT_LENGTH_THRESHOLD));
    sha256_hex(sorted_json(&fields).as_bytes())
}

/// Hash of the metadata fields that stay stable across versions of a document.
///
/// The first of `title`, `subject`, `filename` that is present supplies the
/// cleaned title, even if it cleans down to nothing.
pub fn metadata_hash(metadata: &DocumentMetadata) -> String {
    let department = metadata.department.as_deref().map(lower_trim);
    let document_type = metadata.document_type.as_deref().map(lower_trim);
    let meeting_date = metadata.meeting_date.as_deref().map(lower_trim);
    let title_clean = [&metadata.title, &metadata.subject, &metadata.filename]
        .into_iter()
        .find_map(|field| field.as_deref())
        .map(clean_title)
        .filter(|t| !t.is_empty());

    let mut fields = BTreeMap::new();
    let present = [
        ("department", &department),
        ("document_type", &document_type),
        ("meeting_date", &meeting_date),
        ("title_clean", &title_clean),
    ];
    for (key, value) in present {
        if let Some(value) = value {
            fields.insert(key, JsonScalar::Str(value.as_str()));
        }
    }
    sha256_hex(sorted_json(&fields).as_bytes())
}

fn lower_trim(value: &str) -> String {
    value.to_lowercase().trim().to_string()
}

/// Build the full fingerprint for a document.
///
/// `bytes` is the raw file content; `text` is whatever extraction produced
/// (possibly empty). `file_size` and `text_length` default to the observed
/// byte length and character count when the metadata omits them.
pub fn fingerprint_document(
    bytes: &[u8],
    text: &str,
    metadata: &DocumentMetadata,
    source_path: &str,
    created_at: DateTime<Utc>,
) -> DocumentFingerprint {
    let byte_size = bytes.len() as u64;
    let page_count = metadata.page_count.unwrap_or(0);
    let file_size = metadata.file_size.unwrap_or(byte_size);
    let text_length = metadata
        .text_length
        .unwrap_or_else(|| text.chars().count());

    DocumentFingerprint {
        file_hash: sha256_hex(bytes),
        content_hash: content_hash(text),
        structural_hash: structural_hash(page_count, file_size, text_length),
        metadata_hash: metadata_hash(metadata),
        byte_size,
        page_count,
        created_at,
        source_path: source_path.to_string(),
    }
}
