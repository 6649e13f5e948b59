//! Core data models used throughout civic-dedup.
//!
//! Fingerprint and signature records are persisted by the stores with the
//! field names used by existing deduplication tables (`size` for the byte
//! size, ISO-8601 `created_at`). Missing fields default; unknown fields
//! are dropped on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Confidence at or above which an ingestion pipeline rejects a document
/// outright as already processed.
pub const REJECT_CONFIDENCE: f64 = 0.8;

/// Metadata supplied alongside an ingested document.
///
/// Only the fields the fingerprinter reads are modelled. `file_size` and
/// `text_length` fall back to the actual byte length and extracted text
/// length when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    pub page_count: Option<u32>,
    pub file_size: Option<u64>,
    pub text_length: Option<usize>,
    pub department: Option<String>,
    pub document_type: Option<String>,
    pub meeting_date: Option<String>,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub filename: Option<String>,
}

/// Multi-part fingerprint of one ingested file.
///
/// All four hashes are pure functions of the file bytes, extracted text,
/// and metadata. `created_at` is the only clock-dependent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFingerprint {
    /// SHA-256 of the raw file bytes.
    pub file_hash: String,
    /// SHA-256 of the normalized extracted text, empty when there is no text.
    #[serde(default)]
    pub content_hash: String,
    /// SHA-256 of page count, KB size bucket, and the has-text flag.
    #[serde(default)]
    pub structural_hash: String,
    /// SHA-256 of department, document type, meeting date, and cleaned title.
    #[serde(default)]
    pub metadata_hash: String,
    #[serde(rename = "size", alias = "byte_size", default)]
    pub byte_size: u64,
    #[serde(default)]
    pub page_count: u32,
    #[serde(with = "iso_datetime", default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub source_path: String,
}

impl DocumentFingerprint {
    /// Store key: the 16-character prefix of `file_hash`.
    pub fn id(&self) -> String {
        crate::store::record_id(&self.file_hash)
    }
}

/// A structured project mention extracted from a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    #[serde(deserialize_with = "nullable_string")]
    pub project_id: String,
    #[serde(deserialize_with = "nullable_string")]
    pub location: String,
    #[serde(deserialize_with = "nullable_string")]
    pub request: String,
    #[serde(deserialize_with = "nullable_string")]
    pub meeting_date: String,
    pub metadata: ProjectMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMetadata {
    #[serde(deserialize_with = "nullable_string")]
    pub department: String,
}

/// Normalized identity of a project record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSignature {
    pub project_id: String,
    pub location_normalized: String,
    pub request_fingerprint: String,
    pub meeting_date: String,
    pub department: String,
    pub signature_hash: String,
}

impl ProjectSignature {
    /// Store key: the 16-character prefix of `signature_hash`.
    pub fn id(&self) -> String {
        crate::store::record_id(&self.signature_hash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateType {
    File,
    Content,
    Project,
    PotentialAmendment,
    Unique,
}

impl DuplicateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateType::File => "file",
            DuplicateType::Content => "content",
            DuplicateType::Project => "project",
            DuplicateType::PotentialAmendment => "potential_amendment",
            DuplicateType::Unique => "unique",
        }
    }
}

impl std::fmt::Display for DuplicateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stored record a classification matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchedRecord {
    Document(DocumentFingerprint),
    Project(ProjectSignature),
}

impl From<DocumentFingerprint> for MatchedRecord {
    fn from(fingerprint: DocumentFingerprint) -> Self {
        MatchedRecord::Document(fingerprint)
    }
}

impl From<ProjectSignature> for MatchedRecord {
    fn from(signature: ProjectSignature) -> Self {
        MatchedRecord::Project(signature)
    }
}

/// Outcome of a duplicate check. Returned to the caller, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeduplicationResult {
    pub is_duplicate: bool,
    pub duplicate_type: DuplicateType,
    pub matched_entry: Option<MatchedRecord>,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub reasons: Vec<String>,
}

/// What an ingestion pipeline should do with a checked document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Admission {
    /// Already processed; skip it.
    Reject,
    /// New, but close to an existing record; flag for human review.
    Review,
    Accept,
}

impl DeduplicationResult {
    pub fn unique() -> Self {
        Self {
            is_duplicate: false,
            duplicate_type: DuplicateType::Unique,
            matched_entry: None,
            confidence: 0.0,
            reasons: Vec::new(),
        }
    }

    pub fn admission(&self) -> Admission {
        if self.is_duplicate && self.confidence >= REJECT_CONFIDENCE {
            Admission::Reject
        } else if self.duplicate_type == DuplicateType::PotentialAmendment {
            Admission::Review
        } else {
            Admission::Accept
        }
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// ISO-8601 timestamps. Writes RFC 3339 in UTC; reads RFC 3339 or a naive
/// `YYYY-MM-DDTHH:MM:SS[.ffffff]` timestamp, taken as UTC.
mod iso_datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
