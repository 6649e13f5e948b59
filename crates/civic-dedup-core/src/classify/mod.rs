//! Duplicate classification.
//!
//! Both classifiers are ordered tables of pure rules. Each rule looks at
//! the candidate and every stored record and either produces a result or
//! passes; the first rule that produces one wins, and a candidate no rule
//! claims is `unique`.
//!
//! Within a rule, when several stored records qualify, the one with the
//! highest confidence is reported. Equal confidences go to the earliest
//! `created_at` (documents) and then to the smallest hash, so the outcome
//! never depends on the order a store returns its records in.

pub mod document;
pub mod project;

use serde::{Deserialize, Serialize};

use crate::models::{DeduplicationResult, DuplicateType, MatchedRecord};

pub use document::classify_document;
pub use project::classify_project;

/// Scores are sums and products of decimal weights; compare them with a
/// little slack so `0.5 + 0.3` meets an `0.8` threshold.
const SCORE_EPSILON: f64 = 1e-9;

/// Whether `score` reaches `threshold`.
pub(crate) fn meets(score: f64, threshold: f64) -> bool {
    score + SCORE_EPSILON >= threshold
}

/// Decision thresholds for both classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum confidence for a content-hash match to count as a duplicate.
    pub content_duplicate: f64,
    /// Minimum composite score for a potential amendment.
    pub amendment: f64,
    /// Minimum weighted score for a project duplicate.
    pub project_duplicate: f64,
    /// Minimum `min/max` byte-size ratio for "similar size".
    pub size_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            content_duplicate: 0.8,
            amendment: 0.7,
            project_duplicate: 0.8,
            size_ratio: 0.9,
        }
    }
}

impl Thresholds {
    /// Each threshold as `(name, value)`, for validation and display.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("content_duplicate", self.content_duplicate),
            ("amendment", self.amendment),
            ("project_duplicate", self.project_duplicate),
            ("size_ratio", self.size_ratio),
        ]
    }
}

/// A stored record that satisfied a rule, with its score.
#[derive(Debug, Clone)]
pub(crate) struct Scored<'a, R> {
    pub record: &'a R,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

impl<R: Clone + Into<MatchedRecord>> Scored<'_, R> {
    pub fn into_result(self, duplicate_type: DuplicateType, is_duplicate: bool) -> DeduplicationResult {
        DeduplicationResult {
            is_duplicate,
            duplicate_type,
            matched_entry: Some(self.record.clone().into()),
            confidence: self.confidence,
            reasons: self.reasons,
        }
    }
}
