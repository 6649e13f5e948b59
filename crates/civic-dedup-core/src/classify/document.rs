//! Document duplicate classifier.
//!
//! | Order | Rule | Outcome |
//! |-------|------|---------|
//! | 1 | identical `file_hash` | `file` duplicate, confidence 1.0 |
//! | 2 | identical non-empty `content_hash`, confidence ≥ threshold | `content` duplicate |
//! | 3 | composite similarity ≥ threshold with different content | `potential_amendment`, not a duplicate |
//!
//! Content confidence starts at 0.9, becomes 0.95 when the metadata hash
//! also matches, and is scaled by 0.8 when the structure differs. The
//! amendment composite adds 0.4 for matching metadata, 0.3 for matching
//! structure, and 0.2 for byte sizes within the size-ratio threshold.

use std::cmp::Ordering;

use super::{meets, Scored, Thresholds};
use crate::models::{DeduplicationResult, DocumentFingerprint, DuplicateType};

const FILE_CONFIDENCE: f64 = 1.0;
const CONTENT_CONFIDENCE: f64 = 0.9;
const CONTENT_WITH_METADATA_CONFIDENCE: f64 = 0.95;
const STRUCTURE_MISMATCH_FACTOR: f64 = 0.8;

const METADATA_WEIGHT: f64 = 0.4;
const STRUCTURE_WEIGHT: f64 = 0.3;
const SIZE_WEIGHT: f64 = 0.2;

type RuleFn = fn(&DocumentFingerprint, &[DocumentFingerprint], &Thresholds) -> Option<DeduplicationResult>;

struct DocumentRule {
    name: &'static str,
    apply: RuleFn,
}

const DOCUMENT_RULES: &[DocumentRule] = &[
    DocumentRule {
        name: "file",
        apply: file_duplicate,
    },
    DocumentRule {
        name: "content",
        apply: content_duplicate,
    },
    DocumentRule {
        name: "potential_amendment",
        apply: potential_amendment,
    },
];

/// Classify `candidate` against every stored fingerprint.
pub fn classify_document(
    candidate: &DocumentFingerprint,
    stored: &[DocumentFingerprint],
    thresholds: &Thresholds,
) -> DeduplicationResult {
    for rule in DOCUMENT_RULES {
        if let Some(result) = (rule.apply)(candidate, stored, thresholds) {
            tracing::debug!(
                rule = rule.name,
                confidence = result.confidence,
                file_hash = %candidate.file_hash,
                "document rule matched"
            );
            return result;
        }
    }
    DeduplicationResult::unique()
}

/// Rule 1: byte-identical file.
fn file_duplicate(
    candidate: &DocumentFingerprint,
    stored: &[DocumentFingerprint],
    _thresholds: &Thresholds,
) -> Option<DeduplicationResult> {
    let matches = stored
        .iter()
        .filter(|r| r.file_hash == candidate.file_hash)
        .map(|record| Scored {
            record,
            confidence: FILE_CONFIDENCE,
            reasons: vec!["Identical file hash (exact same file)".to_string()],
        });
    best(matches).map(|hit| hit.into_result(DuplicateType::File, true))
}

/// Rule 2: same normalized text, possibly a different file.
fn content_duplicate(
    candidate: &DocumentFingerprint,
    stored: &[DocumentFingerprint],
    thresholds: &Thresholds,
) -> Option<DeduplicationResult> {
    if candidate.content_hash.is_empty() {
        return None;
    }
    let matches = stored
        .iter()
        .filter(|r| r.content_hash == candidate.content_hash)
        .map(|record| {
            let mut confidence = CONTENT_CONFIDENCE;
            let mut reasons = vec!["Identical content hash".to_string()];
            if record.metadata_hash == candidate.metadata_hash {
                confidence = CONTENT_WITH_METADATA_CONFIDENCE;
                reasons.push("Identical metadata".to_string());
            }
            if record.structural_hash != candidate.structural_hash {
                confidence *= STRUCTURE_MISMATCH_FACTOR;
                reasons.push("Different document structure".to_string());
            }
            Scored {
                record,
                confidence,
                reasons,
            }
        })
        .filter(|s| meets(s.confidence, thresholds.content_duplicate));
    best(matches).map(|hit| hit.into_result(DuplicateType::Content, true))
}

/// Rule 3: looks like the same document but says something different.
fn potential_amendment(
    candidate: &DocumentFingerprint,
    stored: &[DocumentFingerprint],
    thresholds: &Thresholds,
) -> Option<DeduplicationResult> {
    let matches = stored
        .iter()
        .filter(|r| r.content_hash != candidate.content_hash)
        .map(|record| {
            let mut confidence = 0.0;
            let mut reasons = Vec::new();
            if record.metadata_hash == candidate.metadata_hash {
                confidence += METADATA_WEIGHT;
                reasons.push("Same metadata (department, type, date)".to_string());
            }
            if record.structural_hash == candidate.structural_hash {
                confidence += STRUCTURE_WEIGHT;
                reasons.push("Same document structure".to_string());
            }
            if meets(size_ratio(record.byte_size, candidate.byte_size), thresholds.size_ratio) {
                confidence += SIZE_WEIGHT;
                reasons.push("Similar file size".to_string());
            }
            reasons.push("Different content - possible amendment".to_string());
            Scored {
                record,
                confidence,
                reasons,
            }
        })
        .filter(|s| meets(s.confidence, thresholds.amendment));
    best(matches).map(|hit| hit.into_result(DuplicateType::PotentialAmendment, false))
}

/// `min / max` of two byte sizes; two empty files are the same size.
pub fn size_ratio(a: u64, b: u64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi == 0 {
        return 1.0;
    }
    lo as f64 / hi as f64
}

/// Highest confidence, then earliest registration, then smallest hash.
fn best<'a>(
    scored: impl Iterator<Item = Scored<'a, DocumentFingerprint>>,
) -> Option<Scored<'a, DocumentFingerprint>> {
    scored.min_by(|a, b| rank(a, b))
}

fn rank(a: &Scored<'_, DocumentFingerprint>, b: &Scored<'_, DocumentFingerprint>) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.record.created_at.cmp(&b.record.created_at))
        .then_with(|| a.record.file_hash.cmp(&b.record.file_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchedRecord;
    use chrono::{DateTime, Utc};

    fn fp(file: &str, content: &str, structure: &str, metadata: &str, size: u64) -> DocumentFingerprint {
        DocumentFingerprint {
            file_hash: file.to_string(),
            content_hash: content.to_string(),
            structural_hash: structure.to_string(),
            metadata_hash: metadata.to_string(),
            byte_size: size,
            page_count: 1,
            created_at: DateTime::default(),
            source_path: format!("{file}.pdf"),
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn matched_file_hash(result: &DeduplicationResult) -> &str {
        match &result.matched_entry {
            Some(MatchedRecord::Document(d)) => &d.file_hash,
            other => panic!("expected a document match, got {:?}", other),
        }
    }

    fn classify(candidate: &DocumentFingerprint, stored: &[DocumentFingerprint]) -> DeduplicationResult {
        classify_document(candidate, stored, &Thresholds::default())
    }

    #[test]
    fn test_empty_store_is_unique() {
        let result = classify(&fp("f1", "c1", "s1", "m1", 100), &[]);
        assert_eq!(result.duplicate_type, DuplicateType::Unique);
        assert!(!result.is_duplicate);
        assert!(result.matched_entry.is_none());
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_file_duplicate() {
        let stored = vec![fp("other", "c0", "s0", "m0", 5), fp("f1", "c1", "s1", "m1", 100)];
        let result = classify(&fp("f1", "c9", "s9", "m9", 100), &stored);
        assert!(result.is_duplicate);
        assert_eq!(result.duplicate_type, DuplicateType::File);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(matched_file_hash(&result), "f1");
    }

    #[test]
    fn test_file_rule_precedes_content_rule() {
        let stored = vec![fp("a", "c1", "s1", "m1", 100), fp("b", "c2", "s2", "m2", 100)];
        let result = classify(&fp("b", "c1", "s1", "m1", 100), &stored);
        assert_eq!(result.duplicate_type, DuplicateType::File);
        assert_eq!(matched_file_hash(&result), "b");
    }

    #[test]
    fn test_content_duplicate_with_metadata() {
        let stored = vec![fp("a", "c1", "s1", "m1", 100)];
        let result = classify(&fp("b", "c1", "s1", "m1", 120), &stored);
        assert!(result.is_duplicate);
        assert_eq!(result.duplicate_type, DuplicateType::Content);
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.reasons, vec!["Identical content hash", "Identical metadata"]);
    }

    #[test]
    fn test_content_duplicate_different_metadata() {
        let stored = vec![fp("a", "c1", "s1", "m1", 100)];
        let result = classify(&fp("b", "c1", "s1", "m2", 100), &stored);
        assert_eq!(result.duplicate_type, DuplicateType::Content);
        assert!(result.confidence < 0.95 && result.confidence >= 0.8);
    }

    #[test]
    fn test_content_match_with_different_structure_falls_through() {
        // 0.95 * 0.8 = 0.76, below the content threshold; same content rules
        // out an amendment.
        let stored = vec![fp("a", "c1", "s1", "m1", 100)];
        let result = classify(&fp("b", "c1", "s2", "m1", 100), &stored);
        assert_eq!(result.duplicate_type, DuplicateType::Unique);
    }

    #[test]
    fn test_empty_content_never_matches() {
        let stored = vec![fp("a", "", "s1", "m1", 100)];
        let result = classify(&fp("b", "", "s1", "m1", 100), &stored);
        assert_eq!(result.duplicate_type, DuplicateType::Unique);
    }

    #[test]
    fn test_potential_amendment() {
        let stored = vec![fp("a", "c1", "s1", "m1", 1000)];
        let result = classify(&fp("b", "c2", "s1", "m1", 950), &stored);
        assert!(!result.is_duplicate);
        assert_eq!(result.duplicate_type, DuplicateType::PotentialAmendment);
        assert!((result.confidence - 0.9).abs() < 1e-9);
        assert_eq!(
            result.reasons.last().map(String::as_str),
            Some("Different content - possible amendment")
        );
    }

    #[test]
    fn test_amendment_at_threshold() {
        // metadata + structure = 0.7 exactly; sizes too far apart.
        let stored = vec![fp("a", "c1", "s1", "m1", 1000)];
        let result = classify(&fp("b", "c2", "s1", "m1", 500), &stored);
        assert_eq!(result.duplicate_type, DuplicateType::PotentialAmendment);
        assert!((result.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_below_amendment_threshold_is_unique() {
        // metadata + size = 0.6
        let stored = vec![fp("a", "c1", "s1", "m1", 1000)];
        let result = classify(&fp("b", "c2", "s2", "m1", 990), &stored);
        assert_eq!(result.duplicate_type, DuplicateType::Unique);
    }

    #[test]
    fn test_highest_confidence_wins_regardless_of_order() {
        let weaker = fp("a", "c1", "s1", "m1", 100); // 0.7
        let stronger = fp("b", "c2", "s1", "m1", 1000); // 0.9
        let candidate = fp("z", "c9", "s1", "m1", 1000);

        let forward = classify(&candidate, &[weaker.clone(), stronger.clone()]);
        let backward = classify(&candidate, &[stronger, weaker]);
        assert_eq!(matched_file_hash(&forward), "b");
        assert_eq!(matched_file_hash(&backward), "b");
    }

    #[test]
    fn test_tie_goes_to_earliest_created_at() {
        let mut older = fp("b", "c1", "s1", "m1", 100);
        older.created_at = at(1_000);
        let mut newer = fp("a", "c1", "s1", "m1", 100);
        newer.created_at = at(2_000);
        let candidate = fp("z", "c1", "s1", "m1", 100);

        let result = classify(&candidate, &[newer.clone(), older.clone()]);
        assert_eq!(matched_file_hash(&result), "b");
        let result = classify(&candidate, &[older, newer]);
        assert_eq!(matched_file_hash(&result), "b");
    }

    #[test]
    fn test_tie_on_timestamp_goes_to_smallest_hash() {
        let stored = vec![fp("bbb", "c1", "s1", "m1", 100), fp("aaa", "c1", "s1", "m1", 100)];
        let result = classify(&fp("z", "c1", "s1", "m1", 100), &stored);
        assert_eq!(matched_file_hash(&result), "aaa");
    }

    #[test]
    fn test_custom_thresholds() {
        let stored = vec![fp("a", "c1", "s1", "m1", 1000)];
        let strict = Thresholds {
            amendment: 0.95,
            ..Thresholds::default()
        };
        let result = classify_document(&fp("b", "c2", "s1", "m1", 950), &stored, &strict);
        assert_eq!(result.duplicate_type, DuplicateType::Unique);
    }

    #[test]
    fn test_size_ratio() {
        assert_eq!(size_ratio(0, 0), 1.0);
        assert_eq!(size_ratio(0, 10), 0.0);
        assert_eq!(size_ratio(90, 100), 0.9);
        assert_eq!(size_ratio(100, 90), 0.9);
    }
}
