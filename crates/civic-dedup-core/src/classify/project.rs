//! Project duplicate classifier.
//!
//! A project either matches enough fields to be the same civic matter or
//! it does not; there is no amendment outcome for projects.
//!
//! Weighted partial match, per stored signature:
//!
//! | Field (both non-empty and equal) | Weight |
//! |-------|--------|
//! | `project_id` (case-insensitive) | 0.5 |
//! | `location_normalized` | 0.3 |
//! | `request_fingerprint` | 0.3 |
//! | `meeting_date` | 0.2 |
//!
//! Two non-empty departments that differ scale the total by 0.7: a mention
//! from another department is weaker evidence, not proof of a different
//! project.

use std::cmp::Ordering;

use super::{meets, Scored, Thresholds};
use crate::models::{DeduplicationResult, DuplicateType, ProjectSignature};

const EXACT_CONFIDENCE: f64 = 1.0;
const PROJECT_ID_WEIGHT: f64 = 0.5;
const LOCATION_WEIGHT: f64 = 0.3;
const REQUEST_WEIGHT: f64 = 0.3;
const MEETING_DATE_WEIGHT: f64 = 0.2;
const CROSS_DEPARTMENT_FACTOR: f64 = 0.7;

type RuleFn = fn(&ProjectSignature, &[ProjectSignature], &Thresholds) -> Option<DeduplicationResult>;

struct ProjectRule {
    name: &'static str,
    apply: RuleFn,
}

const PROJECT_RULES: &[ProjectRule] = &[
    ProjectRule {
        name: "exact_signature",
        apply: exact_signature,
    },
    ProjectRule {
        name: "weighted_partial",
        apply: weighted_partial,
    },
];

/// Classify `candidate` against every stored signature.
pub fn classify_project(
    candidate: &ProjectSignature,
    stored: &[ProjectSignature],
    thresholds: &Thresholds,
) -> DeduplicationResult {
    for rule in PROJECT_RULES {
        if let Some(result) = (rule.apply)(candidate, stored, thresholds) {
            tracing::debug!(
                rule = rule.name,
                confidence = result.confidence,
                project_id = %candidate.project_id,
                "project rule matched"
            );
            return result;
        }
    }
    DeduplicationResult::unique()
}

fn exact_signature(
    candidate: &ProjectSignature,
    stored: &[ProjectSignature],
    _thresholds: &Thresholds,
) -> Option<DeduplicationResult> {
    let matches = stored
        .iter()
        .filter(|r| r.signature_hash == candidate.signature_hash)
        .map(|record| Scored {
            record,
            confidence: EXACT_CONFIDENCE,
            reasons: vec!["Identical project signature".to_string()],
        });
    best(matches).map(|hit| hit.into_result(DuplicateType::Project, true))
}

fn weighted_partial(
    candidate: &ProjectSignature,
    stored: &[ProjectSignature],
    thresholds: &Thresholds,
) -> Option<DeduplicationResult> {
    let matches = stored
        .iter()
        .map(|record| score(candidate, record))
        .filter(|s| meets(s.confidence, thresholds.project_duplicate));
    best(matches).map(|hit| hit.into_result(DuplicateType::Project, true))
}

/// Weighted field agreement between two signatures.
fn score<'a>(candidate: &ProjectSignature, record: &'a ProjectSignature) -> Scored<'a, ProjectSignature> {
    let mut confidence = 0.0;
    let mut reasons = Vec::new();

    if both_set(&candidate.project_id, &record.project_id)
        && candidate.project_id.to_lowercase() == record.project_id.to_lowercase()
    {
        confidence += PROJECT_ID_WEIGHT;
        reasons.push("Same project ID".to_string());
    }
    if both_set(&candidate.location_normalized, &record.location_normalized)
        && candidate.location_normalized == record.location_normalized
    {
        confidence += LOCATION_WEIGHT;
        reasons.push("Same location".to_string());
    }
    if both_set(&candidate.request_fingerprint, &record.request_fingerprint)
        && candidate.request_fingerprint == record.request_fingerprint
    {
        confidence += REQUEST_WEIGHT;
        reasons.push("Same request description".to_string());
    }
    if both_set(&candidate.meeting_date, &record.meeting_date)
        && candidate.meeting_date == record.meeting_date
    {
        confidence += MEETING_DATE_WEIGHT;
        reasons.push("Same meeting date".to_string());
    }
    if both_set(&candidate.department, &record.department)
        && candidate.department.to_lowercase() != record.department.to_lowercase()
    {
        confidence *= CROSS_DEPARTMENT_FACTOR;
        reasons.push("Different department - possible cross-reference".to_string());
    }

    Scored {
        record,
        confidence,
        reasons,
    }
}

fn both_set(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty()
}

/// Highest confidence, then smallest signature hash.
fn best<'a>(
    scored: impl Iterator<Item = Scored<'a, ProjectSignature>>,
) -> Option<Scored<'a, ProjectSignature>> {
    scored.min_by(|a, b| rank(a, b))
}

fn rank(a: &Scored<'_, ProjectSignature>, b: &Scored<'_, ProjectSignature>) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.record.signature_hash.cmp(&b.record.signature_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchedRecord, ProjectMetadata, ProjectRecord};
    use crate::signature::build_signature;

    fn sig(id: &str, location: &str, request: &str, date: &str, dept: &str) -> ProjectSignature {
        build_signature(&ProjectRecord {
            project_id: id.into(),
            location: location.into(),
            request: request.into(),
            meeting_date: date.into(),
            metadata: ProjectMetadata {
                department: dept.into(),
            },
        })
    }

    fn classify(candidate: &ProjectSignature, stored: &[ProjectSignature]) -> DeduplicationResult {
        classify_project(candidate, stored, &Thresholds::default())
    }

    fn matched_project_id(result: &DeduplicationResult) -> &str {
        match &result.matched_entry {
            Some(MatchedRecord::Project(p)) => &p.project_id,
            other => panic!("expected a project match, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_signature_match() {
        let stored = vec![sig("DDRB-2024-001", "100 Laura St", "facade grant", "2024-03-01", "DIA")];
        let candidate = sig("ddrb-2024-001", "100 laura street", "grant facade", "2024-03-01", "dia");
        let result = classify(&candidate, &stored);
        assert!(result.is_duplicate);
        assert_eq!(result.duplicate_type, DuplicateType::Project);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.reasons, vec!["Identical project signature"]);
    }

    #[test]
    fn test_partial_match_same_id_and_location() {
        let stored = vec![sig("P-7", "Main St", "facade grant", "2024-03-01", "DIA")];
        let candidate = sig("P-7", "Main Street", "parking garage expansion", "2024-05-01", "DIA");
        let result = classify(&candidate, &stored);
        assert!(result.is_duplicate);
        assert_eq!(result.duplicate_type, DuplicateType::Project);
        assert!((result.confidence - 0.8).abs() < 1e-9);
        assert_eq!(result.reasons, vec!["Same project ID", "Same location"]);
    }

    #[test]
    fn test_cross_department_penalty_at_boundary() {
        // 0.5 + 0.3 = 0.8 raw; 0.8 * 0.7 = 0.56 after the department penalty.
        let stored = vec![sig("P-7", "Main St", "facade grant", "2024-03-01", "DIA")];
        let candidate = sig("P-7", "Main St", "parking garage expansion", "2024-05-01", "Planning");
        let result = classify(&candidate, &stored);
        assert!(!result.is_duplicate);
        assert_eq!(result.duplicate_type, DuplicateType::Unique);
    }

    #[test]
    fn test_cross_department_full_match_still_duplicate() {
        // 1.3 * 0.7 = 0.91
        let stored = vec![sig("P-7", "Main St", "facade grant", "2024-03-01", "DIA")];
        let candidate = sig("P-7", "Main St", "facade grant", "2024-03-01", "Planning");
        let result = classify(&candidate, &stored);
        assert!(result.is_duplicate);
        assert!((result.confidence - 0.91).abs() < 1e-9);
        assert!(result
            .reasons
            .contains(&"Different department - possible cross-reference".to_string()));
    }

    #[test]
    fn test_empty_department_no_penalty() {
        let stored = vec![sig("P-7", "Main St", "facade grant", "2024-03-01", "")];
        let candidate = sig("P-7", "Main St", "other work", "2024-05-01", "Planning");
        let result = classify(&candidate, &stored);
        assert!(result.is_duplicate);
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_fields_do_not_match() {
        let stored = vec![sig("", "", "", "", "")];
        let candidate = sig("", "", "", "2024-03-01", "");
        let result = classify(&candidate, &stored);
        assert_eq!(result.duplicate_type, DuplicateType::Unique);
    }

    #[test]
    fn test_location_request_date_without_id() {
        // 0.3 + 0.3 + 0.2 = 0.8
        let stored = vec![sig("", "Bay St", "demolish warehouse", "2024-03-01", "DIA")];
        let candidate = sig("", "Bay Street", "warehouse demolish", "2024-03-01", "DIA");
        let result = classify(&candidate, &stored);
        assert!(result.is_duplicate);
    }

    #[test]
    fn test_best_partial_match_wins() {
        let weak = sig("P-1", "Main St", "facade grant", "2024-01-01", "DIA"); // 0.8
        let strong = sig("P-1", "Main St", "roof repair", "2024-03-01", "DIA"); // 1.0
        let candidate = sig("P-1", "Main St", "roof repair work", "2024-03-01", "DIA");
        let result = classify(&candidate, &[weak.clone(), strong.clone()]);
        assert_eq!(matched_project_id(&result), "P-1");
        match &result.matched_entry {
            Some(MatchedRecord::Project(p)) => assert_eq!(p.meeting_date, "2024-03-01"),
            other => panic!("unexpected {:?}", other),
        }
        let reversed = classify(&candidate, &[strong, weak]);
        assert_eq!(reversed, result);
    }
}
