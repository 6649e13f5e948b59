//! Project identity signatures.
//!
//! The same civic matter is mentioned across many meetings with slightly
//! different wording. A [`ProjectSignature`] reduces a project record to
//! normalized fields that survive those differences, plus one combined
//! hash over all of them.

use std::collections::BTreeMap;

use crate::models::{ProjectRecord, ProjectSignature};
use crate::normalize::{normalize_location, sha256_hex, significant_words, sorted_json, JsonScalar};

/// Order-independent hash of the significant words in a request.
///
/// Returns `""` for a request with no significant words.
pub fn request_fingerprint(request: &str) -> String {
    let words = significant_words(request);
    if words.is_empty() {
        return String::new();
    }
    sha256_hex(words.join(" ").as_bytes())
}

/// Build the signature for a project record. Missing fields are empty
/// strings and still produce a valid signature.
pub fn build_signature(project: &ProjectRecord) -> ProjectSignature {
    let project_id = project.project_id.trim().to_string();
    let location_normalized = normalize_location(&project.location);
    let request_fingerprint = request_fingerprint(&project.request);
    let meeting_date = project.meeting_date.trim().to_string();
    let department = project.metadata.department.trim().to_string();

    let project_id_key = project_id.to_lowercase();
    let department_key = department.to_lowercase();
    let mut fields = BTreeMap::new();
    fields.insert("project_id", JsonScalar::Str(&project_id_key));
    fields.insert("location_normalized", JsonScalar::Str(&location_normalized));
    fields.insert("request_fingerprint", JsonScalar::Str(&request_fingerprint));
    fields.insert("meeting_date", JsonScalar::Str(&meeting_date));
    fields.insert("department", JsonScalar::Str(&department_key));
    let signature_hash = sha256_hex(sorted_json(&fields).as_bytes());

    ProjectSignature {
        project_id,
        location_normalized,
        request_fingerprint,
        meeting_date,
        department,
        signature_hash,
    }
}
