//! Fingerprint store abstraction.
//!
//! The [`FingerprintStore`] trait is the only way the engine reads or
//! persists fingerprints and signatures, so the backing storage (flat
//! file, SQLite, in-memory) can change without touching classifier logic.
//!
//! Stores hold two logical tables keyed by the first 16 hex characters of
//! the primary hash: document fingerprints by `file_hash`, project
//! signatures by `signature_hash`. `put` overwrites by key, so
//! re-registering the same record is safe.
//!
//! Implementations must be `Send + Sync` and tolerate concurrent readers;
//! writes are serialized and never partial.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DocumentFingerprint, ProjectSignature};

/// Length of a store key, in hex characters.
pub const ID_PREFIX_LEN: usize = 16;

/// Store key for a hash: its first [`ID_PREFIX_LEN`] characters.
pub fn record_id(hash: &str) -> String {
    hash.chars().take(ID_PREFIX_LEN).collect()
}

/// Durable storage for fingerprints and signatures.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get_document`](FingerprintStore::get_document) | Fetch a fingerprint by key |
/// | [`put_document`](FingerprintStore::put_document) | Insert or overwrite a fingerprint |
/// | [`all_documents`](FingerprintStore::all_documents) | Every stored fingerprint |
/// | [`get_project`](FingerprintStore::get_project) | Fetch a signature by key |
/// | [`put_project`](FingerprintStore::put_project) | Insert or overwrite a signature |
/// | [`all_projects`](FingerprintStore::all_projects) | Every stored signature |
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    async fn get_document(&self, id: &str) -> Result<Option<DocumentFingerprint>>;

    /// Must be durable before returning: a later load sees this write.
    async fn put_document(&self, id: &str, fingerprint: &DocumentFingerprint) -> Result<()>;

    async fn all_documents(&self) -> Result<Vec<DocumentFingerprint>>;

    async fn get_project(&self, id: &str) -> Result<Option<ProjectSignature>>;

    /// Must be durable before returning: a later load sees this write.
    async fn put_project(&self, id: &str, signature: &ProjectSignature) -> Result<()>;

    async fn all_projects(&self) -> Result<Vec<ProjectSignature>>;

    /// Human-readable location of the backing storage, for stats output.
    fn location(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_prefix() {
        assert_eq!(record_id("0123456789abcdef0123"), "0123456789abcdef");
        assert_eq!(record_id("abc"), "abc");
    }
}
