//! In-memory [`FingerprintStore`] implementation for tests and embedding.
//!
//! Records live in insertion-ordered vectors behind `std::sync::RwLock`.
//! Overwriting a key keeps its original position. Nothing is persisted.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::FingerprintStore;
use crate::error::{DedupError, Result};
use crate::models::{DocumentFingerprint, ProjectSignature};

/// Ordered key → record table.
#[derive(Debug)]
struct Table<R> {
    rows: RwLock<Vec<(String, R)>>,
}

impl<R: Clone> Table<R> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<(String, R)>>> {
        self.rows
            .read()
            .map_err(|_| DedupError::storage("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<(String, R)>>> {
        self.rows
            .write()
            .map_err(|_| DedupError::storage("in-memory store lock poisoned"))
    }

    fn get(&self, id: &str) -> Result<Option<R>> {
        Ok(self
            .read()?
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, record)| record.clone()))
    }

    fn put(&self, id: &str, record: &R) -> Result<()> {
        let mut rows = self.write()?;
        match rows.iter_mut().find(|(key, _)| key == id) {
            Some((_, existing)) => *existing = record.clone(),
            None => rows.push((id.to_string(), record.clone())),
        }
        Ok(())
    }

    fn all(&self) -> Result<Vec<R>> {
        Ok(self.read()?.iter().map(|(_, record)| record.clone()).collect())
    }
}

/// Volatile store; contents are lost when dropped.
#[derive(Debug)]
pub struct InMemoryStore {
    documents: Table<DocumentFingerprint>,
    projects: Table<ProjectSignature>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            documents: Table::new(),
            projects: Table::new(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FingerprintStore for InMemoryStore {
    async fn get_document(&self, id: &str) -> Result<Option<DocumentFingerprint>> {
        self.documents.get(id)
    }

    async fn put_document(&self, id: &str, fingerprint: &DocumentFingerprint) -> Result<()> {
        self.documents.put(id, fingerprint)
    }

    async fn all_documents(&self) -> Result<Vec<DocumentFingerprint>> {
        self.documents.all()
    }

    async fn get_project(&self, id: &str) -> Result<Option<ProjectSignature>> {
        self.projects.get(id)
    }

    async fn put_project(&self, id: &str, signature: &ProjectSignature) -> Result<()> {
        self.projects.put(id, signature)
    }

    async fn all_projects(&self) -> Result<Vec<ProjectSignature>> {
        self.projects.all()
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
