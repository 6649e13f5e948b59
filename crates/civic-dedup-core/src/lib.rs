//! # Civic Dedup Core
//!
//! Shared, I/O-free logic for civic-dedup: data models, text
//! normalization, document fingerprints, project signatures, the
//! duplicate classifiers, and the fingerprint store abstraction.
//!
//! This crate contains no tokio, sqlx, or filesystem access. Callers
//! hand it file bytes and extracted text; durable stores live in the
//! `civic-dedup` crate.

pub mod classify;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod normalize;
pub mod signature;
pub mod store;

pub use error::DedupError;
