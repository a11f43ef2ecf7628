//! Record identifiers and sharded-path utilities.
//!
//! Every Mutu record (incident, risk, user, unit, ...) is keyed by a [`RecordId`]. The store
//! layer allocates identifiers; callers only ever parse them from request paths.
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
//! Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected, which
//! keeps identifiers safe to embed in file paths and URLs without escaping.
//!
//! ## Sharded directory layout
//! The file-backed store places a record with id `u` under
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`, e.g.
//! `data/incidents/55/0e/550e8400e29b41d4a716446655440000/`.

mod service;

pub use service::{RecordId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
