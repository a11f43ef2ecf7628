//! # API Shared
//!
//! Shared definitions for the Mutu HTTP API.
//!
//! Contains:
//! - JSON response envelopes with OpenAPI schemas
//! - The `HealthService`
//!
//! Used by `api-rest` and the `mutu-run` server binary.

pub mod envelopes;
pub mod health;

pub use envelopes::*;
pub use health::{HealthRes, HealthService};
