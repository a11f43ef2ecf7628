//! # API REST
//!
//! REST API for Mutu.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Session cookie extraction and role scoping per request
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON envelopes, status codes, CORS)
//!
//! Uses `api-shared` for the wire envelopes and `mutu-core` for everything else.

#![warn(rust_2018_idioms)]

pub mod docs;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;

pub use docs::ApiDoc;
pub use error::ApiError;
pub use router::{router, AppState};
