//! # Mutu Core
//!
//! Core business logic for the Mutu hospital quality and patient-safety service.
//!
//! This crate contains the domain layer:
//! - Incident reports, risk register, quality indicators, culture surveys, units and users
//! - Role policy deciding which units a user may see
//! - Record stores (in memory, or one YAML file per record) behind a single trait
//! - An audit log entry for every mutation, sign-in and sign-out
//! - The in-process notification feed and the session token codec
//!
//! **No API concerns**: HTTP routing, request extraction and status codes belong in `api-rest`
//! and `api-shared`.

pub mod chronology;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod notifications;
pub mod password;
pub mod records;
pub mod repository;
pub mod roles;
pub mod services;
pub mod session;
pub mod standard_unit;
pub mod store;
pub mod validation;

pub use config::{CoreConfig, StoreBackend};
pub use error::{MutuError, MutuResult};
pub use repository::{Actor, Repository};
pub use roles::{Role, Scope};
pub use services::Services;
pub use session::{SessionCodec, SessionSecret, SessionUser};

pub use mutu_uuid::RecordId;
