use crate::records::EntityKind;

#[derive(Debug, thiserror::Error)]
pub enum MutuError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },
    #[error("{0}")]
    Validation(String),
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("store failure: {0}")]
    Store(String),

    #[error("invalid text: {0}")]
    Text(#[from] mutu_types::TextError),
    #[error("invalid id: {0}")]
    Id(#[from] mutu_uuid::UuidError),
}

impl MutuError {
    pub fn not_found(entity: EntityKind, id: impl std::fmt::Display) -> Self {
        MutuError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wraps a lower-level store error with a short description of what was attempted.
    pub fn store(context: &str, err: impl std::fmt::Display) -> Self {
        MutuError::Store(format!("{context}: {err}"))
    }
}

pub type MutuResult<T> = std::result::Result<T, MutuError>;
