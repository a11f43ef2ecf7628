//! Record stores.
//!
//! A [`RecordStore`] is the seam between the domain layer and whatever keeps the records.
//! Repositories hold an `Arc<dyn RecordStore<T>>` so the same role policy, formatting and
//! logging logic runs against the in-memory store in tests and against the file-backed store
//! in a deployment. Stores do plain keyed storage only; validation, scoping and ordering live
//! in the repositories.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::StoreBackend;
use crate::records::EntityKind;
use crate::MutuResult;
use mutu_uuid::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// A record that can be kept in a [`RecordStore`].
pub trait StoredRecord: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &RecordId;
}

/// Keyed storage for one entity kind.
pub trait RecordStore<T: StoredRecord>: Send + Sync {
    /// Adds a new record. Fails if a record with the same id already exists.
    fn insert(&self, record: T) -> MutuResult<()>;

    fn get(&self, id: &RecordId) -> MutuResult<Option<T>>;

    /// All records in insertion order.
    fn list(&self) -> MutuResult<Vec<T>>;

    /// Overwrites an existing record, keeping its position. Returns `false` if it is missing.
    fn replace(&self, record: T) -> MutuResult<bool>;

    /// Removes a record. Returns `false` if it was already absent.
    fn delete(&self, id: &RecordId) -> MutuResult<bool>;
}

/// Opens the store for `T` on the configured backend.
pub fn open_store<T: StoredRecord>(backend: &StoreBackend) -> MutuResult<Arc<dyn RecordStore<T>>> {
    match backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::<T>::new())),
        StoreBackend::Files(dir) => Ok(Arc::new(FileStore::<T>::open(dir)?)),
    }
}
