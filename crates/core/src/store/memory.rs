use super::{RecordStore, StoredRecord};
use crate::{MutuError, MutuResult};
use mutu_uuid::RecordId;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-lifetime store backed by a vector, preserving insertion order.
pub struct MemoryStore<T> {
    records: RwLock<Vec<T>>,
}

impl<T: StoredRecord> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> MutuResult<RwLockReadGuard<'_, Vec<T>>> {
        self.records
            .read()
            .map_err(|_| MutuError::Store(format!("{} store lock poisoned", T::KIND)))
    }

    fn write(&self) -> MutuResult<RwLockWriteGuard<'_, Vec<T>>> {
        self.records
            .write()
            .map_err(|_| MutuError::Store(format!("{} store lock poisoned", T::KIND)))
    }
}

impl<T: StoredRecord> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StoredRecord> RecordStore<T> for MemoryStore<T> {
    fn insert(&self, record: T) -> MutuResult<()> {
        let mut records = self.write()?;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(MutuError::Store(format!(
                "{} {} already exists",
                T::KIND,
                record.id()
            )));
        }
        records.push(record);
        Ok(())
    }

    fn get(&self, id: &RecordId) -> MutuResult<Option<T>> {
        Ok(self.read()?.iter().find(|r| r.id() == id).cloned())
    }

    fn list(&self) -> MutuResult<Vec<T>> {
        Ok(self.read()?.clone())
    }

    fn replace(&self, record: T) -> MutuResult<bool> {
        let mut records = self.write()?;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: &RecordId) -> MutuResult<bool> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() != before)
    }
}
