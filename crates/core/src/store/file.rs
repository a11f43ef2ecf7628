//! File-backed record store.
//!
//! Records are stored as YAML files in a sharded structure:
//!
//! ```text
//! <data_dir>/
//!   incidents/
//!     <s1>/
//!       <s2>/
//!         <id>/
//!           record.yaml
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the record id. Each file wraps the
//! record with the time it was first stored so listings can be returned in insertion order.
//!
//! Writes are serialised through a process-local mutex and land via write-then-rename, so a
//! reader never sees a half-written file. There is no cross-process locking.
//!
//! Insert timestamps are strictly increasing within a process: if the clock has not moved
//! since the previous insert, the new stamp is bumped one microsecond past it.

use super::{RecordStore, StoredRecord};
use crate::constants::RECORD_FILENAME;
use crate::{MutuError, MutuResult};
use chrono::{DateTime, Duration, Utc};
use mutu_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Serialize, Deserialize)]
struct StoredFile<T> {
    stored_at: DateTime<Utc>,
    record: T,
}

pub struct FileStore<T> {
    root: PathBuf,
    /// Guards writes; holds the last insert timestamp issued by this instance.
    write_lock: Mutex<Option<DateTime<Utc>>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: StoredRecord> FileStore<T> {
    /// Opens (creating if needed) the directory for `T` under `data_dir`.
    pub fn open(data_dir: &Path) -> MutuResult<Self> {
        let root = data_dir.join(T::KIND.dir_name());
        fs::create_dir_all(&root)
            .map_err(|e| MutuError::store(&format!("create {}", root.display()), e))?;

        Ok(Self {
            root,
            write_lock: Mutex::new(None),
            _record: PhantomData,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> MutuResult<MutexGuard<'_, Option<DateTime<Utc>>>> {
        self.write_lock
            .lock()
            .map_err(|_| MutuError::Store(format!("{} store lock poisoned", T::KIND)))
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        id.sharded_dir(&self.root).join(RECORD_FILENAME)
    }

    fn read_file(path: &Path) -> MutuResult<StoredFile<T>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| MutuError::store(&format!("read {}", path.display()), e))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MutuError::store(&format!("parse {}", path.display()), e))
    }

    fn write_file(path: &Path, file: &StoredFile<T>) -> MutuResult<()> {
        let yaml = serde_yaml::to_string(file)
            .map_err(|e| MutuError::store(&format!("serialise {}", T::KIND), e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MutuError::store(&format!("create {}", parent.display()), e))?;
        }

        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml)
            .map_err(|e| MutuError::store(&format!("write {}", tmp.display()), e))?;
        fs::rename(&tmp, path)
            .map_err(|e| MutuError::store(&format!("rename {}", path.display()), e))
    }

    /// Walks `<root>/<s1>/<s2>/<id>/record.yaml`, skipping unreadable entries.
    fn scan(&self) -> Vec<StoredFile<T>> {
        let mut files = Vec::new();

        let s1_iter = match fs::read_dir(&self.root) {
            Ok(it) => it,
            Err(_) => return files,
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };

            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };

                for id_ent in id_iter.flatten() {
                    let record_path = id_ent.path().join(RECORD_FILENAME);
                    if !record_path.is_file() {
                        continue;
                    }

                    match Self::read_file(&record_path) {
                        Ok(file) => files.push(file),
                        Err(e) => {
                            tracing::warn!("skipping unreadable {} record: {}", T::KIND, e);
                        }
                    }
                }
            }
        }

        files
    }
}

impl<T: StoredRecord> RecordStore<T> for FileStore<T> {
    fn insert(&self, record: T) -> MutuResult<()> {
        let mut last_stored = self.lock()?;
        let path = self.record_path(record.id());
        if path.exists() {
            return Err(MutuError::Store(format!(
                "{} {} already exists",
                T::KIND,
                record.id()
            )));
        }

        let now = Utc::now();
        let stored_at = match *last_stored {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };

        Self::write_file(&path, &StoredFile { stored_at, record })?;
        *last_stored = Some(stored_at);
        Ok(())
    }

    fn get(&self, id: &RecordId) -> MutuResult<Option<T>> {
        let path = self.record_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        Self::read_file(&path).map(|file| Some(file.record))
    }

    fn list(&self) -> MutuResult<Vec<T>> {
        let mut files = self.scan();
        files.sort_by(|a, b| {
            a.stored_at
                .cmp(&b.stored_at)
                .then_with(|| a.record.id().cmp(b.record.id()))
        });
        Ok(files.into_iter().map(|file| file.record).collect())
    }

    fn replace(&self, record: T) -> MutuResult<bool> {
        let _guard = self.lock()?;
        let path = self.record_path(record.id());
        if !path.is_file() {
            return Ok(false);
        }

        let existing = Self::read_file(&path)?;
        Self::write_file(
            &path,
            &StoredFile {
                stored_at: existing.stored_at,
                record,
            },
        )?;
        Ok(true)
    }

    fn delete(&self, id: &RecordId) -> MutuResult<bool> {
        let _guard = self.lock()?;
        let dir = id.sharded_dir(&self.root);
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .map_err(|e| MutuError::store(&format!("remove {}", dir.display()), e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::unit::Unit;
    use mutu_types::NonEmptyText;
    use tempfile::TempDir;

    fn unit(name: &str) -> Unit {
        Unit {
            id: RecordId::new(),
            name: NonEmptyText::new(name).unwrap(),
        }
    }

    #[test]
    fn test_insert_writes_sharded_record_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::<Unit>::open(temp_dir.path()).expect("open should succeed");

        let record = unit("RANAP");
        store.insert(record.clone()).expect("insert should succeed");

        let expected = record
            .id
            .sharded_dir(&temp_dir.path().join("units"))
            .join(RECORD_FILENAME);
        assert!(expected.is_file(), "record.yaml should exist");
        assert_eq!(store.get(&record.id).unwrap(), Some(record));
    }

    #[test]
    fn test_list_returns_insertion_order_across_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let names = ["RANAP", "IGD", "ICU", "Farmasi"];
        {
            let store = FileStore::<Unit>::open(temp_dir.path()).unwrap();
            for name in names {
                store.insert(unit(name)).unwrap();
            }
        }

        let reopened = FileStore::<Unit>::open(temp_dir.path()).unwrap();
        let listed: Vec<_> = reopened
            .list()
            .unwrap()
            .into_iter()
            .map(|u| u.name.into_inner())
            .collect();
        assert_eq!(listed, names);
    }

    #[test]
    fn test_replace_keeps_position_and_reports_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::<Unit>::open(temp_dir.path()).unwrap();

        let first = unit("RANAP");
        let second = unit("IGD");
        store.insert(first.clone()).unwrap();
        store.insert(second.clone()).unwrap();

        let mut renamed = first.clone();
        renamed.name = NonEmptyText::new("Rawat Inap").unwrap();
        assert!(store.replace(renamed.clone()).unwrap());
        assert!(!store.replace(unit("ghost")).unwrap());

        let listed = store.list().unwrap();
        assert_eq!(listed, vec![renamed, second]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::<Unit>::open(temp_dir.path()).unwrap();

        let record = unit("RANAP");
        store.insert(record.clone()).unwrap();
        assert!(store.delete(&record.id).unwrap());
        assert!(!store.delete(&record.id).unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_corrupt_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::<Unit>::open(temp_dir.path()).unwrap();
        store.insert(unit("RANAP")).unwrap();

        let bogus = RecordId::new().sharded_dir(store.root());
        fs::create_dir_all(&bogus).unwrap();
        fs::write(bogus.join(RECORD_FILENAME), "invalid: yaml: content: [[[").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1, "corrupt record should be skipped");
        assert_eq!(listed[0].name.as_str(), "RANAP");
    }
}
