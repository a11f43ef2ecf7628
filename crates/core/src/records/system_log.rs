//! Append-only audit trail of mutations and sign-ins.

use crate::records::EntityKind;
use crate::store::{RecordStore, StoredRecord};
use crate::MutuResult;
use chrono::{DateTime, Utc};
use mutu_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Create => "CREATE",
            LogAction::Update => "UPDATE",
            LogAction::Delete => "DELETE",
            LogAction::Login => "LOGIN",
            LogAction::Logout => "LOGOUT",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLog {
    pub id: RecordId,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub action: LogAction,
    pub details: String,
}

impl StoredRecord for SystemLog {
    const KIND: EntityKind = EntityKind::SystemLog;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Appends and lists [`SystemLog`] entries.
#[derive(Clone)]
pub struct SystemLogService {
    store: Arc<dyn RecordStore<SystemLog>>,
}

impl SystemLogService {
    pub fn new(store: Arc<dyn RecordStore<SystemLog>>) -> Self {
        Self { store }
    }

    /// Appends an entry stamped with the current time.
    pub fn record(
        &self,
        user: &str,
        action: LogAction,
        details: impl Into<String>,
    ) -> MutuResult<SystemLog> {
        let entry = SystemLog {
            id: RecordId::new(),
            timestamp: Utc::now(),
            user: user.to_string(),
            action,
            details: details.into(),
        };
        self.store.insert(entry.clone())?;
        tracing::info!(user, action = %action, "{}", entry.details);
        Ok(entry)
    }

    /// All entries, newest first. Entries with equal timestamps keep reverse insertion order.
    pub fn list(&self) -> MutuResult<Vec<SystemLog>> {
        let mut entries = self.store.list()?;
        entries.reverse();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }
}
