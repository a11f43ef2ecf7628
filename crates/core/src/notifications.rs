//! In-process notification feed.
//!
//! Notifications live for the lifetime of the process only. A notification may be addressed to
//! a role, a unit, both, or neither (a broadcast); [`NotificationStore::list`] applies those
//! addressing rules against the reader's role and unit.

use crate::records::{optional_unit, UnitName};
use crate::roles::Role;
use crate::{MutuError, MutuResult};
use chrono::{DateTime, Utc};
use mutu_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_unit: Option<UnitName>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Whether a reader holding `filter` should see this notification.
    pub fn is_visible_to(&self, filter: &NotificationFilter) -> bool {
        match (&self.recipient_role, &self.recipient_unit) {
            (None, None) => true,
            (Some(role), None) => filter.role.as_ref() == Some(role),
            (Some(role), Some(unit)) => {
                filter.role.as_ref() == Some(role) && filter.unit.as_ref() == Some(unit)
            }
            (None, Some(unit)) => filter.unit.as_ref() == Some(unit),
        }
    }
}

/// Input for [`NotificationStore::add`]. Title and description are required.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub recipient_role: Option<Role>,
    pub recipient_unit: Option<String>,
}

/// The reader's role and unit.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NotificationFilter {
    pub role: Option<Role>,
    pub unit: Option<UnitName>,
}

pub struct NotificationStore {
    entries: RwLock<Vec<Notification>>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, new: NewNotification) -> MutuResult<Notification> {
        let title = new.title.as_deref().map(str::trim).unwrap_or_default();
        let description = new.description.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || description.is_empty() {
            return Err(MutuError::Validation(
                "title and description are required".into(),
            ));
        }

        let notification = Notification {
            id: RecordId::new(),
            title: title.to_string(),
            description: description.to_string(),
            link: new.link.filter(|l| !l.trim().is_empty()),
            recipient_role: new.recipient_role,
            recipient_unit: optional_unit(new.recipient_unit.as_deref()),
            created_at: Utc::now(),
        };

        self.entries
            .write()
            .map_err(|_| MutuError::Store("notification store lock poisoned".into()))?
            .push(notification.clone());

        tracing::debug!(id = %notification.id, "notification added");
        Ok(notification)
    }

    /// Notifications visible under `filter`, newest first.
    pub fn list(&self, filter: &NotificationFilter) -> MutuResult<Vec<Notification>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| MutuError::Store("notification store lock poisoned".into()))?;

        let mut visible: Vec<Notification> = entries
            .iter()
            .rev()
            .filter(|n| n.is_visible_to(filter))
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(visible)
    }
}

#[cfg(test)]
impl NotificationStore {
    /// Poisons the lock so every later `add` and `list` fails.
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.entries.write();
            panic!("poisoning the notification store");
        }));
    }
}
