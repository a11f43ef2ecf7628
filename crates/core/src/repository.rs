//! Generic create/read/update/delete over a [`RecordStore`], with role scoping and audit logging.
//!
//! A [`Repository`] owns no data itself. It validates input through the entity's
//! [`Entity`] implementation, filters by the caller's [`Scope`], and appends one
//! [`SystemLog`](crate::records::system_log::SystemLog) entry per successful mutation.
//!
//! The record is written first and the log entry second. A failed log write is reported with
//! `error!` and does not fail the mutation, so a client never retries a create that already
//! happened.

use crate::constants::SYSTEM_ACTOR;
use crate::records::system_log::{LogAction, SystemLogService};
use crate::records::UnitName;
use crate::roles::{Role, Scope};
use crate::store::{RecordStore, StoredRecord};
use crate::{MutuError, MutuResult};
use mutu_uuid::RecordId;
use std::sync::Arc;

/// A stored record with its input types and per-entity rules.
pub trait Entity: StoredRecord {
    /// Create input.
    type New;
    /// Partial-update input; absent fields leave the record unchanged.
    type Patch;

    /// Whether visibility is decided by [`Entity::unit`].
    const UNIT_SCOPED: bool;

    fn unit(&self) -> Option<&UnitName> {
        None
    }

    /// Validates a create input into a record carrying `id`.
    fn build(id: RecordId, new: Self::New) -> MutuResult<Self>;

    /// Applies a patch, validating every field it touches.
    fn apply(&mut self, patch: Self::Patch) -> MutuResult<()>;

    /// Sorts records into listing order. Insertion order unless overridden.
    fn order(_records: &mut [Self]) {}

    /// Extra context appended to audit log details, such as `(unit RANAP)`.
    fn describe(&self) -> String {
        match self.unit() {
            Some(unit) => format!("(unit {unit})"),
            None => String::new(),
        }
    }

    /// A message if `self` may not coexist with `other` (duplicate names, emails, ...).
    fn conflicts_with(&self, _other: &Self) -> Option<String> {
        None
    }

    /// Checks that `actor` may mutate records of this kind at all.
    fn authorise(_actor: &Actor) -> MutuResult<()> {
        Ok(())
    }
}

/// Who is performing an operation.
///
/// An actor without a role is the system itself (CLI bootstrap, startup tasks) and is not
/// restricted.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub name: String,
    pub role: Option<Role>,
    pub unit: Option<UnitName>,
    pub user_id: Option<RecordId>,
}

impl Actor {
    pub fn system() -> Self {
        Self {
            name: SYSTEM_ACTOR.into(),
            role: None,
            unit: None,
            user_id: None,
        }
    }

    pub fn scope(&self) -> Scope {
        match self.role {
            Some(role) => Scope::for_user(role, self.unit.as_ref()),
            None => Scope::All,
        }
    }

    /// Fails with `Forbidden` unless the actor is the system or `allowed(role)` holds.
    pub fn require(&self, allowed: impl Fn(&Role) -> bool, what: &str) -> MutuResult<()> {
        match self.role {
            None => Ok(()),
            Some(role) if allowed(&role) => Ok(()),
            Some(role) => Err(MutuError::Forbidden(format!("{role} may not {what}"))),
        }
    }
}

pub struct Repository<T: Entity> {
    store: Arc<dyn RecordStore<T>>,
    logs: SystemLogService,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            logs: self.logs.clone(),
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn RecordStore<T>>, logs: SystemLogService) -> Self {
        Self { store, logs }
    }

    fn visible(scope: &Scope, record: &T) -> bool {
        !T::UNIT_SCOPED || scope.accepts(record.unit())
    }

    fn check_conflicts(&self, record: &T) -> MutuResult<()> {
        for other in self.store.list()? {
            if other.id() == record.id() {
                continue;
            }
            if let Some(msg) = record.conflicts_with(&other) {
                return Err(MutuError::Validation(msg));
            }
        }
        Ok(())
    }

    fn log(&self, actor: &Actor, action: LogAction, record: &T, verb: &str) {
        let context = record.describe();
        let mut details = format!("{} {} {}", T::KIND, record.id().short(), verb);
        if !context.is_empty() {
            details.push(' ');
            details.push_str(&context);
        }
        if let Err(e) = self.logs.record(&actor.name, action, details.clone()) {
            tracing::error!("{details} but the system log entry was not written: {e}");
        }
    }

    /// Validates and inserts a new record, logging `CREATE`.
    pub fn create(&self, actor: &Actor, new: T::New) -> MutuResult<T> {
        T::authorise(actor)?;
        let record = T::build(RecordId::new(), new)?;
        if T::UNIT_SCOPED {
            actor.scope().require(record.unit())?;
        }
        self.check_conflicts(&record)?;

        self.store.insert(record.clone())?;
        self.log(actor, LogAction::Create, &record, "created");
        Ok(record)
    }

    /// Every record visible under `scope`, in listing order.
    pub fn find_all(&self, scope: &Scope) -> MutuResult<Vec<T>> {
        let mut records: Vec<T> = self
            .store
            .list()?
            .into_iter()
            .filter(|r| Self::visible(scope, r))
            .collect();
        T::order(&mut records);
        Ok(records)
    }

    /// One record, or `NotFound` when it is missing or outside `scope`.
    pub fn find(&self, scope: &Scope, id: &RecordId) -> MutuResult<T> {
        self.store
            .get(id)?
            .filter(|r| Self::visible(scope, r))
            .ok_or_else(|| MutuError::not_found(T::KIND, id))
    }

    /// Applies `patch` to a visible record, logging `UPDATE`.
    pub fn update(&self, actor: &Actor, id: &RecordId, patch: T::Patch) -> MutuResult<T> {
        T::authorise(actor)?;
        let scope = actor.scope();
        let mut record = self.find(&scope, id)?;

        record.apply(patch)?;
        if T::UNIT_SCOPED {
            scope.require(record.unit())?;
        }
        self.check_conflicts(&record)?;

        if !self.store.replace(record.clone())? {
            return Err(MutuError::not_found(T::KIND, id));
        }
        self.log(actor, LogAction::Update, &record, "updated");
        Ok(record)
    }

    /// Deletes a visible record, logging `DELETE`. Missing or invisible ids are a no-op.
    pub fn remove(&self, actor: &Actor, id: &RecordId) -> MutuResult<()> {
        T::authorise(actor)?;
        let record = match self.store.get(id)? {
            Some(record) if Self::visible(&actor.scope(), &record) => record,
            _ => return Ok(()),
        };

        if self.store.delete(id)? {
            self.log(actor, LogAction::Delete, &record, "deleted");
        }
        Ok(())
    }
}
