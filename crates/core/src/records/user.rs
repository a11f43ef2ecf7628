//! User accounts.
//!
//! A stored [`User`] carries the password hash. Everything that leaves the core goes through
//! [`UserView`] (or [`SessionUser`](crate::session::SessionUser)), neither of which has a
//! password field.

use crate::constants::MIN_PASSWORD_LEN;
use crate::password::{self, PasswordHasher};
use crate::records::system_log::{LogAction, SystemLogService};
use crate::records::{optional_unit, EntityKind, UnitName};
use crate::repository::{Actor, Entity, Repository};
use crate::roles::{Role, Scope};
use crate::session::SessionUser;
use crate::store::StoredRecord;
use crate::validation::required_text;
use crate::{MutuError, MutuResult};
use mutu_types::{EmailAddress, NonEmptyText};
use mutu_uuid::RecordId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub email: EmailAddress,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitName>,
}

impl User {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            unit: self.unit.clone(),
        }
    }

    fn check_unit(&self) -> MutuResult<()> {
        if !self.role.is_central() && self.unit.is_none() {
            return Err(MutuError::Validation(format!(
                "unit is required for role {}",
                self.role
            )));
        }
        Ok(())
    }
}

/// A user as returned to clients.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub email: EmailAddress,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitName>,
}

/// Create request for a user, with the plain password.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub unit: Option<String>,
}

/// A user create request after hashing.
#[derive(Clone, Debug)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub unit: Option<String>,
}

/// A user patch after hashing.
#[derive(Clone, Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub unit: Option<String>,
}

fn parse_email(value: &str) -> MutuResult<EmailAddress> {
    EmailAddress::parse(value).map_err(|e| MutuError::Validation(format!("email: {e}")))
}

impl StoredRecord for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Entity for User {
    type New = UserDraft;
    type Patch = UserChanges;

    const UNIT_SCOPED: bool = true;

    fn unit(&self) -> Option<&UnitName> {
        self.unit.as_ref()
    }

    fn build(id: RecordId, new: UserDraft) -> MutuResult<Self> {
        let user = Self {
            id,
            name: required_text("name", &new.name)?,
            email: parse_email(&new.email)?,
            password_hash: new.password_hash,
            role: new.role,
            unit: optional_unit(new.unit.as_deref()),
        };
        user.check_unit()?;
        Ok(user)
    }

    fn apply(&mut self, patch: UserChanges) -> MutuResult<()> {
        if let Some(name) = patch.name {
            self.name = required_text("name", &name)?;
        }
        if let Some(email) = patch.email {
            self.email = parse_email(&email)?;
        }
        if let Some(hash) = patch.password_hash {
            self.password_hash = hash;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(unit) = patch.unit {
            self.unit = Some(required_text("unit", &unit)?);
        }
        self.check_unit()
    }

    fn describe(&self) -> String {
        format!("({}, {})", self.email, self.role)
    }

    fn conflicts_with(&self, other: &Self) -> Option<String> {
        (self.email == other.email).then(|| format!("email {} is already registered", self.email))
    }

    fn authorise(actor: &Actor) -> MutuResult<()> {
        actor.require(Role::can_manage_users, "manage users")
    }
}

/// Account management and sign-in.
#[derive(Clone)]
pub struct UserService {
    repo: Repository<User>,
    logs: SystemLogService,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(repo: Repository<User>, logs: SystemLogService, hasher: PasswordHasher) -> Self {
        Self { repo, logs, hasher }
    }

    fn hash_password(&self, password: &str) -> MutuResult<String> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(MutuError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(self.hasher.hash(password))
    }

    pub fn create(&self, actor: &Actor, new: NewUser) -> MutuResult<UserView> {
        actor.require(Role::can_manage_users, "manage users")?;
        let draft = UserDraft {
            name: new.name,
            email: new.email,
            password_hash: self.hash_password(&new.password)?,
            role: new.role,
            unit: new.unit,
        };
        Ok(self.repo.create(actor, draft)?.view())
    }

    pub fn list(&self, scope: &Scope) -> MutuResult<Vec<UserView>> {
        Ok(self.repo.find_all(scope)?.iter().map(User::view).collect())
    }

    pub fn find(&self, scope: &Scope, id: &RecordId) -> MutuResult<UserView> {
        Ok(self.repo.find(scope, id)?.view())
    }

    pub fn update(&self, actor: &Actor, id: &RecordId, patch: UserPatch) -> MutuResult<UserView> {
        actor.require(Role::can_manage_users, "manage users")?;
        let password_hash = match patch.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };
        let changes = UserChanges {
            name: patch.name,
            email: patch.email,
            password_hash,
            role: patch.role,
            unit: patch.unit,
        };
        Ok(self.repo.update(actor, id, changes)?.view())
    }

    pub fn remove(&self, actor: &Actor, id: &RecordId) -> MutuResult<()> {
        self.repo.remove(actor, id)
    }

    /// The current state of the account behind a session, or `None` if it no longer exists.
    pub fn session_user(&self, id: &RecordId) -> MutuResult<Option<SessionUser>> {
        match self.repo.find(&Scope::All, id) {
            Ok(user) => Ok(Some(SessionUser::from(&user))),
            Err(MutuError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The user with these credentials, or `Unauthenticated`.
    pub fn authenticate(&self, email: &str, password: &str) -> MutuResult<User> {
        let email = EmailAddress::parse(email).map_err(|_| MutuError::Unauthenticated)?;
        self.repo
            .find_all(&Scope::All)?
            .into_iter()
            .find(|u| u.email == email && password::verify(password, &u.password_hash))
            .ok_or(MutuError::Unauthenticated)
    }

    /// Authenticates and records a `LOGIN` entry.
    pub fn login(&self, email: &str, password: &str) -> MutuResult<SessionUser> {
        let user = match self.authenticate(email, password) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("failed sign-in attempt");
                return Err(e);
            }
        };
        self.logs
            .record(user.name.as_str(), LogAction::Login, format!("{} signed in", user.email))?;
        Ok(SessionUser::from(&user))
    }

    /// Records a `LOGOUT` entry for `user`.
    pub fn logout(&self, user: &SessionUser) -> MutuResult<()> {
        self.logs
            .record(user.name.as_str(), LogAction::Logout, format!("{} signed out", user.email))?;
        Ok(())
    }
}
