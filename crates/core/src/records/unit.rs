//! Organisational units.

use crate::records::{EntityKind, UnitName};
use crate::repository::{Actor, Entity};
use crate::roles::Role;
use crate::store::StoredRecord;
use crate::validation::required_text;
use crate::MutuResult;
use mutu_uuid::RecordId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: RecordId,
    pub name: UnitName,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUnit {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UnitPatch {
    pub name: Option<String>,
}

impl StoredRecord for Unit {
    const KIND: EntityKind = EntityKind::Unit;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Entity for Unit {
    type New = NewUnit;
    type Patch = UnitPatch;

    const UNIT_SCOPED: bool = false;

    fn build(id: RecordId, new: NewUnit) -> MutuResult<Self> {
        Ok(Self {
            id,
            name: required_text("name", &new.name)?,
        })
    }

    fn apply(&mut self, patch: UnitPatch) -> MutuResult<()> {
        if let Some(name) = patch.name {
            self.name = required_text("name", &name)?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("({})", self.name)
    }

    fn conflicts_with(&self, other: &Self) -> Option<String> {
        self.name
            .eq_ignore_case(&other.name)
            .then(|| format!("unit {} already exists", other.name))
    }

    fn authorise(actor: &Actor) -> MutuResult<()> {
        actor.require(Role::can_manage_units, "manage units")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::system_log::SystemLogService;
    use crate::repository::Repository;
    use crate::roles::Scope;
    use crate::store::MemoryStore;
    use crate::MutuError;
    use std::sync::Arc;

    fn repository() -> Repository<Unit> {
        let logs = SystemLogService::new(Arc::new(MemoryStore::new()));
        Repository::new(Arc::new(MemoryStore::new()), logs)
    }

    fn named(name: &str) -> NewUnit {
        NewUnit { name: name.into() }
    }

    fn actor(role: Role) -> Actor {
        Actor {
            name: "Budi".into(),
            role: Some(role),
            unit: Some(UnitName::new("RANAP").unwrap()),
            user_id: None,
        }
    }

    #[test]
    fn names_are_unique_ignoring_case() {
        let repo = repository();
        let system = Actor::system();
        repo.create(&system, named("RANAP")).unwrap();
        assert!(matches!(
            repo.create(&system, named("ranap")),
            Err(MutuError::Validation(_))
        ));

        let igd = repo.create(&system, named("IGD")).unwrap();
        let rename = UnitPatch {
            name: Some("Ranap".into()),
        };
        assert!(repo.update(&system, &igd.id, rename).is_err());

        let same_name = UnitPatch {
            name: Some("igd".into()),
        };
        assert!(repo.update(&system, &igd.id, same_name).is_ok());
    }

    #[test]
    fn only_central_roles_manage_units() {
        let repo = repository();
        assert!(matches!(
            repo.create(&actor(Role::UnitHead), named("ICU")),
            Err(MutuError::Forbidden(_))
        ));
        let icu = repo.create(&actor(Role::QualityCommittee), named("ICU")).unwrap();
        assert!(matches!(
            repo.remove(&actor(Role::Staff), &icu.id),
            Err(MutuError::Forbidden(_))
        ));
    }

    #[test]
    fn units_are_visible_to_every_scope() {
        let repo = repository();
        repo.create(&Actor::system(), named("IGD")).unwrap();
        repo.create(&Actor::system(), named("RANAP")).unwrap();

        let names: Vec<_> = repo
            .find_all(&Scope::Nothing)
            .unwrap()
            .into_iter()
            .map(|u| u.name.into_inner())
            .collect();
        assert_eq!(names, vec!["IGD", "RANAP"]);
    }
}
