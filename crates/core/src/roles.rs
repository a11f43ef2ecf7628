//! Role policy.
//!
//! Decides which records a user may see. Central roles (hospital management and the quality
//! committees) see every unit; everyone else is confined to their own unit, and a unit-scoped
//! user without a unit sees nothing at all.

use crate::records::UnitName;
use crate::{MutuError, MutuResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every role a user can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Direktur")]
    Director,
    #[serde(rename = "Komite Mutu")]
    QualityCommittee,
    #[serde(rename = "Sub Komite Keselamatan Pasien")]
    PatientSafetySubcommittee,
    #[serde(rename = "Sub Komite Manajemen Risiko")]
    RiskManagementSubcommittee,
    #[serde(rename = "Kepala Unit")]
    UnitHead,
    #[serde(rename = "PJ Ruangan")]
    WardLead,
    #[serde(rename = "Staf")]
    Staff,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Admin,
        Role::Director,
        Role::QualityCommittee,
        Role::PatientSafetySubcommittee,
        Role::RiskManagementSubcommittee,
        Role::UnitHead,
        Role::WardLead,
        Role::Staff,
    ];

    /// The name used on the wire and in the UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Director => "Direktur",
            Role::QualityCommittee => "Komite Mutu",
            Role::PatientSafetySubcommittee => "Sub Komite Keselamatan Pasien",
            Role::RiskManagementSubcommittee => "Sub Komite Manajemen Risiko",
            Role::UnitHead => "Kepala Unit",
            Role::WardLead => "PJ Ruangan",
            Role::Staff => "Staf",
        }
    }

    pub fn is_central(&self) -> bool {
        is_central_role(*self)
    }

    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_manage_units(&self) -> bool {
        self.is_central()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MutuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MutuError::Validation(format!("unknown role '{wanted}'")))
    }
}

/// Whether holders of `role` see records of every unit.
pub fn is_central_role(role: Role) -> bool {
    match role {
        Role::Admin
        | Role::Director
        | Role::QualityCommittee
        | Role::PatientSafetySubcommittee
        | Role::RiskManagementSubcommittee => true,
        Role::UnitHead | Role::WardLead | Role::Staff => false,
    }
}

/// Row filter derived from a user's role and unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    All,
    Unit(UnitName),
    Nothing,
}

impl Scope {
    /// Builds the filter for a user.
    pub fn for_user(role: Role, unit: Option<&UnitName>) -> Self {
        if is_central_role(role) {
            return Scope::All;
        }
        match unit {
            Some(unit) => Scope::Unit(unit.clone()),
            None => Scope::Nothing,
        }
    }

    /// Whether a record belonging to `record_unit` passes the filter.
    pub fn accepts(&self, record_unit: Option<&UnitName>) -> bool {
        match self {
            Scope::All => true,
            Scope::Unit(unit) => record_unit == Some(unit),
            Scope::Nothing => false,
        }
    }

    /// Fails with `Forbidden` when a record for `record_unit` lies outside the filter.
    pub fn require(&self, record_unit: Option<&UnitName>) -> MutuResult<()> {
        if self.accepts(record_unit) {
            return Ok(());
        }
        let unit = record_unit.map(|u| u.as_str()).unwrap_or("-");
        Err(MutuError::Forbidden(format!(
            "unit '{unit}' is outside your scope"
        )))
    }
}
