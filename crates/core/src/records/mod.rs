//! Entity records.
//!
//! Each submodule defines one entity: the stored record, the create DTO, the partial-update
//! DTO and its [`Entity`](crate::repository::Entity) implementation. Relations between
//! entities are plain [`RecordId`](mutu_uuid::RecordId) fields resolved at read time.

/// Declares a closed enum whose variants travel under fixed wire names.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The name used on the wire and in stored records.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod incident;
pub mod indicator;
pub mod risk;
pub mod survey;
pub mod system_log;
pub mod unit;
pub mod user;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Organisational unit name as carried on records ("RANAP", "IGD", ...).
pub type UnitName = mutu_types::NonEmptyText;

/// The kinds of record the core stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Incident,
    Risk,
    User,
    IndicatorSubmission,
    Indicator,
    Survey,
    Unit,
    SystemLog,
}

impl EntityKind {
    /// Label used in messages and log details.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Incident => "Incident",
            EntityKind::Risk => "Risk",
            EntityKind::User => "User",
            EntityKind::IndicatorSubmission => "Indicator submission",
            EntityKind::Indicator => "Indicator",
            EntityKind::Survey => "Survey",
            EntityKind::Unit => "Unit",
            EntityKind::SystemLog => "System log",
        }
    }

    /// Directory used by the file-backed store.
    pub fn dir_name(&self) -> &'static str {
        match self {
            EntityKind::Incident => "incidents",
            EntityKind::Risk => "risks",
            EntityKind::User => "users",
            EntityKind::IndicatorSubmission => "indicator_submissions",
            EntityKind::Indicator => "indicators",
            EntityKind::Survey => "surveys",
            EntityKind::Unit => "units",
            EntityKind::SystemLog => "system_logs",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses an optional unit field: absent or blank means no unit.
pub(crate) fn optional_unit(value: Option<&str>) -> Option<UnitName> {
    value.and_then(|v| UnitName::new(v).ok())
}
