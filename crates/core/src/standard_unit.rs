//! Standard units of quality-indicator targets.
//!
//! Units are persisted as an enumerated kind. The only label that differs from its persisted
//! name is the percent sign: users see `%`, the store keeps `persen`. All other labels pass
//! through unchanged in both directions.

use crate::{MutuError, MutuResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardUnit {
    Persen,
    PerMil,
    Menit,
    Jam,
    Hari,
    Kali,
    Orang,
}

impl StandardUnit {
    pub const ALL: [StandardUnit; 7] = [
        StandardUnit::Persen,
        StandardUnit::PerMil,
        StandardUnit::Menit,
        StandardUnit::Jam,
        StandardUnit::Hari,
        StandardUnit::Kali,
        StandardUnit::Orang,
    ];

    /// Name of the persisted kind.
    pub fn persisted_name(&self) -> &'static str {
        match self {
            StandardUnit::Persen => "persen",
            StandardUnit::PerMil => "permil",
            StandardUnit::Menit => "menit",
            StandardUnit::Jam => "jam",
            StandardUnit::Hari => "hari",
            StandardUnit::Kali => "kali",
            StandardUnit::Orang => "orang",
        }
    }
}

impl fmt::Display for StandardUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(to_display(*self))
    }
}

/// Maps a display label to its persisted kind.
///
/// # Errors
///
/// Returns `MutuError::Validation` for labels outside the known set.
pub fn to_persisted(label: &str) -> MutuResult<StandardUnit> {
    let label = label.trim();
    if label == "%" {
        return Ok(StandardUnit::Persen);
    }

    StandardUnit::ALL
        .into_iter()
        .filter(|unit| *unit != StandardUnit::Persen)
        .find(|unit| unit.persisted_name() == label)
        .ok_or_else(|| MutuError::Validation(format!("unknown standard unit '{label}'")))
}

/// Maps a persisted kind to the label shown to users.
pub fn to_display(unit: StandardUnit) -> &'static str {
    match unit {
        StandardUnit::Persen => "%",
        other => other.persisted_name(),
    }
}
