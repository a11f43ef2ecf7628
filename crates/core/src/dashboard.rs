//! Dashboard counters.

use crate::records::incident::{Incident, IncidentStatus, IncidentType, Severity};
use crate::records::risk::{Risk, RiskGrade, RiskStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts keyed by wire name. Every known value is present, zero or not.
pub type Breakdown = BTreeMap<&'static str, usize>;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentCounts {
    pub total: usize,
    pub by_status: Breakdown,
    pub by_type: Breakdown,
    pub by_severity: Breakdown,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCounts {
    pub total: usize,
    pub by_grade: Breakdown,
    pub by_status: Breakdown,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub incidents: IncidentCounts,
    pub risks: RiskCounts,
    pub indicator_entries: usize,
    pub surveys: usize,
}

fn breakdown<K: Copy>(
    known: &[K],
    name: impl Fn(&K) -> &'static str,
    values: impl Iterator<Item = K>,
) -> Breakdown {
    let mut counts: Breakdown = known.iter().map(|k| (name(k), 0)).collect();
    for value in values {
        *counts.entry(name(&value)).or_default() += 1;
    }
    counts
}

/// Summarises records that have already been filtered to the reader's scope.
pub fn summarise(
    incidents: &[Incident],
    risks: &[Risk],
    indicator_entries: usize,
    surveys: usize,
) -> DashboardSummary {
    DashboardSummary {
        incidents: IncidentCounts {
            total: incidents.len(),
            by_status: breakdown(
                IncidentStatus::ALL,
                IncidentStatus::as_str,
                incidents.iter().map(|i| i.status),
            ),
            by_type: breakdown(
                IncidentType::ALL,
                IncidentType::as_str,
                incidents.iter().map(|i| i.incident_type),
            ),
            by_severity: breakdown(
                Severity::ALL,
                Severity::as_str,
                incidents.iter().map(|i| i.severity),
            ),
        },
        risks: RiskCounts {
            total: risks.len(),
            by_grade: breakdown(RiskGrade::ALL, RiskGrade::as_str, risks.iter().map(Risk::grade)),
            by_status: breakdown(
                RiskStatus::ALL,
                RiskStatus::as_str,
                risks.iter().map(|r| r.status),
            ),
        },
        indicator_entries,
        surveys,
    }
}
