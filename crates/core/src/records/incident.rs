//! Incident reports.

use crate::chronology;
use crate::notifications::{NewNotification, NotificationStore};
use crate::records::{EntityKind, UnitName};
use crate::repository::{Actor, Entity, Repository};
use crate::roles::{Role, Scope};
use crate::store::StoredRecord;
use crate::validation::{parse_date, required_text};
use crate::{MutuError, MutuResult};
use chrono::NaiveDate;
use mutu_types::NonEmptyText;
use mutu_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

wire_enum! {
    pub enum IncidentStatus {
        Reported => "Dilaporkan",
        UnderInvestigation => "Investigasi",
        Closed => "Selesai",
    }
}

wire_enum! {
    /// Incident classification used in patient-safety reporting.
    pub enum IncidentType {
        /// Kejadian Tidak Diharapkan: the patient was harmed.
        AdverseEvent => "KTD",
        /// Kejadian Nyaris Cedera: caught before reaching the patient.
        NearMiss => "KNC",
        /// Kejadian Tidak Cedera: reached the patient without harm.
        NoHarm => "KTC",
        /// Kondisi Potensial Cedera: a hazard with no incident yet.
        PotentialInjury => "KPC",
        Sentinel => "Sentinel",
    }
}

wire_enum! {
    /// Risk-grading colour of an incident.
    pub enum Severity {
        Blue => "Biru",
        Green => "Hijau",
        Yellow => "Kuning",
        Red => "Merah",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: RecordId,
    pub date: NaiveDate,
    pub status: IncidentStatus,
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub severity: Severity,
    pub patient_name: NonEmptyText,
    pub chronology: String,
    pub related_unit: UnitName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_id: Option<RecordId>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    pub date: String,
    /// Defaults to `Dilaporkan`.
    #[serde(default)]
    pub status: Option<IncidentStatus>,
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub severity: Severity,
    pub patient_name: String,
    pub chronology: String,
    pub related_unit: String,
    /// Set from the session, never from the request body.
    #[serde(skip_deserializing)]
    pub reporter_id: Option<RecordId>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPatch {
    pub date: Option<String>,
    pub status: Option<IncidentStatus>,
    #[serde(rename = "type")]
    pub incident_type: Option<IncidentType>,
    pub severity: Option<Severity>,
    pub patient_name: Option<String>,
    pub chronology: Option<String>,
    pub related_unit: Option<String>,
}

fn formatted_chronology(text: &str) -> MutuResult<String> {
    let formatted = chronology::format(text);
    if formatted.is_empty() {
        return Err(MutuError::Validation("chronology is required".into()));
    }
    Ok(formatted)
}

impl StoredRecord for Incident {
    const KIND: EntityKind = EntityKind::Incident;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Entity for Incident {
    type New = NewIncident;
    type Patch = IncidentPatch;

    const UNIT_SCOPED: bool = true;

    fn unit(&self) -> Option<&UnitName> {
        Some(&self.related_unit)
    }

    fn build(id: RecordId, new: NewIncident) -> MutuResult<Self> {
        Ok(Self {
            id,
            date: parse_date("date", &new.date)?,
            status: new.status.unwrap_or(IncidentStatus::Reported),
            incident_type: new.incident_type,
            severity: new.severity,
            patient_name: required_text("patientName", &new.patient_name)?,
            chronology: formatted_chronology(&new.chronology)?,
            related_unit: required_text("relatedUnit", &new.related_unit)?,
            reporter_id: new.reporter_id,
        })
    }

    fn apply(&mut self, patch: IncidentPatch) -> MutuResult<()> {
        if let Some(date) = patch.date {
            self.date = parse_date("date", &date)?;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(incident_type) = patch.incident_type {
            self.incident_type = incident_type;
        }
        if let Some(severity) = patch.severity {
            self.severity = severity;
        }
        if let Some(name) = patch.patient_name {
            self.patient_name = required_text("patientName", &name)?;
        }
        if let Some(text) = patch.chronology {
            self.chronology = formatted_chronology(&text)?;
        }
        if let Some(unit) = patch.related_unit {
            self.related_unit = required_text("relatedUnit", &unit)?;
        }
        Ok(())
    }

    /// Most recent incident first.
    fn order(records: &mut [Self]) {
        records.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

/// Incident workflow: the repository plus the patient-safety notification on new reports.
#[derive(Clone)]
pub struct IncidentService {
    repo: Repository<Incident>,
    notifications: Arc<NotificationStore>,
}

impl IncidentService {
    pub fn new(repo: Repository<Incident>, notifications: Arc<NotificationStore>) -> Self {
        Self {
            repo,
            notifications,
        }
    }

    /// Records a new incident reported by `actor` and alerts the patient-safety subcommittee.
    ///
    /// The incident is stored before the alert is sent; a failed alert is logged, not returned.
    pub fn create(&self, actor: &Actor, mut new: NewIncident) -> MutuResult<Incident> {
        new.reporter_id = actor.user_id.clone();
        let incident = self.repo.create(actor, new)?;

        let alert = self.notifications.add(NewNotification {
            title: Some(format!("New {} incident reported", incident.incident_type)),
            description: Some(format!(
                "{} incident in {} on {} ({})",
                incident.severity, incident.related_unit, incident.date, incident.status
            )),
            link: Some(format!("/incidents/{}", incident.id)),
            recipient_role: Some(Role::PatientSafetySubcommittee),
            recipient_unit: None,
        });
        if let Err(e) = alert {
            tracing::error!("incident {} saved but not announced: {e}", incident.id.short());
        }

        Ok(incident)
    }

    pub fn list(&self, scope: &Scope) -> MutuResult<Vec<Incident>> {
        self.repo.find_all(scope)
    }

    pub fn find(&self, scope: &Scope, id: &RecordId) -> MutuResult<Incident> {
        self.repo.find(scope, id)
    }

    pub fn update(&self, actor: &Actor, id: &RecordId, patch: IncidentPatch) -> MutuResult<Incident> {
        self.repo.update(actor, id, patch)
    }

    pub fn remove(&self, actor: &Actor, id: &RecordId) -> MutuResult<()> {
        self.repo.remove(actor, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationFilter;
    use crate::records::system_log::SystemLogService;
    use crate::store::MemoryStore;

    fn service() -> (IncidentService, Arc<NotificationStore>) {
        let logs = SystemLogService::new(Arc::new(MemoryStore::new()));
        let notifications = Arc::new(NotificationStore::new());
        let repo = Repository::new(Arc::new(MemoryStore::new()), logs);
        (IncidentService::new(repo, Arc::clone(&notifications)), notifications)
    }

    fn body(chronology: &str) -> NewIncident {
        serde_json::from_value(serde_json::json!({
            "date": "2024-03-09",
            "type": "KTD",
            "severity": "Merah",
            "patientName": "Tn. A",
            "chronology": chronology,
            "relatedUnit": "RANAP",
            "reporterId": "ffffffffffffffffffffffffffffffff"
        }))
        .expect("valid incident body")
    }

    #[test]
    fn create_formats_chronology() {
        let (service, _) = service();
        let incident = service
            .create(&Actor::system(), body("first step\nsecond step"))
            .unwrap();
        assert_eq!(incident.chronology, "First step.\nSecond step.");
        assert_eq!(incident.status, IncidentStatus::Reported);
    }

    #[test]
    fn update_formats_chronology() {
        let (service, _) = service();
        let incident = service.create(&Actor::system(), body("awal")).unwrap();
        let patch = IncidentPatch {
            chronology: Some("  dipindah ke icu \r\n\r\n dokter jaga datang".into()),
            ..Default::default()
        };
        let updated = service.update(&Actor::system(), &incident.id, patch).unwrap();
        assert_eq!(updated.chronology, "Dipindah ke icu.\nDokter jaga datang.");
    }

    #[test]
    fn blank_chronology_is_rejected() {
        let (service, _) = service();
        assert!(matches!(
            service.create(&Actor::system(), body(" \n \n")),
            Err(MutuError::Validation(_))
        ));
    }

    #[test]
    fn reporter_comes_from_actor_not_body() {
        let (service, _) = service();
        let reporter = RecordId::new();
        let actor = Actor {
            name: "Dewi".into(),
            role: Some(Role::Staff),
            unit: Some(UnitName::new("RANAP").unwrap()),
            user_id: Some(reporter.clone()),
        };
        let incident = service.create(&actor, body("jatuh")).unwrap();
        assert_eq!(incident.reporter_id, Some(reporter));
    }

    #[test]
    fn create_notifies_patient_safety_subcommittee() {
        let (service, notifications) = service();
        service.create(&Actor::system(), body("jatuh")).unwrap();

        let for_subcommittee = notifications
            .list(&NotificationFilter {
                role: Some(Role::PatientSafetySubcommittee),
                unit: None,
            })
            .unwrap();
        assert_eq!(for_subcommittee.len(), 1);
        assert!(for_subcommittee[0].title.contains("KTD"));

        let for_staff = notifications
            .list(&NotificationFilter {
                role: Some(Role::Staff),
                unit: None,
            })
            .unwrap();
        assert!(for_staff.is_empty());
    }

    #[test]
    fn failed_alert_still_returns_the_saved_incident() {
        let (service, notifications) = service();
        notifications.poison();

        let incident = service.create(&Actor::system(), body("jatuh")).unwrap();
        assert_eq!(service.list(&Scope::All).unwrap(), vec![incident]);
    }

    #[test]
    fn wire_format_uses_camel_case_and_type_key() {
        let (service, _) = service();
        let incident = service.create(&Actor::system(), body("jatuh")).unwrap();
        let json = serde_json::to_value(&incident).unwrap();
        assert_eq!(json["type"], "KTD");
        assert_eq!(json["severity"], "Merah");
        assert_eq!(json["patientName"], "Tn. A");
        assert_eq!(json["relatedUnit"], "RANAP");
        assert_eq!(json["date"], "2024-03-09");
        assert!(json.get("reporterId").is_none());
    }
}
