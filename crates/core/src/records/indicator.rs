//! Quality indicators.
//!
//! An [`IndicatorSubmission`] defines an indicator for a unit: its title, its target value
//! (`standard`) and the unit the target is measured in. Periodic [`Indicator`] entries record a
//! numerator and denominator against a submission. Entries carry no unit of their own; they
//! are visible to whoever can see their submission.

use crate::records::{EntityKind, UnitName};
use crate::repository::{Actor, Entity, Repository};
use crate::roles::Scope;
use crate::standard_unit::{self, StandardUnit};
use crate::store::StoredRecord;
use crate::validation::{parse_date, required_text, NumericInput};
use crate::{MutuError, MutuResult};
use chrono::NaiveDate;
use mutu_types::NonEmptyText;
use mutu_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSubmission {
    pub id: RecordId,
    pub unit: UnitName,
    pub title: NonEmptyText,
    pub standard: f64,
    pub standard_unit: StandardUnit,
}

impl IndicatorSubmission {
    /// The submission as shown to clients, with the display label of its standard unit.
    pub fn view(&self) -> IndicatorSubmissionView {
        IndicatorSubmissionView {
            id: self.id.clone(),
            unit: self.unit.clone(),
            title: self.title.clone(),
            standard: self.standard,
            standard_unit: standard_unit::to_display(self.standard_unit),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSubmissionView {
    pub id: RecordId,
    pub unit: UnitName,
    pub title: NonEmptyText,
    pub standard: f64,
    pub standard_unit: &'static str,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIndicatorSubmission {
    pub unit: String,
    pub title: String,
    pub standard: NumericInput,
    /// Display label, e.g. `%` or `menit`.
    pub standard_unit: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSubmissionPatch {
    pub unit: Option<String>,
    pub title: Option<String>,
    pub standard: Option<NumericInput>,
    pub standard_unit: Option<String>,
}

impl StoredRecord for IndicatorSubmission {
    const KIND: EntityKind = EntityKind::IndicatorSubmission;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Entity for IndicatorSubmission {
    type New = NewIndicatorSubmission;
    type Patch = IndicatorSubmissionPatch;

    const UNIT_SCOPED: bool = true;

    fn unit(&self) -> Option<&UnitName> {
        Some(&self.unit)
    }

    fn build(id: RecordId, new: NewIndicatorSubmission) -> MutuResult<Self> {
        Ok(Self {
            id,
            unit: required_text("unit", &new.unit)?,
            title: required_text("title", &new.title)?,
            standard: new.standard.parse("standard")?,
            standard_unit: standard_unit::to_persisted(&new.standard_unit)?,
        })
    }

    fn apply(&mut self, patch: IndicatorSubmissionPatch) -> MutuResult<()> {
        if let Some(unit) = patch.unit {
            self.unit = required_text("unit", &unit)?;
        }
        if let Some(title) = patch.title {
            self.title = required_text("title", &title)?;
        }
        if let Some(standard) = patch.standard {
            self.standard = standard.parse("standard")?;
        }
        if let Some(label) = patch.standard_unit {
            self.standard_unit = standard_unit::to_persisted(&label)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub id: RecordId,
    pub submission_id: RecordId,
    pub period: NaiveDate,
    pub numerator: f64,
    pub denominator: f64,
    pub analysis_notes: String,
    pub follow_up_plan: String,
}

impl Indicator {
    /// `numerator / denominator * 100`, when the denominator is non-zero.
    pub fn achievement(&self) -> Option<f64> {
        (self.denominator != 0.0).then(|| self.numerator / self.denominator * 100.0)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIndicator {
    pub submission_id: RecordId,
    pub period: String,
    pub numerator: NumericInput,
    pub denominator: NumericInput,
    #[serde(default)]
    pub analysis_notes: String,
    #[serde(default)]
    pub follow_up_plan: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorPatch {
    pub submission_id: Option<RecordId>,
    pub period: Option<String>,
    pub numerator: Option<NumericInput>,
    pub denominator: Option<NumericInput>,
    pub analysis_notes: Option<String>,
    pub follow_up_plan: Option<String>,
}

fn count(field: &str, input: &NumericInput) -> MutuResult<f64> {
    let value = input.parse(field)?;
    if value < 0.0 {
        return Err(MutuError::Validation(format!("{field} must not be negative")));
    }
    Ok(value)
}

impl StoredRecord for Indicator {
    const KIND: EntityKind = EntityKind::Indicator;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Entity for Indicator {
    type New = NewIndicator;
    type Patch = IndicatorPatch;

    /// Scoped through the submission by [`IndicatorService`].
    const UNIT_SCOPED: bool = false;

    fn build(id: RecordId, new: NewIndicator) -> MutuResult<Self> {
        Ok(Self {
            id,
            submission_id: new.submission_id,
            period: parse_date("period", &new.period)?,
            numerator: count("numerator", &new.numerator)?,
            denominator: count("denominator", &new.denominator)?,
            analysis_notes: new.analysis_notes.trim().to_string(),
            follow_up_plan: new.follow_up_plan.trim().to_string(),
        })
    }

    fn apply(&mut self, patch: IndicatorPatch) -> MutuResult<()> {
        if let Some(id) = patch.submission_id {
            self.submission_id = id;
        }
        if let Some(period) = patch.period {
            self.period = parse_date("period", &period)?;
        }
        if let Some(input) = patch.numerator {
            self.numerator = count("numerator", &input)?;
        }
        if let Some(input) = patch.denominator {
            self.denominator = count("denominator", &input)?;
        }
        if let Some(notes) = patch.analysis_notes {
            self.analysis_notes = notes.trim().to_string();
        }
        if let Some(plan) = patch.follow_up_plan {
            self.follow_up_plan = plan.trim().to_string();
        }
        Ok(())
    }

    /// Latest period first.
    fn order(records: &mut [Self]) {
        records.sort_by(|a, b| b.period.cmp(&a.period));
    }

    fn describe(&self) -> String {
        format!("(submission {}, period {})", self.submission_id.short(), self.period)
    }
}

/// An indicator entry joined with its submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorView {
    #[serde(flatten)]
    pub indicator: Indicator,
    pub submission: Option<IndicatorSubmissionView>,
    pub achievement: Option<f64>,
}

/// Indicator entries, scoped by the unit of their submission.
#[derive(Clone)]
pub struct IndicatorService {
    repo: Repository<Indicator>,
    submissions: Repository<IndicatorSubmission>,
}

impl IndicatorService {
    pub fn new(repo: Repository<Indicator>, submissions: Repository<IndicatorSubmission>) -> Self {
        Self { repo, submissions }
    }

    fn view(indicator: Indicator, submission: Option<&IndicatorSubmission>) -> IndicatorView {
        IndicatorView {
            achievement: indicator.achievement(),
            submission: submission.map(IndicatorSubmission::view),
            indicator,
        }
    }

    /// The submission `id`, as a validation failure when `scope` cannot see it.
    fn visible_submission(&self, scope: &Scope, id: &RecordId) -> MutuResult<IndicatorSubmission> {
        match self.submissions.find(scope, id) {
            Err(MutuError::NotFound { .. }) => Err(MutuError::Validation(format!(
                "submissionId {id} does not reference an indicator submission"
            ))),
            other => other,
        }
    }

    /// Loads `id` if its submission is visible under `scope`. A missing submission fails closed.
    fn visible(&self, scope: &Scope, id: &RecordId) -> MutuResult<Option<IndicatorView>> {
        let indicator = match self.repo.find(&Scope::All, id) {
            Ok(indicator) => indicator,
            Err(MutuError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let submission = match self.submissions.find(&Scope::All, &indicator.submission_id) {
            Ok(submission) => Some(submission),
            Err(MutuError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        if !scope.accepts(submission.as_ref().map(|s| &s.unit)) {
            return Ok(None);
        }
        Ok(Some(Self::view(indicator, submission.as_ref())))
    }

    pub fn create(&self, actor: &Actor, new: NewIndicator) -> MutuResult<IndicatorView> {
        let submission = self.visible_submission(&actor.scope(), &new.submission_id)?;
        let indicator = self.repo.create(actor, new)?;
        Ok(Self::view(indicator, Some(&submission)))
    }

    pub fn list(&self, scope: &Scope) -> MutuResult<Vec<IndicatorView>> {
        let submissions: HashMap<RecordId, IndicatorSubmission> = self
            .submissions
            .find_all(&Scope::All)?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        Ok(self
            .repo
            .find_all(&Scope::All)?
            .into_iter()
            .filter_map(|indicator| {
                let submission = submissions.get(&indicator.submission_id);
                scope
                    .accepts(submission.map(|s| &s.unit))
                    .then(|| Self::view(indicator, submission))
            })
            .collect())
    }

    pub fn find(&self, scope: &Scope, id: &RecordId) -> MutuResult<IndicatorView> {
        self.visible(scope, id)?
            .ok_or_else(|| MutuError::not_found(EntityKind::Indicator, id))
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: &RecordId,
        patch: IndicatorPatch,
    ) -> MutuResult<IndicatorView> {
        let scope = actor.scope();
        if self.visible(&scope, id)?.is_none() {
            return Err(MutuError::not_found(EntityKind::Indicator, id));
        }
        if let Some(submission_id) = &patch.submission_id {
            self.visible_submission(&scope, submission_id)?;
        }

        let indicator = self.repo.update(actor, id, patch)?;
        let submission = self.submissions.find(&Scope::All, &indicator.submission_id).ok();
        Ok(Self::view(indicator, submission.as_ref()))
    }

    pub fn remove(&self, actor: &Actor, id: &RecordId) -> MutuResult<()> {
        if self.visible(&actor.scope(), id)?.is_none() {
            return Ok(());
        }
        self.repo.remove(actor, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::system_log::SystemLogService;
    use crate::roles::Role;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn services() -> (IndicatorService, Repository<IndicatorSubmission>) {
        let logs = SystemLogService::new(Arc::new(MemoryStore::new()));
        let submissions = Repository::new(Arc::new(MemoryStore::new()), logs.clone());
        let indicators = Repository::new(Arc::new(MemoryStore::new()), logs);
        (
            IndicatorService::new(indicators, submissions.clone()),
            submissions,
        )
    }

    fn submission(repo: &Repository<IndicatorSubmission>, unit: &str) -> IndicatorSubmission {
        repo.create(
            &Actor::system(),
            NewIndicatorSubmission {
                unit: unit.into(),
                title: "Kepatuhan cuci tangan".into(),
                standard: NumericInput::from(85.0),
                standard_unit: "%".into(),
            },
        )
        .unwrap()
    }

    fn entry(submission: &IndicatorSubmission, period: &str, num: f64, den: f64) -> NewIndicator {
        NewIndicator {
            submission_id: submission.id.clone(),
            period: period.into(),
            numerator: NumericInput::from(num),
            denominator: NumericInput::from(den),
            analysis_notes: String::new(),
            follow_up_plan: String::new(),
        }
    }

    fn ward_lead(unit: &str) -> Actor {
        Actor {
            name: "Sari".into(),
            role: Some(Role::WardLead),
            unit: Some(UnitName::new(unit).unwrap()),
            user_id: None,
        }
    }

    #[test]
    fn submission_stores_persisted_unit_and_shows_label() {
        let (_, submissions) = services();
        let created = submission(&submissions, "RANAP");
        assert_eq!(created.standard_unit, StandardUnit::Persen);

        let stored = serde_json::to_value(&created).unwrap();
        assert_eq!(stored["standardUnit"], "persen");
        let shown = serde_json::to_value(created.view()).unwrap();
        assert_eq!(shown["standardUnit"], "%");
    }

    #[test]
    fn unknown_standard_unit_is_rejected() {
        let (_, submissions) = services();
        let result = submissions.create(
            &Actor::system(),
            NewIndicatorSubmission {
                unit: "RANAP".into(),
                title: "Waktu tunggu".into(),
                standard: NumericInput::from("60"),
                standard_unit: "detik".into(),
            },
        );
        assert!(matches!(result, Err(MutuError::Validation(_))));
    }

    #[test]
    fn list_joins_submission_and_computes_achievement() {
        let (service, submissions) = services();
        let sub = submission(&submissions, "RANAP");
        service
            .create(&Actor::system(), entry(&sub, "2024-01-31", 45.0, 50.0))
            .unwrap();
        service
            .create(&Actor::system(), entry(&sub, "2024-02-29", 0.0, 0.0))
            .unwrap();

        let views = service.list(&Scope::All).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].indicator.period.to_string(), "2024-02-29");
        assert_eq!(views[0].achievement, None);
        assert_eq!(views[1].achievement, Some(90.0));
        assert_eq!(
            views[1].submission.as_ref().map(|s| s.standard_unit),
            Some("%")
        );
    }

    #[test]
    fn entries_are_scoped_by_submission_unit() {
        let (service, submissions) = services();
        let ranap = submission(&submissions, "RANAP");
        let igd = submission(&submissions, "IGD");
        service
            .create(&Actor::system(), entry(&ranap, "2024-01-31", 1.0, 2.0))
            .unwrap();
        let igd_entry = service
            .create(&Actor::system(), entry(&igd, "2024-01-31", 1.0, 2.0))
            .unwrap();

        let actor = ward_lead("RANAP");
        let seen = service.list(&actor.scope()).unwrap();
        assert_eq!(seen.len(), 1);
        assert!(matches!(
            service.find(&actor.scope(), &igd_entry.indicator.id),
            Err(MutuError::NotFound { .. })
        ));
        assert!(matches!(
            service.create(&actor, entry(&igd, "2024-02-29", 1.0, 2.0)),
            Err(MutuError::Validation(_))
        ));
    }

    #[test]
    fn orphaned_entries_fail_closed() {
        let (service, submissions) = services();
        let sub = submission(&submissions, "RANAP");
        service
            .create(&Actor::system(), entry(&sub, "2024-01-31", 1.0, 2.0))
            .unwrap();
        submissions.remove(&Actor::system(), &sub.id).unwrap();

        assert!(service.list(&ward_lead("RANAP").scope()).unwrap().is_empty());
        let central = service.list(&Scope::All).unwrap();
        assert_eq!(central.len(), 1);
        assert!(central[0].submission.is_none());
    }

    #[test]
    fn counts_must_be_finite_and_non_negative() {
        let (service, submissions) = services();
        let sub = submission(&submissions, "RANAP");
        let mut body = entry(&sub, "2024-01-31", 1.0, 2.0);
        body.numerator = NumericInput::from("NaN");
        assert!(service.create(&Actor::system(), body).is_err());

        let body = entry(&sub, "2024-01-31", -1.0, 2.0);
        assert!(service.create(&Actor::system(), body).is_err());
    }

    #[test]
    fn numeric_strings_are_accepted_from_forms() {
        let (service, submissions) = services();
        let sub = submission(&submissions, "RANAP");
        let body: NewIndicator = serde_json::from_value(json!({
            "submissionId": sub.id,
            "period": "2024-03-31",
            "numerator": "9",
            "denominator": 10
        }))
        .unwrap();
        let view = service.create(&Actor::system(), body).unwrap();
        assert_eq!(view.achievement, Some(90.0));
    }
}
