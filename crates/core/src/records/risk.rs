//! Risk register.
//!
//! Each risk is rated on three ordinal factors (consequence, likelihood, controllability), each
//! from 1 to 5. Their product is the risk score, which falls into one of four grade bands. An
//! optional residual rating records consequence and likelihood after the action plan.

use crate::constants::{ORDINAL_MAX, ORDINAL_MIN};
use crate::notifications::{NewNotification, NotificationStore};
use crate::records::user::{User, UserView};
use crate::records::{EntityKind, UnitName};
use crate::repository::{Actor, Entity, Repository};
use crate::roles::{Role, Scope};
use crate::store::StoredRecord;
use crate::validation::{parse_date, required_text, NumericInput};
use crate::{MutuError, MutuResult};
use chrono::NaiveDate;
use mutu_types::NonEmptyText;
use mutu_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

wire_enum! {
    pub enum RiskStatus {
        Open => "Terbuka",
        InProgress => "Dalam Proses",
        Done => "Selesai",
    }
}

wire_enum! {
    pub enum RiskGrade {
        Low => "Rendah",
        Medium => "Sedang",
        High => "Tinggi",
        Extreme => "Ekstrem",
    }
}

impl RiskGrade {
    /// Grade band of a consequence × likelihood × controllability product.
    pub fn from_score(score: u16) -> Self {
        match score {
            0..=15 => RiskGrade::Low,
            16..=40 => RiskGrade::Medium,
            41..=75 => RiskGrade::High,
            _ => RiskGrade::Extreme,
        }
    }
}

/// A whole number on the 1..=5 rating scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct OrdinalScore(u8);

impl OrdinalScore {
    pub fn new(value: u8) -> MutuResult<Self> {
        if !(ORDINAL_MIN..=ORDINAL_MAX).contains(&value) {
            return Err(MutuError::Validation(format!(
                "score must be between {ORDINAL_MIN} and {ORDINAL_MAX}, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Parses a submitted score, naming `field` in any error.
    pub fn parse(field: &str, input: &NumericInput) -> MutuResult<Self> {
        let value = input.parse(field)?;
        let in_range = value >= f64::from(ORDINAL_MIN) && value <= f64::from(ORDINAL_MAX);
        if value.fract() != 0.0 || !in_range {
            return Err(MutuError::Validation(format!(
                "{field} must be a whole number from {ORDINAL_MIN} to {ORDINAL_MAX}"
            )));
        }
        Ok(Self(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for OrdinalScore {
    type Error = MutuError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrdinalScore> for u8 {
    fn from(score: OrdinalScore) -> Self {
        score.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: RecordId,
    pub unit: UnitName,
    pub source: String,
    pub description: NonEmptyText,
    pub cause: String,
    pub category: String,
    pub consequence: OrdinalScore,
    pub likelihood: OrdinalScore,
    pub controllability: OrdinalScore,
    pub evaluation: String,
    pub action_plan: String,
    pub due_date: NaiveDate,
    pub status: RiskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual_consequence: Option<OrdinalScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual_likelihood: Option<OrdinalScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic_id: Option<RecordId>,
}

impl Risk {
    pub fn inherent_score(&self) -> u16 {
        u16::from(self.consequence.value())
            * u16::from(self.likelihood.value())
            * u16::from(self.controllability.value())
    }

    /// Score after treatment, once both residual factors are recorded.
    pub fn residual_score(&self) -> Option<u16> {
        let consequence = self.residual_consequence?;
        let likelihood = self.residual_likelihood?;
        Some(
            u16::from(consequence.value())
                * u16::from(likelihood.value())
                * u16::from(self.controllability.value()),
        )
    }

    pub fn grade(&self) -> RiskGrade {
        RiskGrade::from_score(self.inherent_score())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRisk {
    pub unit: String,
    #[serde(default)]
    pub source: String,
    pub description: String,
    #[serde(default)]
    pub cause: String,
    #[serde(default)]
    pub category: String,
    pub consequence: NumericInput,
    pub likelihood: NumericInput,
    pub controllability: NumericInput,
    #[serde(default)]
    pub evaluation: String,
    #[serde(default)]
    pub action_plan: String,
    pub due_date: String,
    /// Defaults to `Terbuka`.
    #[serde(default)]
    pub status: Option<RiskStatus>,
    #[serde(default)]
    pub residual_consequence: Option<NumericInput>,
    #[serde(default)]
    pub residual_likelihood: Option<NumericInput>,
    #[serde(default)]
    pub pic_id: Option<RecordId>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPatch {
    pub unit: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub cause: Option<String>,
    pub category: Option<String>,
    pub consequence: Option<NumericInput>,
    pub likelihood: Option<NumericInput>,
    pub controllability: Option<NumericInput>,
    pub evaluation: Option<String>,
    pub action_plan: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<RiskStatus>,
    pub residual_consequence: Option<NumericInput>,
    pub residual_likelihood: Option<NumericInput>,
    pub pic_id: Option<RecordId>,
}

fn optional_score(field: &str, input: Option<&NumericInput>) -> MutuResult<Option<OrdinalScore>> {
    input.map(|i| OrdinalScore::parse(field, i)).transpose()
}

impl StoredRecord for Risk {
    const KIND: EntityKind = EntityKind::Risk;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Entity for Risk {
    type New = NewRisk;
    type Patch = RiskPatch;

    const UNIT_SCOPED: bool = true;

    fn unit(&self) -> Option<&UnitName> {
        Some(&self.unit)
    }

    fn build(id: RecordId, new: NewRisk) -> MutuResult<Self> {
        Ok(Self {
            id,
            unit: required_text("unit", &new.unit)?,
            source: new.source.trim().to_string(),
            description: required_text("description", &new.description)?,
            cause: new.cause.trim().to_string(),
            category: new.category.trim().to_string(),
            consequence: OrdinalScore::parse("consequence", &new.consequence)?,
            likelihood: OrdinalScore::parse("likelihood", &new.likelihood)?,
            controllability: OrdinalScore::parse("controllability", &new.controllability)?,
            evaluation: new.evaluation.trim().to_string(),
            action_plan: new.action_plan.trim().to_string(),
            due_date: parse_date("dueDate", &new.due_date)?,
            status: new.status.unwrap_or(RiskStatus::Open),
            residual_consequence: optional_score(
                "residualConsequence",
                new.residual_consequence.as_ref(),
            )?,
            residual_likelihood: optional_score(
                "residualLikelihood",
                new.residual_likelihood.as_ref(),
            )?,
            pic_id: new.pic_id,
        })
    }

    fn apply(&mut self, patch: RiskPatch) -> MutuResult<()> {
        if let Some(unit) = patch.unit {
            self.unit = required_text("unit", &unit)?;
        }
        if let Some(source) = patch.source {
            self.source = source.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = required_text("description", &description)?;
        }
        if let Some(cause) = patch.cause {
            self.cause = cause.trim().to_string();
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(input) = patch.consequence {
            self.consequence = OrdinalScore::parse("consequence", &input)?;
        }
        if let Some(input) = patch.likelihood {
            self.likelihood = OrdinalScore::parse("likelihood", &input)?;
        }
        if let Some(input) = patch.controllability {
            self.controllability = OrdinalScore::parse("controllability", &input)?;
        }
        if let Some(evaluation) = patch.evaluation {
            self.evaluation = evaluation.trim().to_string();
        }
        if let Some(plan) = patch.action_plan {
            self.action_plan = plan.trim().to_string();
        }
        if let Some(due) = patch.due_date {
            self.due_date = parse_date("dueDate", &due)?;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(input) = patch.residual_consequence {
            self.residual_consequence = Some(OrdinalScore::parse("residualConsequence", &input)?);
        }
        if let Some(input) = patch.residual_likelihood {
            self.residual_likelihood = Some(OrdinalScore::parse("residualLikelihood", &input)?);
        }
        if let Some(pic) = patch.pic_id {
            self.pic_id = Some(pic);
        }
        Ok(())
    }
}

/// A risk with its derived scores and resolved person in charge.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskView {
    #[serde(flatten)]
    pub risk: Risk,
    pub pic: Option<UserView>,
    pub inherent_score: u16,
    pub residual_score: Option<u16>,
    pub grade: RiskGrade,
}

#[derive(Clone)]
pub struct RiskService {
    repo: Repository<Risk>,
    users: Repository<User>,
    notifications: Arc<NotificationStore>,
}

impl RiskService {
    pub fn new(
        repo: Repository<Risk>,
        users: Repository<User>,
        notifications: Arc<NotificationStore>,
    ) -> Self {
        Self {
            repo,
            users,
            notifications,
        }
    }

    fn check_pic(&self, pic_id: Option<&RecordId>) -> MutuResult<()> {
        let Some(id) = pic_id else {
            return Ok(());
        };
        match self.users.find(&Scope::All, id) {
            Ok(_) => Ok(()),
            Err(MutuError::NotFound { .. }) => Err(MutuError::Validation(format!(
                "picId {id} does not reference a user"
            ))),
            Err(e) => Err(e),
        }
    }

    fn view(&self, risk: Risk) -> MutuResult<RiskView> {
        let pic = match &risk.pic_id {
            Some(id) => match self.users.find(&Scope::All, id) {
                Ok(user) => Some(user.view()),
                Err(MutuError::NotFound { .. }) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        Ok(RiskView {
            inherent_score: risk.inherent_score(),
            residual_score: risk.residual_score(),
            grade: risk.grade(),
            pic,
            risk,
        })
    }

    /// Registers a risk and alerts the risk-management subcommittee.
    pub fn create(&self, actor: &Actor, new: NewRisk) -> MutuResult<RiskView> {
        self.check_pic(new.pic_id.as_ref())?;
        let risk = self.repo.create(actor, new)?;

        let alert = self.notifications.add(NewNotification {
            title: Some(format!("New risk registered in {}", risk.unit)),
            description: Some(format!("{} (grade {})", risk.description, risk.grade())),
            link: Some(format!("/risks/{}", risk.id)),
            recipient_role: Some(Role::RiskManagementSubcommittee),
            recipient_unit: None,
        });
        if let Err(e) = alert {
            tracing::error!("risk {} saved but not announced: {e}", risk.id.short());
        }

        self.view(risk)
    }

    pub fn list(&self, scope: &Scope) -> MutuResult<Vec<RiskView>> {
        self.repo
            .find_all(scope)?
            .into_iter()
            .map(|risk| self.view(risk))
            .collect()
    }

    pub fn find(&self, scope: &Scope, id: &RecordId) -> MutuResult<RiskView> {
        let risk = self.repo.find(scope, id)?;
        self.view(risk)
    }

    pub fn update(&self, actor: &Actor, id: &RecordId, patch: RiskPatch) -> MutuResult<RiskView> {
        self.check_pic(patch.pic_id.as_ref())?;
        let risk = self.repo.update(actor, id, patch)?;
        self.view(risk)
    }

    pub fn remove(&self, actor: &Actor, id: &RecordId) -> MutuResult<()> {
        self.repo.remove(actor, id)
    }

    /// Raw records, for aggregation.
    pub fn records(&self, scope: &Scope) -> MutuResult<Vec<Risk>> {
        self.repo.find_all(scope)
    }
}
