//! Patient-safety culture survey results.
//!
//! Scores are reported per dimension of the hospital survey on patient-safety culture, together
//! with the share of positive, neutral and negative answers.

use crate::records::{EntityKind, UnitName};
use crate::repository::Entity;
use crate::store::StoredRecord;
use crate::validation::{parse_date, required_text, NumericInput};
use crate::{MutuError, MutuResult};
use chrono::NaiveDate;
use mutu_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

wire_enum! {
    pub enum SurveyDimension {
        TeamworkWithinUnits => "teamworkWithinUnits",
        SupervisorExpectations => "supervisorExpectations",
        OrganizationalLearning => "organizationalLearning",
        ManagementSupport => "managementSupport",
        OverallPerceptions => "overallPerceptions",
        FeedbackAboutError => "feedbackAboutError",
        CommunicationOpenness => "communicationOpenness",
        FrequencyOfEventsReported => "frequencyOfEventsReported",
        TeamworkAcrossUnits => "teamworkAcrossUnits",
        Staffing => "staffing",
        HandoffsAndTransitions => "handoffsAndTransitions",
        NonpunitiveResponse => "nonpunitiveResponse",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: f64,
    pub max: f64,
}

impl DimensionScore {
    fn validate(&self, dimension: SurveyDimension) -> MutuResult<()> {
        let finite = self.score.is_finite() && self.max.is_finite();
        if !finite || self.max <= 0.0 || self.score < 0.0 || self.score > self.max {
            return Err(MutuError::Validation(format!(
                "score for {dimension} must be between 0 and a positive max"
            )));
        }
        Ok(())
    }
}

/// Share of answers per sentiment, each in percent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Percentages {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl Percentages {
    fn validate(&self) -> MutuResult<()> {
        for (name, value) in [
            ("positive", self.positive),
            ("neutral", self.neutral),
            ("negative", self.negative),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(MutuError::Validation(format!(
                    "percentages.{name} must be between 0 and 100"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: RecordId,
    pub unit: UnitName,
    pub submission_date: NaiveDate,
    pub scores: BTreeMap<SurveyDimension, DimensionScore>,
    pub total_score: f64,
    pub percentages: Percentages,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSurvey {
    pub unit: String,
    pub submission_date: String,
    pub scores: BTreeMap<SurveyDimension, DimensionScore>,
    pub total_score: NumericInput,
    pub percentages: Percentages,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyPatch {
    pub unit: Option<String>,
    pub submission_date: Option<String>,
    pub scores: Option<BTreeMap<SurveyDimension, DimensionScore>>,
    pub total_score: Option<NumericInput>,
    pub percentages: Option<Percentages>,
    pub answers: Option<BTreeMap<String, String>>,
}

fn validate_scores(scores: &BTreeMap<SurveyDimension, DimensionScore>) -> MutuResult<()> {
    scores
        .iter()
        .try_for_each(|(dimension, score)| score.validate(*dimension))
}

impl StoredRecord for Survey {
    const KIND: EntityKind = EntityKind::Survey;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Entity for Survey {
    type New = NewSurvey;
    type Patch = SurveyPatch;

    const UNIT_SCOPED: bool = true;

    fn unit(&self) -> Option<&UnitName> {
        Some(&self.unit)
    }

    fn build(id: RecordId, new: NewSurvey) -> MutuResult<Self> {
        validate_scores(&new.scores)?;
        new.percentages.validate()?;
        Ok(Self {
            id,
            unit: required_text("unit", &new.unit)?,
            submission_date: parse_date("submissionDate", &new.submission_date)?,
            scores: new.scores,
            total_score: new.total_score.parse("totalScore")?,
            percentages: new.percentages,
            answers: new.answers,
        })
    }

    fn apply(&mut self, patch: SurveyPatch) -> MutuResult<()> {
        if let Some(unit) = patch.unit {
            self.unit = required_text("unit", &unit)?;
        }
        if let Some(date) = patch.submission_date {
            self.submission_date = parse_date("submissionDate", &date)?;
        }
        if let Some(scores) = patch.scores {
            validate_scores(&scores)?;
            self.scores = scores;
        }
        if let Some(total) = patch.total_score {
            self.total_score = total.parse("totalScore")?;
        }
        if let Some(percentages) = patch.percentages {
            percentages.validate()?;
            self.percentages = percentages;
        }
        if let Some(answers) = patch.answers {
            self.answers = answers;
        }
        Ok(())
    }

    /// Most recent submission first.
    fn order(records: &mut [Self]) {
        records.sort_by(|a, b| b.submission_date.cmp(&a.submission_date));
    }
}
