//! JSON envelopes.
//!
//! Every response body is an object keyed by what it carries: `{"incidents": [...]}`,
//! `{"incident": {...}}`, `{"error": "..."}`. Record payloads are documented as opaque
//! objects in the OpenAPI schema.

use mutu_core::dashboard::DashboardSummary;
use mutu_core::notifications::Notification;
use mutu_core::records::incident::Incident;
use mutu_core::records::indicator::{IndicatorSubmissionView, IndicatorView};
use mutu_core::records::risk::RiskView;
use mutu_core::records::survey::Survey;
use mutu_core::records::system_log::SystemLog;
use mutu_core::records::unit::Unit;
use mutu_core::records::user::UserView;
use mutu_core::SessionUser;
use serde::Serialize;
use utoipa::ToSchema;

macro_rules! envelope {
    ($(#[$meta:meta])* $name:ident { $field:ident: Vec<$ty:ty> }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Serialize, ToSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[schema(value_type = Vec<Object>)]
            pub $field: Vec<$ty>,
        }
    };
    ($(#[$meta:meta])* $name:ident { $field:ident: $ty:ty }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Serialize, ToSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[schema(value_type = Object)]
            pub $field: $ty,
        }
    };
}

envelope!(IncidentsRes { incidents: Vec<Incident> });
envelope!(IncidentRes { incident: Incident });
envelope!(
    /// Risks with derived scores, grade and resolved person in charge.
    RisksRes { risks: Vec<RiskView> }
);
envelope!(RiskRes { risk: RiskView });
envelope!(
    /// Indicator entries joined with their submission.
    IndicatorsRes { indicators: Vec<IndicatorView> }
);
envelope!(IndicatorRes { indicator: IndicatorView });
envelope!(IndicatorSubmissionsRes { indicator_submissions: Vec<IndicatorSubmissionView> });
envelope!(IndicatorSubmissionRes { indicator_submission: IndicatorSubmissionView });
envelope!(SurveysRes { surveys: Vec<Survey> });
envelope!(SurveyRes { survey: Survey });
envelope!(UnitsRes { units: Vec<Unit> });
envelope!(UnitRes { unit: Unit });
envelope!(
    /// Users without password hashes.
    UsersRes { users: Vec<UserView> }
);
envelope!(UserRes { user: UserView });
envelope!(LogsRes { logs: Vec<SystemLog> });
envelope!(NotificationsRes { notifications: Vec<Notification> });
envelope!(NotificationRes { notification: Notification });
envelope!(DashboardRes { summary: DashboardSummary });
envelope!(
    /// The signed-in user, or `null`.
    SessionRes { user: Option<SessionUser> }
);

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct OkRes {
    pub ok: bool,
}

impl OkRes {
    pub fn yes() -> Self {
        Self { ok: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}
