use crate::handlers::{
    dashboard, health, incidents, indicators, logs, notifications, risks, session, surveys, units,
    users,
};
use utoipa::OpenApi;

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Mutu", description = "Hospital quality and patient-safety records"),
    paths(
        health::health,
        session::get_session,
        session::login,
        session::logout,
        incidents::list_incidents,
        incidents::get_incident,
        incidents::create_incident,
        incidents::update_incident,
        incidents::delete_incident,
        risks::list_risks,
        risks::get_risk,
        risks::create_risk,
        risks::update_risk,
        risks::delete_risk,
        indicators::list_indicators,
        indicators::create_indicator,
        indicators::update_indicator,
        indicators::delete_indicator,
        indicators::list_indicator_submissions,
        indicators::create_indicator_submission,
        indicators::update_indicator_submission,
        indicators::delete_indicator_submission,
        surveys::list_surveys,
        surveys::create_survey,
        surveys::update_survey,
        surveys::delete_survey,
        units::list_units,
        units::create_unit,
        units::update_unit,
        units::delete_unit,
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
        logs::list_logs,
        notifications::list_notifications,
        notifications::create_notification,
        dashboard::get_dashboard,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::OkRes,
        api_shared::SessionRes,
        session::LoginReq,
        api_shared::IncidentsRes,
        api_shared::IncidentRes,
        api_shared::RisksRes,
        api_shared::RiskRes,
        api_shared::IndicatorsRes,
        api_shared::IndicatorRes,
        api_shared::IndicatorSubmissionsRes,
        api_shared::IndicatorSubmissionRes,
        api_shared::SurveysRes,
        api_shared::SurveyRes,
        api_shared::UnitsRes,
        api_shared::UnitRes,
        api_shared::UsersRes,
        api_shared::UserRes,
        api_shared::LogsRes,
        api_shared::NotificationsRes,
        api_shared::NotificationRes,
        api_shared::DashboardRes,
    ))
)]
pub struct ApiDoc;
