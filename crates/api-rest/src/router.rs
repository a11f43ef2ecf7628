use crate::docs::ApiDoc;
use crate::handlers::{
    dashboard, health, incidents, indicators, logs, notifications, risks, session, surveys, units,
    users,
};
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use mutu_core::{CoreConfig, Services};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared state for every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub services: Arc<Services>,
}

impl AppState {
    pub fn new(cfg: CoreConfig, services: Services) -> Self {
        Self {
            cfg: Arc::new(cfg),
            services: Arc::new(services),
        }
    }
}

/// The full REST surface, including Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/session", get(session::get_session))
        .route("/auth/login", post(session::login))
        .route("/auth/logout", post(session::logout))
        .route(
            "/incidents",
            get(incidents::list_incidents).post(incidents::create_incident),
        )
        .route(
            "/incidents/:id",
            get(incidents::get_incident)
                .patch(incidents::update_incident)
                .put(incidents::update_incident)
                .delete(incidents::delete_incident),
        )
        .route("/risks", get(risks::list_risks).post(risks::create_risk))
        .route(
            "/risks/:id",
            get(risks::get_risk)
                .patch(risks::update_risk)
                .put(risks::update_risk)
                .delete(risks::delete_risk),
        )
        .route(
            "/indicators",
            get(indicators::list_indicators).post(indicators::create_indicator),
        )
        .route(
            "/indicators/:id",
            axum::routing::patch(indicators::update_indicator)
                .put(indicators::update_indicator)
                .delete(indicators::delete_indicator),
        )
        .route(
            "/indicator-submissions",
            get(indicators::list_indicator_submissions)
                .post(indicators::create_indicator_submission),
        )
        .route(
            "/indicator-submissions/:id",
            axum::routing::patch(indicators::update_indicator_submission)
                .put(indicators::update_indicator_submission)
                .delete(indicators::delete_indicator_submission),
        )
        .route(
            "/surveys",
            get(surveys::list_surveys).post(surveys::create_survey),
        )
        .route(
            "/surveys/:id",
            axum::routing::patch(surveys::update_survey)
                .put(surveys::update_survey)
                .delete(surveys::delete_survey),
        )
        .route("/units", get(units::list_units).post(units::create_unit))
        .route(
            "/units/:id",
            axum::routing::patch(units::update_unit)
                .put(units::update_unit)
                .delete(units::delete_unit),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            axum::routing::patch(users::update_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/logs", get(logs::list_logs))
        .route(
            "/notifications",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
    use axum::http::{Method, Request, StatusCode};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use mutu_core::records::user::NewUser;
    use mutu_core::{Actor, Role, SessionUser, StoreBackend};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const COOKIE_NAME: &str = "mutu_session";

    fn state() -> AppState {
        let cfg = CoreConfig::new(StoreBackend::Memory, 1_000, COOKIE_NAME).unwrap();
        let services = Services::open(&cfg).expect("in-memory services should open");
        AppState::new(cfg, services)
    }

    /// Creates an account and returns a cookie for a session signed by this server.
    fn sign_in(state: &AppState, name: &str, role: Role, unit: Option<&str>) -> String {
        let view = state
            .services
            .users
            .create(
                &Actor::system(),
                NewUser {
                    name: name.into(),
                    email: format!("{}@rs.example", name.to_lowercase()),
                    password: "kata-sandi-1".into(),
                    role,
                    unit: unit.map(str::to_string),
                },
            )
            .unwrap();
        let user = state.services.users.session_user(&view.id).unwrap().unwrap();
        cookie_for(state, &user)
    }

    fn cookie_for(state: &AppState, user: &SessionUser) -> String {
        let token = state.services.sessions.encode(user).unwrap();
        format!("{COOKIE_NAME}={token}")
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn risk_body(unit: &str) -> Value {
        json!({
            "unit": unit,
            "description": format!("Pasien jatuh di {unit}"),
            "consequence": 3,
            "likelihood": "2",
            "controllability": 2,
            "dueDate": "2024-12-31",
        })
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let (status, body) = send(router(state()), Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "message": "Mutu is alive" }));
    }

    #[tokio::test]
    async fn anonymous_incident_list_is_unauthorised_and_empty() {
        let (status, body) = send(router(state()), Method::GET, "/incidents", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "incidents": [] }));
    }

    #[tokio::test]
    async fn ward_lead_sees_only_own_unit_risks() {
        let state = state();
        let director = sign_in(&state, "Dina", Role::Director, None);
        for unit in ["RANAP", "IGD"] {
            let (status, _) = send(
                router(state.clone()),
                Method::POST,
                "/risks",
                Some(&director),
                Some(risk_body(unit)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let lead = sign_in(&state, "Rina", Role::WardLead, Some("RANAP"));
        let (status, body) =
            send(router(state.clone()), Method::GET, "/risks", Some(&lead), None).await;
        assert_eq!(status, StatusCode::OK);
        let risks = body["risks"].as_array().unwrap();
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0]["unit"], "RANAP");
        assert_eq!(risks[0]["inherentScore"], 12);

        let (_, body) =
            send(router(state.clone()), Method::GET, "/risks", Some(&director), None).await;
        assert_eq!(body["risks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ward_lead_cannot_read_other_unit_risk_by_id() {
        let state = state();
        let director = sign_in(&state, "Dina", Role::Director, None);
        let (_, created) = send(
            router(state.clone()),
            Method::POST,
            "/risks",
            Some(&director),
            Some(risk_body("IGD")),
        )
        .await;
        let id = created["risk"]["id"].as_str().unwrap().to_string();

        let lead = sign_in(&state, "Rina", Role::WardLead, Some("RANAP"));
        let (status, _) = send(
            router(state.clone()),
            Method::GET,
            &format!("/risks/{id}"),
            Some(&lead),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn notification_without_description_is_rejected() {
        let (status, body) = send(
            router(state()),
            Method::POST,
            "/notifications",
            None,
            Some(json!({ "title": "A" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "title and description are required" }));
    }

    #[tokio::test]
    async fn incident_chronology_is_normalised_and_subcommittee_notified() {
        let state = state();
        let staff = sign_in(&state, "Sari", Role::Staff, Some("RANAP"));
        let (status, body) = send(
            router(state.clone()),
            Method::POST,
            "/incidents",
            Some(&staff),
            Some(json!({
                "date": "2024-03-09",
                "type": "KNC",
                "severity": "Hijau",
                "patientName": "Tn. A",
                "chronology": "first step\nsecond step",
                "relatedUnit": "RANAP",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["incident"]["chronology"], "First step.\nSecond step.");
        assert_eq!(body["incident"]["status"], "Dilaporkan");

        let (_, body) = send(
            router(state.clone()),
            Method::GET,
            "/notifications?role=Sub%20Komite%20Keselamatan%20Pasien",
            None,
            None,
        )
        .await;
        assert_eq!(body["notifications"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn session_never_returns_a_password() {
        let state = state();
        let cookie = sign_in(&state, "Sari", Role::Staff, Some("RANAP"));

        let (status, body) =
            send(router(state), Method::GET, "/session", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Sari");
        assert_eq!(body["user"]["role"], "Staf");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn hand_built_admin_token_is_not_a_session() {
        let state = state();
        let token = URL_SAFE_NO_PAD.encode(
            json!({
                "id": mutu_core::RecordId::new().to_string(),
                "name": "Mallory",
                "email": "mallory@rs.example",
                "role": "Admin",
            })
            .to_string(),
        );
        let cookie = format!("{COOKIE_NAME}={token}");

        let (status, body) =
            send(router(state.clone()), Method::GET, "/session", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "user": null }));

        let (status, _) = send(
            router(state.clone()),
            Method::POST,
            "/users",
            Some(&cookie),
            Some(json!({
                "name": "Mallory",
                "email": "mallory@rs.example",
                "password": "kata-sandi-1",
                "role": "Admin",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(state.services.users.list(&mutu_core::Scope::All).unwrap().is_empty());
    }

    #[tokio::test]
    async fn demoted_users_lose_their_old_role_at_once() {
        let state = state();
        let cookie = sign_in(&state, "Dina", Role::Director, None);
        let (status, _) = send(router(state.clone()), Method::GET, "/logs", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);

        let id = state.services.users.list(&mutu_core::Scope::All).unwrap()[0].id.clone();
        state
            .services
            .users
            .update(
                &Actor::system(),
                &id,
                serde_json::from_value(json!({ "role": "Staf", "unit": "RANAP" })).unwrap(),
            )
            .unwrap();

        let (status, _) = send(router(state.clone()), Method::GET, "/logs", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        state.services.users.remove(&Actor::system(), &id).unwrap();
        let (_, body) = send(router(state), Method::GET, "/session", Some(&cookie), None).await;
        assert_eq!(body, json!({ "user": null }));
    }

    #[tokio::test]
    async fn ward_lead_lists_only_own_unit_users() {
        let state = state();
        sign_in(&state, "Dina", Role::Director, None);
        sign_in(&state, "Budi", Role::Staff, Some("IGD"));
        sign_in(&state, "Sari", Role::Staff, Some("RANAP"));
        let lead = sign_in(&state, "Rina", Role::WardLead, Some("RANAP"));

        let (status, body) = send(router(state.clone()), Method::GET, "/users", Some(&lead), None).await;
        assert_eq!(status, StatusCode::OK);
        let mut names: Vec<_> = body["users"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["Rina", "Sari"]);

        let admin = sign_in(&state, "Adi", Role::Admin, None);
        let (_, body) = send(router(state), Method::GET, "/users", Some(&admin), None).await;
        assert_eq!(body["users"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn notifications_default_to_the_session_user() {
        let state = state();
        let staff = sign_in(&state, "Sari", Role::Staff, Some("RANAP"));
        let (status, _) = send(
            router(state.clone()),
            Method::POST,
            "/incidents",
            Some(&staff),
            Some(json!({
                "date": "2024-03-09",
                "type": "KTD",
                "severity": "Merah",
                "patientName": "Ny. B",
                "chronology": "pasien jatuh",
                "relatedUnit": "RANAP",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let psc = sign_in(&state, "Putri", Role::PatientSafetySubcommittee, None);
        let (status, body) =
            send(router(state.clone()), Method::GET, "/notifications", Some(&psc), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notifications"].as_array().unwrap().len(), 1);

        let (_, body) =
            send(router(state), Method::GET, "/notifications", Some(&staff), None).await;
        assert!(body["notifications"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn garbage_session_cookie_reads_as_signed_out() {
        let cookie = format!("{COOKIE_NAME}=not-a-token!");
        let (status, body) =
            send(router(state()), Method::GET, "/session", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "user": null }));
    }

    #[tokio::test]
    async fn login_sets_cookie_and_logs_the_sign_in() {
        let state = state();
        state
            .services
            .users
            .create(
                &Actor::system(),
                NewUser {
                    name: "Admin".into(),
                    email: "admin@rs.example".into(),
                    password: "rahasia-sekali".into(),
                    role: Role::Admin,
                    unit: None,
                },
            )
            .unwrap();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "admin@rs.example", "password": "rahasia-sekali" }).to_string(),
            ))
            .unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("mutu_session="));
        assert!(cookie.contains("HttpOnly"));

        let pair = cookie.split(';').next().unwrap().to_string();
        let (_, body) = send(router(state.clone()), Method::GET, "/logs", Some(&pair), None).await;
        let logs = body["logs"].as_array().unwrap();
        assert_eq!(logs[0]["action"], "LOGIN");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorised() {
        let (status, body) = send(
            router(state()),
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@rs.example", "password": "whatever1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn logs_are_for_central_roles_only() {
        let state = state();
        let staff = sign_in(&state, "Sari", Role::Staff, Some("RANAP"));
        let (status, body) = send(router(state), Method::GET, "/logs", Some(&staff), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].as_str().unwrap().contains("Staf"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let state = state();
        let staff = sign_in(&state, "Sari", Role::Staff, Some("RANAP"));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/incidents")
            .header(CONTENT_TYPE, "application/json")
            .header(COOKIE, staff)
            .body(Body::from("{not json"))
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deleting_twice_is_idempotent() {
        let state = state();
        let director = sign_in(&state, "Dina", Role::Director, None);
        let (_, created) = send(
            router(state.clone()),
            Method::POST,
            "/risks",
            Some(&director),
            Some(risk_body("IGD")),
        )
        .await;
        let uri = format!("/risks/{}", created["risk"]["id"].as_str().unwrap());

        for _ in 0..2 {
            let (status, body) =
                send(router(state.clone()), Method::DELETE, &uri, Some(&director), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "ok": true }));
        }
    }

    #[tokio::test]
    async fn dashboard_requires_a_session() {
        let (status, _) = send(router(state()), Method::GET, "/dashboard", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
