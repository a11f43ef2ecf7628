//! Mapping of domain errors onto HTTP responses.

use api_shared::ErrorRes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mutu_core::MutuError;

/// Errors returned by handlers. The body is always `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] MutuError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                MutuError::NotFound { .. } => StatusCode::NOT_FOUND,
                MutuError::Validation(_) | MutuError::Text(_) | MutuError::Id(_) => {
                    StatusCode::BAD_REQUEST
                }
                MutuError::Unauthenticated => StatusCode::UNAUTHORIZED,
                MutuError::Forbidden(_) => StatusCode::FORBIDDEN,
                MutuError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self);
            "Internal error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorRes { error: message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutu_core::records::EntityKind;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[tokio::test]
    async fn store_failures_hide_the_raw_message() {
        let err = ApiError::from(MutuError::Store("disk /var/lib/mutu is full".into()));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Internal error" })
        );
    }

    #[tokio::test]
    async fn validation_message_is_returned_verbatim() {
        let err = ApiError::from(MutuError::Validation(
            "title and description are required".into(),
        ));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "title and description are required" })
        );
    }

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (
                MutuError::not_found(EntityKind::Incident, "abc"),
                StatusCode::NOT_FOUND,
            ),
            (MutuError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (MutuError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (MutuError::Validation("bad".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
