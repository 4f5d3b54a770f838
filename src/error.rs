use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{service::ServiceError, templates::Renderer};

/// Status code shared by the JSON and HTML front ends for each service outcome.
pub fn status_of(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing text for a service error. Storage details are logged, never returned.
pub fn public_message(err: &ServiceError) -> String {
    match err {
        ServiceError::Storage(detail) => {
            tracing::error!(error = ?detail, "storage failure");
            "an internal error occurred".to_string()
        }
        other => other.to_string(),
    }
}

/// Path ids that are not integers are reported as missing records.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

/// A rendered HTML error page.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    body: String,
}

impl AppError {
    pub fn page(renderer: &Renderer, status: StatusCode, message: &str) -> Self {
        Self { status, body: renderer.error_page(status.as_u16(), message) }
    }

    pub fn not_found(renderer: &Renderer, what: &str) -> Self {
        Self::page(renderer, StatusCode::NOT_FOUND, &format!("{what} not found"))
    }

    pub fn from_service(renderer: &Renderer, err: ServiceError) -> Self {
        Self::page(renderer, status_of(&err), &public_message(&err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Html(self.body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub trait OrPage<T> {
    fn or_page(self, renderer: &Renderer) -> AppResult<T>;
}

impl<T> OrPage<T> for Result<T, ServiceError> {
    fn or_page(self, renderer: &Renderer) -> AppResult<T> {
        self.map_err(|err| AppError::from_service(renderer, err))
    }
}
