//! JSON handlers for `/api/v1/movies`.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{parse_id, public_message, status_of},
    models::{Movie, MovieInput},
    service::{ServiceError, validate},
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Unreadable, oversized, or undecodable request body.
    #[error("{0}")]
    Decode(String),

    #[error("no movie with id {0:?}")]
    BadId(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Service(err) => (status_of(err), public_message(err)),
            ApiError::Decode(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::BadId(_) => (StatusCode::NOT_FOUND, self.to_string()),
        };

        if status.is_client_error() {
            tracing::debug!(status = status.as_u16(), %message, "request rejected");
        }

        let body = json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(state.movies.list_all().await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<Movie>)> {
    let input = decode(body)?;
    validate(&input)?;
    let id = state.movies.create(&input).await?;
    tracing::debug!(id, "movie created");

    let movie = state.movies.get(id).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> ApiResult<Json<Movie>> {
    let id = parse_id(&raw).ok_or(ApiError::BadId(raw))?;
    Ok(Json(state.movies.get(id).await?))
}

/// Existence is checked before the body is read, so a missing id wins over a
/// bad body. A delete racing between the check and the update surfaces as 404
/// from the update itself.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<Movie>> {
    let id = parse_id(&raw).ok_or(ApiError::BadId(raw))?;
    state.movies.get(id).await?;

    let input = decode(body)?;
    validate(&input)?;
    state.movies.update(id, &input).await?;
    tracing::debug!(id, "movie updated");

    Ok(Json(state.movies.get(id).await?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&raw).ok_or(ApiError::BadId(raw))?;
    state.movies.get(id).await?;
    state.movies.delete(id).await?;
    tracing::debug!(id, "movie deleted");

    Ok(Json(json!({})))
}

fn decode(body: Result<Bytes, BytesRejection>) -> ApiResult<MovieInput> {
    let bytes = body.map_err(|rejection| ApiError::Decode(rejection.body_text()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
