use std::sync::Arc;

use axum::{
    extract::{Form, Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    error::{AppError, AppResult, OrPage, parse_id, public_message, status_of},
    models::MovieInput,
    service::{ServiceError, validate},
    templates::{FormTarget, show_path},
};

pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.renderer.home_page())
}

pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let movies = state.movies.list_all().await.or_page(&state.renderer)?;
    Ok(Html(state.renderer.movie_list(&movies)))
}

pub async fn new_movie(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.renderer.movie_form(FormTarget::New, &MovieInput::default(), None))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    form: Result<Form<MovieInput>, FormRejection>,
) -> AppResult<Response> {
    let Form(values) = form.map_err(|rejection| bad_form(&state, rejection))?;

    let result = match validate(&values) {
        Ok(()) => state.movies.create(&values).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(id) => {
            tracing::debug!(id, "movie created");
            Ok(Redirect::to(&show_path(id)).into_response())
        }
        Err(err) => refill(&state, FormTarget::New, &values, err),
    }
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&raw).ok_or_else(|| AppError::not_found(&state.renderer, "movie"))?;
    let movie = state.movies.get(id).await.or_page(&state.renderer)?;
    Ok(Html(state.renderer.movie_detail(&movie)))
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&raw).ok_or_else(|| AppError::not_found(&state.renderer, "movie"))?;
    let movie = state.movies.get(id).await.or_page(&state.renderer)?;
    Ok(Html(state.renderer.movie_form(FormTarget::Edit(id), &MovieInput::from(&movie), None)))
}

/// Same check-then-update sequence as the JSON API; a concurrent delete in
/// between ends in a 404 page.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    form: Result<Form<MovieInput>, FormRejection>,
) -> AppResult<Response> {
    let id = parse_id(&raw).ok_or_else(|| AppError::not_found(&state.renderer, "movie"))?;
    state.movies.get(id).await.or_page(&state.renderer)?;
    let Form(values) = form.map_err(|rejection| bad_form(&state, rejection))?;

    let result = match validate(&values) {
        Ok(()) => state.movies.update(id, &values).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => {
            tracing::debug!(id, "movie updated");
            Ok(Redirect::to(&show_path(id)).into_response())
        }
        Err(err) => refill(&state, FormTarget::Edit(id), &values, err),
    }
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> AppResult<Redirect> {
    let id = parse_id(&raw).ok_or_else(|| AppError::not_found(&state.renderer, "movie"))?;
    state.movies.get(id).await.or_page(&state.renderer)?;
    state.movies.delete(id).await.or_page(&state.renderer)?;
    tracing::debug!(id, "movie deleted");
    Ok(Redirect::to("/movies"))
}

pub async fn not_found(State(state): State<Arc<AppState>>) -> AppError {
    AppError::not_found(&state.renderer, "page")
}

fn bad_form(state: &AppState, rejection: FormRejection) -> AppError {
    AppError::page(&state.renderer, StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text())
}

/// Input problems re-render the form with what the user typed; anything else is an error page.
fn refill(
    state: &AppState,
    target: FormTarget,
    values: &MovieInput,
    err: ServiceError,
) -> AppResult<Response> {
    match err {
        ServiceError::Validation(_) | ServiceError::Conflict(_) => {
            let status = status_of(&err);
            let message = public_message(&err);
            let page = state.renderer.movie_form(target, values, Some(message.as_str()));
            Ok((status, Html(page)).into_response())
        }
        other => Err(AppError::from_service(&state.renderer, other)),
    }
}
