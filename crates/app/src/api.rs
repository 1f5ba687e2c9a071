//! HTTP surface over the catalog and stored progress.

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use course_core::model::LessonId;
use course_core::navigation::{CourseOutcome, IgnoredReason};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use services::{AppServices, CatalogQueryError, Clock, CourseProgressView, CourseSessionError};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const LIST_CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=300";

#[derive(Clone)]
pub struct AppState {
    services: AppServices,
    clock: Clock,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices, clock: Clock) -> Self {
        Self { services, clock }
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("Course not found")]
    CourseNotFound,
    #[error("Missing courseId or lessonId")]
    MissingFields,
    #[error("Invalid request body")]
    InvalidBody,
    #[error("Invalid lesson id")]
    InvalidLesson,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::CourseNotFound => StatusCode::NOT_FOUND,
            ApiError::MissingFields | ApiError::InvalidBody | ApiError::InvalidLesson => {
                StatusCode::BAD_REQUEST
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CourseSessionError> for ApiError {
    fn from(_: CourseSessionError) -> Self {
        ApiError::CourseNotFound
    }
}

impl From<CatalogQueryError> for ApiError {
    fn from(_: CatalogQueryError) -> Self {
        ApiError::CourseNotFound
    }
}

//
// ─── ROUTES ────────────────────────────────────────────────────────────────────
//

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/courses", get(list_courses).post(echo_progress))
        .route("/api/courses/:id", get(get_course))
        .route("/api/courses/:id/progress", get(get_progress))
        .route(
            "/api/courses/:id/lessons/:lesson/complete",
            post(complete_lesson),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    id: Option<String>,
}

async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    if let Some(id) = query.id.filter(|id| !id.is_empty()) {
        let course = state.services.queries().course(&id)?;
        return Ok(Json(course.as_ref()).into_response());
    }

    let summaries = state.services.queries().summaries();
    Ok((
        [(header::CACHE_CONTROL, LIST_CACHE_CONTROL)],
        Json(summaries),
    )
        .into_response())
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let course = state.services.queries().course(&id)?;
    Ok(Json(course.as_ref()).into_response())
}

/// Echoes a progress update back without storing it.
async fn echo_progress(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let body: Value = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidBody)?;
    if body.is_null() {
        return Err(ApiError::InvalidBody);
    }

    let course_id = body.get("courseId").cloned().unwrap_or(Value::Null);
    let lesson_id = body.get("lessonId").cloned().unwrap_or(Value::Null);
    if !is_truthy(&course_id) || !is_truthy(&lesson_id) {
        return Err(ApiError::MissingFields);
    }

    let mut echo = json!({
        "success": true,
        "courseId": course_id,
        "lessonId": lesson_id,
        "updatedAt": state.clock.now_rfc3339(),
    });
    if let Some(completed) = body.get("completed") {
        echo["completed"] = completed.clone();
    }
    Ok(Json(echo))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseProgressView>, ApiError> {
    let view = state.services.courses().progress_view(&id).await?;
    Ok(Json(view))
}

#[derive(Debug, Serialize)]
struct CompleteResponse {
    applied: bool,
    newly_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignored: Option<IgnoredReason>,
    progress: CourseProgressView,
}

async fn complete_lesson(
    State(state): State<AppState>,
    Path((id, lesson)): Path<(String, String)>,
) -> Result<Json<CompleteResponse>, ApiError> {
    let lesson: LessonId = lesson.parse().map_err(|_| ApiError::InvalidLesson)?;
    let courses = state.services.courses();
    let mut session = courses.open(&id).await?;
    let step = courses.complete_lesson(&mut session, lesson).await;

    let (applied, newly_completed, ignored) = match step.outcome {
        CourseOutcome::Completed {
            newly_completed, ..
        } => (true, newly_completed, None),
        CourseOutcome::Ignored(reason) => (false, false, Some(reason)),
        CourseOutcome::Opened(_) | CourseOutcome::Closed(_) => (false, false, None),
    };

    Ok(Json(CompleteResponse {
        applied,
        newly_completed,
        saved: step.saved.map(services::SaveStatus::is_saved),
        ignored,
        progress: session.view(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_loose_rules() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("financial-literacy")));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(
            ApiError::CourseNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidBody.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
