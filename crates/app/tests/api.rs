use app::api::{AppState, LIST_CACHE_CONTROL, router};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use course_core::time::fixed_clock;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use services::AppServices;
use tower::ServiceExt;

fn create_test_app() -> Router {
    let services = AppServices::in_memory(fixed_clock()).unwrap();
    router(AppState::new(services, fixed_clock()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let app = create_test_app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn list_returns_summaries_with_cache_header() {
    let app = create_test_app();
    let response = app.clone().oneshot(get("/api/courses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        LIST_CACHE_CONTROL
    );

    let (_, body) = send(&app, get("/api/courses")).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 6);
    assert_eq!(list[0]["id"], "financial-literacy");
    assert_eq!(list[0]["total_lessons"], 8);
}

#[tokio::test]
async fn list_with_id_returns_one_course() {
    let app = create_test_app();
    let (status, body) = send(&app, get("/api/courses?id=study-skills")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "study-skills");
    assert_eq!(body["lessons"].as_array().unwrap().len(), 8);
    assert_eq!(body["lessons"][0]["content"][0]["type"], "heading");

    let (status, body) = send(&app, get("/api/courses?id=nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Course not found" }));
}

#[tokio::test]
async fn course_detail_by_path() {
    let app = create_test_app();
    let (status, body) = send(&app, get("/api/courses/relationships")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quiz_questions"].as_array().unwrap().len(), 12);

    let (status, _) = send(&app, get("/api/courses/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn progress_echo_validates_body() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        post(
            "/api/courses",
            r#"{"courseId":"financial-literacy","lessonId":2,"completed":true}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["courseId"], "financial-literacy");
    assert_eq!(body["lessonId"], 2);
    assert_eq!(body["completed"], true);
    assert_eq!(body["updatedAt"], "2023-11-14T22:13:20.000Z");

    let (status, body) = send(&app, post("/api/courses", r#"{"courseId":"x"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing courseId or lessonId");

    let (status, body) = send(&app, post("/api/courses", "{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn completing_lessons_updates_progress() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        post("/api/courses/health-wellness/lessons/2/complete", ""),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);
    assert_eq!(body["ignored"]["reason"], "lesson_locked");

    let (_, body) = send(
        &app,
        post("/api/courses/health-wellness/lessons/1/complete", ""),
    )
    .await;
    assert_eq!(body["applied"], true);
    assert_eq!(body["newly_completed"], true);
    assert_eq!(body["saved"], true);

    let (status, body) = send(&app, get("/api/courses/health-wellness/progress")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed_lessons"], json!([1]));
    assert_eq!(body["percentage"], 17);
    assert_eq!(body["next_lesson"], 2);
    assert_eq!(body["lessons"][1]["status"], "unlocked");
    assert_eq!(body["lessons"][2]["status"], "locked");
}

#[tokio::test]
async fn bad_lesson_and_course_ids() {
    let app = create_test_app();
    let (status, _) = send(&app, post("/api/courses/study-skills/lessons/abc/complete", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, post("/api/courses/nope/lessons/1/complete", "")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, get("/api/courses/nope/progress")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
