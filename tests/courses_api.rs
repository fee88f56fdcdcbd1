mod support;

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, StatusCode},
};
use classroom_kit::courses::{CoursesState, build_router, store::InMemoryCourseStore};
use serde_json::json;
use support::{send_empty, send_json};

fn app() -> Router {
    let store = Arc::new(InMemoryCourseStore::new());
    build_router(CoursesState::new(store, "school"))
}

#[tokio::test]
async fn root_reports_database() {
    let app = app();

    let (status, body) = send_empty(&app, Method::GET, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "OK", "db": "school" }));
}

#[tokio::test]
async fn create_then_fetch_course() {
    let app = app();

    let (status, created) = send_json(
        &app,
        Method::POST,
        "/courses",
        json!({ "id": "CS101", "title": "Databases", "credits": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created,
        json!({ "id": "CS101", "title": "Databases", "credits": 3 })
    );

    let (status, fetched) = send_empty(&app, Method::GET, "/courses/CS101").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn code_is_used_when_id_is_missing() {
    let app = app();

    let (status, created) = send_json(
        &app,
        Method::POST,
        "/courses",
        json!({ "code": "EC201", "title": "Econometrics", "credits": 4 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "EC201");
}

#[tokio::test]
async fn generated_id_round_trips() {
    let app = app();

    let (_, created) = send_json(
        &app,
        Method::POST,
        "/courses",
        json!({ "title": "Marketing", "credits": 2 }),
    )
    .await;
    let id = created["id"].as_str().expect("generated id");
    assert!(!id.is_empty());

    let (status, fetched) = send_empty(&app, Method::GET, &format!("/courses/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Marketing");
}

#[tokio::test]
async fn duplicate_course_is_a_conflict() {
    let app = app();
    let payload = json!({ "id": "CS101", "title": "Databases", "credits": 3 });

    let (status, _) = send_json(&app, Method::POST, "/courses", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(&app, Method::POST, "/courses", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Course already exists");
}

#[tokio::test]
async fn missing_course_is_not_found() {
    let app = app();

    let (status, body) = send_empty(&app, Method::GET, "/courses/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn credits_outside_range_are_rejected() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/courses",
        json!({ "title": "Thesis", "credits": 6 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "credits must be between 0 and 4");
}

#[tokio::test]
async fn list_is_capped_by_limit() {
    let app = app();

    for index in 0..5 {
        let (status, _) = send_json(
            &app,
            Method::POST,
            "/courses",
            json!({ "id": format!("C{index}"), "title": format!("Course {index}"), "credits": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_empty(&app, Method::GET, "/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(5));

    let (_, body) = send_empty(&app, Method::GET, "/courses?limit=2").await;
    let ids = body
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|course| course["id"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["C0", "C1"]);

    let (status, _) = send_empty(&app, Method::GET, "/courses?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_empty(&app, Method::GET, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
