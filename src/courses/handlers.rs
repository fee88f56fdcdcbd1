use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    courses::{
        CoursesState,
        model::{Course, CreateCourseRequest, ListCoursesQuery},
    },
    error::{AppError, AppResult},
};

pub async fn root(State(state): State<CoursesState>) -> Json<Value> {
    Json(json!({ "message": "OK", "db": &*state.database }))
}

pub async fn list_courses(
    State(state): State<CoursesState>,
    Query(query): Query<ListCoursesQuery>,
) -> AppResult<Json<Vec<Course>>> {
    let courses = state.store.list(query.limit()?).await?;
    Ok(Json(courses))
}

pub async fn create_course(
    State(state): State<CoursesState>,
    Json(payload): Json<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<Course>)> {
    payload.validate()?;

    let course = state.store.insert(payload.into_new_course()).await?;

    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn get_course(
    State(state): State<CoursesState>,
    Path(id): Path<String>,
) -> AppResult<Json<Course>> {
    let course = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Not found"))?;

    Ok(Json(course))
}
