use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    error::{AppError, AppResult},
    students::{
        StudentsState,
        model::{CreateStudentRequest, ListStudentsQuery, Student, StudentCreated},
    },
};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "In the Name of Allah" }))
}

pub async fn photos() -> Json<Value> {
    Json(json!({ "message": "Here are some photos" }))
}

pub async fn get_item(Path(item_id): Path<i64>) -> Json<Value> {
    Json(json!({ "Dummy API call for": item_id }))
}

pub async fn get_student(
    State(state): State<StudentsState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Student>> {
    let student = state
        .repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("student {id} not found")))?;

    Ok(Json(student))
}

pub async fn list_students(
    State(state): State<StudentsState>,
    Query(query): Query<ListStudentsQuery>,
) -> AppResult<Json<Vec<Student>>> {
    let filter = query.into_filter()?;
    let students = state.repo.find(&filter).await?;
    Ok(Json(students))
}

pub async fn create_student(
    State(state): State<StudentsState>,
    Json(payload): Json<CreateStudentRequest>,
) -> AppResult<(StatusCode, Json<StudentCreated>)> {
    payload.validate()?;

    let student = state.repo.insert(payload.into_student()).await?;

    Ok((
        StatusCode::CREATED,
        Json(StudentCreated {
            message: "Student created successfully",
            student,
        }),
    ))
}
