//! Student roster API over a CSV file.

pub mod handlers;
pub mod model;
pub mod repository;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::server::{healthcheck, with_common_layers};
use handlers::{create_student, get_item, get_student, list_students, photos, root};
use repository::StudentRepository;

#[derive(Clone)]
pub struct StudentsState {
    pub repo: Arc<dyn StudentRepository>,
}

impl StudentsState {
    pub fn new(repo: Arc<dyn StudentRepository>) -> Self {
        Self { repo }
    }
}

pub fn build_router(state: StudentsState) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthcheck))
        .route("/photos", get(photos))
        .route("/items/{item_id}", get(get_item))
        .route("/students", get(list_students).post(create_student))
        .route("/students/{id}", get(get_student))
        .with_state(state);

    with_common_layers(router)
}
