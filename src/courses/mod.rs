//! Course API over a document-store collection.

pub mod handlers;
pub mod model;
pub mod mongo_store;
pub mod seed;
pub mod store;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::server::{healthcheck, with_common_layers};
use handlers::{create_course, get_course, list_courses, root};
use store::CourseStore;

#[derive(Clone)]
pub struct CoursesState {
    pub store: Arc<dyn CourseStore>,
    pub database: Arc<str>,
}

impl CoursesState {
    pub fn new(store: Arc<dyn CourseStore>, database: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            database: database.into(),
        }
    }
}

pub fn build_router(state: CoursesState) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthcheck))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course))
        .with_state(state);

    with_common_layers(router)
}
