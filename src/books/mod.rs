//! Read-only books catalog loaded once at startup.

pub mod catalog;
pub mod handlers;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::server::{healthcheck, with_common_layers};
use catalog::BookCatalog;
use handlers::{get_book, search_books};

#[derive(Clone)]
pub struct BooksState {
    pub catalog: Arc<BookCatalog>,
}

impl BooksState {
    pub fn new(catalog: BookCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

pub fn build_router(state: BooksState) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthcheck))
        .route("/books", get(search_books))
        .route("/books/{book_id}", get(get_book))
        .with_state(state);

    with_common_layers(router)
}
