use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    books::{
        BooksState,
        catalog::{BookRecord, SearchBooksQuery},
    },
    error::AppResult,
};

pub async fn get_book(
    State(state): State<BooksState>,
    Path(book_id): Path<i64>,
) -> Json<Vec<BookRecord>> {
    Json(state.catalog.by_id(book_id))
}

pub async fn search_books(
    State(state): State<BooksState>,
    Query(query): Query<SearchBooksQuery>,
) -> AppResult<Json<Vec<BookRecord>>> {
    let search = query.into_search()?;
    Ok(Json(state.catalog.search(&search)))
}
