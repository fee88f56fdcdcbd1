//! Query and aggregation walkthrough over a books collection in the document
//! store.
//!
//! [`run_library_tour`] loads [`SAMPLE_BOOKS`] into a scratch collection,
//! then prints filters, projections, a count and three aggregation pipelines
//! as text tables.

use std::io::Write;

use anyhow::Context;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{Bson, Document, doc},
};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::{config::MongoConfig, warehouse::RowSet};

pub const LIBRARY_COLLECTION: &str = "library_books";

/// (title, author, published year, genres)
pub const SAMPLE_BOOKS: [(&str, &str, i32, &[&str]); 8] = [
    (
        "Harry Potter and the Philosopher's Stone",
        "J.K. Rowling",
        1997,
        &["fiction", "fantasy"],
    ),
    (
        "Harry Potter and the Deathly Hallows",
        "J.K. Rowling",
        2007,
        &["fiction", "fantasy"],
    ),
    ("The Casual Vacancy", "J.K. Rowling", 2012, &["fiction"]),
    ("The Hobbit", "J.R.R. Tolkien", 1937, &["fantasy"]),
    ("The Silmarillion", "J.R.R. Tolkien", 1977, &["fantasy"]),
    ("Linear Algebra Done Right", "Sheldon Axler", 2015, &["Math"]),
    ("Measure, Integration & Real Analysis", "Sheldon Axler", 2019, &["Math"]),
    ("The Fault in Our Stars", "John Green", 2012, &["fiction", "romance"]),
];

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("document store error: {0}")]
    Store(#[from] mongodb::error::Error),
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryTourOptions {
    pub cleanup: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryTourReport {
    pub inserted: usize,
    pub fiction_count: u64,
    pub genres: usize,
    pub authors: usize,
}

pub async fn books_collection(config: &MongoConfig) -> anyhow::Result<Collection<Document>> {
    let client = Client::with_uri_str(&config.url)
        .await
        .with_context(|| format!("invalid MongoDB URL {}", config.url))?;
    Ok(client.database(&config.database).collection(LIBRARY_COLLECTION))
}

pub fn sample_documents() -> Vec<Document> {
    SAMPLE_BOOKS
        .iter()
        .map(|(title, author, year, genres)| {
            doc! {
                "title": *title,
                "author": *author,
                "publishedYear": *year,
                "genres": genres.to_vec(),
            }
        })
        .collect()
}

/// Books per genre, most common first.
pub fn genre_counts() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$genres" },
        doc! { "$group": { "_id": "$genres", "total": { "$sum": 1 } } },
        doc! { "$sort": { "total": -1, "_id": 1 } },
    ]
}

pub fn average_year_by_author() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$author", "avgYear": { "$avg": "$publishedYear" } } },
        doc! { "$sort": { "avgYear": -1 } },
    ]
}

pub fn top_authors(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$author", "totalBooks": { "$sum": 1 } } },
        doc! { "$sort": { "totalBooks": -1, "_id": 1 } },
        doc! { "$limit": limit },
    ]
}

/// Columns are the union of field names in first-seen order.
pub fn documents_to_rows(documents: &[Document]) -> RowSet {
    let mut columns: Vec<String> = Vec::new();
    for document in documents {
        for key in document.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = documents
        .iter()
        .map(|document| {
            columns
                .iter()
                .map(|column| {
                    document
                        .get(column)
                        .cloned()
                        .map(Bson::into_relaxed_extjson)
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    RowSet::new(columns, rows)
}

/// Runs the walkthrough against `collection`, which is emptied first.
pub async fn run_library_tour<O: Write>(
    collection: &Collection<Document>,
    out: &mut O,
    options: LibraryTourOptions,
) -> Result<LibraryTourReport, LibraryError> {
    let mut report = LibraryTourReport::default();

    heading(out, "1. Load sample books")?;
    collection.delete_many(doc! {}).await?;
    let inserted = collection.insert_many(sample_documents()).await?;
    report.inserted = inserted.inserted_ids.len();
    writeln!(out, "Inserted {} books.", report.inserted)?;

    heading(out, "2. Filters")?;
    let no_id = doc! { "_id": 0 };
    writeln!(out, "Books by J.K. Rowling:")?;
    show(
        out,
        collection
            .find(doc! { "author": "J.K. Rowling" })
            .projection(no_id.clone())
            .await?,
    )
    .await?;

    writeln!(out, "\nPublished after 2010:")?;
    show(
        out,
        collection
            .find(doc! { "publishedYear": { "$gt": 2010 } })
            .projection(no_id.clone())
            .await?,
    )
    .await?;

    writeln!(out, "\nFiction or fantasy:")?;
    show(
        out,
        collection
            .find(doc! { "genres": { "$in": ["fiction", "fantasy"] } })
            .projection(no_id.clone())
            .await?,
    )
    .await?;

    heading(out, "3. Projection and sort")?;
    show(
        out,
        collection
            .find(doc! {})
            .projection(doc! { "title": 1, "author": 1, "publishedYear": 1, "_id": 0 })
            .sort(doc! { "publishedYear": -1 })
            .await?,
    )
    .await?;

    heading(out, "4. Count")?;
    report.fiction_count = collection.count_documents(doc! { "genres": "fiction" }).await?;
    writeln!(out, "Fiction books: {}", report.fiction_count)?;

    heading(out, "5. Aggregations")?;
    writeln!(out, "Books per genre:")?;
    report.genres = show(out, collection.aggregate(genre_counts()).await?).await?;

    writeln!(out, "\nAverage published year per author:")?;
    show(out, collection.aggregate(average_year_by_author()).await?).await?;

    writeln!(out, "\nTop 5 authors by number of books:")?;
    report.authors = show(out, collection.aggregate(top_authors(5)).await?).await?;

    if options.cleanup {
        heading(out, "6. Clean up")?;
        collection.drop().await?;
        writeln!(out, "Dropped collection '{LIBRARY_COLLECTION}'.")?;
    }

    info!(inserted = report.inserted, "library tour finished");
    Ok(report)
}

async fn show<O: Write>(
    out: &mut O,
    cursor: mongodb::Cursor<Document>,
) -> Result<usize, LibraryError> {
    let documents: Vec<Document> = cursor.try_collect().await?;
    documents_to_rows(&documents).render(out)?;
    Ok(documents.len())
}

fn heading<O: Write>(out: &mut O, title: &str) -> Result<(), LibraryError> {
    writeln!(out, "\n=== {title} ===")?;
    Ok(())
}
