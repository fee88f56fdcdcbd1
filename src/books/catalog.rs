use std::io::Read;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use tracing::info;

use crate::error::{AppError, AppResult};

pub type BookRecord = Map<String, Value>;

pub const DEFAULT_LANGUAGE: &str = "eng";
pub const DEFAULT_YEAR_FROM: i64 = 1800;
pub const DEFAULT_YEAR_TO: i64 = 2025;

/// A catalog row plus typed views of the columns the search filters on.
#[derive(Debug, Clone)]
pub struct Book {
    book_id: Option<i64>,
    authors: Option<String>,
    publication_year: Option<f64>,
    language_code: Option<String>,
    record: BookRecord,
}

impl Book {
    fn from_record(record: BookRecord) -> Self {
        Self {
            book_id: record.get("book_id").and_then(Value::as_i64),
            authors: record
                .get("authors")
                .and_then(Value::as_str)
                .map(str::to_lowercase),
            publication_year: record
                .get("original_publication_year")
                .and_then(coerce_number),
            language_code: record
                .get("language_code")
                .and_then(Value::as_str)
                .map(str::to_lowercase),
            record,
        }
    }

    pub fn record(&self) -> &BookRecord {
        &self.record
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookSearch {
    pub author: String,
    pub language: Option<String>,
    pub year_from: i64,
    pub year_to: i64,
}

impl BookSearch {
    fn matches(&self, book: &Book) -> bool {
        let author = self.author.to_lowercase();
        let author_ok = book
            .authors
            .as_deref()
            .is_some_and(|authors| authors.contains(&author));

        let year_ok = book.publication_year.is_some_and(|year| {
            year >= self.year_from as f64 && year <= self.year_to as f64
        });

        let language_ok = self.language.as_deref().is_none_or(|language| {
            book.language_code.as_deref().unwrap_or_default() == language.to_lowercase()
        });

        author_ok && year_ok && language_ok
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchBooksQuery {
    pub author: Option<String>,
    pub language: Option<String>,
    pub year1: Option<i64>,
    pub year2: Option<i64>,
}

impl SearchBooksQuery {
    pub fn into_search(self) -> AppResult<BookSearch> {
        let Some(author) = self.author else {
            return Err(AppError::validation("author query parameter is required"));
        };

        // An explicit `language=` still filters, keeping books with no code.
        let language = self
            .language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(BookSearch {
            author,
            language: Some(language),
            year_from: self.year1.unwrap_or(DEFAULT_YEAR_FROM),
            year_to: self.year2.unwrap_or(DEFAULT_YEAR_TO),
        })
    }
}

/// Immutable in-memory copy of the books CSV.
#[derive(Debug, Clone, Default)]
pub struct BookCatalog {
    books: Vec<Book>,
}

impl BookCatalog {
    /// Loads from a local path or an `http(s)://` URL.
    pub async fn load(source: &str) -> Result<Self> {
        let bytes = if source.starts_with("http://") || source.starts_with("https://") {
            reqwest::get(source)
                .await
                .with_context(|| format!("failed to fetch {source}"))?
                .error_for_status()
                .with_context(|| format!("books source {source} returned an error status"))?
                .bytes()
                .await
                .context("failed to read books response body")?
                .to_vec()
        } else {
            tokio::fs::read(source)
                .await
                .with_context(|| format!("failed to read {source}"))?
        };

        let catalog = Self::from_csv(bytes.as_slice())
            .with_context(|| format!("failed to parse books CSV from {source}"))?;
        info!(source, books = catalog.len(), "loaded book catalog");
        Ok(catalog)
    }

    pub fn from_csv<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();

        let mut books = Vec::new();
        for row in reader.records() {
            let row = row?;
            let record = headers
                .iter()
                .zip(row.iter())
                .map(|(column, cell)| (column.to_string(), parse_cell(cell)))
                .collect::<BookRecord>();
            books.push(Book::from_record(record));
        }

        Ok(Self { books })
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn by_id(&self, book_id: i64) -> Vec<BookRecord> {
        self.books
            .iter()
            .filter(|book| book.book_id == Some(book_id))
            .map(|book| book.record.clone())
            .collect()
    }

    pub fn search(&self, search: &BookSearch) -> Vec<BookRecord> {
        self.books
            .iter()
            .filter(|book| search.matches(book))
            .map(|book| book.record.clone())
            .collect()
    }
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(cell.to_string())
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
