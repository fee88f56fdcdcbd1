use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::{config::ClickHouseConfig, warehouse::table::RowSet};

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("row {row} has {actual} values but {expected} columns were named")]
    RowShape {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("expected at least {expected} rows from {table}, got {actual}")]
    MissingRows {
        table: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{table} rows have no {column} column")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

/// The three calls the walkthrough needs from a columnar database.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// DDL or any statement whose result is discarded.
    async fn command(&self, sql: &str) -> Result<(), WarehouseError>;
    async fn query(&self, sql: &str) -> Result<RowSet, WarehouseError>;
    async fn insert(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<Value>],
    ) -> Result<(), WarehouseError>;
}

/// Talks to ClickHouse over its HTTP interface (port 8123 by default).
#[derive(Clone)]
pub struct ClickHouseHttp {
    http: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl ClickHouseHttp {
    pub fn new(config: &ClickHouseConfig) -> Result<Self, WarehouseError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    async fn post(&self, body: String) -> Result<String, WarehouseError> {
        let response = self
            .http
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(WarehouseError::Server {
                status: status.as_u16(),
                message: text.trim().to_string(),
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl Warehouse for ClickHouseHttp {
    async fn command(&self, sql: &str) -> Result<(), WarehouseError> {
        debug!(sql = sql.trim(), "command");
        self.post(sql.to_string()).await?;
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<RowSet, WarehouseError> {
        debug!(sql = sql.trim(), "query");
        let statement = format!("{} FORMAT JSONCompact", strip_terminator(sql));
        let body = self.post(statement).await?;
        parse_compact(&body)
    }

    async fn insert(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<Value>],
    ) -> Result<(), WarehouseError> {
        debug!(table, rows = rows.len(), "insert");
        self.post(insert_body(table, columns, rows)?).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CompactResponse {
    meta: Vec<ColumnMeta>,
    data: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ColumnMeta {
    name: String,
}

pub(crate) fn parse_compact(body: &str) -> Result<RowSet, WarehouseError> {
    let response: CompactResponse = serde_json::from_str(body)?;
    Ok(RowSet::new(
        response.meta.into_iter().map(|column| column.name).collect(),
        response.data,
    ))
}

/// `INSERT ... FORMAT JSONEachRow` followed by one JSON object per row.
pub(crate) fn insert_body(
    table: &str,
    columns: &[&str],
    rows: &[Vec<Value>],
) -> Result<String, WarehouseError> {
    let mut body = format!(
        "INSERT INTO {table} ({}) FORMAT JSONEachRow\n",
        columns.join(", ")
    );

    for (index, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(WarehouseError::RowShape {
                row: index,
                expected: columns.len(),
                actual: row.len(),
            });
        }

        let object = columns
            .iter()
            .map(|column| column.to_string())
            .zip(row.iter().cloned())
            .collect::<Map<String, Value>>();
        body.push_str(&serde_json::to_string(&object)?);
        body.push('\n');
    }

    Ok(body)
}

fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}
