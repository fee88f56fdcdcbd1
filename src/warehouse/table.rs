use std::io::{self, Write};

use serde_json::Value;

/// Rows returned by a warehouse query, columns in SELECT order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.columns.is_empty() {
            return writeln!(out, "Empty result set");
        }

        let cells = self
            .rows
            .iter()
            .map(|row| row.iter().map(display_cell).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        let mut widths = self.columns.iter().map(|c| c.len()).collect::<Vec<_>>();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let header = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| format!("{column:width$}"))
            .collect::<Vec<_>>();
        writeln!(out, "{}", header.join(" | "))?;

        let separator = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-");
        writeln!(out, "{separator}")?;

        for row in &cells {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:width$}"))
                .collect::<Vec<_>>();
            writeln!(out, "{}", line.join(" | "))?;
        }

        writeln!(out, "\n{} row(s)", self.rows.len())
    }
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
