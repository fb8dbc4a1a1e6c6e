//! Operator console over the coin store.
//!
//! Table names typed by the operator are never spliced into SQL as-is: they
//! are first looked up in the live catalog with a bound parameter, and only a
//! [`CatalogTable`] obtained from that lookup can be dumped.

pub mod app;
pub mod autocomplete;
pub mod grid;
pub mod ui;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool, TypeInfo, ValueRef};
use thiserror::Error;

pub use grid::render_grid;

pub const EMPTY_TABLE_MESSAGE: &str = "(Table is empty)";

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("No table name provided.")]
    EmptyName,
    #[error("Table '{0}' does not exist.")]
    UnknownTable(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// A table name known to exist in the store catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTable(String);

impl CatalogTable {
    pub fn name(&self) -> &str {
        &self.0
    }

    fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDump {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableDump {
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            EMPTY_TABLE_MESSAGE.to_string()
        } else {
            render_grid(&self.columns, &self.rows)
        }
    }
}

pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<String>, ConsoleError> {
    let tables = sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(tables)
}

pub async fn resolve_table(pool: &SqlitePool, requested: &str) -> Result<CatalogTable, ConsoleError> {
    let requested = requested.trim();
    if requested.is_empty() {
        return Err(ConsoleError::EmptyName);
    }

    let found: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")
            .bind(requested)
            .fetch_optional(pool)
            .await?;

    found
        .map(CatalogTable)
        .ok_or_else(|| ConsoleError::UnknownTable(requested.to_string()))
}

pub async fn dump_table(pool: &SqlitePool, table: &CatalogTable) -> Result<TableDump, ConsoleError> {
    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .bind(table.name())
            .fetch_all(pool)
            .await?;

    let sql = format!("SELECT * FROM {}", table.quoted());
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let rows = rows
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|index| render_cell(row, index))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TableDump {
        table: table.name().to_string(),
        columns,
        rows,
    })
}

/// Renders a cell by the storage class of the value itself, since SQLite
/// columns may hold values of any type.
fn render_cell(row: &SqliteRow, index: usize) -> Result<String, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(String::new());
    }
    let storage_class = raw.type_info().name().to_string();

    let text = match storage_class.as_str() {
        "INTEGER" => row.try_get_unchecked::<i64, _>(index)?.to_string(),
        "REAL" => row.try_get_unchecked::<f64, _>(index)?.to_string(),
        "BLOB" => format!("<{} bytes>", row.try_get_unchecked::<Vec<u8>, _>(index)?.len()),
        _ => row.try_get_unchecked::<String, _>(index)?,
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_escapes_embedded_quotes() {
        let table = CatalogTable("odd\"name".to_string());
        assert_eq!(table.quoted(), "\"odd\"\"name\"");
    }

    #[test]
    fn empty_dump_renders_placeholder() {
        let dump = TableDump {
            table: "coins".to_string(),
            columns: vec!["id".to_string()],
            rows: Vec::new(),
        };
        assert_eq!(dump.render(), EMPTY_TABLE_MESSAGE);
    }
}
