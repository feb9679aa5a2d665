// Table schemas: caller-declared, frame-inferred, and introspected
use serde::{Deserialize, Serialize};

use crate::db::ident::{quote_ident, validate_ident};
use crate::error::{Error, Result};
use crate::frame::{DataFrame, Value};

/// One column of a table definition: a name and its raw SQL declaration,
/// e.g. `("id", "INTEGER PRIMARY KEY")`. The name is validated when the
/// statement is built; the declaration is trusted as code-authored SQL.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub decl: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, decl: impl Into<String>) -> ColumnSpec {
        ColumnSpec {
            name: name.into(),
            decl: decl.into(),
        }
    }
}

/// A table definition, built column by column or inferred from a frame.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> TableSchema {
        TableSchema {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column and returns the schema for chaining.
    pub fn column(mut self, name: impl Into<String>, decl: impl Into<String>) -> TableSchema {
        self.columns.push(ColumnSpec::new(name, decl));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Derives a schema from a frame's columns and cell types.
    pub fn infer(name: impl Into<String>, frame: &DataFrame) -> Result<TableSchema> {
        if frame.num_columns() == 0 {
            return Err(Error::EmptyFrame);
        }
        let name = name.into();
        let columns = frame
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| ColumnSpec::new(column.clone(), infer_decl(frame, i)))
            .collect();
        Ok(TableSchema { name, columns })
    }

    /// Renders the CREATE TABLE statement, validating and quoting every
    /// identifier on the way.
    pub(crate) fn create_sql(&self, if_not_exists: bool) -> Result<String> {
        validate_ident(&self.name)?;
        if self.columns.is_empty() {
            return Err(Error::NoColumns(self.name.clone()));
        }

        let mut parts = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            validate_ident(&column.name)?;
            if column.decl.is_empty() {
                parts.push(quote_ident(&column.name));
            } else {
                parts.push(format!("{} {}", quote_ident(&column.name), column.decl));
            }
        }

        let keyword = if if_not_exists {
            "CREATE TABLE IF NOT EXISTS"
        } else {
            "CREATE TABLE"
        };
        Ok(format!(
            "{} {} ({})",
            keyword,
            quote_ident(&self.name),
            parts.join(", ")
        ))
    }
}

/// Storage class for one frame column, from the cells it actually holds.
/// Text anywhere wins; a column of nothing but nulls defaults to TEXT.
fn infer_decl(frame: &DataFrame, index: usize) -> &'static str {
    let mut has_text = false;
    let mut has_blob = false;
    let mut has_real = false;
    let mut has_integer = false;

    for row in frame.rows() {
        match &row[index] {
            Value::Null => {}
            Value::Text(_) => has_text = true,
            Value::Blob(_) => has_blob = true,
            Value::Real(_) => has_real = true,
            Value::Integer(_) | Value::Boolean(_) => has_integer = true,
        }
    }

    if has_text {
        "TEXT"
    } else if has_blob {
        // Blobs mixed with numbers have no single storage class.
        if has_real || has_integer {
            "TEXT"
        } else {
            "BLOB"
        }
    } else if has_real {
        "REAL"
    } else if has_integer {
        "INTEGER"
    } else {
        "TEXT"
    }
}

/// One row of a table's column metadata, as reported by the engine's
/// `PRAGMA table_info`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    pub decl_type: String,
    pub notnull: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}
