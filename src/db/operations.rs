use rusqlite::{params_from_iter, Connection, OptionalExtension, Params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::connection::Database;
use crate::db::ident::{quote_ident, validate_ident};
use crate::db::schema::{ColumnInfo, TableSchema};
use crate::error::{Error, Result};
use crate::frame::{DataFrame, Value};

/// What to do when the target table of `insert_frame` already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IfExists {
    /// Refuse to write and report `Error::TableExists`.
    Fail,
    /// Drop the table and recreate it from the frame's inferred schema.
    Replace,
    /// Keep the table and its rows, creating it only when missing.
    Append,
}

impl Database {
    /// Runs a single statement that produces no rows, returning the
    /// affected row count. Use `query` for statements that return rows.
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.execute_with(sql, [])
    }

    /// Parameterized form of `execute`.
    pub fn execute_with<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute(sql, params)?))
    }

    /// Runs multiple semicolon-separated statements in one call.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.with_conn(|conn| Ok(conn.execute_batch(sql)?))
    }

    /// Runs a query and marshals the full result set into a frame. A query
    /// with no matching rows still yields the statement's column names.
    pub fn query(&self, sql: &str) -> Result<DataFrame> {
        self.query_with(sql, [])
    }

    /// Parameterized form of `query`.
    pub fn query_with<P: Params>(&self, sql: &str, params: P) -> Result<DataFrame> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let mut frame = DataFrame::new(columns);

            let mut rows = stmt.query(params)?;
            while let Some(row) = rows.next()? {
                let mut cells = Vec::with_capacity(frame.num_columns());
                for i in 0..frame.num_columns() {
                    cells.push(Value::from(row.get_ref(i)?));
                }
                frame.push_row(cells)?;
            }
            Ok(frame)
        })
    }

    /// Creates the table described by `schema` unless it already exists.
    pub fn create_table(&self, schema: &TableSchema) -> Result<()> {
        let sql = schema.create_sql(true)?;
        self.with_conn(|conn| {
            conn.execute(&sql, [])?;
            debug!(table = %schema.name(), "Ensured table exists");
            Ok(())
        })
    }

    /// Writes a frame into `table`, creating the table from the frame's
    /// inferred schema when needed, and returns the number of rows written.
    ///
    /// The whole load runs inside one transaction: on any failure the table
    /// and its previous rows are left untouched, including under
    /// `IfExists::Replace`.
    pub fn insert_frame(
        &self,
        frame: &DataFrame,
        table: &str,
        if_exists: IfExists,
    ) -> Result<usize> {
        validate_ident(table)?;
        for column in frame.columns() {
            validate_ident(column)?;
        }
        if frame.num_columns() == 0 {
            return Err(Error::EmptyFrame);
        }
        let schema = TableSchema::infer(table, frame)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let exists = table_exists_in(&tx, table)?;
            match if_exists {
                IfExists::Fail if exists => {
                    return Err(Error::TableExists(table.to_string()));
                }
                IfExists::Replace if exists => {
                    tx.execute(&format!("DROP TABLE {}", quote_ident(table)), [])?;
                    tx.execute(&schema.create_sql(false)?, [])?;
                }
                _ if !exists => {
                    tx.execute(&schema.create_sql(false)?, [])?;
                }
                _ => {}
            }

            {
                let mut stmt = tx.prepare(&insert_sql(table, frame.columns()))?;
                for row in frame.rows() {
                    stmt.execute(params_from_iter(row.iter()))?;
                }
            }
            tx.commit()?;

            debug!(table = %table, rows = frame.num_rows(), "Inserted frame");
            Ok(frame.num_rows())
        })
    }

    /// Names of all tables in the database, sorted.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(names)
        })
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        self.with_conn(|conn| table_exists_in(conn, table))
    }

    /// Column metadata for `table` as a raw frame, one row per column.
    /// A missing table yields an empty frame, mirroring the pragma.
    pub fn table_info(&self, table: &str) -> Result<DataFrame> {
        validate_ident(table)?;
        self.query(&format!("PRAGMA table_info({})", quote_ident(table)))
    }

    /// Typed variant of `table_info`.
    pub fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        validate_ident(table)?;
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let columns = stmt
                .query_map([], |row| {
                    Ok(ColumnInfo {
                        cid: row.get(0)?,
                        name: row.get(1)?,
                        decl_type: row.get(2)?,
                        notnull: row.get(3)?,
                        default_value: row.get(4)?,
                        primary_key: row.get::<_, i64>(5)? != 0,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(columns)
        })
    }

    /// Counts the rows of `table`. Fails when the table does not exist.
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        validate_ident(table)?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        self.with_conn(|conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
    }

    /// Drops `table` if it exists.
    pub fn drop_table(&self, table: &str) -> Result<()> {
        validate_ident(table)?;
        let sql = format!("DROP TABLE IF EXISTS {}", quote_ident(table));
        self.with_conn(|conn| {
            conn.execute(&sql, [])?;
            debug!(table = %table, "Dropped table");
            Ok(())
        })
    }
}

fn table_exists_in(conn: &Connection, table: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn insert_sql(table: &str, columns: &[String]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_shape() {
        let sql = insert_sql("people", &["id".to_string(), "name".to_string()]);
        assert_eq!(
            sql,
            "INSERT INTO \"people\" (\"id\", \"name\") VALUES (?1, ?2)"
        );
    }

    #[test]
    fn test_if_exists_serde_names() {
        assert_eq!(
            serde_json::to_string(&IfExists::Replace).unwrap(),
            "\"replace\""
        );
        let parsed: IfExists = serde_json::from_str("\"append\"").unwrap();
        assert_eq!(parsed, IfExists::Append);
    }
}
