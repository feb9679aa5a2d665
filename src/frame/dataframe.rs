// In-memory tabular results and load input
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::frame::value::Value;

/// A small column-named, row-major table.
///
/// This is the interchange type for the crate: query results come back as a
/// `DataFrame`, and `insert_frame` takes one as input. Every row holds
/// exactly one `Value` per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct DataFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataFrame {
    /// An empty frame with the given column names.
    pub fn new<I, S>(columns: I) -> DataFrame
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DataFrame {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a frame from prepared rows, checking every row's arity.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<DataFrame>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut frame = DataFrame::new(columns);
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    /// Appends a row. The row must have one value per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::ColumnCountMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Iterates rows as value slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column index).
    pub fn get(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row)?.get(column)
    }

    /// Cell at (row, column name).
    pub fn get_by_name(&self, row: usize, column: &str) -> Option<&Value> {
        self.get(row, self.column_index(column)?)
    }

    /// All cells of one named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}

// Deserialization routes through `from_rows` so row arity is re-checked.
#[derive(Deserialize)]
struct RawFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TryFrom<RawFrame> for DataFrame {
    type Error = Error;

    fn try_from(raw: RawFrame) -> Result<DataFrame> {
        DataFrame::from_rows(raw.columns, raw.rows)
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Column widths sized to the longest rendered cell.
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();
        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:width$}", c, width = widths[i]))
            .collect();
        writeln!(f, "{}", header.join("  "))?;

        for row in &rendered {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{:width$}", cell, width = widths[i]))
                .collect();
            writeln!(f, "{}", line.join("  "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        let mut frame = DataFrame::new(["id", "name"]);
        frame
            .push_row(vec![Value::Integer(1), Value::Text("ana".to_string())])
            .unwrap();
        frame
            .push_row(vec![Value::Integer(2), Value::Text("bruno".to_string())])
            .unwrap();
        frame
    }

    #[test]
    fn test_push_row_checks_arity() {
        let mut frame = DataFrame::new(["a", "b"]);
        let err = frame.push_row(vec![Value::Integer(1)]).unwrap_err();
        match err {
            Error::ColumnCountMismatch { expected, got } => {
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(frame.num_rows(), 0);
    }

    #[test]
    fn test_from_rows() {
        let frame = DataFrame::from_rows(
            ["x"],
            vec![vec![Value::Integer(1)], vec![Value::Integer(2)]],
        )
        .unwrap();
        assert_eq!(frame.num_rows(), 2);

        let result = DataFrame::from_rows(["x"], vec![vec![]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_lookups() {
        let frame = sample();
        assert_eq!(frame.num_rows(), 2);
        assert_eq!(frame.num_columns(), 2);
        assert_eq!(frame.column_index("name"), Some(1));
        assert_eq!(frame.column_index("missing"), None);
        assert_eq!(frame.get(0, 0), Some(&Value::Integer(1)));
        assert_eq!(frame.get(5, 0), None);
        assert_eq!(
            frame.get_by_name(1, "name"),
            Some(&Value::Text("bruno".to_string()))
        );
        let ids = frame.column("id").unwrap();
        assert_eq!(ids, vec![&Value::Integer(1), &Value::Integer(2)]);
    }

    #[test]
    fn test_iter_rows() {
        let frame = sample();
        assert_eq!(frame.iter_rows().count(), 2);
        let names: Vec<&Value> = frame.iter_rows().map(|row| &row[1]).collect();
        assert_eq!(
            names,
            vec![
                &Value::Text("ana".to_string()),
                &Value::Text("bruno".to_string())
            ]
        );
    }

    #[test]
    fn test_display_aligns_columns() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id  name ");
        assert_eq!(lines[1], "1   ana  ");
        assert_eq!(lines[2], "2   bruno");
    }

    #[test]
    fn test_serde_round_trip() {
        let frame = sample();
        let json = serde_json::to_string(&frame).unwrap();
        let back: DataFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_deserialize_rejects_ragged_rows() {
        let json = r#"{"columns":["a","b"],"rows":[["x"]]}"#;
        let result: std::result::Result<DataFrame, _> = serde_json::from_str(json);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("the frame has 2 columns"), "{}", message);
    }
}
