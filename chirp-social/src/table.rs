//! Small column-oriented view over search results.
//!
//! A [`Table`] is a list of named columns plus rows of [`Cell`]s. It only supports what
//! the fetch/clean pipeline needs: building from a single column or from JSON records,
//! rewriting one column, and turning rows back into JSON records.
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("row has {got} cells, table has {expected} columns")]
    RowWidth { expected: usize, got: usize },
    #[error("column {column} holds a nested value, only scalars are supported")]
    UnsupportedValue { column: String },
}

/// A scalar value stored in a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(n) => write!(f, "{n}"),
            Cell::UInt(n) => write!(f, "{n}"),
            // `{:?}` keeps the fractional part, so 1.0 prints as "1.0".
            Cell::Float(x) => write!(f, "{x:?}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Int(n)
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Float(x)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl Cell {
    /// Text form used when a value has to be read as a string. Same as [`Display`](fmt::Display)
    /// except that a missing value reads as `None`.
    ///
    /// ```
    /// use chirp_social::table::Cell;
    ///
    /// assert_eq!(Cell::Float(1.0).as_text(), "1.0");
    /// assert_eq!(Cell::Null.as_text(), "None");
    /// ```
    pub fn as_text(&self) -> String {
        match self {
            Cell::Null => "None".to_string(),
            other => other.to_string(),
        }
    }

    fn from_json(column: &str, v: Value) -> Result<Self, TableError> {
        match v {
            Value::Null => Ok(Cell::Null),
            Value::Bool(b) => Ok(Cell::Bool(b)),
            Value::Number(n) => Ok(if let Some(i) = n.as_i64() {
                Cell::Int(i)
            } else if let Some(u) = n.as_u64() {
                Cell::UInt(u)
            } else {
                Cell::Float(n.as_f64().unwrap_or(f64::NAN))
            }),
            Value::String(s) => Ok(Cell::Text(s)),
            Value::Array(_) | Value::Object(_) => Err(TableError::UnsupportedValue {
                column: column.to_string(),
            }),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Int(n) => Value::from(*n),
            Cell::UInt(n) => Value::from(*n),
            Cell::Float(x) => serde_json::Number::from_f64(*x)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Text(s) => Value::String(s.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Single-column table, one row per value.
    ///
    /// ```
    /// use chirp_social::table::{Cell, Table};
    ///
    /// let t = Table::from_column("text", ["a", "b"]);
    /// assert_eq!(t.len(), 2);
    /// assert_eq!(t.column("text").unwrap(), vec![&Cell::from("a"), &Cell::from("b")]);
    /// ```
    pub fn from_column<I, C>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        Self {
            columns: vec![name.to_string()],
            rows: values.into_iter().map(|v| vec![v.into()]).collect(),
        }
    }

    /// Build from JSON objects. Columns are the union of keys in first-seen order;
    /// keys missing from a record become [`Cell::Null`].
    pub fn from_records<I>(records: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let records: Vec<_> = records.into_iter().collect();
        let mut columns: Vec<String> = Vec::new();
        for rec in &records {
            for key in rec.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Table::new(columns);
        for mut rec in records {
            let row = table
                .columns
                .iter()
                .map(|c| Cell::from_json(c, rec.remove(c).unwrap_or(Value::Null)))
                .collect::<Result<Vec<_>, _>>()?;
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Cell>, TableError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Replace every value of `name` with `f(value)`; other columns are untouched.
    pub fn map_column<F>(mut self, name: &str, mut f: F) -> Result<Self, TableError>
    where
        F: FnMut(&Cell) -> Cell,
    {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        Ok(self)
    }

    /// Keep at most `n` rows.
    pub fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(Cell::to_json))
                    .collect()
            })
            .collect()
    }
}
