//! In-memory columnar table produced by ingestion.
//!
//! A [`Table`] owns an ordered list of equally long [`Column`]s. Every non-null
//! cell of a column carries the column's [`ColumnType`]; both invariants are
//! checked by [`Table::new`], so downstream stages can rely on them.

use std::collections::HashSet;

use crate::{
    data::{Value, display_cell},
    error::{SelectionError, TableError},
    schema::ColumnType,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    values: Vec<Option<Value>>,
}

impl Column {
    /// Builds a column whose type is taken from its first non-null value
    /// (string when every value is null).
    pub fn new(name: impl Into<String>, values: Vec<Option<Value>>) -> Self {
        let column_type = values
            .iter()
            .flatten()
            .next()
            .map(Value::column_type)
            .unwrap_or(ColumnType::String);
        Self::with_type(name, column_type, values)
    }

    pub fn with_type(
        name: impl Into<String>,
        column_type: ColumnType,
        values: Vec<Option<Value>>,
    ) -> Self {
        Self {
            name: name.into(),
            column_type,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_none()).count()
    }

    fn head(&self, rows: usize) -> Column {
        Column {
            name: self.name.clone(),
            column_type: self.column_type,
            values: self.values.iter().take(rows).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
            if column.len() != row_count {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected: row_count,
                    found: column.len(),
                });
            }
            let stray = column.values.iter().enumerate().find_map(|(row, value)| {
                value
                    .as_ref()
                    .filter(|value| value.column_type() != column.column_type)
                    .map(|value| (row, value))
            });
            if let Some((row, value)) = stray {
                return Err(TableError::TypeMismatch {
                    column: column.name.clone(),
                    row,
                    expected: column.column_type.to_string(),
                    found: value.column_type().to_string(),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Assembles a table whose invariants the caller already upholds.
    pub(crate) fn from_parts(columns: Vec<Column>, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|column| column.len() == row_count));
        Self { columns, row_count }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Total number of null cells across every column.
    pub fn null_cell_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Projects the named columns, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, SelectionError> {
        let columns = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.column(name)
                    .cloned()
                    .ok_or_else(|| SelectionError::UnknownColumn {
                        column: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table {
            columns,
            row_count: self.row_count,
        })
    }

    /// First `rows` rows, verbatim.
    pub fn head(&self, rows: usize) -> Table {
        Table {
            columns: self.columns.iter().map(|column| column.head(rows)).collect(),
            row_count: self.row_count.min(rows),
        }
    }

    /// Raw-row preview: the named columns, first `rows` rows.
    pub fn preview<S: AsRef<str>>(&self, names: &[S], rows: usize) -> Result<Table, SelectionError> {
        Ok(self.select(names)?.head(rows))
    }

    /// Cells in row-major order.
    pub fn records(&self) -> Vec<Vec<Option<Value>>> {
        (0..self.row_count)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| column.values[row].clone())
                    .collect()
            })
            .collect()
    }

    pub fn display_rows(&self) -> Vec<Vec<String>> {
        (0..self.row_count)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| display_cell(column.values[row].as_ref()))
                    .collect()
            })
            .collect()
    }
}
