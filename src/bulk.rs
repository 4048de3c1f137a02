use bitvec::prelude::*;

use crate::error::{Error, Result};

/// Rows per `INSERT` statement when no batch size is given.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Options for [crate::Database::load].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Maximum number of rows in one `INSERT` statement.
    pub batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// An in-memory table of literal SQL values, stored column by column.
///
/// Every column holds the same number of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkTable {
    field_names: Vec<String>,
    columns: Vec<Vec<String>>,
}

impl BulkTable {
    /// Builds a table from field names and one value column per field.
    ///
    /// # Errors
    /// - [Error::ColumnCountMismatch] if there are not as many columns as names.
    /// - [Error::RowCountMismatch] if a column's length differs from the first column's.
    pub fn new(field_names: Vec<String>, columns: Vec<Vec<String>>) -> Result<Self> {
        if field_names.len() != columns.len() {
            return Err(Error::ColumnCountMismatch {
                fields: field_names.len(),
                columns: columns.len(),
            });
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some((column, c)) = columns
                .iter()
                .enumerate()
                .find(|(_, c)| c.len() != expected)
            {
                return Err(Error::RowCountMismatch {
                    column,
                    expected,
                    actual: c.len(),
                });
            }
        }
        Ok(Self {
            field_names,
            columns,
        })
    }

    /// Builds a table from row-major values (`rows[i][j]` is field `j` of row `i`).
    pub fn from_rows(field_names: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut columns = vec![Vec::with_capacity(rows.len()); field_names.len()];
        for row in rows {
            if row.len() != field_names.len() {
                return Err(Error::ColumnCountMismatch {
                    fields: field_names.len(),
                    columns: row.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
        Self::new(field_names, columns)
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn columns(&self) -> &[Vec<String>] {
        &self.columns
    }

    pub fn field_count(&self) -> usize {
        self.field_names.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Builds the batched `INSERT` statements for loading this table into `table`.
    ///
    /// Rows are split into consecutive batches of at most `batch_size`; each
    /// batch becomes one multi-row `insert into ... values (...),(...)`.
    /// Fields flagged in `text_like` are single-quoted, the others are
    /// emitted raw. Embedded quotes are not escaped.
    ///
    /// # Errors
    /// [Error::InvalidBatchSize] if `batch_size` is 0.
    pub fn insert_statements(
        &self,
        table: &str,
        text_like: &BitSlice,
        batch_size: usize,
    ) -> Result<Vec<String>> {
        if batch_size == 0 {
            return Err(Error::InvalidBatchSize);
        }
        if self.field_count() == 0 {
            return Ok(Vec::new());
        }

        let header = format!("insert into {table} ({}) values ", self.field_names.join(","));
        let rows = self.row_count();
        let mut statements = Vec::with_capacity(rows.div_ceil(batch_size));

        for start in (0..rows).step_by(batch_size) {
            let end = rows.min(start + batch_size);
            let mut sql = header.clone();
            for row in start..end {
                if row > start {
                    sql.push(',');
                }
                sql.push('(');
                for (j, column) in self.columns.iter().enumerate() {
                    if j > 0 {
                        sql.push(',');
                    }
                    if text_like.get(j).is_some_and(|b| *b) {
                        sql.push('\'');
                        sql.push_str(&column[row]);
                        sql.push('\'');
                    } else {
                        sql.push_str(&column[row]);
                    }
                }
                sql.push(')');
            }
            statements.push(sql);
        }
        Ok(statements)
    }
}
