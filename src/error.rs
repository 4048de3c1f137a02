use std::{io, path::PathBuf};
use thiserror::Error;

use crate::data_type::{DataType, StorageClass};

/// Every failure surfaced by this crate.
///
/// Errors are fatal to the call that raised them. Connections and prepared
/// statements are already released by the time an `Error` reaches the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// The database file could not be opened.
    #[error("can't open database file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite refused to compile the statement.
    #[error("prepare error for {sql:?}: {source}")]
    Prepare {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Stepping through the rows of a prepared statement failed.
    #[error("step error: {0}")]
    Step(#[source] rusqlite::Error),

    /// A fire-and-forget statement failed.
    #[error("execution error: {0}")]
    Execute(#[source] rusqlite::Error),

    /// A value arrived with a storage class the column cannot hold.
    #[error("unsupported column type {class:?} for column {column:?}")]
    UnsupportedType { column: String, class: StorageClass },

    /// A query returned the same column name more than once.
    #[error("duplicate field {0:?} in query result")]
    DuplicateField(String),

    /// The requested table does not exist in the schema catalog.
    #[error("table {0:?} does not exist")]
    TableNotFound(String),

    /// A typed accessor or schema lookup referenced an unknown field.
    #[error("field {0:?} does not exist")]
    FieldNotFound(String),

    /// A typed accessor asked for the wrong bucket.
    #[error("field {field:?} is {actual:?}, not {requested:?}")]
    WrongType {
        field: String,
        requested: DataType,
        actual: DataType,
    },

    /// The right-hand side of a merge lacks one of the left-hand fields.
    #[error("can't find field {0:?} in right-hand result set")]
    MergeFieldMissing(String),

    /// The right-hand side of a merge holds a field with a different type.
    #[error("field {field:?} is {lhs:?} on the left but {rhs:?} on the right")]
    MergeTypeMismatch {
        field: String,
        lhs: DataType,
        rhs: DataType,
    },

    #[error("{fields} field names but {columns} value columns")]
    ColumnCountMismatch { fields: usize, columns: usize },

    #[error("column {column} has {actual} rows, expected {expected}")]
    RowCountMismatch {
        column: usize,
        expected: usize,
        actual: usize,
    },

    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The calling user has no entry in the password database.
    #[error("no home directory for uid {0}")]
    NoHomeDir(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
