/// The canonical type of a result-set column.
/// Fixed from the first row for the whole life of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A 64-bit signed integer.
    Int,
    /// A 64-bit floating-point number.
    Float,
    /// A UTF-8 character string.
    Text,
}

impl DataType {
    /// Maps a declared column type (`CREATE TABLE t (x VARCHAR(10))`) to a
    /// [DataType] following SQLite's column affinity rules.
    ///
    /// Used only when a query returns no rows, so there is no first row to
    /// infer from. Numeric, blob and undeclared affinities fall back to
    /// [DataType::Text].
    pub fn from_declared(decl: Option<&str>) -> Self {
        let Some(decl) = decl else {
            return Self::Text;
        };
        let decl = decl.to_ascii_uppercase();
        if decl.contains("INT") {
            Self::Int
        } else if decl.contains("CHAR") || decl.contains("CLOB") || decl.contains("TEXT") {
            Self::Text
        } else if decl.contains("REAL") || decl.contains("FLOA") || decl.contains("DOUB") {
            Self::Float
        } else {
            Self::Text
        }
    }
}

/// The per-value storage class reported by SQLite.
/// It may change from row to row inside a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}
