use std::path::{Path, PathBuf};

use bitvec::vec::BitVec;
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::bulk::{BulkTable, LoadOptions};
use crate::coercion::infer;
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::result_set::ResultSet;
use crate::value::Value;

/// Entry point for every operation on one SQLite database file.
///
/// A `Database` only remembers the file path. Each call opens its own
/// connection and closes it (and finalizes any prepared statement) before
/// returning, on success and on error alike. There is no pooling, so
/// concurrent writers are serialized by SQLite's file locking alone.
///
/// SQL text is concatenated verbatim: callers must sanitize untrusted input.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Creates a handle for the database file at `path`.
    /// Nothing is opened until an operation runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path).map_err(|source| Error::Open {
            path: self.path.clone(),
            source,
        })
    }

    /// Runs `SELECT <body>` and materializes every row into a [ResultSet].
    ///
    /// Column types are inferred from the first row and later rows are
    /// coerced against them (see [crate::coercion]). When the query returns
    /// no rows the declared column types decide instead, so the result still
    /// carries one empty column per selected field.
    ///
    /// # Errors
    /// [Error::Open], [Error::Prepare], [Error::Step],
    /// [Error::UnsupportedType], [Error::DuplicateField]. A failure discards
    /// the rows read so far.
    ///
    /// # Example
    /// ```
    /// # use typedsql::Database;
    /// let dir = tempfile::tempdir().unwrap();
    /// let db = Database::new(dir.path().join("demo.db"));
    /// db.execute("CREATE TABLE users (id INT, name TEXT); \
    ///             INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob');").unwrap();
    ///
    /// let rs = db.select("id, name FROM users ORDER BY id").unwrap();
    /// assert_eq!(rs.ints("id").unwrap(), &[1, 2]);
    /// assert_eq!(rs.texts("name").unwrap()[1], "Bob");
    /// ```
    pub fn select(&self, body: &str) -> Result<ResultSet> {
        let sql = format!("SELECT {body}");
        debug!(path = %self.path.display(), %sql, "select");

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql).map_err(|source| Error::Prepare {
            sql: sql.clone(),
            source,
        })?;

        let columns: Vec<(String, Option<String>)> = stmt
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.decl_type().map(str::to_string)))
            .collect();
        let n = columns.len();

        let mut rows = stmt.query([]).map_err(Error::Step)?;
        let mut set: Option<ResultSet> = None;

        while let Some(row) = rows.next().map_err(Error::Step)? {
            let values = (0..n)
                .map(|i| row.get_ref(i).map(Value::from))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(Error::Step)?;

            if set.is_none() {
                set = Some(ResultSet::with_schema(first_row_schema(&columns, &values)?)?);
            }
            if let Some(set) = &mut set {
                set.push_row(values)?;
            }
        }

        let set = match set {
            Some(set) => set,
            None => ResultSet::with_schema(
                columns
                    .into_iter()
                    .map(|(name, decl)| {
                        let data_type = DataType::from_declared(decl.as_deref());
                        (name, data_type)
                    })
                    .collect(),
            )?,
        };
        debug!(
            rows = set.row_count(),
            columns = set.column_count(),
            "select done"
        );
        Ok(set)
    }

    /// Runs one or more SQL statements (DDL/DML) and discards any output.
    ///
    /// # Errors
    /// [Error::Open], or [Error::Execute] carrying SQLite's message.
    pub fn execute(&self, sql: &str) -> Result<()> {
        debug!(path = %self.path.display(), %sql, "execute");
        let conn = self.connect()?;
        conn.execute_batch(sql).map_err(Error::Execute)
    }

    /// Returns `true` if the schema catalog holds exactly one table named `name`.
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let rs = self.select(&format!(
            "name from sqlite_master where type='table' and name='{name}'"
        ))?;
        Ok(rs.row_count() == 1)
    }

    /// Creates table `dst` with the column definitions of table `src`.
    ///
    /// Does nothing but log a warning if `dst` already exists. Only the
    /// part of `src`'s stored `CREATE TABLE` statement after the first `(`
    /// is reused, so indexes, triggers and data are not copied.
    ///
    /// # Errors
    /// [Error::TableNotFound] if `src` does not exist, plus any query error.
    pub fn copy_table_structure(&self, src: &str, dst: &str) -> Result<()> {
        if self.table_exists(dst)? {
            warn!(table = dst, "table already exists, structure not copied");
            return Ok(());
        }

        let rs = self.select(&format!(
            "sql from sqlite_master where type='table' and name='{src}'"
        ))?;
        let Some(create) = rs.texts("sql")?.first() else {
            return Err(Error::TableNotFound(src.to_string()));
        };
        let Some((_, definitions)) = create.split_once('(') else {
            return Err(Error::TableNotFound(src.to_string()));
        };

        self.execute(&format!("create table {dst} ({definitions}"))
    }

    /// For each field of `table`, reports whether its declared type is
    /// exactly `blob` or `text`, ignoring ASCII case. `varchar(20)` and
    /// other text-affinity spellings do not count.
    ///
    /// # Errors
    /// [Error::FieldNotFound] if a field is not a column of `table`.
    pub fn text_like_columns(&self, table: &str, fields: &[impl AsRef<str>]) -> Result<BitVec> {
        let mut out = BitVec::with_capacity(fields.len());
        for field in fields {
            let field = field.as_ref();
            let rs = self.select(&format!(
                "type from pragma_table_info('{table}') where name='{field}'"
            ))?;
            let declared = rs
                .texts("type")?
                .first()
                .ok_or_else(|| Error::FieldNotFound(field.to_string()))?;
            out.push(declared.eq_ignore_ascii_case("blob") || declared.eq_ignore_ascii_case("text"));
        }
        Ok(out)
    }

    /// Inserts every row of `data` into `table` in batched multi-row
    /// `INSERT` statements. Returns the number of statements executed.
    ///
    /// Text-like columns (see [Database::text_like_columns]) are wrapped in
    /// single quotes, every other value is written raw. Quotes inside values
    /// are not escaped.
    ///
    /// Not transactional: batches executed before a failing batch stay
    /// committed.
    ///
    /// # Errors
    /// [Error::TableNotFound] if `table` does not exist, [Error::FieldNotFound]
    /// for a field that is not one of its columns, [Error::Execute] for a
    /// rejected batch.
    pub fn load(&self, table: &str, data: &BulkTable, options: &LoadOptions) -> Result<usize> {
        if data.field_count() == 0 || data.row_count() == 0 {
            return Ok(0);
        }
        if !self.table_exists(table)? {
            return Err(Error::TableNotFound(table.to_string()));
        }
        let text_like = self.text_like_columns(table, data.field_names())?;
        let statements = data.insert_statements(table, &text_like, options.batch_size)?;

        for (i, sql) in statements.iter().enumerate() {
            debug!(table, batch = i, "load batch");
            self.execute(sql)?;
        }
        Ok(statements.len())
    }
}

/// Infers every column's type from the storage classes of the first row.
fn first_row_schema(
    columns: &[(String, Option<String>)],
    values: &[Value],
) -> Result<Vec<(String, DataType)>> {
    let mut schema = Vec::with_capacity(columns.len());
    for ((name, _), value) in columns.iter().zip(values) {
        schema.push((name.clone(), infer(name, value.storage_class())?));
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::INT_SENTINEL;
    use tempfile::TempDir;

    fn temp_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("test.db"));
        (dir, db)
    }

    #[test]
    fn test_select_infers_types() {
        let (_dir, db) = temp_db();
        db.execute(
            "CREATE TABLE t (i INT, s TEXT, f REAL);
             INSERT INTO t VALUES (1, 'a', 0.5), (2, 'b', 1.5);",
        )
        .unwrap();

        let rs = db.select("i, s, f FROM t ORDER BY i").unwrap();
        assert_eq!(rs.row_count(), 2);
        assert_eq!(rs.column_count(), 3);
        assert_eq!(rs.data_type("i"), Some(DataType::Int));
        assert_eq!(rs.data_type("s"), Some(DataType::Text));
        assert_eq!(rs.data_type("f"), Some(DataType::Float));
        assert_eq!(rs.ints("i").unwrap(), &[1, 2]);
        assert_eq!(rs.floats("f").unwrap(), &[0.5, 1.5]);
        assert!(rs.is_consistent());
    }

    #[test]
    fn test_select_coerces_later_rows() {
        let (_dir, db) = temp_db();
        // Untyped columns keep each value's own storage class.
        db.execute(
            "CREATE TABLE t (k, i, s, f);
             INSERT INTO t VALUES (1, 10, 'x', 1.5);
             INSERT INTO t VALUES (2, '3.5', 7, 2);
             INSERT INTO t VALUES (3, 2.5, 0.25, 'nan?');",
        )
        .unwrap();

        let rs = db.select("i, s, f FROM t ORDER BY k").unwrap();
        assert_eq!(rs.ints("i").unwrap(), &[10, INT_SENTINEL, INT_SENTINEL]);
        assert_eq!(
            rs.texts("s").unwrap(),
            &["x".to_string(), "7".to_string(), "0.25".to_string()]
        );
        let f = rs.floats("f").unwrap();
        assert_eq!(&f[..2], &[1.5, 2.0]);
        assert!(f[2].is_nan());
    }

    #[test]
    fn test_select_is_repeatable() {
        let (_dir, db) = temp_db();
        db.execute(
            "CREATE TABLE t (a, b);
             INSERT INTO t VALUES (1, 'x'), ('y', 2);",
        )
        .unwrap();

        let first = db.select("a, b FROM t").unwrap();
        let second = db.select("a, b FROM t").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_empty_table_keeps_columns() {
        let (_dir, db) = temp_db();
        db.execute("CREATE TABLE t (x int, y text)").unwrap();

        let rs = db.select("x,y from t").unwrap();
        assert_eq!(rs.row_count(), 0);
        assert_eq!(rs.column_count(), 2);
        assert!(rs.ints("x").unwrap().is_empty());
        assert!(rs.texts("y").unwrap().is_empty());
    }

    #[test]
    fn test_select_null_first_row_is_unsupported() {
        let (_dir, db) = temp_db();
        db.execute("CREATE TABLE t (x); INSERT INTO t VALUES (NULL);")
            .unwrap();

        assert!(matches!(
            db.select("x FROM t"),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_select_null_later_row_is_unsupported() {
        let (_dir, db) = temp_db();
        db.execute("CREATE TABLE t (k, x); INSERT INTO t VALUES (1, 5), (2, NULL);")
            .unwrap();

        assert!(matches!(
            db.select("x FROM t ORDER BY k"),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_select_duplicate_field() {
        let (_dir, db) = temp_db();
        assert!(matches!(
            db.select("1 AS a, 2 AS a"),
            Err(Error::DuplicateField(_))
        ));
    }

    #[test]
    fn test_select_prepare_error() {
        let (_dir, db) = temp_db();
        assert!(matches!(
            db.select("x FROM missing_table"),
            Err(Error::Prepare { .. })
        ));
    }

    #[test]
    fn test_open_error() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("no/such/dir/test.db"));

        assert!(matches!(db.select("1"), Err(Error::Open { .. })));
        assert!(matches!(db.execute("SELECT 1"), Err(Error::Open { .. })));
    }

    #[test]
    fn test_execute_error() {
        let (_dir, db) = temp_db();
        assert!(matches!(db.execute("NOT SQL AT ALL"), Err(Error::Execute(_))));
    }

    #[test]
    fn test_table_exists() {
        let (_dir, db) = temp_db();

        assert!(!db.table_exists("t").unwrap());
        db.execute("CREATE TABLE t(x)").unwrap();
        assert!(db.table_exists("t").unwrap());
    }

    #[test]
    fn test_copy_table_structure() {
        let (_dir, db) = temp_db();
        db.execute(
            "CREATE TABLE src (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO src VALUES (1, 'a');",
        )
        .unwrap();

        db.copy_table_structure("src", "dst").unwrap();
        assert!(db.table_exists("dst").unwrap());

        let rs = db
            .select("sql from sqlite_master where name='dst'")
            .unwrap();
        assert_eq!(
            rs.texts("sql").unwrap()[0],
            "CREATE TABLE dst (id INTEGER PRIMARY KEY, name TEXT)"
        );
        let rows = db.select("count(*) AS n FROM dst").unwrap();
        assert_eq!(rows.ints("n").unwrap(), &[0]);

        // Second call is a no-op.
        db.copy_table_structure("src", "dst").unwrap();
    }

    #[test]
    fn test_copy_table_structure_missing_source() {
        let (_dir, db) = temp_db();
        assert!(matches!(
            db.copy_table_structure("nope", "dst"),
            Err(Error::TableNotFound(t)) if t == "nope"
        ));
    }

    #[test]
    fn test_text_like_columns() {
        let (_dir, db) = temp_db();
        db.execute("CREATE TABLE t (a int, b text, c blob, d real, e TEXT, f, g varchar(20))")
            .unwrap();

        let flags = db
            .text_like_columns("t", &["a", "b", "c", "d", "e", "f", "g"])
            .unwrap();
        assert_eq!(
            flags.iter().by_vals().collect::<Vec<_>>(),
            vec![false, true, true, false, true, false, false]
        );

        let empty: [&str; 0] = [];
        assert!(db.text_like_columns("t", &empty).unwrap().is_empty());

        assert!(matches!(
            db.text_like_columns("t", &["zzz"]),
            Err(Error::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_load_batches() {
        let (_dir, db) = temp_db();
        db.execute("CREATE TABLE t (id int, name text)").unwrap();

        let ids: Vec<String> = (0..25).map(|i| i.to_string()).collect();
        let names: Vec<String> = (0..25).map(|i| format!("n{i}")).collect();
        let data = BulkTable::new(vec!["id".into(), "name".into()], vec![ids, names]).unwrap();

        let n = db.load("t", &data, &LoadOptions { batch_size: 10 }).unwrap();
        assert_eq!(n, 3);

        let rs = db.select("id, name FROM t ORDER BY id").unwrap();
        assert_eq!(rs.row_count(), 25);
        assert_eq!(rs.ints("id").unwrap()[24], 24);
        assert_eq!(rs.texts("name").unwrap()[3], "n3");
    }

    #[test]
    fn test_load_empty_is_noop() {
        let (_dir, db) = temp_db();
        // The table does not exist: a no-op must not even introspect it.
        let no_fields = BulkTable::new(vec![], vec![]).unwrap();
        assert_eq!(db.load("t", &no_fields, &LoadOptions::default()).unwrap(), 0);

        let no_rows = BulkTable::new(vec!["a".into()], vec![vec![]]).unwrap();
        assert_eq!(db.load("t", &no_rows, &LoadOptions::default()).unwrap(), 0);
    }

    #[test]
    fn test_load_is_not_transactional() {
        let (_dir, db) = temp_db();
        db.execute("CREATE TABLE t (id int UNIQUE)").unwrap();

        let ids = vec!["1".into(), "2".into(), "1".into()];
        let data = BulkTable::new(vec!["id".into()], vec![ids]).unwrap();

        assert!(matches!(
            db.load("t", &data, &LoadOptions { batch_size: 2 }),
            Err(Error::Execute(_))
        ));
        let rs = db.select("id FROM t ORDER BY id").unwrap();
        assert_eq!(rs.ints("id").unwrap(), &[1, 2]);
    }

    #[test]
    fn test_load_quotes_text_with_spaces() {
        let (_dir, db) = temp_db();
        db.execute("CREATE TABLE t (id int, name TEXT, tag blob)").unwrap();

        let data = BulkTable::from_rows(
            vec!["id".into(), "name".into(), "tag".into()],
            vec![
                vec!["1".into(), "Ada Lovelace".into(), "x-1".into()],
                vec!["2".into(), "a, b; c".into(), "two words".into()],
            ],
        )
        .unwrap();

        assert_eq!(db.load("t", &data, &LoadOptions::default()).unwrap(), 1);

        let rs = db.select("id, name, tag FROM t ORDER BY id").unwrap();
        assert_eq!(rs.ints("id").unwrap(), &[1, 2]);
        assert_eq!(
            rs.texts("name").unwrap(),
            &["Ada Lovelace".to_string(), "a, b; c".to_string()]
        );
        assert_eq!(
            rs.texts("tag").unwrap(),
            &["x-1".to_string(), "two words".to_string()]
        );
    }

    #[test]
    fn test_load_missing_table() {
        let (_dir, db) = temp_db();
        let data = BulkTable::new(vec!["a".into()], vec![vec!["1".into()]]).unwrap();

        assert!(matches!(
            db.load("nope", &data, &LoadOptions::default()),
            Err(Error::TableNotFound(t)) if t == "nope"
        ));
    }

    #[test]
    fn test_select_renders_reals_like_sqlite() {
        let (_dir, db) = temp_db();
        db.execute(
            "CREATE TABLE t (k, x);
             INSERT INTO t VALUES (0, 'head');
             INSERT INTO t VALUES (1, 0.1 + 0.2), (2, 1e15), (3, 1e20), (4, 1e-5),
                                  (5, 123456789.123456789), (6, 3.0);",
        )
        .unwrap();

        let ours = db.select("x FROM t ORDER BY k").unwrap();
        let engine = db.select("CAST(x AS TEXT) AS x FROM t ORDER BY k").unwrap();
        assert_eq!(ours.texts("x").unwrap(), engine.texts("x").unwrap());
        assert_eq!(ours.texts("x").unwrap()[2], "1.0e+15");
    }
}
