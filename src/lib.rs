pub mod bulk;
pub mod coercion;
pub mod column;
pub mod data_type;
pub mod database;
pub mod error;
#[cfg(unix)]
pub mod home;
pub mod read_columns;
pub mod result_set;
pub mod value;
pub mod waypoint;

pub use bulk::{BulkTable, LoadOptions};
pub use data_type::{DataType, StorageClass};
pub use database::Database;
pub use error::{Error, Result};
pub use result_set::ResultSet;
pub use value::Value;
