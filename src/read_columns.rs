use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// Reads whitespace-separated numbers from `path` into `n_cols` columns.
///
/// Values are dealt round-robin in file order: the first token goes to
/// column 0, the second to column 1, and so on, wrapping after `n_cols`.
/// Reading stops silently at the first token that is not a finite number and
/// returns whatever was read so far, so trailing columns may be one value
/// shorter than leading ones.
///
/// # Errors
/// [crate::Error::Io] if the file cannot be read.
pub fn read_columns(path: impl AsRef<Path>, n_cols: usize) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    if n_cols == 0 {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let mut columns = vec![Vec::new(); n_cols];

    for (i, token) in content.split_whitespace().enumerate() {
        match token.parse::<f64>() {
            Ok(x) if x.is_finite() => columns[i % n_cols].push(x),
            _ => {
                debug!(path = %path.display(), token, "stopped at non-numeric token");
                break;
            }
        }
    }
    Ok(columns)
}
