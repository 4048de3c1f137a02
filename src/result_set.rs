use std::collections::HashMap;

use crate::coercion::{coerce, render_real};
use crate::column::{Buckets, Slot};
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::value::Value;

/// The typed, columnar materialization of one executed query.
///
/// Every column name maps to exactly one [Slot], and every stored column
/// has exactly [ResultSet::row_count] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    row_count: usize,
    /// Columns in query order.
    columns: Vec<(String, Slot)>,
    /// Column name to position in `columns`.
    index: HashMap<String, usize>,
    buckets: Buckets,
}

impl ResultSet {
    /// Creates an empty result set with one empty column per `(name, type)`.
    ///
    /// # Errors
    /// Returns [Error::DuplicateField] if a name appears twice.
    pub(crate) fn with_schema(schema: Vec<(String, DataType)>) -> Result<Self> {
        let mut set = Self::default();
        for (name, data_type) in schema {
            if set.index.contains_key(&name) {
                return Err(Error::DuplicateField(name));
            }
            let slot = set.buckets.allocate(data_type);
            set.index.insert(name.clone(), set.columns.len());
            set.columns.push((name, slot));
        }
        Ok(set)
    }

    /// Coerces one row of native values into the column types and appends it.
    pub(crate) fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        for ((name, slot), value) in self.columns.iter().zip(row) {
            self.buckets.push(name, *slot, coerce(slot.data_type, value))?;
        }
        self.row_count += 1;
        Ok(())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `true` when there are no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }

    /// Field names in query order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// The inferred type of a field, or `None` if the field is unknown.
    pub fn data_type(&self, name: &str) -> Option<DataType> {
        self.slot(name).map(|s| s.data_type)
    }

    fn slot(&self, name: &str) -> Option<Slot> {
        self.index.get(name).map(|&i| self.columns[i].1)
    }

    fn typed_slot(&self, name: &str, requested: DataType) -> Result<Slot> {
        let slot = self
            .slot(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))?;
        if slot.data_type != requested {
            return Err(Error::WrongType {
                field: name.to_string(),
                requested,
                actual: slot.data_type,
            });
        }
        Ok(slot)
    }

    /// Returns the values of an integer field.
    ///
    /// # Errors
    /// [Error::FieldNotFound] if the field is unknown, [Error::WrongType] if
    /// it is not an integer field.
    pub fn ints(&self, name: &str) -> Result<&[i64]> {
        let slot = self.typed_slot(name, DataType::Int)?;
        Ok(&self.buckets.ints[slot.index])
    }

    /// Returns the values of a text field. Same errors as [ResultSet::ints].
    pub fn texts(&self, name: &str) -> Result<&[String]> {
        let slot = self.typed_slot(name, DataType::Text)?;
        Ok(&self.buckets.texts[slot.index])
    }

    /// Returns the values of a floating-point field. Same errors as [ResultSet::ints].
    pub fn floats(&self, name: &str) -> Result<&[f64]> {
        let slot = self.typed_slot(name, DataType::Float)?;
        Ok(&self.buckets.floats[slot.index])
    }

    /// Renders the cell at (`row`, `name`) as text, whatever its type.
    pub fn cell_text(&self, row: usize, name: &str) -> Option<String> {
        let slot = self.slot(name)?;
        match slot.data_type {
            DataType::Int => self.buckets.ints[slot.index].get(row).map(i64::to_string),
            DataType::Float => self.buckets.floats[slot.index].get(row).map(|f| render_real(*f)),
            DataType::Text => self.buckets.texts[slot.index].get(row).cloned(),
        }
    }

    /// Discards all buckets and the name index, leaving an empty set.
    pub fn clear(&mut self) {
        self.row_count = 0;
        self.columns.clear();
        self.index.clear();
        self.buckets.clear();
    }

    /// Appends the rows of `rhs` after the rows of `self`.
    ///
    /// An empty side (no columns, then no rows) is absorbed: an empty `rhs`
    /// changes nothing, an empty `self` becomes a copy of `rhs`. Otherwise
    /// every field of `self` must exist in `rhs` with the same type; extra
    /// fields of `rhs` are dropped. Nothing is modified when validation fails.
    ///
    /// # Errors
    /// [Error::MergeFieldMissing] or [Error::MergeTypeMismatch].
    pub fn append(&mut self, rhs: &ResultSet) -> Result<()> {
        if rhs.column_count() == 0 {
            return Ok(());
        }
        if self.column_count() == 0 {
            *self = rhs.clone();
            return Ok(());
        }
        if rhs.row_count == 0 {
            return Ok(());
        }
        if self.row_count == 0 {
            *self = rhs.clone();
            return Ok(());
        }

        let mut pairs = Vec::with_capacity(self.columns.len());
        for (name, slot) in &self.columns {
            let other = rhs
                .slot(name)
                .ok_or_else(|| Error::MergeFieldMissing(name.clone()))?;
            if other.data_type != slot.data_type {
                return Err(Error::MergeTypeMismatch {
                    field: name.clone(),
                    lhs: slot.data_type,
                    rhs: other.data_type,
                });
            }
            pairs.push((name.as_str(), *slot, other));
        }

        for (name, dst, src) in pairs {
            self.buckets.extend_from(name, dst, &rhs.buckets, src)?;
        }
        self.row_count += rhs.row_count;
        Ok(())
    }

    /// Non-mutating form of [ResultSet::append].
    pub fn merged(&self, rhs: &ResultSet) -> Result<ResultSet> {
        let mut out = self.clone();
        out.append(rhs)?;
        Ok(out)
    }

    /// Checks the rectangular-table invariant: every name resolves to a live
    /// column holding exactly `row_count` values.
    pub fn is_consistent(&self) -> bool {
        self.buckets.column_count() == self.columns.len()
            && self.index.len() == self.columns.len()
            && self
                .columns
                .iter()
                .all(|(_, slot)| self.buckets.len_of(*slot) == Some(self.row_count))
    }
}
