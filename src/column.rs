use crate::coercion::Coerced;
use crate::data_type::DataType;
use crate::error::{Error, Result};

/// Position of a named column inside [Buckets]: which bucket, and which
/// column within that bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub data_type: DataType,
    pub index: usize,
}

/// Type-segregated columnar storage.
///
/// Each bucket is a list of columns and each column holds one entry per row,
/// so values of one type sit in contiguous memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub(crate) ints: Vec<Vec<i64>>,
    pub(crate) texts: Vec<Vec<String>>,
    pub(crate) floats: Vec<Vec<f64>>,
}

impl Buckets {
    /// Adds an empty column of `data_type` and returns its slot.
    pub fn allocate(&mut self, data_type: DataType) -> Slot {
        let index = match data_type {
            DataType::Int => {
                self.ints.push(Vec::new());
                self.ints.len() - 1
            }
            DataType::Text => {
                self.texts.push(Vec::new());
                self.texts.len() - 1
            }
            DataType::Float => {
                self.floats.push(Vec::new());
                self.floats.len() - 1
            }
        };
        Slot { data_type, index }
    }

    /// Appends a coerced value to the column at `slot`.
    ///
    /// # Errors
    /// - [Error::UnsupportedType] if the value was rejected by the coercion table.
    /// - [Error::WrongType] if the value's type does not match the slot's bucket.
    /// - [Error::FieldNotFound] if `slot` does not point at a live column.
    pub fn push(&mut self, field: &str, slot: Slot, value: Coerced) -> Result<()> {
        let dead = || Error::FieldNotFound(field.to_string());
        match (slot.data_type, value) {
            (DataType::Int, Coerced::Int(v)) => {
                self.ints.get_mut(slot.index).ok_or_else(dead)?.push(v)
            }
            (DataType::Text, Coerced::Text(v)) => {
                self.texts.get_mut(slot.index).ok_or_else(dead)?.push(v)
            }
            (DataType::Float, Coerced::Float(v)) => {
                self.floats.get_mut(slot.index).ok_or_else(dead)?.push(v)
            }
            (_, Coerced::Reject(class)) => {
                return Err(Error::UnsupportedType {
                    column: field.to_string(),
                    class,
                });
            }
            (requested, other) => {
                let actual = match other {
                    Coerced::Int(_) => DataType::Int,
                    Coerced::Float(_) => DataType::Float,
                    _ => DataType::Text,
                };
                return Err(Error::WrongType {
                    field: field.to_string(),
                    requested,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Number of rows stored in the column at `slot`, or `None` if the slot is dead.
    pub fn len_of(&self, slot: Slot) -> Option<usize> {
        match slot.data_type {
            DataType::Int => self.ints.get(slot.index).map(Vec::len),
            DataType::Text => self.texts.get(slot.index).map(Vec::len),
            DataType::Float => self.floats.get(slot.index).map(Vec::len),
        }
    }

    /// Appends every value of `other[src]` to `self[dst]`.
    ///
    /// # Errors
    /// - [Error::WrongType] if the two slots hold different types.
    /// - [Error::FieldNotFound] if either slot does not point at a live column.
    pub fn extend_from(&mut self, field: &str, dst: Slot, other: &Buckets, src: Slot) -> Result<()> {
        let dead = || Error::FieldNotFound(field.to_string());
        match (dst.data_type, src.data_type) {
            (DataType::Int, DataType::Int) => {
                let values = other.ints.get(src.index).ok_or_else(dead)?;
                self.ints.get_mut(dst.index).ok_or_else(dead)?.extend_from_slice(values)
            }
            (DataType::Text, DataType::Text) => {
                let values = other.texts.get(src.index).ok_or_else(dead)?;
                self.texts.get_mut(dst.index).ok_or_else(dead)?.extend_from_slice(values)
            }
            (DataType::Float, DataType::Float) => {
                let values = other.floats.get(src.index).ok_or_else(dead)?;
                self.floats.get_mut(dst.index).ok_or_else(dead)?.extend_from_slice(values)
            }
            (requested, actual) => {
                return Err(Error::WrongType {
                    field: field.to_string(),
                    requested,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Drops every column of every bucket.
    pub fn clear(&mut self) {
        self.ints.clear();
        self.texts.clear();
        self.floats.clear();
    }

    /// Total number of columns across all buckets.
    pub fn column_count(&self) -> usize {
        self.ints.len() + self.texts.len() + self.floats.len()
    }
}
