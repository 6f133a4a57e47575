//! # Row Materializer
//!
//! Converts result rows (column name -> raw value) into populated model
//! instances. Materialization is a pure read of the row plus the allocation
//! of the target object graph; descriptors are never mutated.

use std::marker::PhantomData;

use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};

use crate::Error;
use crate::metadata;
use crate::model::Model;

/// Materializes a single row into a model instance.
pub fn row<T: Model>(row: &AnyRow) -> Result<T, Error> {
    T::from_row(row)
}

/// Resolves a nested foreign-key member from the same flattened row.
///
/// The read path flattens joins into one result row, so the nested type's
/// columns are read here without a second round-trip. When the nested type's
/// key column is null (outer-join semantics) the nested reference is absent.
/// A nested type that itself declares foreign keys is rejected: transitive
/// joins are out of scope.
pub fn nested<T: Model>(row: &AnyRow) -> Result<Option<T>, Error> {
    let meta = metadata::extract::<T>()?;

    if !meta.foreign_keys.is_empty() {
        return Err(Error::configuration(format!(
            "foreign key target {} declares foreign keys of its own; transitive joins are not supported",
            meta.table.model
        )));
    }

    let key = meta.primary_key.column;
    let raw = row
        .try_get_raw(key)
        .map_err(|e| Error::conversion(key, e.to_string()))?;
    if raw.is_null() {
        return Ok(None);
    }

    T::from_row(row).map(Some)
}

/// Fetches one column by name, mapping storage nulls onto `Option` and
/// wrapping failed coercions in a `Conversion` error. A null in a column
/// whose target type cannot represent absence fails here rather than
/// silently defaulting.
pub fn decode<'r, T>(row: &'r AnyRow, column: &str) -> Result<T, Error>
where
    T: sqlx::Decode<'r, sqlx::Any> + sqlx::Type<sqlx::Any>,
{
    row.try_get(column)
        .map_err(|e| Error::conversion(column, e.to_string()))
}

/// Fetched result rows, materialized lazily one per pull.
///
/// The underlying cursor is drained by the driver when the statement runs;
/// only the conversion into model instances is deferred to iteration, so
/// abandoning the iterator early costs nothing and holds no resources.
pub struct Rows<T> {
    rows: std::vec::IntoIter<AnyRow>,
    _marker: PhantomData<T>,
}

impl<T: Model> Rows<T> {
    pub(crate) fn new(rows: Vec<AnyRow>) -> Self {
        Self {
            rows: rows.into_iter(),
            _marker: PhantomData,
        }
    }
}

impl<T: Model> Iterator for Rows<T> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|r| T::from_row(&r))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<T: Model> ExactSizeIterator for Rows<T> {}
