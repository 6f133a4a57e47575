//! # Metadata Extractor
//!
//! Turns the raw field specs generated by the `Model` derive into validated
//! mapping descriptors. Extraction is a pure function of the type's static
//! configuration: no caching, no side effects, recomputed per call. The
//! descriptors are created on demand, never persisted and never shared
//! across calls.

use crate::model::{Model, StorageType};
use crate::Error;

/// Derived description of a model type's backing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Identity of the mapped type.
    pub model: &'static str,
    /// The declared table name.
    pub name: &'static str,
}

/// Derived description of one mapped column.
///
/// Every column used in I/O carries a non-empty column name and a declared
/// storage type; anything else is rejected during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// The Rust member backing this column.
    pub field: &'static str,
    /// The column name in the database.
    pub column: &'static str,
    /// Storage type tag used for parameter binding.
    pub storage: StorageType,
}

/// Derived description of a single-level foreign-key member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDescriptor {
    /// The nested-model member.
    pub field: &'static str,
    /// Local column of the join predicate.
    pub local_column: &'static str,
    /// Name of the joined table.
    pub table: &'static str,
    /// Column on the joined table.
    pub foreign_column: &'static str,
}

/// The complete validated mapping metadata for one model type.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    pub table: TableDescriptor,
    /// Mapped columns in declaration order. Order is stable across calls so
    /// generated SQL and materialization line up with user expectations.
    pub columns: Vec<ColumnDescriptor>,
    /// The single key-marked column.
    pub primary_key: ColumnDescriptor,
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

/// Extracts and validates the mapping metadata of a model type.
///
/// Fails with `Error::Configuration` when the type has no table marker, a
/// column-eligible member has an empty column name or no storage type, the
/// type has zero or more than one key marker, or a foreign-key-eligible
/// member lacks its join predicate.
pub fn extract<T: Model>() -> Result<ModelMetadata, Error> {
    let model = std::any::type_name::<T>();

    let name = T::table_name().ok_or_else(|| {
        Error::configuration(format!("type {model} does not have a table marker"))
    })?;

    let mut columns = Vec::new();
    let mut foreign_keys = Vec::new();
    let mut primary_key: Option<ColumnDescriptor> = None;
    let mut key_count = 0usize;

    for spec in T::fields() {
        if spec.skip {
            continue;
        }

        if spec.nested {
            let join = spec.join.ok_or_else(|| {
                Error::configuration(format!(
                    "foreign key member {} of type {model} has no join predicate",
                    spec.field
                ))
            })?;
            foreign_keys.push(ForeignKeyDescriptor {
                field: spec.field,
                local_column: join.local,
                table: join.table,
                foreign_column: join.foreign,
            });
            continue;
        }

        if spec.column.is_empty() {
            return Err(Error::configuration(format!(
                "member {} of type {model} does not have a defined column name",
                spec.field
            )));
        }

        let storage = spec.storage.ok_or_else(|| {
            Error::configuration(format!(
                "member {} of type {model} does not have a declared storage type",
                spec.field
            ))
        })?;

        let column = ColumnDescriptor {
            field: spec.field,
            column: spec.column,
            storage,
        };

        if spec.key {
            key_count += 1;
            if primary_key.is_none() {
                primary_key = Some(column.clone());
            }
        }

        columns.push(column);
    }

    if key_count > 1 {
        return Err(Error::configuration(format!(
            "type {model} has more than one key marker"
        )));
    }

    let primary_key = primary_key.ok_or_else(|| {
        Error::configuration(format!("type {model} is not annotated with a key marker"))
    })?;

    Ok(ModelMetadata {
        table: TableDescriptor { model, name },
        columns,
        primary_key,
        foreign_keys,
    })
}
