//! # Keel ORM
//!
//! A minimal attribute-driven ORM built on top of sqlx: model types annotated
//! with `#[orm(...)]` markers map to relational table rows, queries are built
//! generically from the extracted metadata, and result rows materialize back
//! into objects, including single-level foreign-key joins flattened into the
//! same row.
//!
//! ```rust,ignore
//! use keel_orm::{Database, Model};
//!
//! #[derive(Model)]
//! #[orm(table = "genders")]
//! struct Gender {
//!     #[orm(key, column = "gender_id")]
//!     id: i32,
//!     #[orm(column = "gender_name")]
//!     name: String,
//! }
//!
//! let mut db = Database::connect("sqlite::memory:").await?;
//! let id = db.insert(&Gender { id: 0, name: "Test name".into() }).await?;
//! let fetched: Option<Gender> = db.get_by_id(id.unwrap()).await?;
//! ```

pub mod compile;
pub mod database;
pub mod error;
pub mod materialize;
pub mod metadata;
pub mod model;
pub mod query;

pub use compile::{Compiler, SqlCompiler, Statement};
pub use database::{Database, Drivers};
pub use error::Error;
pub use keel_orm_macro::Model;
pub use materialize::Rows;
pub use metadata::{
    ColumnDescriptor, ForeignKeyDescriptor, ModelMetadata, TableDescriptor, extract,
};
pub use model::{FieldSpec, JoinSpec, Model, StorageType, Value};
pub use query::Query;
pub use sqlx::any::AnyRow;
