//! # Keel ORM Macros
//!
//! Procedural macros for keel-orm. The `Model` derive turns a struct with
//! `#[orm(...)]` markers into the statically generated metadata and row
//! mapping code the runtime crate works with.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive_model;
mod types;

/// Derives the `keel_orm::Model` trait.
///
/// Recognized markers:
/// - `#[orm(table = "name")]` on the struct — backing table
/// - `#[orm(key)]` — primary-key member (exactly one per type)
/// - `#[orm(column = "name")]` — backing column, defaults to snake_case field name
/// - `#[orm(db_type = "Int32")]` — storage type tag, inferred from the Rust type when omitted
/// - `#[orm(foreign_key = "local_column::table::foreign_column")]` — single-level join member
/// - `#[orm(skip)]` — field is not mapped (must implement `Default`)
#[proc_macro_derive(Model, attributes(orm))]
pub fn model_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    derive_model::expand(ast).into()
}
