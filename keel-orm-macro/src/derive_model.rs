use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::types::{self, DecodeKind};

/// Expands the `#[derive(Model)]` macro.
///
/// This function parses the struct fields and `#[orm(...)]` attributes to generate:
/// 1. `FieldSpec` metadata for each field (consumed by the metadata extractor).
/// 2. The `impl Model` block with `table_name`, `fields`, `from_row`, `values`
///    and `key_value`.
///
/// Marker validation (exactly one key, non-empty column names, configured
/// join predicates) is deliberately left to `keel_orm::metadata::extract`, so
/// that incomplete configuration surfaces as a `Configuration` error instead
/// of an opaque compile failure.
pub fn expand(ast: DeriveInput) -> TokenStream {
    let struct_name = &ast.ident;

    // Parse container attribute #[orm(table = "...")]
    let mut table_name: Option<String> = None;
    for attr in &ast.attrs {
        if attr.path().is_ident("orm") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    table_name = Some(value.value());
                }
                Ok(())
            })
            .expect("Failed to parse orm attributes");
        }
    }

    let table_tokens = match &table_name {
        Some(name) => quote! { Some(#name) },
        None => quote! { None },
    };

    let fields = if let Data::Struct(data) = &ast.data {
        if let Fields::Named(fields) = &data.fields {
            fields
        } else {
            panic!("Model must have named fields");
        }
    } else {
        panic!("Model must be a struct")
    };

    let mut field_specs = Vec::new();
    let mut row_reads = Vec::new();
    let mut value_pairs = Vec::new();
    let mut constructors = Vec::new();
    let mut key_field = None;

    for f in &fields.named {
        let ident = f.ident.clone().expect("named field");
        let field_type = &f.ty;

        let raw_name = ident.to_string();
        let field_name = raw_name.strip_prefix("r#").unwrap_or(&raw_name).to_string();
        let mut column = field_name.to_snake_case();

        let classified = types::classify(field_type);
        let mut storage = classified.storage.clone();
        let mut is_key = false;
        let mut skip = false;
        let mut foreign = false;
        let mut join: Option<(String, String, String)> = None;

        // Parse attributes #[orm(...)]
        for attr in &f.attrs {
            if attr.path().is_ident("orm") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("key") {
                        is_key = true;
                    }

                    if meta.path.is_ident("skip") {
                        skip = true;
                    }

                    if meta.path.is_ident("foreign") {
                        foreign = true;
                    }

                    if meta.path.is_ident("column") {
                        let value: syn::LitStr = meta.value()?.parse()?;
                        column = value.value();
                    }

                    if meta.path.is_ident("db_type") {
                        let value: syn::LitStr = meta.value()?.parse()?;
                        match types::storage_path(&value.value()) {
                            Some(path) => storage = Some(path),
                            None => return Err(meta.error("Unknown storage type tag")),
                        }
                    }

                    if meta.path.is_ident("foreign_key") {
                        let value: syn::LitStr = meta.value()?.parse()?;
                        let fk_string = value.value();

                        let parts: Vec<&str> = fk_string.split("::").collect();

                        if parts.len() == 3 {
                            join = Some((parts[0].into(), parts[1].into(), parts[2].into()));
                        } else {
                            return Err(meta.error(
                                "Invalid format for foreign_key. Use 'local_column::table::foreign_column'",
                            ));
                        }
                    }

                    Ok(())
                })
                .expect("Failed to parse orm attributes");
            }
        }

        let nested = foreign || join.is_some();

        let storage_tokens = match &storage {
            Some(path) => quote! { Some(#path) },
            None => quote! { None },
        };

        let join_tokens = match &join {
            Some((local, table, foreign_col)) => quote! {
                Some(keel_orm::JoinSpec {
                    local: #local,
                    table: #table,
                    foreign: #foreign_col,
                })
            },
            None => quote! { None },
        };

        field_specs.push(quote! {
            keel_orm::FieldSpec {
                field: #field_name,
                column: #column,
                storage: #storage_tokens,
                key: #is_key,
                skip: #skip,
                nested: #nested,
                join: #join_tokens,
            }
        });

        // Generate the row read for this field
        if skip {
            row_reads.push(quote! {
                let #ident: #field_type = ::core::default::Default::default();
            });
        } else if nested {
            if !classified.nullable {
                panic!("Foreign key members must be Option<...>");
            }
            let inner = &classified.inner;
            if join.is_some() {
                row_reads.push(quote! {
                    let #ident: #field_type = keel_orm::materialize::nested::<#inner>(row)?;
                });
            } else {
                // Eligibility marker without a join predicate; the metadata
                // extractor rejects the type before any row is read.
                row_reads.push(quote! {
                    let #ident: #field_type = None;
                });
            }
        } else {
            match (classified.decode, classified.nullable) {
                (DecodeKind::Plain, _) => {
                    row_reads.push(quote! {
                        let #ident: #field_type = keel_orm::materialize::decode(row, #column)?;
                    });
                }
                // uuid and chrono values travel as text under the Any driver
                (DecodeKind::Parse, false) => {
                    row_reads.push(quote! {
                        let #ident: #field_type = {
                            let raw: String = keel_orm::materialize::decode(row, #column)?;
                            raw.parse().map_err(|e| {
                                keel_orm::Error::conversion(#column, ::std::string::ToString::to_string(&e))
                            })?
                        };
                    });
                }
                (DecodeKind::Parse, true) => {
                    let inner = &classified.inner;
                    row_reads.push(quote! {
                        let #ident: #field_type = {
                            let raw: ::core::option::Option<String> =
                                keel_orm::materialize::decode(row, #column)?;
                            match raw {
                                Some(s) => Some(s.parse::<#inner>().map_err(|e| {
                                    keel_orm::Error::conversion(#column, ::std::string::ToString::to_string(&e))
                                })?),
                                None => None,
                            }
                        };
                    });
                }
            }
        }

        if !skip && !nested {
            value_pairs.push(quote! {
                (#column, keel_orm::Value::from(self.#ident.clone()))
            });
        }

        if is_key && key_field.is_none() {
            key_field = Some(ident.clone());
        }

        constructors.push(ident);
    }

    let key_value_tokens = match &key_field {
        Some(ident) => quote! { keel_orm::Value::from(self.#ident.clone()) },
        None => quote! { keel_orm::Value::Null },
    };

    quote! {
        impl keel_orm::Model for #struct_name {
            fn table_name() -> Option<&'static str> {
                #table_tokens
            }

            fn fields() -> Vec<keel_orm::FieldSpec> {
                vec![#(#field_specs),*]
            }

            fn from_row(row: &keel_orm::AnyRow) -> Result<Self, keel_orm::Error> {
                #(#row_reads)*

                Ok(#struct_name {
                    #(#constructors),*
                })
            }

            fn values(&self) -> Vec<(&'static str, keel_orm::Value)> {
                vec![#(#value_pairs),*]
            }

            fn key_value(&self) -> keel_orm::Value {
                #key_value_tokens
            }
        }
    }
}
