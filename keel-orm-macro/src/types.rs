use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type};

/// How a field is read out of a result row.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum DecodeKind {
    /// Decoded directly by the driver (integers, floats, bools, strings).
    Plain,
    /// Stored as text and parsed via `FromStr` (uuid and chrono types, which
    /// the Any driver cannot decode natively).
    Parse,
}

/// Classification of a model field's Rust type.
pub struct FieldType {
    /// Tokens for the inferred `keel_orm::StorageType`, if the type is known.
    pub storage: Option<TokenStream>,
    /// Whether the field is `Option<T>` (storage NULL maps to `None`).
    pub nullable: bool,
    pub decode: DecodeKind,
    /// The type inside `Option<..>`, or the type itself when not optional.
    pub inner: Type,
}

/// Maps a Rust field type to its dialect-neutral storage tag.
///
/// Returns `storage: None` for types the mapper does not know; the metadata
/// extractor turns that into a configuration error unless the field carries
/// an explicit `db_type` marker.
pub fn classify(ty: &Type) -> FieldType {
    if let Some(inner) = option_inner(ty) {
        let mut classified = classify(inner);
        classified.nullable = true;
        return classified;
    }

    let (storage, decode) = match type_ident(ty).as_deref() {
        Some("i16") | Some("i32") => (Some("Int32"), DecodeKind::Plain),
        Some("i64") => (Some("Int64"), DecodeKind::Plain),
        Some("f32") | Some("f64") => (Some("Double"), DecodeKind::Plain),
        Some("bool") => (Some("Bool"), DecodeKind::Plain),
        Some("String") => (Some("Text"), DecodeKind::Plain),
        Some("Uuid") => (Some("Uuid"), DecodeKind::Parse),
        Some("DateTime") | Some("NaiveDateTime") => (Some("DateTime"), DecodeKind::Parse),
        Some("NaiveDate") => (Some("Date"), DecodeKind::Parse),
        Some("NaiveTime") => (Some("Time"), DecodeKind::Parse),
        _ => (None, DecodeKind::Plain),
    };

    FieldType {
        storage: storage.and_then(storage_path),
        nullable: false,
        decode,
        inner: ty.clone(),
    }
}

/// Resolves a storage tag name (as written in `db_type = "..."`) to the
/// corresponding `keel_orm::StorageType` path.
pub fn storage_path(tag: &str) -> Option<TokenStream> {
    let path = match tag {
        "Bool" => quote! { keel_orm::StorageType::Bool },
        "Int32" => quote! { keel_orm::StorageType::Int32 },
        "Int64" => quote! { keel_orm::StorageType::Int64 },
        "Double" => quote! { keel_orm::StorageType::Double },
        "Text" => quote! { keel_orm::StorageType::Text },
        "Uuid" => quote! { keel_orm::StorageType::Uuid },
        "DateTime" => quote! { keel_orm::StorageType::DateTime },
        "Date" => quote! { keel_orm::StorageType::Date },
        "Time" => quote! { keel_orm::StorageType::Time },
        _ => return None,
    };
    Some(path)
}

/// Returns the `T` of `Option<T>`, or `None` when the type is not an Option.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return Some(inner);
                    }
                }
            }
        }
    }
    None
}

fn type_ident(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
    } else {
        None
    }
}
