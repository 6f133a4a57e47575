use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::Error;

/// Dialect-neutral storage type tag for a mapped column.
///
/// Declares the on-the-wire value type used for parameter binding. Inferred
/// from the Rust field type by the `Model` derive, or declared explicitly via
/// `#[orm(db_type = "...")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Bool,
    Int32,
    Int64,
    Double,
    Text,
    /// Stored as text; the Any driver has no native uuid representation.
    Uuid,
    /// Stored as RFC 3339 text.
    DateTime,
    Date,
    Time,
}

/// A dialect-neutral bound parameter value.
///
/// Integers widen to 64 bits and floats to double precision; uuid and
/// chrono values travel as text. `Null` is the language-native absence value
/// (`Option::None`) on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
}

macro_rules! impl_value_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    };
}

impl_value_int!(i16, i32, i64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Text(v.to_rfc3339())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// Join predicate configuration for a foreign-key member.
///
/// Resolution is single-level: the joined table's columns are expected to be
/// flattened into the same result row by a SQL join, never fetched by a
/// second round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    /// Local column of the join predicate.
    pub local: &'static str,
    /// Name of the joined table.
    pub table: &'static str,
    /// Column on the joined table.
    pub foreign: &'static str,
}

/// Raw per-member marker data emitted by the `Model` derive.
///
/// This is the unvalidated form; `metadata::extract` turns a field spec list
/// into checked descriptors or a `Configuration` error.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// The Rust field name (without any `r#` prefix).
    pub field: &'static str,
    /// The backing column name. Defaults to the snake_case field name.
    pub column: &'static str,
    /// Storage type tag, if declared or inferable.
    pub storage: Option<StorageType>,
    /// Whether this member carries the key marker.
    pub key: bool,
    /// Whether this member is excluded from mapping.
    pub skip: bool,
    /// Whether this member holds a nested model resolved through a join.
    pub nested: bool,
    /// Join predicate for nested members.
    pub join: Option<JoinSpec>,
}

/// The core trait connecting a model type to its table mapping.
///
/// Implemented via the `#[derive(Model)]` macro.
///
/// # Example
///
/// ```rust,ignore
/// use keel_orm::Model;
///
/// #[derive(Model)]
/// #[orm(table = "genders")]
/// struct Gender {
///     #[orm(key, column = "gender_id")]
///     id: i32,
///     #[orm(column = "gender_name")]
///     name: String,
/// }
/// ```
pub trait Model: Sized {
    /// Returns the declared table name, or `None` when the type carries no
    /// table marker (rejected at metadata extraction).
    fn table_name() -> Option<&'static str>;

    /// Returns the raw field specs in declaration order.
    fn fields() -> Vec<FieldSpec>;

    /// Materializes an instance from a single result row. Nested foreign-key
    /// members are read from the same flattened row.
    fn from_row(row: &sqlx::any::AnyRow) -> Result<Self, Error>;

    /// Converts the instance into column/value pairs for write statements.
    /// Includes the primary key; callers exclude it where required.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Returns the value of the key-marked member, or `Value::Null` when the
    /// type declares none.
    fn key_value(&self) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_conversions_widen() {
        assert_eq!(Value::from(7i32), Value::Int(7));
        assert_eq!(Value::from(7i16), Value::Int(7));
        assert_eq!(Value::from(2.5f32), Value::Double(2.5));
        assert_eq!(Value::from("abc"), Value::Text("abc".to_string()));
    }

    #[test]
    fn optional_absence_maps_to_null() {
        assert_eq!(Value::from(Option::<i32>::None), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Int(3));
    }

    #[test]
    fn uuid_and_datetime_travel_as_text() {
        let id = Uuid::new_v4();
        assert_eq!(Value::from(id), Value::Text(id.to_string()));

        let now = Utc::now();
        assert_eq!(Value::from(now), Value::Text(now.to_rfc3339()));
    }
}
