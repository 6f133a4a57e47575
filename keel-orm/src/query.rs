//! # Query Descriptor
//!
//! A dialect-neutral representation of select/insert/update/delete intent.
//! Built incrementally through the builder methods, compiled to SQL text by
//! the `compile` module, and never executed here.

use crate::model::Value;

/// The statement kind a query descriptor represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// One inner-join clause: `table` joined on `local_column = foreign_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: String,
    pub local_column: String,
    pub foreign_column: String,
}

/// One equality predicate. Predicates compose conjunctively.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

/// A dialect-neutral query descriptor.
///
/// Pagination (`skip`/`take`) carries no implicit ordering: callers must not
/// assume stable row order across pagination calls unless the query also
/// carries an explicit `order_by`. That absence is a documented limitation,
/// not a defect.
#[derive(Debug, Clone)]
pub struct Query {
    pub(crate) kind: QueryKind,
    pub(crate) table: String,
    /// Projected columns; empty means `*`.
    pub(crate) projection: Vec<String>,
    pub(crate) joins: Vec<Join>,
    pub(crate) filters: Vec<Filter>,
    pub(crate) order_by: Option<String>,
    pub(crate) skip: Option<usize>,
    pub(crate) take: Option<usize>,
    /// Column/value pairs for insert and update statements.
    pub(crate) values: Vec<(String, Value)>,
    /// Key column whose generated value the insert should report, where the
    /// dialect supports it.
    pub(crate) returning: Option<String>,
}

impl Query {
    fn new(kind: QueryKind, table: &str) -> Self {
        Self {
            kind,
            table: table.to_string(),
            projection: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            order_by: None,
            skip: None,
            take: None,
            values: Vec::new(),
            returning: None,
        }
    }

    /// Starts a select descriptor over `table`, projecting all columns.
    pub fn select(table: &str) -> Self {
        Self::new(QueryKind::Select, table)
    }

    /// Starts an insert descriptor carrying the given column/value pairs.
    /// `returning_key` names the generated key column to report back, where
    /// the dialect supports reporting one.
    pub fn insert(table: &str, values: Vec<(String, Value)>, returning_key: Option<&str>) -> Self {
        let mut query = Self::new(QueryKind::Insert, table);
        query.values = values;
        query.returning = returning_key.map(str::to_string);
        query
    }

    /// Starts an update descriptor setting `values` on the rows matching
    /// `where_column = where_value`.
    pub fn update(
        table: &str,
        values: Vec<(String, Value)>,
        where_column: &str,
        where_value: Value,
    ) -> Self {
        let mut query = Self::new(QueryKind::Update, table);
        query.values = values;
        query.where_equals(where_column, where_value)
    }

    /// Starts a delete descriptor for the rows matching
    /// `where_column = where_value`.
    pub fn delete(table: &str, where_column: &str, where_value: Value) -> Self {
        Self::new(QueryKind::Delete, table).where_equals(where_column, where_value)
    }

    /// Replaces the projection with an explicit column list.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.projection = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Adds an inner join against `table` on `local_column = foreign_column`.
    /// Joins apply only to selects; on write descriptors this is a no-op.
    pub fn join(mut self, table: &str, local_column: &str, foreign_column: &str) -> Self {
        if self.kind == QueryKind::Select {
            self.joins.push(Join {
                table: table.to_string(),
                local_column: local_column.to_string(),
                foreign_column: foreign_column.to_string(),
            });
        }
        self
    }

    /// Adds an equality predicate. Predicates compose conjunctively; there is
    /// no disjunction or nested grouping.
    pub fn where_equals(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    /// Sets an explicit ascending sort. Only meaningful on selects.
    pub fn order_by(mut self, column: &str) -> Self {
        if self.kind == QueryKind::Select {
            self.order_by = Some(column.to_string());
        }
        self
    }

    /// Skips the first `n` rows. No implicit ordering is applied.
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    /// Limits the result to at most `n` rows.
    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_never_join_or_order() {
        let query = Query::delete("users", "user_id", Value::Int(5))
            .join("genders", "gender_id", "gender_id")
            .order_by("user_id");
        assert!(query.joins.is_empty());
        assert!(query.order_by.is_none());

        let query = Query::update(
            "users",
            vec![("full_name".to_string(), Value::Text("x".to_string()))],
            "user_id",
            Value::Int(1),
        )
        .join("genders", "gender_id", "gender_id");
        assert!(query.joins.is_empty());
    }

    #[test]
    fn filters_compose_conjunctively() {
        let query = Query::select("users")
            .where_equals("gender_id", 1)
            .where_equals("full_name", "Alice");
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[1].value, Value::Text("Alice".to_string()));
    }
}
