//! # SQL Compiler
//!
//! Turns a dialect-neutral `Query` descriptor into parameterized SQL text
//! plus bound parameters. This is the single compiler boundary of the crate:
//! one compiler, parameterized by the detected driver for placeholder style
//! and the few spots where the engines disagree.

use sqlx::Arguments;
use sqlx::any::AnyArguments;

use crate::Error;
use crate::database::Drivers;
use crate::model::Value;
use crate::query::{Query, QueryKind};

/// A compiled, parameterized statement.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    /// Binds the statement parameters into sqlx Any arguments.
    pub fn arguments<'q>(&self) -> AnyArguments<'q> {
        let mut args = AnyArguments::default();
        for value in &self.params {
            match value {
                Value::Null => {
                    let _ = args.add(Option::<String>::None);
                }
                Value::Bool(v) => {
                    let _ = args.add(*v);
                }
                Value::Int(v) => {
                    let _ = args.add(*v);
                }
                Value::Double(v) => {
                    let _ = args.add(*v);
                }
                Value::Text(v) => {
                    let _ = args.add(v.clone());
                }
            }
        }
        args
    }
}

/// The compiler collaborator interface consumed by the database façade.
pub trait Compiler {
    fn compile(&self, query: &Query) -> Result<Statement, Error>;
}

/// Compiles query descriptors for one driver of the sqlx Any family.
#[derive(Debug, Clone, Copy)]
pub struct SqlCompiler {
    driver: Drivers,
}

impl SqlCompiler {
    pub fn new(driver: Drivers) -> Self {
        Self { driver }
    }

    fn placeholder(&self, index: usize) -> String {
        match self.driver {
            Drivers::Postgres => format!("${index}"),
            Drivers::MySQL | Drivers::SQLite => "?".to_string(),
        }
    }

    fn compile_select(&self, query: &Query) -> Statement {
        let mut sql = String::from("SELECT ");
        if query.projection.is_empty() {
            sql.push('*');
        } else {
            let columns: Vec<String> = query.projection.iter().map(|c| quote_ident(c)).collect();
            sql.push_str(&columns.join(", "));
        }
        sql.push_str(&format!(" FROM {}", quote_ident(&query.table)));

        for join in &query.joins {
            sql.push_str(&format!(
                " INNER JOIN {} ON {}.{} = {}.{}",
                quote_ident(&join.table),
                quote_ident(&query.table),
                quote_ident(&join.local_column),
                quote_ident(&join.table),
                quote_ident(&join.foreign_column),
            ));
        }

        let mut params = Vec::new();
        // Filter columns are qualified with the main table once joins are in
        // play, since the joined tables may carry columns of the same name.
        self.push_where(&mut sql, &mut params, query, !query.joins.is_empty());

        if let Some(order) = &query.order_by {
            let column = if query.joins.is_empty() {
                quote_ident(order)
            } else {
                format!("{}.{}", quote_ident(&query.table), quote_ident(order))
            };
            sql.push_str(&format!(" ORDER BY {column}"));
        }

        match (query.take, query.skip) {
            (Some(take), Some(skip)) => sql.push_str(&format!(" LIMIT {take} OFFSET {skip}")),
            (Some(take), None) => sql.push_str(&format!(" LIMIT {take}")),
            // An offset without a limit needs per-engine spelling.
            (None, Some(skip)) => match self.driver {
                Drivers::Postgres => sql.push_str(&format!(" OFFSET {skip}")),
                Drivers::MySQL => {
                    sql.push_str(&format!(" LIMIT 18446744073709551615 OFFSET {skip}"))
                }
                Drivers::SQLite => sql.push_str(&format!(" LIMIT -1 OFFSET {skip}")),
            },
            (None, None) => {}
        }

        Statement { sql, params }
    }

    fn compile_insert(&self, query: &Query) -> Result<Statement, Error> {
        if query.values.is_empty() {
            return Err(Error::configuration(format!(
                "insert into {} has no column values",
                query.table
            )));
        }

        let mut params = Vec::new();
        let mut placeholders = Vec::new();
        let columns: Vec<String> = query.values.iter().map(|(c, _)| quote_ident(c)).collect();
        for (_, value) in &query.values {
            params.push(value.clone());
            placeholders.push(self.placeholder(params.len()));
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&query.table),
            columns.join(", "),
            placeholders.join(", "),
        );

        // MySQL has no RETURNING; the generated key comes from the driver's
        // last-insert id instead.
        if let Some(key) = &query.returning {
            match self.driver {
                Drivers::Postgres | Drivers::SQLite => {
                    sql.push_str(&format!(" RETURNING {}", quote_ident(key)));
                }
                Drivers::MySQL => {}
            }
        }

        Ok(Statement { sql, params })
    }

    fn compile_update(&self, query: &Query) -> Result<Statement, Error> {
        if query.values.is_empty() {
            return Err(Error::configuration(format!(
                "update of {} has no column values",
                query.table
            )));
        }

        let mut params = Vec::new();
        let mut setters = Vec::new();
        for (column, value) in &query.values {
            params.push(value.clone());
            setters.push(format!(
                "{} = {}",
                quote_ident(column),
                self.placeholder(params.len())
            ));
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            quote_ident(&query.table),
            setters.join(", "),
        );
        self.push_where(&mut sql, &mut params, query, false);

        Ok(Statement { sql, params })
    }

    fn compile_delete(&self, query: &Query) -> Statement {
        let mut sql = format!("DELETE FROM {}", quote_ident(&query.table));
        let mut params = Vec::new();
        self.push_where(&mut sql, &mut params, query, false);
        Statement { sql, params }
    }

    fn push_where(&self, sql: &mut String, params: &mut Vec<Value>, query: &Query, qualify: bool) {
        if query.filters.is_empty() {
            return;
        }

        let mut clauses = Vec::new();
        for filter in &query.filters {
            params.push(filter.value.clone());
            let column = if qualify {
                format!(
                    "{}.{}",
                    quote_ident(&query.table),
                    quote_ident(&filter.column)
                )
            } else {
                quote_ident(&filter.column)
            };
            clauses.push(format!("{column} = {}", self.placeholder(params.len())));
        }

        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
}

impl Compiler for SqlCompiler {
    fn compile(&self, query: &Query) -> Result<Statement, Error> {
        match query.kind {
            QueryKind::Select => Ok(self.compile_select(query)),
            QueryKind::Insert => self.compile_insert(query),
            QueryKind::Update => self.compile_update(query),
            QueryKind::Delete => Ok(self.compile_delete(query)),
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{name}\"")
}
