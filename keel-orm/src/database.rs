//! # Database Module
//!
//! The database façade: orchestrates metadata extraction, query building,
//! SQL compilation, execution and row materialization over a single
//! connection. One façade instance owns one connection handle for its whole
//! lifetime and assumes sequential use; concurrent callers need one façade
//! instance each.

// ============================================================================
// External Crate Imports
// ============================================================================

use std::sync::Once;

use sqlx::Connection as _;
use sqlx::Row;
use sqlx::AnyConnection;
use sqlx::any::{AnyQueryResult, AnyRow};

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::Error;
use crate::compile::{Compiler, SqlCompiler, Statement};
use crate::materialize::{self, Rows};
use crate::metadata::{self, ModelMetadata};
use crate::model::{Model, Value};
use crate::query::Query;

// ============================================================================
// Database Driver Enum
// ============================================================================

/// Supported database drivers, detected from the connection string scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drivers {
    /// PostgreSQL driver
    Postgres,
    /// MySQL driver
    MySQL,
    /// SQLite driver
    SQLite,
}

// ============================================================================
// Database Struct
// ============================================================================

/// The main entry point for keel-orm database operations.
///
/// A façade instance moves through three states: constructed but not yet
/// connected, open, and disposed. The transition to open happens lazily on
/// the first statement if `connect` was not used; disposal via [`close`] is
/// terminal and every later operation fails with [`Error::Closed`].
///
/// Every operation takes `&mut self`: the single underlying connection
/// serializes statement execution, so the façade does not support parallel
/// use from multiple logical callers.
///
/// [`close`]: Database::close
pub struct Database {
    url: String,
    driver: Drivers,
    compiler: SqlCompiler,
    conn: Option<AnyConnection>,
    disposed: bool,
}

// ============================================================================
// Database Implementation
// ============================================================================

impl Database {
    /// Creates a façade for the given connection string without opening the
    /// connection; it opens lazily on the first statement.
    pub fn new(url: &str) -> Self {
        let driver = if url.starts_with("postgres") {
            Drivers::Postgres
        } else if url.starts_with("mysql") {
            Drivers::MySQL
        } else {
            Drivers::SQLite
        };

        Self {
            url: url.to_string(),
            driver,
            compiler: SqlCompiler::new(driver),
            conn: None,
            disposed: false,
        }
    }

    /// Creates a façade and opens the connection eagerly.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let mut db = Self::new(url);
        db.connection().await?;
        Ok(db)
    }

    /// Returns the detected driver.
    pub fn driver(&self) -> Drivers {
        self.driver
    }

    fn install_drivers() {
        static INSTALL: Once = Once::new();
        INSTALL.call_once(sqlx::any::install_default_drivers);
    }

    async fn connection(&mut self) -> Result<&mut AnyConnection, Error> {
        if self.disposed {
            return Err(Error::Closed);
        }

        if self.conn.is_none() {
            Self::install_drivers();
            let conn = AnyConnection::connect(&self.url).await?;
            self.conn = Some(conn);
        }

        match self.conn.as_mut() {
            Some(conn) => Ok(conn),
            None => Err(Error::Closed),
        }
    }

    /// Closes the connection and disposes the façade. Terminal: no operation
    /// is valid afterwards.
    pub async fn close(&mut self) -> Result<(), Error> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        self.disposed = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statement execution
    // ------------------------------------------------------------------

    async fn run(&mut self, stmt: &Statement) -> Result<AnyQueryResult, Error> {
        log::debug!("execute: {}", stmt.sql);
        log::trace!("params: {:?}", stmt.params);
        let args = stmt.arguments();
        let conn = self.connection().await?;
        Ok(sqlx::query_with(&stmt.sql, args).execute(&mut *conn).await?)
    }

    async fn fetch(&mut self, stmt: &Statement) -> Result<Vec<AnyRow>, Error> {
        log::debug!("fetch: {}", stmt.sql);
        log::trace!("params: {:?}", stmt.params);
        let args = stmt.arguments();
        let conn = self.connection().await?;
        Ok(sqlx::query_with(&stmt.sql, args)
            .fetch_all(&mut *conn)
            .await?)
    }

    /// A select over the model's table, joined once per declared foreign key
    /// so nested members can be materialized from the flattened row.
    fn select_query(meta: &ModelMetadata) -> Query {
        let mut query = Query::select(meta.table.name);
        for fk in &meta.foreign_keys {
            query = query.join(fk.table, fk.local_column, fk.foreign_column);
        }
        query
    }

    fn write_values<T: Model>(obj: &T, key_column: &str) -> Vec<(String, Value)> {
        obj.values()
            .into_iter()
            .filter(|(column, _)| *column != key_column)
            .map(|(column, value)| (column.to_string(), value))
            .collect()
    }

    // ------------------------------------------------------------------
    // CRUD surface
    // ------------------------------------------------------------------

    /// Inserts `obj`, excluding its primary key so the store can assign one.
    /// Returns the generated key, or `None` when the store does not report
    /// one. Postgres and SQLite report it through a `RETURNING` clause;
    /// MySQL through the driver's last-insert id.
    pub async fn insert<T: Model>(&mut self, obj: &T) -> Result<Option<i64>, Error> {
        let meta = metadata::extract::<T>()?;
        let key_column = meta.primary_key.column;

        let values = Self::write_values(obj, key_column);
        let query = Query::insert(meta.table.name, values, Some(key_column));
        let stmt = self.compiler.compile(&query)?;

        match self.driver {
            Drivers::MySQL => {
                let result = self.run(&stmt).await?;
                Ok(result.last_insert_id())
            }
            Drivers::Postgres | Drivers::SQLite => {
                let rows = self.fetch(&stmt).await?;
                match rows.first() {
                    Some(row) => {
                        let id = row
                            .try_get::<i64, _>(0)
                            .map_err(|e| Error::conversion(key_column, e.to_string()))?;
                        Ok(Some(id))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    /// Updates the row whose primary key equals `id` with the non-key
    /// columns of `obj`.
    ///
    /// The explicit `id` argument is always the filter; the object's own
    /// embedded key value is never consulted and may diverge (a caller
    /// error, not reconciled here).
    pub async fn update<T: Model>(&mut self, id: impl Into<Value>, obj: &T) -> Result<u64, Error> {
        let meta = metadata::extract::<T>()?;
        let key_column = meta.primary_key.column;

        let values = Self::write_values(obj, key_column);
        let query = Query::update(meta.table.name, values, key_column, id.into());
        let stmt = self.compiler.compile(&query)?;

        let result = self.run(&stmt).await?;
        Ok(result.rows_affected())
    }

    /// Deletes the row matching the object's own key value. Returns the
    /// affected row count; removing an already-absent row affects zero rows.
    pub async fn remove<T: Model>(&mut self, obj: &T) -> Result<u64, Error> {
        let meta = metadata::extract::<T>()?;

        let query = Query::delete(meta.table.name, meta.primary_key.column, obj.key_value());
        let stmt = self.compiler.compile(&query)?;

        let result = self.run(&stmt).await?;
        Ok(result.rows_affected())
    }

    /// Fetches all rows of the model's table, with joins applied when the
    /// type declares foreign keys. Raw rows are buffered up front when the
    /// statement runs; only materialization is deferred to each pull, so
    /// dropping the iterator early holds no database resources.
    pub async fn get_all<T: Model>(&mut self) -> Result<Rows<T>, Error> {
        let meta = metadata::extract::<T>()?;

        let stmt = self.compiler.compile(&Self::select_query(&meta))?;
        let rows = self.fetch(&stmt).await?;
        Ok(Rows::new(rows))
    }

    /// Fetches one page of rows, buffered up front like [`get_all`]. No
    /// implicit ordering is applied: row order across pages is unspecified
    /// unless the caller drives an explicitly ordered query instead.
    ///
    /// [`get_all`]: Database::get_all
    pub async fn get_page<T: Model>(&mut self, skip: usize, take: usize) -> Result<Rows<T>, Error> {
        let meta = metadata::extract::<T>()?;

        let query = Self::select_query(&meta).skip(skip).take(take);
        let stmt = self.compiler.compile(&query)?;
        let rows = self.fetch(&stmt).await?;
        Ok(Rows::new(rows))
    }

    /// Fetches the first row whose primary key equals `id`, or `None` when
    /// there is no match.
    pub async fn get_by_id<T: Model>(&mut self, id: impl Into<Value>) -> Result<Option<T>, Error> {
        let meta = metadata::extract::<T>()?;

        let query = Self::select_query(&meta)
            .where_equals(meta.primary_key.column, id.into())
            .take(1);
        let stmt = self.compiler.compile(&query)?;

        let rows = self.fetch(&stmt).await?;
        match rows.first() {
            Some(row) => materialize::row(row).map(Some),
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Raw statement passthrough
    // ------------------------------------------------------------------

    /// Executes arbitrary SQL and returns the raw rows, bypassing the
    /// mapping layer. Store errors propagate unchanged.
    pub async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<AnyRow>, Error> {
        log::debug!("fetch: {sql}");
        let conn = self.connection().await?;
        Ok(sqlx::query(sql).fetch_all(&mut *conn).await?)
    }

    /// Executes arbitrary SQL and returns the first column of the first row.
    /// Zero rows or a failed conversion fall back to `T::default()`; this is
    /// the one place conversion does not fail loudly.
    pub async fn execute_scalar<T>(&mut self, sql: &str) -> Result<T, Error>
    where
        T: Default + for<'r> sqlx::Decode<'r, sqlx::Any> + sqlx::Type<sqlx::Any>,
    {
        log::debug!("scalar: {sql}");
        let conn = self.connection().await?;
        let row = sqlx::query(sql).fetch_optional(&mut *conn).await?;
        Ok(row
            .and_then(|r| r.try_get::<T, _>(0).ok())
            .unwrap_or_default())
    }

    /// Executes arbitrary SQL and returns the affected row count. Store
    /// errors propagate unchanged.
    pub async fn execute(&mut self, sql: &str) -> Result<u64, Error> {
        log::debug!("execute: {sql}");
        let conn = self.connection().await?;
        let result = sqlx::query(sql).execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }
}
