/// Errors produced by keel-orm.
///
/// The taxonomy is deliberately small: configuration problems are detected
/// before any statement is built, store failures propagate unchanged, and
/// value coercion failures during materialization fail loudly instead of
/// silently defaulting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model metadata is incomplete or inconsistent (missing table marker,
    /// empty column name, zero or duplicate key markers, unconfigured
    /// foreign-key member). Surfaced at metadata extraction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A compiled statement failed at the store. Never swallowed or retried.
    #[error("query execution failed: {0}")]
    Execution(#[from] sqlx::Error),

    /// A raw column value could not be coerced to the target member's type.
    #[error("cannot convert column `{column}`: {message}")]
    Conversion { column: String, message: String },

    /// An operation was attempted after the database handle was disposed.
    #[error("database handle has been closed")]
    Closed,
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub fn conversion(column: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Conversion {
            column: column.into(),
            message: message.into(),
        }
    }
}
