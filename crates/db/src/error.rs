//! Error type shared by every [`RowStore`](crate::RowStore) backend.

/// A failed store operation.
///
/// Whatever shape the backend reports errors in, it ends up here. The
/// `Display` text is the store's own message so it can be surfaced verbatim.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store answered and refused the operation.
    #[error("{message}")]
    Rejected {
        /// HTTP status from the REST backend, if any.
        status: Option<u16>,
        /// Store-specific error code (e.g. a Postgres SQLSTATE).
        code: Option<String>,
        message: String,
        details: Option<String>,
    },

    /// The HTTP request to the store failed (connect, timeout, TLS, ...).
    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A direct Postgres query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store answered with something that is not a row set.
    #[error("Unexpected store response: {0}")]
    Malformed(String),

    /// A write succeeded but the expected row or key was missing.
    #[error("{0}")]
    MissingResult(String),

    /// A table or column name that is unsafe to put in a query.
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

impl StoreError {
    /// Secondary detail text, when the store supplied any.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Rejected { details, .. } => details.clone(),
            Self::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().map(|code| format!("SQLSTATE {code}"))
            }
            _ => None,
        }
    }
}
