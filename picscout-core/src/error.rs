use thiserror::Error;

/// Errors from the query log store.
///
/// `ConnectionNotReady` and `Closed` are lifecycle preconditions; the
/// remaining variants carry the underlying storage failure. All of them
/// are recoverable from the caller's point of view.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store connection has not finished initializing")]
    ConnectionNotReady,

    #[error("store connection is closed")]
    Closed,

    #[error("failed to open store connection: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to write query log entry: {0}")]
    Write(#[source] sqlx::Error),

    #[error("failed to read query log: {0}")]
    Read(#[source] sqlx::Error),
}
