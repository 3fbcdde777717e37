//! Application-wide error types.
//!
//! Library modules return [`Error`] through the [`Result`] alias, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! Lookups that find nothing are not errors: they return `Ok(None)`.
//! Everything here is a hard failure that the caller must handle.
//!
//! # Example
//!
//! ```ignore
//! use playlist_keeper::error::{Result, ResultExt};
//!
//! async fn rename(manager: &mut PlaylistManager) -> Result<()> {
//!     let playlist = manager.get_or_create_playlist("Road Trip").await?;
//!     manager
//!         .rename_playlist(Some(&playlist), "Summer Road Trip")
//!         .await
//!         .with_context("while renaming playlist")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error (constraint violations, locking, corrupt files)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The manager's session was closed and not reopened
    #[error("Session is closed")]
    SessionClosed,

    /// Metadata reading error
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error (or the error it wraps) is a closed-session failure.
    pub fn is_session_closed(&self) -> bool {
        match self {
            Self::SessionClosed => true,
            Self::WithContext { source, .. } => source.is_session_closed(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}
