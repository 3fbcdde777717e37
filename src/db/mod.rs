//! Database module for playlist, track, and stream persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! The module is split into:
//! - [`Store`]: the explicitly constructed store handle (pool + file path)
//! - [`Session`]: the unit of work a manager reads and writes through
//! - [`tracks`] / [`playlists`]: repository functions issuing the SQL
//!
//! # Example
//!
//! ```ignore
//! use playlist_keeper::db::{Session, Store};
//!
//! let store = Store::open("data/appdata.db").await?;
//! let mut session = Session::open(&store);
//! let conn = session.conn().await?;
//! let liked = playlists::find_by_title(conn, "Liked Songs").await?;
//! session.commit().await?;
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::{Result, ResultExt};

/// Expands to a `SELECT` over `track` joined with its optional `stream`,
/// followed by the given SQL tail. Column names match `TrackRow`.
macro_rules! select_tracks {
    ($tail:literal) => {
        concat!(
            "SELECT t.id, COALESCE(t.title, '') AS title, COALESCE(t.artist, '') AS artist, ",
            "COALESCE(t.album, '') AS album, COALESCE(t.duration, 0) AS duration, ",
            "t.path, t.stream_id, s.url AS stream_url, ",
            "COALESCE(t.cover_art_url, '') AS cover_art_url ",
            "FROM track t LEFT JOIN stream s ON s.id = t.stream_id ",
            $tail
        )
    };
}

/// Expands to a `SELECT` over `playlist` followed by the given SQL tail.
/// Column names match `PlaylistRow`.
macro_rules! select_playlists {
    ($tail:literal) => {
        concat!(
            "SELECT p.id, COALESCE(p.title, '') AS title, ",
            "COALESCE(p.description, '') AS description, ",
            "p.date_created FROM playlist p ",
            $tail
        )
    };
}

pub mod playlists;
mod session;
pub mod tracks;

pub use session::Session;

/// Default database location, relative to the working directory.
/// See `StoreConfig::resolved_path`.
pub const DEFAULT_DB_PATH: &str = "data/appdata.db";

/// Default upper bound on pooled connections. Each open session pins one.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Schema for a fresh store. Every statement is create-if-absent, so running
/// it against an existing database never changes or drops anything.
///
/// Stores written by older versions have nullable text columns and no key on
/// `playlist_track`; the queries in this module tolerate both.
///
/// `playlist.downloaded` and `track.liked` are kept for compatibility with
/// existing files; nothing reads them and new rows store `0`.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS playlist (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    date_created TEXT NOT NULL,
    downloaded INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS stream (
    id INTEGER PRIMARY KEY,
    url TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS track (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    album TEXT NOT NULL,
    duration INTEGER NOT NULL,
    path TEXT,
    stream_id INTEGER REFERENCES stream(id),
    liked INTEGER NOT NULL DEFAULT 0,
    cover_art_url TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS playlist_track (
    playlist_id INTEGER NOT NULL REFERENCES playlist(id),
    track_id INTEGER NOT NULL REFERENCES track(id),
    PRIMARY KEY (playlist_id, track_id)
);

CREATE INDEX IF NOT EXISTS idx_playlist_title ON playlist(title);
CREATE INDEX IF NOT EXISTS idx_track_title ON track(title);
CREATE INDEX IF NOT EXISTS idx_playlist_track_track ON playlist_track(track_id);
"#;

/// Build a SQLite database URL for a file path.
///
/// # Returns
///
/// A SQLite connection URL string (e.g., "sqlite:data/appdata.db")
pub fn db_url(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}

/// Handle to the backing store.
///
/// Cloning is cheap and clones share the same connection pool, so one
/// `Store` opened by the application can be handed to any number of
/// managers. Each manager still owns its own [`Session`].
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    path: PathBuf,
}

impl Store {
    /// Open (creating if needed) the store at `path` with default pool size.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Open (creating if needed) the store at `path`.
    ///
    /// Creates the parent directory and the database file when missing,
    /// establishes a connection pool, and ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - Connection cannot be established
    /// - Schema creation fails
    pub async fn open_with(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(format!("creating store directory {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .with_context(format!("opening {}", db_url(path)))?;

        ensure_schema(&pool).await?;

        info!(path = %path.display(), "Store opened");

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection. Sessions still holding a connection
    /// finish their work first.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Create any missing tables and indexes.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .with_context("creating schema")?;
    Ok(())
}
