//! Test utilities and fixtures for playlist-keeper tests.
//!
//! # Example
//!
//! ```ignore
//! use playlist_keeper::test_utils::{temp_manager, mock_new_track, create_track};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (mut manager, _dir) = temp_manager().await;
//!     let track = create_track(&mut manager, mock_new_track("Song", 180)).await;
//!     // ... test logic
//! }
//! ```

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

use crate::db::Store;
use crate::library::PlaylistManager;
use crate::model::{NewTrack, Track};

/// Creates a temporary store for testing.
///
/// The database lives in a temporary directory that is removed when the
/// returned `TempDir` is dropped. Keep it alive for the whole test.
pub async fn temp_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("data").join("appdata.db");

    let store = Store::open(&db_path)
        .await
        .expect("Failed to initialize test database");

    (store, dir)
}

/// Creates a manager over a fresh temporary store.
pub async fn temp_manager() -> (PlaylistManager, TempDir) {
    let (store, dir) = temp_store().await;
    let manager = PlaylistManager::new(store)
        .await
        .expect("Failed to create manager");
    (manager, dir)
}

/// A streamed track with the given title and duration and sensible
/// defaults for everything else. The stream URL is derived from the title.
pub fn mock_new_track(title: &str, duration: i64) -> NewTrack {
    NewTrack::streamed(
        title,
        "Test Artist",
        "Test Album",
        duration,
        format!("http://stream.test/{}", title.replace(' ', "-")),
        None,
    )
}

/// Get-or-create `new` through the manager, panicking on failure.
pub async fn create_track(manager: &mut PlaylistManager, new: NewTrack) -> Track {
    manager
        .get_or_create_track_from(new)
        .await
        .expect("Failed to create track")
}

/// Tables as older versions of the application created them: every text
/// column nullable and no key on `playlist_track`.
const LEGACY_SCHEMA: &str = r#"
CREATE TABLE playlist (
    id INTEGER NOT NULL,
    title VARCHAR,
    description VARCHAR,
    date_created DATETIME,
    downloaded BOOLEAN,
    PRIMARY KEY (id)
);
CREATE TABLE stream (
    id INTEGER NOT NULL,
    url VARCHAR,
    PRIMARY KEY (id)
);
CREATE TABLE track (
    id INTEGER NOT NULL,
    title VARCHAR,
    artist VARCHAR,
    album VARCHAR,
    duration INTEGER,
    path VARCHAR,
    stream_id INTEGER,
    liked BOOLEAN,
    cover_art_url VARCHAR,
    PRIMARY KEY (id),
    FOREIGN KEY(stream_id) REFERENCES stream (id)
);
CREATE TABLE playlist_track (
    playlist_id INTEGER,
    track_id INTEGER,
    FOREIGN KEY(playlist_id) REFERENCES playlist (id),
    FOREIGN KEY(track_id) REFERENCES track (id)
);
INSERT INTO playlist (title, description, date_created, downloaded)
VALUES ('Old Mix', NULL, '2023-05-01 10:20:30.123456', 0);
"#;

/// A store file first written with the legacy schema (holding one playlist,
/// "Old Mix"), then opened normally.
pub async fn legacy_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("appdata.db");

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create legacy database");
    sqlx::raw_sql(LEGACY_SCHEMA)
        .execute(&pool)
        .await
        .expect("Failed to create legacy schema");
    pool.close().await;

    let store = Store::open(&db_path)
        .await
        .expect("Failed to open legacy database");
    (store, dir)
}

/// Write a mono 16-bit PCM WAV of silence with `samples` frames at
/// `sample_rate` Hz. An `artist` is stored in a RIFF INFO `IART` chunk.
pub fn write_wav(path: &Path, sample_rate: u32, samples: u32, artist: Option<&str>) {
    let data_len = samples * 2;

    let mut info = Vec::new();
    if let Some(artist) = artist {
        let mut value = artist.as_bytes().to_vec();
        value.push(0);
        let value_len = value.len() as u32;
        if value.len() % 2 == 1 {
            value.push(0);
        }
        info.extend_from_slice(b"LIST");
        info.extend_from_slice(&(4 + 8 + value.len() as u32).to_le_bytes());
        info.extend_from_slice(b"INFO");
        info.extend_from_slice(b"IART");
        info.extend_from_slice(&value_len.to_le_bytes());
        info.extend_from_slice(&value);
    }

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(4 + (8 + 16) + (8 + data_len) + info.len() as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());

    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0);

    bytes.extend_from_slice(&info);
    std::fs::write(path, bytes).expect("Failed to write wav file");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_manager_starts_empty() {
        let (mut manager, _dir) = temp_manager().await;
        assert!(manager.list_playlists().await.unwrap().is_empty());
        assert!(manager.list_tracks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_track_persists() {
        let (mut manager, _dir) = temp_manager().await;
        let track = create_track(&mut manager, mock_new_track("Test Track", 180)).await;
        assert!(track.id > 0);
        assert_eq!(track.location(), Some("http://stream.test/Test-Track"));
    }

    #[tokio::test]
    async fn test_legacy_store_keeps_its_rows() {
        let (store, _dir) = legacy_store().await;
        let titles: Vec<String> = sqlx::query_scalar("SELECT title FROM playlist")
            .fetch_all(store.pool())
            .await
            .unwrap();
        assert_eq!(titles, vec!["Old Mix"]);
    }

    #[test]
    fn test_write_wav_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 8000, 12_000, None);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 44 + 24_000);
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize, bytes.len() - 8);
    }

    #[test]
    fn test_mock_new_track_defaults() {
        let new = mock_new_track("Test Track", 180);
        assert_eq!(new.title, "Test Track");
        assert_eq!(new.artist, "Test Artist");
        assert_eq!(new.album, "Test Album");
        assert_eq!(new.duration, 180);
        assert!(new.playlists.is_empty());
    }
}
