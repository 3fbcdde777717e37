//! Core data models for the playlist library.
//!
//! Defines the primary entities: [`Track`], [`Playlist`], and [`Stream`],
//! plus the construction records ([`NewTrack`], [`NewPlaylist`]) used when
//! persisting new rows.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `playlist` - Named playlists with a creation timestamp
//! - `track` - Tracks, either local files (`path`) or streamed (`stream_id`)
//! - `stream` - Stream URLs, each owned by exactly one track
//! - `playlist_track` - The playlist/track membership set
//!
//! Entities are plain snapshots. Mutations go through
//! [`PlaylistManager`](crate::library::PlaylistManager), which returns
//! fresh snapshots after writing.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Title of the reserved, lazily-created liked songs playlist.
pub const LIKED_SONGS: &str = "Liked Songs";

/// Title used by `get_or_create_playlist` when the caller has none.
pub const DEFAULT_PLAYLIST_TITLE: &str = "New Playlist";

/// A stream source owned by a single track.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Stream {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Stream URL
    pub url: String,
}

/// A track in the library.
///
/// A track has either a local `path` or a `stream`. Which one is decided
/// when the track is constructed (see [`TrackSource`]); the storage layer
/// does not enforce the exclusivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// Database ID (auto-generated)
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Duration in seconds
    pub duration: i64,
    /// Local file path, for tracks that were imported from disk
    pub path: Option<String>,
    /// Stream source, for tracks that were not imported from disk
    pub stream: Option<Stream>,
    /// Cover art URL; empty when the track has none
    pub cover_art_url: String,
}

impl Track {
    /// Cover art URL, treating the empty string as absent.
    pub fn cover_art(&self) -> Option<&str> {
        Some(self.cover_art_url.as_str()).filter(|url| !url.is_empty())
    }

    /// Where the audio lives: the stream URL, or the local path.
    pub fn location(&self) -> Option<&str> {
        self.stream
            .as_ref()
            .map(|s| s.url.as_str())
            .or(self.path.as_deref())
    }
}

/// Joined `track` + `stream` row.
#[derive(Debug, FromRow)]
pub(crate) struct TrackRow {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: i64,
    pub path: Option<String>,
    pub stream_id: Option<i64>,
    pub stream_url: Option<String>,
    pub cover_art_url: String,
}

impl From<TrackRow> for Track {
    fn from(row: TrackRow) -> Self {
        let stream = match (row.stream_id, row.stream_url) {
            (Some(id), Some(url)) => Some(Stream { id, url }),
            _ => None,
        };
        Track {
            id: row.id,
            title: row.title,
            artist: row.artist,
            album: row.album,
            duration: row.duration,
            path: row.path,
            stream,
            cover_art_url: row.cover_art_url,
        }
    }
}

/// A playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Title; used as the business key by lookups, but not unique in storage
    pub title: String,
    pub description: String,
    pub date_created: DateTime<Utc>,
}

impl Playlist {
    pub fn is_liked_songs(&self) -> bool {
        self.title == LIKED_SONGS
    }
}

/// Database row for the playlist table.
#[derive(Debug, FromRow)]
pub(crate) struct PlaylistRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date_created: Option<String>,
}

impl TryFrom<PlaylistRow> for Playlist {
    type Error = sqlx::Error;

    fn try_from(row: PlaylistRow) -> Result<Self, Self::Error> {
        let stored = row.date_created.unwrap_or_default();
        let date_created = parse_timestamp(&stored).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("playlist {}: unreadable date_created {:?}", row.id, stored).into(),
            )
        })?;
        Ok(Playlist {
            id: row.id,
            title: row.title,
            description: row.description,
            date_created,
        })
    }
}

/// Parse a stored timestamp: RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS[.ffffff]`
/// taken as UTC (the layout older stores wrote).
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// A playlist together with its loaded membership set.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistContents {
    pub playlist: Playlist,
    /// Member tracks. Order is not meaningful.
    pub tracks: Vec<Track>,
}

impl PlaylistContents {
    /// Number of tracks in the playlist.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Sum of member durations in seconds. Zero for an empty playlist.
    pub fn total_duration(&self) -> i64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}

/// Where a new track's audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    /// A file on disk; no stream row is created.
    Local(String),
    /// A stream URL; a stream row is created alongside the track.
    Stream(String),
}

/// Everything needed to construct a track row.
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Duration in seconds
    pub duration: i64,
    pub source: TrackSource,
    /// Playlists the track joins as soon as it is created
    pub playlists: Vec<Playlist>,
    pub cover_art_url: String,
}

impl NewTrack {
    /// A streamed track with no playlists. A missing cover art URL is
    /// stored as the empty string.
    pub fn streamed(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration: i64,
        stream_url: impl Into<String>,
        cover_art_url: Option<&str>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration,
            source: TrackSource::Stream(stream_url.into()),
            playlists: Vec::new(),
            cover_art_url: cover_art_url.unwrap_or_default().to_string(),
        }
    }

    /// A local track with no playlists and no cover art.
    pub fn local(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration: i64,
        path: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration,
            source: TrackSource::Local(path.into()),
            playlists: Vec::new(),
            cover_art_url: String::new(),
        }
    }
}

/// Everything needed to construct a playlist row.
#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub title: String,
    pub description: String,
    pub date_created: DateTime<Utc>,
}

impl NewPlaylist {
    /// A playlist with an empty description.
    pub fn new(title: impl Into<String>, date_created: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date_created,
        }
    }
}
