//! Audio file metadata reading.
//!
//! Uses the lofty crate for format-independent access to audio properties
//! and tags. Title and album come from the caller (they usually come from
//! the folder layout or an import form); duration, sample rate, and artist
//! come from the file itself.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::NewTrack;

/// Artist recorded when the file has no readable artist tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Properties of a local audio file, ready to become a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrackInfo {
    pub path: PathBuf,
    pub title: String,
    pub album: String,
    /// File creation time (modification time on filesystems without it)
    pub date_added: DateTime<Utc>,
    /// Duration in whole seconds, truncated
    pub duration: u64,
    /// Sample rate in Hz, 0 when the format does not report one
    pub sample_rate: u32,
    pub artist: String,
}

impl LocalTrackInfo {
    /// Construction record for a local track with no playlists.
    pub fn to_new_track(&self) -> NewTrack {
        NewTrack::local(
            self.title.clone(),
            self.artist.clone(),
            self.album.clone(),
            i64::try_from(self.duration).unwrap_or(i64::MAX),
            self.path.to_string_lossy().into_owned(),
        )
    }
}

/// Read duration, sample rate, date added, and artist from an audio file.
///
/// # Errors
///
/// - [`Error::NotFound`] if `path` does not exist
/// - [`Error::Metadata`] if the file cannot be probed or parsed as audio
pub fn read(path: &Path, title: &str, album: &str) -> Result<LocalTrackInfo> {
    let fs_meta = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::not_found(path),
        _ => Error::Io(e),
    })?;
    let date_added = fs_meta
        .created()
        .or_else(|_| fs_meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let tagged_file = Probe::open(path)
        .map_err(|e| Error::metadata(path, format!("failed to open file for probing: {e}")))?
        .read()
        .map_err(|e| Error::metadata(path, format!("failed to read file metadata: {e}")))?;

    let properties = tagged_file.properties();
    let duration = properties.duration().as_secs();
    let sample_rate = properties.sample_rate().unwrap_or(0);

    // Primary tag first, then whatever tag the file has
    let tag_artist = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .and_then(|t| t.artist().map(|s| s.to_string()));
    let artist = artist_or_unknown(tag_artist.as_deref());

    debug!(
        path = %path.display(),
        duration,
        sample_rate,
        artist = %artist,
        "Read audio metadata"
    );

    Ok(LocalTrackInfo {
        path: path.to_path_buf(),
        title: title.to_string(),
        album: album.to_string(),
        date_added,
        duration,
        sample_rate,
        artist,
    })
}

fn artist_or_unknown(tag: Option<&str>) -> String {
    match tag.map(|t| t.trim_matches(|c: char| c.is_whitespace() || c == '\0')) {
        Some(artist) if !artist.is_empty() => artist.to_string(),
        _ => UNKNOWN_ARTIST.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_wav;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_non_audio_file_returns_error() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "This is just some text, not music.").expect("Failed to write to temp file");

        let result = read(file.path(), "Title", "Album");
        assert!(matches!(result, Err(Error::Metadata { .. })));
    }

    #[test]
    fn test_read_non_existent_file_returns_not_found() {
        let path = Path::new("non_existent_file.mp3");
        let result = read(path, "Title", "Album");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_read_wav_truncates_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        // 1.5 seconds at 8 kHz
        write_wav(&path, 8000, 12_000, None);

        let info = read(&path, "Tone", "Tests").unwrap();
        assert_eq!(info.duration, 1);
        assert_eq!(info.sample_rate, 8000);
        assert_eq!(info.artist, UNKNOWN_ARTIST);
        assert_eq!(info.title, "Tone");
        assert_eq!(info.album, "Tests");
        assert_eq!(info.path, path);
    }

    #[test]
    fn test_read_wav_artist_from_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagged.wav");
        write_wav(&path, 44_100, 44_100 * 2, Some("Quartet"));

        let info = read(&path, "Tagged", "Tests").unwrap();
        assert_eq!(info.duration, 2);
        assert_eq!(info.sample_rate, 44_100);
        assert_eq!(info.artist, "Quartet");
    }

    #[test]
    fn test_artist_fallback() {
        assert_eq!(artist_or_unknown(Some("Queen")), "Queen");
        assert_eq!(artist_or_unknown(Some("  ")), UNKNOWN_ARTIST);
        assert_eq!(artist_or_unknown(Some("Queen\0")), "Queen");
        assert_eq!(artist_or_unknown(None), UNKNOWN_ARTIST);
    }

    #[test]
    fn test_to_new_track_is_local() {
        let info = LocalTrackInfo {
            path: PathBuf::from("/music/song.mp3"),
            title: "Song".to_string(),
            album: "Album".to_string(),
            date_added: Utc::now(),
            duration: 215,
            sample_rate: 44100,
            artist: UNKNOWN_ARTIST.to_string(),
        };
        let new = info.to_new_track();
        assert_eq!(new.duration, 215);
        assert_eq!(
            new.source,
            crate::model::TrackSource::Local("/music/song.mp3".to_string())
        );
        assert!(new.cover_art_url.is_empty());
    }
}
