//! Bulk import of local audio files.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{PlaylistManager, UNKNOWN_ALBUM};
use crate::error::{Error, Result};
use crate::model::{Playlist, Track};
use crate::scanner;

/// Outcome of importing a directory.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Tracks created or matched by title
    pub imported: Vec<Track>,
    /// Files whose metadata could not be read, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

impl PlaylistManager {
    /// Import every audio file under `root` (or `root` itself if it is a file).
    ///
    /// Each file's title is its file stem. Files whose metadata cannot be
    /// read are recorded in [`ImportReport::skipped`] and the import
    /// continues; storage failures abort the import.
    ///
    /// When `playlist` is given, every imported track is added to it.
    pub async fn import_path(
        &mut self,
        root: &Path,
        album: Option<&str>,
        playlist: Option<&Playlist>,
    ) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        for path in scanner::scan(root) {
            let track = match self.import_file(&path, None, album).await {
                Ok(track) => track,
                Err(e @ (Error::Metadata { .. } | Error::NotFound(_) | Error::Io(_))) => {
                    warn!(path = %path.display(), error = %e, "Skipping file");
                    report.skipped.push((path, e.to_string()));
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(playlist) = playlist {
                self.add_track_to_playlist(&track, playlist).await?;
            }
            report.imported.push(track);
        }

        info!(
            root = %root.display(),
            album = album.unwrap_or(UNKNOWN_ALBUM),
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "Import finished"
        );
        Ok(report)
    }
}
