//! Finds audio files to import.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions treated as audio (compared case-insensitively).
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a"];

/// Check if a path has an audio file extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Audio files under `root`, recursively, sorted by path.
///
/// A `root` that is itself a file is returned as-is, whatever its extension,
/// so callers can import a single file explicitly. Unreadable directory
/// entries are skipped.
pub fn scan(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_audio_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_scan_audio_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        File::create(root.join("song.mp3")).unwrap();
        File::create(root.join("music.flac")).unwrap();
        File::create(root.join("notes.txt")).unwrap();
        File::create(root.join("UPPERCASE.OGG")).unwrap();

        let subdir = root.join("subdir");
        std::fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("track.wav")).unwrap();
        File::create(subdir.join("ignore.doc")).unwrap();

        let paths = scan(root);
        let file_names: Vec<&str> = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();

        assert_eq!(paths.len(), 4);
        assert!(file_names.contains(&"song.mp3"));
        assert!(file_names.contains(&"music.flac"));
        assert!(file_names.contains(&"track.wav"));
        assert!(file_names.contains(&"UPPERCASE.OGG"));
        assert!(!file_names.contains(&"notes.txt"));
    }

    #[test]
    fn test_scan_single_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("anything.bin");
        File::create(&file).unwrap();
        assert_eq!(scan(&file), vec![file]);
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        assert!(scan(Path::new("/definitely/not/here")).is_empty());
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("/a/b.M4A")));
        assert!(!is_audio_file(Path::new("/a/b")));
        assert!(!is_audio_file(Path::new("/a/b.jpg")));
    }
}
