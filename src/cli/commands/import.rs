//! Local file import command.

use std::path::PathBuf;

use crate::library::PlaylistManager;

/// Import each root, optionally adding the tracks to a playlist.
pub async fn cmd_import(
    manager: &mut PlaylistManager,
    roots: &[PathBuf],
    album: Option<&str>,
    playlist: Option<&str>,
) -> anyhow::Result<()> {
    if roots.is_empty() {
        anyhow::bail!("Nothing to import: pass a path or set library.import_paths in the config");
    }

    let playlist = match playlist {
        Some(title) => Some(manager.get_or_create_playlist(title).await?),
        None => None,
    };

    let mut imported = 0;
    let mut skipped = 0;
    for root in roots {
        println!("Importing {}", root.display());
        let report = manager.import_path(root, album, playlist.as_ref()).await?;

        for track in &report.imported {
            println!("  + {} - {} ({}s)", track.artist, track.title, track.duration);
        }
        for (path, reason) in &report.skipped {
            println!("  ! {}: {}", path.display(), reason);
        }
        imported += report.imported.len();
        skipped += report.skipped.len();
    }

    println!();
    println!("Imported: {}", imported);
    println!("Skipped:  {}", skipped);
    Ok(())
}
