//! Playlist commands.

use super::require_playlist;
use crate::library::PlaylistManager;

/// Create a playlist unless one with this title exists.
pub async fn cmd_create_playlist(
    manager: &mut PlaylistManager,
    title: &str,
    description: Option<&str>,
) -> anyhow::Result<()> {
    let existed = manager.playlist_exists(title).await?;
    let mut playlist = manager.get_or_create_playlist(title).await?;

    if let Some(description) = description
        && let Some(updated) = manager
            .edit_playlist_description(Some(&playlist), description)
            .await?
    {
        playlist = updated;
    }

    if existed {
        println!("Playlist {:?} already exists (id {})", playlist.title, playlist.id);
    } else {
        println!("Created playlist {:?} (id {})", playlist.title, playlist.id);
    }
    Ok(())
}

pub async fn cmd_rename_playlist(
    manager: &mut PlaylistManager,
    title: &str,
    new_title: &str,
) -> anyhow::Result<()> {
    let playlist = require_playlist(manager, title).await?;
    manager.rename_playlist(Some(&playlist), new_title).await?;
    println!("Renamed {:?} to {:?}", title, new_title);
    Ok(())
}

pub async fn cmd_describe_playlist(
    manager: &mut PlaylistManager,
    title: &str,
    description: &str,
) -> anyhow::Result<()> {
    let playlist = require_playlist(manager, title).await?;
    manager
        .edit_playlist_description(Some(&playlist), description)
        .await?;
    println!("Updated description of {:?}", title);
    Ok(())
}

pub async fn cmd_delete_playlist(manager: &mut PlaylistManager, title: &str) -> anyhow::Result<()> {
    let playlist = require_playlist(manager, title).await?;
    let tracks = manager.playlist_length(&playlist).await?;
    manager.delete_playlist(Some(&playlist)).await?;
    println!("Deleted {:?} ({} tracks kept in the library)", title, tracks);
    Ok(())
}
