//! Track membership, liking, and cover art commands.

use super::{require_playlist, require_track};
use crate::library::PlaylistManager;
use crate::model::NewTrack;

/// Get-or-create the track and add it to the (get-or-created) playlist.
pub async fn cmd_add_track(
    manager: &mut PlaylistManager,
    playlist: &str,
    new: NewTrack,
) -> anyhow::Result<()> {
    let playlist = manager.get_or_create_playlist(playlist).await?;
    let track = manager
        .create_and_add_track_to_playlist(new, &playlist)
        .await?;
    println!(
        "{:?} (id {}) is in {:?}",
        track.title, track.id, playlist.title
    );
    Ok(())
}

pub async fn cmd_remove_track(
    manager: &mut PlaylistManager,
    playlist: &str,
    title: &str,
) -> anyhow::Result<()> {
    let playlist = require_playlist(manager, playlist).await?;
    let track = require_track(manager, title).await?;
    if manager.remove_track_from_playlist(&track, &playlist).await? {
        println!("Removed {:?} from {:?}", track.title, playlist.title);
    } else {
        println!("{:?} was not in {:?}", track.title, playlist.title);
    }
    Ok(())
}

pub async fn cmd_like(manager: &mut PlaylistManager, title: &str) -> anyhow::Result<()> {
    let track = require_track(manager, title).await?;
    manager.add_track_to_liked_songs(&track).await?;
    println!("Liked {:?}", track.title);
    Ok(())
}

pub async fn cmd_unlike(manager: &mut PlaylistManager, title: &str) -> anyhow::Result<()> {
    let track = require_track(manager, title).await?;
    manager.remove_track_from_liked_songs(&track).await?;
    println!("Unliked {:?}", track.title);
    Ok(())
}

pub async fn cmd_liked(manager: &mut PlaylistManager, title: &str) -> anyhow::Result<()> {
    let track = require_track(manager, title).await?;
    let liked = manager.track_is_liked(&track).await?;
    println!("{:?}: {}", track.title, if liked { "liked" } else { "not liked" });
    Ok(())
}

pub async fn cmd_cover_art(
    manager: &mut PlaylistManager,
    title: &str,
    url: &str,
) -> anyhow::Result<()> {
    let track = require_track(manager, title).await?;
    manager.add_track_cover_art(Some(&track), url).await?;
    println!("Set cover art of {:?}", track.title);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_new_track, temp_manager};

    #[tokio::test]
    async fn test_add_like_and_remove() {
        let (mut manager, _dir) = temp_manager().await;

        cmd_add_track(&mut manager, "Mix", mock_new_track("Song", 200))
            .await
            .unwrap();
        cmd_like(&mut manager, "Song").await.unwrap();

        let track = manager.get_track(Some("Song"), None).await.unwrap().unwrap();
        assert!(manager.track_is_liked(&track).await.unwrap());

        cmd_remove_track(&mut manager, "Mix", "Song").await.unwrap();
        let mix = manager.get_playlist("Mix").await.unwrap().unwrap();
        assert_eq!(manager.playlist_length(&mix).await.unwrap(), 0);

        cmd_unlike(&mut manager, "Song").await.unwrap();
        assert!(!manager.track_is_liked(&track).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_track_is_an_error() {
        let (mut manager, _dir) = temp_manager().await;
        assert!(cmd_like(&mut manager, "Ghost").await.is_err());
        assert!(cmd_cover_art(&mut manager, "Ghost", "http://img").await.is_err());
    }
}
