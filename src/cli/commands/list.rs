//! Library listing.

use super::format_duration;
use crate::library::PlaylistManager;
use crate::model::PlaylistContents;

/// Print every playlist with its track count, total duration, and tracks.
pub async fn cmd_list(manager: &mut PlaylistManager, json: bool) -> anyhow::Result<()> {
    let mut listing = Vec::new();
    for playlist in manager.list_playlists().await? {
        listing.push(manager.playlist_contents(&playlist).await?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print!("{}", render(&listing));
    }
    Ok(())
}

fn render(listing: &[PlaylistContents]) -> String {
    if listing.is_empty() {
        return "No playlists yet.\n".to_string();
    }

    let mut out = String::new();
    for contents in listing {
        out.push_str(&format!("{}\n", contents.playlist.title));
        if !contents.playlist.description.is_empty() {
            out.push_str(&format!("{}\n", contents.playlist.description));
        }
        out.push_str(&format!("Number of Tracks: {}\n", contents.len()));
        out.push_str(&format!(
            "Total duration: {}\n",
            format_duration(contents.total_duration())
        ));
        for (i, track) in contents.tracks.iter().enumerate() {
            out.push_str(&format!("{}. Track: {} - {}\n", i + 1, track.title, track.artist));
            out.push_str(&format!(
                "{}. Url/Path: {}\n",
                i + 1,
                track.location().unwrap_or("-")
            ));
            if let Some(cover) = track.cover_art() {
                out.push_str(&format!("{}. Cover: {}\n", i + 1, cover));
            }
        }
        out.push('\n');
    }
    out
}
