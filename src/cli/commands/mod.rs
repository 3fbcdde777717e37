//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `list`: library listing (the default when no subcommand is given)
//! - `playlist`: create, rename, describe, delete
//! - `track`: add/remove tracks, liking, cover art
//! - `import`: local audio file import
//! - `config`: writing the config file

mod config;
mod import;
mod list;
mod playlist;
mod track;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::config::Config;
use crate::db::Store;
use crate::library::PlaylistManager;

pub use config::cmd_init_config;
pub use import::cmd_import;
pub use list::cmd_list;
pub use playlist::{cmd_create_playlist, cmd_delete_playlist, cmd_describe_playlist, cmd_rename_playlist};
pub use track::{cmd_add_track, cmd_cover_art, cmd_like, cmd_liked, cmd_remove_track, cmd_unlike};

/// Playlist Keeper CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database file (overrides the config file)
    #[arg(long, global = true, env = "PLAYLIST_KEEPER_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List playlists with their tracks
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Create a playlist (no-op if one with this title exists)
    CreatePlaylist {
        /// Playlist title (defaults to the configured default title)
        title: Option<String>,
        /// Description to set on the playlist
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename a playlist
    RenamePlaylist {
        /// Current title
        title: String,
        /// New title
        new_title: String,
    },
    /// Replace a playlist's description
    DescribePlaylist {
        /// Playlist title
        title: String,
        /// New description
        description: String,
    },
    /// Delete a playlist (its tracks are kept)
    DeletePlaylist {
        /// Playlist title
        title: String,
    },
    /// Add a streamed track to a playlist, creating the track if needed
    AddTrack {
        /// Playlist title (created if missing)
        #[arg(short, long)]
        playlist: String,
        /// Track title
        title: String,
        /// Stream URL
        url: String,
        #[arg(long, default_value = "Unknown Artist")]
        artist: String,
        #[arg(long, default_value = "Unknown Album")]
        album: String,
        /// Duration in seconds
        #[arg(long, default_value_t = 0)]
        duration: i64,
        /// Cover art URL
        #[arg(long)]
        cover_art: Option<String>,
    },
    /// Remove a track from a playlist
    RemoveTrack {
        /// Playlist title
        #[arg(short, long)]
        playlist: String,
        /// Track title
        title: String,
    },
    /// Add an existing track to Liked Songs
    Like {
        /// Track title
        title: String,
    },
    /// Remove a track from Liked Songs
    Unlike {
        /// Track title
        title: String,
    },
    /// Show whether a track is in Liked Songs
    Liked {
        /// Track title
        title: String,
    },
    /// Set a track's cover art URL
    CoverArt {
        /// Track title
        title: String,
        /// Cover art URL
        url: String,
    },
    /// Import local audio files
    Import {
        /// File or directory (defaults to the configured import paths)
        path: Option<PathBuf>,
        /// Album to record for every imported file
        #[arg(long)]
        album: Option<String>,
        /// Add imported tracks to this playlist (created if missing)
        #[arg(short, long)]
        playlist: Option<String>,
    },
    /// Write the current configuration to the config file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command, or the library listing when none is given.
pub fn run_command(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    // Needs no store
    if let Some(Commands::InitConfig { force }) = &cli.command {
        return cmd_init_config(config, *force);
    }

    let rt = Runtime::new()?;

    rt.block_on(async {
        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => config.store.resolved_path(),
        };
        debug!(db = %db_path.display(), "Opening store");

        let store = Store::open_with(&db_path, config.store.max_connections).await?;
        let mut manager = PlaylistManager::new(store.clone()).await?;

        let result = dispatch(&mut manager, cli.command.as_ref(), config).await;

        manager.close_session().await?;
        store.close().await;
        result
    })
}

async fn dispatch(
    manager: &mut PlaylistManager,
    command: Option<&Commands>,
    config: &Config,
) -> anyhow::Result<()> {
    match command {
        None => cmd_list(manager, false).await,
        Some(Commands::List { json }) => cmd_list(manager, *json).await,
        Some(Commands::CreatePlaylist { title, description }) => {
            let title = title.as_deref().unwrap_or(&config.playlists.default_title);
            cmd_create_playlist(manager, title, description.as_deref()).await
        }
        Some(Commands::RenamePlaylist { title, new_title }) => {
            cmd_rename_playlist(manager, title, new_title).await
        }
        Some(Commands::DescribePlaylist { title, description }) => {
            cmd_describe_playlist(manager, title, description).await
        }
        Some(Commands::DeletePlaylist { title }) => cmd_delete_playlist(manager, title).await,
        Some(Commands::AddTrack {
            playlist,
            title,
            url,
            artist,
            album,
            duration,
            cover_art,
        }) => {
            let new = crate::model::NewTrack::streamed(
                title.as_str(),
                artist.as_str(),
                album.as_str(),
                *duration,
                url.as_str(),
                cover_art.as_deref(),
            );
            cmd_add_track(manager, playlist, new).await
        }
        Some(Commands::RemoveTrack { playlist, title }) => {
            cmd_remove_track(manager, playlist, title).await
        }
        Some(Commands::Like { title }) => cmd_like(manager, title).await,
        Some(Commands::Unlike { title }) => cmd_unlike(manager, title).await,
        Some(Commands::Liked { title }) => cmd_liked(manager, title).await,
        Some(Commands::CoverArt { title, url }) => cmd_cover_art(manager, title, url).await,
        Some(Commands::Import {
            path,
            album,
            playlist,
        }) => {
            let roots = match path {
                Some(path) => vec![path.clone()],
                None => config.library.import_paths.clone(),
            };
            cmd_import(manager, &roots, album.as_deref(), playlist.as_deref()).await
        }
        Some(Commands::InitConfig { force }) => cmd_init_config(config, *force),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Format seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub(crate) fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Look up a track by title or fail with a user-facing message.
pub(crate) async fn require_track(
    manager: &mut PlaylistManager,
    title: &str,
) -> anyhow::Result<crate::model::Track> {
    manager
        .get_track(Some(title), None)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No track titled {:?}", title))
}

/// Look up a playlist by title or fail with a user-facing message.
pub(crate) async fn require_playlist(
    manager: &mut PlaylistManager,
    title: &str,
) -> anyhow::Result<crate::model::Playlist> {
    manager
        .get_playlist(title)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No playlist titled {:?}", title))
}
