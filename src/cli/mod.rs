//! Command-line interface for playlist-keeper.
//!
//! Every command opens the store, builds a [`PlaylistManager`](crate::library::PlaylistManager)
//! and runs one operation. Without a subcommand the library listing is printed.

mod commands;

pub use commands::{Cli, Commands, run_command};
