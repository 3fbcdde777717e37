//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\playlist-keeper\config.toml
//! - macOS: ~/Library/Application Support/playlist-keeper/config.toml
//! - Linux: ~/.config/playlist-keeper/config.toml
//!
//! Every section is optional; missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::db;
use crate::model::DEFAULT_PLAYLIST_TITLE;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backing store settings
    pub store: StoreConfig,

    /// Playlist naming
    pub playlists: PlaylistConfig,

    /// Local file import settings
    pub library: LibraryConfig,
}

/// Backing store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. Relative paths resolve against the working directory.
    pub path: PathBuf,

    /// Upper bound on pooled connections
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(db::DEFAULT_DB_PATH),
            max_connections: db::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl StoreConfig {
    /// The database path, made absolute against the working directory.
    pub fn resolved_path(&self) -> PathBuf {
        if self.path.is_absolute() {
            return self.path.clone();
        }
        std::env::current_dir()
            .map(|dir| dir.join(&self.path))
            .unwrap_or_else(|_| self.path.clone())
    }
}

/// Playlist naming. "Liked Songs" is reserved and not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Title for playlists created without one
    pub default_title: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_PLAYLIST_TITLE.to_string(),
        }
    }
}

/// Local file import settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directories `import` scans when no path is given
    pub import_paths: Vec<PathBuf>,
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playlist-keeper"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match parse(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Parse a TOML config document.
pub fn parse(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(contents)
}

/// Save configuration to the standard config file.
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to `path`, replacing it atomically.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write to a temp file, then rename over the real one
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[store]"));
        assert!(toml.contains("[playlists]"));
        assert!(toml.contains("[library]"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.store.path = PathBuf::from("/var/lib/music/appdata.db");
        config.store.max_connections = 2;
        config.library.import_paths.push(PathBuf::from("/music"));

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed = parse(&toml).unwrap();

        assert_eq!(parsed.store.path, PathBuf::from("/var/lib/music/appdata.db"));
        assert_eq!(parsed.store.max_connections, 2);
        assert_eq!(parsed.library.import_paths, vec![PathBuf::from("/music")]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[playlists]
default_title = "Untitled"
"#;
        let config = parse(toml).unwrap();

        assert_eq!(config.playlists.default_title, "Untitled");
        assert_eq!(config.store.path, PathBuf::from("data/appdata.db"));
        assert_eq!(config.store.max_connections, 5);
        assert!(config.library.import_paths.is_empty());
    }

    #[test]
    fn test_resolved_path_is_absolute() {
        let config = StoreConfig::default();
        let resolved = config.resolved_path();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("data/appdata.db"));

        let absolute = StoreConfig {
            path: PathBuf::from("/tmp/x.db"),
            ..StoreConfig::default()
        };
        assert_eq!(absolute.resolved_path(), PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_save_to_then_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.playlists.default_title = "Scratch".to_string();
        save_to(&config, &path).unwrap();

        let parsed = parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.playlists.default_title, "Scratch");
        assert!(!path.with_extension("toml.tmp").exists());
    }
}
