//! Persistent cache for per-game data packages.
//!
//! The default store keeps one JSON file per (game, checksum) pair under
//! an OS-appropriate cache directory. Loading a file refreshes its
//! modification time so external tooling can evict by LRU.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use apclient_protocol::GameData;

use crate::StoreError;

/// Characters stripped from games and checksums before they become path
/// components.
const UNSAFE_PATH_CHARS: &str = "<>:\"/\\|?*";

/// Abstract cache keyed by (game, checksum).
///
/// The client consults the store on every `RoomInfo` to decide which
/// games need a fresh fetch, and writes every `DataPackage` payload back
/// through it. Implement this to put the cache somewhere other than the
/// filesystem (a database, an embedder-provided blob store, ...).
pub trait DataPackageStore {
    /// Returns the cached payload for `game`, or `None` on a miss.
    ///
    /// `checksum` of `None` addresses the un-checksummed entry used with
    /// servers that only publish integer versions.
    fn load(&mut self, game: &str, checksum: Option<&str>) -> Option<GameData>;

    /// Persists a payload. The entry is keyed by the payload's own
    /// embedded checksum, if any.
    fn save(&mut self, game: &str, data: &GameData) -> Result<(), StoreError>;
}

/// The default [`DataPackageStore`]: one file per entry below
/// `<cache root>/Archipelago/Cache/datapackage`.
///
/// Layout: `<root>/<game>/<checksum>.json` for checksummed entries and
/// `<root>/<game>.json` for version-validated ones. Concurrent writers
/// for the same entry are not coordinated; the last write wins.
pub struct FileDataPackageStore {
    root: PathBuf,
}

impl FileDataPackageStore {
    /// Creates a store rooted at the platform cache directory
    /// (`%LOCALAPPDATA%` on Windows, `~/Library/Caches` on macOS,
    /// `$XDG_CACHE_HOME` or `~/.cache` elsewhere).
    pub fn new() -> Self {
        Self {
            root: default_cache_dir().join("datapackage"),
        }
    }

    /// Creates a store rooted at an explicit directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_path(&self, game: &str, checksum: Option<&str>) -> Option<PathBuf> {
        let safe_game = sanitize(game);
        if safe_game.is_empty() {
            return None;
        }
        match checksum {
            None | Some("") => Some(self.root.join(format!("{safe_game}.json"))),
            Some(checksum) => {
                let safe_checksum = sanitize(checksum);
                // A checksum that sanitization alters could collide with
                // a different checksum's file.
                if safe_checksum != checksum {
                    return None;
                }
                Some(self.root.join(safe_game).join(format!("{safe_checksum}.json")))
            }
        }
    }

    fn load_inner(&self, path: &Path) -> Result<GameData, StoreError> {
        let bytes = fs::read(path)?;
        let data = serde_json::from_slice(&bytes)?;
        touch(path);
        Ok(data)
    }
}

impl Default for FileDataPackageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPackageStore for FileDataPackageStore {
    fn load(&mut self, game: &str, checksum: Option<&str>) -> Option<GameData> {
        let path = self.entry_path(game, checksum)?;
        if !path.is_file() {
            return None;
        }
        match self.load_inner(&path) {
            Ok(data) => Some(data),
            Err(error) => {
                tracing::warn!(game, path = %path.display(), %error, "failed to load cached data package");
                None
            }
        }
    }

    fn save(&mut self, game: &str, data: &GameData) -> Result<(), StoreError> {
        let path = self
            .entry_path(game, data.checksum.as_deref())
            .ok_or_else(|| StoreError::InvalidPath(game.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_vec(data)?)?;
        tracing::debug!(game, path = %path.display(), "cached data package");
        Ok(())
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .filter(|c| !UNSAFE_PATH_CHARS.contains(*c))
        .collect()
}

/// Bumps a file's mtime so LRU eviction by external tooling keeps warm
/// entries alive. Failure is ignored; the load already succeeded.
fn touch(path: &Path) {
    if let Ok(file) = fs::OpenOptions::new().append(true).open(path) {
        let _ = file.set_modified(SystemTime::now());
    }
}

fn default_cache_dir() -> PathBuf {
    platform_cache_root().unwrap_or_else(|| PathBuf::from("cache"))
}

#[cfg(target_os = "windows")]
fn platform_cache_root() -> Option<PathBuf> {
    std::env::var_os("LOCALAPPDATA").map(|base| PathBuf::from(base).join("Archipelago").join("Cache"))
}

#[cfg(target_os = "macos")]
fn platform_cache_root() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join("Library").join("Caches").join("Archipelago"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_cache_root() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CACHE_HOME") {
        return Some(PathBuf::from(xdg).join("Archipelago"));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache").join("Archipelago"))
}

// =========================================================================
// Tests
// =========================================================================
