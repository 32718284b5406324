//! Cache-coherence decisions for the room's catalog set.
//!
//! On every `RoomInfo` the client must decide, per played game, whether
//! its cached data package entry is still good or must be refetched.
//! Three server generations exist:
//!
//! 1. current servers publish a `games` list plus per-game checksums;
//! 2. legacy servers publish per-game integer versions;
//! 3. ancient servers publish only a summed scalar, which cannot
//!    validate anything — everything is refetched.
//!
//! The decision is a pure function from the room's announcement and the
//! store's contents to a [`SyncPlan`], so the whole procedure is
//! testable without a connection.

use std::collections::{BTreeMap, BTreeSet};

use apclient_protocol::{GameData, RoomInfo};

use crate::DataPackageStore;

/// The game whose catalog ships the server's own commands. It never
/// appears in a room's `games` list but is always needed.
const CORE_GAME: &str = "Archipelago";

/// What the room announced about its catalogs, extracted from `RoomInfo`.
#[derive(Debug, Default)]
pub struct RoomCatalog<'a> {
    pub games: Option<&'a [String]>,
    pub versions: Option<&'a BTreeMap<String, i64>>,
    pub checksums: Option<&'a BTreeMap<String, String>>,
    /// True when the server sent only the ancient summed version scalar.
    pub ancient_schema: bool,
}

impl<'a> RoomCatalog<'a> {
    pub fn from_room_info(info: &'a RoomInfo) -> Self {
        let ancient_schema = info.games.is_none() && info.datapackage_versions.is_none();
        Self {
            games: info.games.as_deref(),
            versions: info.datapackage_versions.as_ref(),
            checksums: info.datapackage_checksums.as_ref(),
            ancient_schema,
        }
    }
}

/// The outcome of the coherence check.
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// Cached payloads that are still valid, ready to merge into the
    /// in-memory package so names resolve before any fetch completes.
    pub accepted: Vec<(String, GameData)>,
    /// Games whose payload must be requested from the server.
    pub fetch: Vec<String>,
    /// The ancient-schema case: request the entire catalog unfiltered.
    pub fetch_all: bool,
}

impl SyncPlan {
    /// True when every needed game was already cached and no request is
    /// required.
    pub fn is_valid(&self) -> bool {
        self.fetch.is_empty() && !self.fetch_all
    }
}

/// Decides which games are cache-hits and which must be fetched.
///
/// Checksums take precedence over versions; a game present in the
/// server's catalog but not played is never fetched.
pub fn sync_plan(room: &RoomCatalog<'_>, store: &mut dyn DataPackageStore) -> SyncPlan {
    let mut plan = SyncPlan::default();

    if room.ancient_schema {
        plan.fetch_all = true;
        return plan;
    }

    let mut played: BTreeSet<&str> = BTreeSet::new();
    if let Some(games) = room.games {
        played.extend(games.iter().map(String::as_str));
        played.insert(CORE_GAME);
    } else if let Some(versions) = room.versions {
        played.extend(versions.keys().map(String::as_str));
    }

    for game in played {
        let remote_checksum = room
            .checksums
            .and_then(|checksums| checksums.get(game))
            .map(String::as_str)
            .unwrap_or("");
        let remote_version = room
            .versions
            .and_then(|versions| versions.get(game))
            .copied()
            .unwrap_or(0);

        let checksum_key = (!remote_checksum.is_empty()).then_some(remote_checksum);
        let accepted = match store.load(game, checksum_key) {
            Some(local) => {
                if !remote_checksum.is_empty() {
                    local.checksum.as_deref() == Some(remote_checksum)
                } else {
                    remote_version != 0 && local.version == remote_version
                }
            }
            None => false,
        };

        if accepted {
            // Reload is cheap; the first load above already parsed it.
            if let Some(local) = store.load(game, checksum_key) {
                plan.accepted.push((game.to_string(), local));
                continue;
            }
        }
        plan.fetch.push(game.to_string());
    }

    plan
}

// =========================================================================
// Tests
// =========================================================================
