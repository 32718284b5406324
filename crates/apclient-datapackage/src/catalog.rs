//! In-memory id → name indices built from the merged data package.
//!
//! The package maps names to ids (that is what the wire carries); the
//! catalog inverts it per game, plus a global index used when the
//! caller does not know which game an id belongs to. Rebuilding is
//! idempotent: the catalog always reflects exactly the package it was
//! last rebuilt from.

use std::collections::BTreeMap;

use apclient_protocol::DataPackage;

#[derive(Debug, Default)]
struct GameIndex {
    items: BTreeMap<i64, String>,
    locations: BTreeMap<i64, String>,
}

/// Resolves numeric item/location ids to display names.
#[derive(Debug, Default)]
pub struct Catalog {
    games: BTreeMap<String, GameIndex>,
    all_items: BTreeMap<i64, String>,
    all_locations: BTreeMap<i64, String>,
}

impl Catalog {
    /// Replaces the indices with the contents of `package`.
    pub fn rebuild(&mut self, package: &DataPackage) {
        self.clear();
        for (game, data) in &package.games {
            let index = self.games.entry(game.clone()).or_default();
            for (name, id) in &data.item_name_to_id {
                index.items.insert(*id, name.clone());
                self.all_items.insert(*id, name.clone());
            }
            for (name, id) in &data.location_name_to_id {
                index.locations.insert(*id, name.clone());
                self.all_locations.insert(*id, name.clone());
            }
        }
    }

    /// Drops every index, as `reset()` requires.
    pub fn clear(&mut self) {
        self.games.clear();
        self.all_items.clear();
        self.all_locations.clear();
    }

    /// Looks up an item name, preferring the given game's index and
    /// falling back to the global one.
    pub fn item_name(&self, id: i64, game: Option<&str>) -> Option<&str> {
        if let Some(index) = game.and_then(|g| self.games.get(g)) {
            if let Some(name) = index.items.get(&id) {
                return Some(name);
            }
        }
        self.all_items.get(&id).map(String::as_str)
    }

    /// Looks up a location name, preferring the given game's index and
    /// falling back to the global one.
    pub fn location_name(&self, id: i64, game: Option<&str>) -> Option<&str> {
        if let Some(index) = game.and_then(|g| self.games.get(g)) {
            if let Some(name) = index.locations.get(&id) {
                return Some(name);
            }
        }
        self.all_locations.get(&id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use apclient_protocol::GameData;

    use super::*;

    fn package() -> DataPackage {
        let mut package = DataPackage::default();
        let mut clue = GameData::default();
        clue.item_name_to_id.insert("Candlestick".into(), 42);
        clue.location_name_to_id.insert("Library".into(), 100);
        package.games.insert("Clue".into(), clue);

        let mut chess = GameData::default();
        chess.item_name_to_id.insert("Pawn".into(), 42);
        chess.location_name_to_id.insert("E4".into(), 200);
        package.games.insert("Chess".into(), chess);
        package
    }

    #[test]
    fn test_item_name_resolves_per_game() {
        let mut catalog = Catalog::default();
        catalog.rebuild(&package());

        // Id 42 exists in both games; the per-game index disambiguates.
        assert_eq!(catalog.item_name(42, Some("Clue")), Some("Candlestick"));
        assert_eq!(catalog.item_name(42, Some("Chess")), Some("Pawn"));
    }

    #[test]
    fn test_item_name_falls_back_to_global_index() {
        let mut catalog = Catalog::default();
        catalog.rebuild(&package());

        assert!(catalog.item_name(42, None).is_some());
        assert_eq!(catalog.item_name(42, Some("Unknown Game")), Some("Pawn"));
    }

    #[test]
    fn test_location_name_unknown_id_is_none() {
        let mut catalog = Catalog::default();
        catalog.rebuild(&package());

        assert_eq!(catalog.location_name(999, Some("Clue")), None);
        assert_eq!(catalog.location_name(999, None), None);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut catalog = Catalog::default();
        let package = package();
        catalog.rebuild(&package);
        catalog.rebuild(&package);

        assert_eq!(catalog.location_name(100, Some("Clue")), Some("Library"));
        assert_eq!(catalog.games.len(), 2);
    }

    #[test]
    fn test_rebuild_drops_stale_entries() {
        let mut catalog = Catalog::default();
        catalog.rebuild(&package());

        let mut smaller = DataPackage::default();
        smaller.games.insert("Clue".into(), GameData::default());
        catalog.rebuild(&smaller);

        assert_eq!(catalog.item_name(42, Some("Clue")), None);
        assert_eq!(catalog.location_name(200, Some("Chess")), None);
    }

    #[test]
    fn test_clear_empties_all_indices() {
        let mut catalog = Catalog::default();
        catalog.rebuild(&package());
        catalog.clear();

        assert_eq!(catalog.item_name(42, Some("Clue")), None);
        assert_eq!(catalog.item_name(42, None), None);
    }
}
