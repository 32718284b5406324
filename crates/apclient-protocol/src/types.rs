//! Core wire types for the Archipelago protocol.
//!
//! Everything in this module travels inside command objects on the wire,
//! so the serde attributes here define the exact JSON the server sees and
//! sends. The shapes follow the upstream network protocol; the unit tests
//! at the bottom pin the JSON representation of each type.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::BitOr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// A server or generator version triple, ordered lexicographically.
///
/// Serializes with the extra `"class": "Version"` entry the Archipelago
/// server requires; the field is ignored on the way back in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct NetworkVersion {
    pub major: i32,
    pub minor: i32,
    pub build: i32,
}

impl NetworkVersion {
    pub const fn new(major: i32, minor: i32, build: i32) -> Self {
        Self { major, minor, build }
    }
}

impl fmt::Display for NetworkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

impl Serialize for NetworkVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("major", &self.major)?;
        map.serialize_entry("minor", &self.minor)?;
        map.serialize_entry("build", &self.build)?;
        map.serialize_entry("class", "Version")?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for NetworkVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            major: i32,
            #[serde(default)]
            minor: i32,
            #[serde(default)]
            build: i32,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::new(raw.major, raw.minor, raw.build))
    }
}

// ---------------------------------------------------------------------------
// Item flags
// ---------------------------------------------------------------------------

/// Bitfield describing an item's classification.
///
/// Wire representation is a plain integer: advancement = 1,
/// never-exclude = 2, trap = 4.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemFlags(pub u32);

impl ItemFlags {
    pub const NONE: Self = Self(0);
    pub const ADVANCEMENT: Self = Self(1);
    pub const NEVER_EXCLUDE: Self = Self(2);
    pub const TRAP: Self = Self(4);

    pub fn is_advancement(self) -> bool {
        self.0 & Self::ADVANCEMENT.0 != 0
    }

    pub fn is_never_exclude(self) -> bool {
        self.0 & Self::NEVER_EXCLUDE.0 != 0
    }

    pub fn is_trap(self) -> bool {
        self.0 & Self::TRAP.0 != 0
    }
}

impl BitOr for ItemFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Items, players, slots
// ---------------------------------------------------------------------------

/// An item travelling between worlds.
///
/// `index` is this client's position in the received-item stream. It is
/// not part of the wire format: the server sends a starting index per
/// `ReceivedItems` packet and the client numbers the items consecutively
/// from there. Scouted items keep the default of `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkItem {
    pub item: i64,
    pub location: i64,
    pub player: i32,
    #[serde(default)]
    pub flags: ItemFlags,
    #[serde(skip, default = "no_index")]
    pub index: i32,
}

fn no_index() -> i32 {
    -1
}

/// A participant in the multiworld. Superseded wholesale whenever the
/// server resends the player list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPlayer {
    pub team: i32,
    pub slot: i32,
    pub alias: String,
    pub name: String,
}

/// The kind of seat a slot represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum SlotType {
    Spectator = 0,
    Player = 1,
    Group = 2,
}

/// Static slot metadata delivered on `Connected` via `slot_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSlot {
    pub name: String,
    pub game: String,
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    /// Member slot numbers, populated only for `SlotType::Group`.
    #[serde(default)]
    pub group_members: Vec<i32>,
}

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// The client's self-reported game status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ClientStatus {
    Unknown = 0,
    Ready = 10,
    Playing = 20,
    Goal = 30,
}

/// Priority annotation on a hint. `Found` is terminal: the server never
/// moves a found hint back to any other status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum HintStatus {
    Unspecified = 0,
    NoPriority = 10,
    Avoid = 20,
    Priority = 30,
    Found = 40,
}

impl HintStatus {
    /// Maps a raw wire integer to a known status. Unknown values stay
    /// `None` so display code can fall back instead of rejecting the
    /// whole message.
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Unspecified),
            10 => Some(Self::NoPriority),
            20 => Some(Self::Avoid),
            30 => Some(Self::Priority),
            40 => Some(Self::Found),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PrintJSON
// ---------------------------------------------------------------------------

/// One typed span of a `PrintJSON` message.
///
/// `kind` is open-ended on the wire ("text", "player_id", "item_id",
/// "location_id", "hint_status", "color", ...); spans with an unknown
/// kind are rendered verbatim. `hint_status` is kept as the raw integer
/// so an unrecognised status degrades gracefully at render time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub player: i32,
    #[serde(default)]
    pub flags: ItemFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_status: Option<i32>,
}

/// Parsed `PrintJSON` arguments with every optional field owned.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PrintJsonArgs {
    #[serde(default)]
    pub data: Vec<TextNode>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub receiving: Option<i32>,
    #[serde(default)]
    pub item: Option<NetworkItem>,
    #[serde(default)]
    pub found: Option<bool>,
    #[serde(default)]
    pub team: Option<i32>,
    #[serde(default)]
    pub slot: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub countdown: Option<i32>,
}

// ---------------------------------------------------------------------------
// Data package
// ---------------------------------------------------------------------------

/// One game's name↔id catalog plus its cache-validation metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub item_name_to_id: BTreeMap<String, i64>,
    #[serde(default)]
    pub location_name_to_id: BTreeMap<String, i64>,
    /// Legacy integer version; 0 when the server only uses checksums.
    #[serde(default)]
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// The merged per-game catalogs, as sent in a `DataPackage` command and
/// as held by the client across cache refreshes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPackage {
    #[serde(default)]
    pub games: BTreeMap<String, GameData>,
    /// Summed legacy version; -1 when absent.
    #[serde(default = "legacy_version_absent")]
    pub version: i64,
}

fn legacy_version_absent() -> i64 {
    -1
}

/// A single data-storage mutation inside a `Set` command, applied by the
/// server in order of appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStorageOperation {
    pub operation: String,
    pub value: serde_json::Value,
}

// =========================================================================
// Tests
// =========================================================================
