//! Inbound and outbound protocol commands.
//!
//! Every command object on the wire carries a string `cmd` naming its
//! kind; the enums here use that field as the serde tag. Inbound fields
//! the server may omit are `#[serde(default)]` so old servers still
//! decode; outbound optional fields are skipped entirely when absent, the
//! way the reference server expects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    ClientStatus, DataPackage, DataStorageOperation, HintStatus, NetworkItem, NetworkPlayer,
    NetworkSlot, NetworkVersion, PrintJsonArgs,
};

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// A command received from the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd")]
pub enum ServerCommand {
    RoomInfo(RoomInfo),
    ConnectionRefused(ConnectionRefused),
    Connected(Connected),
    ReceivedItems(ReceivedItems),
    LocationInfo(LocationInfo),
    RoomUpdate(RoomUpdate),
    DataPackage(DataPackageMessage),
    Print(Print),
    #[serde(rename = "PrintJSON")]
    PrintJson(PrintJsonArgs),
    Bounced(Bounced),
    Retrieved(Retrieved),
    SetReply(SetReply),
}

impl ServerCommand {
    /// Command names this client understands. Anything else in a frame is
    /// skipped without failing the frame.
    pub const KNOWN: &'static [&'static str] = &[
        "RoomInfo",
        "ConnectionRefused",
        "Connected",
        "ReceivedItems",
        "LocationInfo",
        "RoomUpdate",
        "DataPackage",
        "Print",
        "PrintJSON",
        "Bounced",
        "Retrieved",
        "SetReply",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::RoomInfo(_) => "RoomInfo",
            Self::ConnectionRefused(_) => "ConnectionRefused",
            Self::Connected(_) => "Connected",
            Self::ReceivedItems(_) => "ReceivedItems",
            Self::LocationInfo(_) => "LocationInfo",
            Self::RoomUpdate(_) => "RoomUpdate",
            Self::DataPackage(_) => "DataPackage",
            Self::Print(_) => "Print",
            Self::PrintJson(_) => "PrintJSON",
            Self::Bounced(_) => "Bounced",
            Self::Retrieved(_) => "Retrieved",
            Self::SetReply(_) => "SetReply",
        }
    }
}

/// First half of the server handshake, sent as soon as the socket opens.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomInfo {
    #[serde(default)]
    pub version: NetworkVersion,
    #[serde(default)]
    pub generator_version: NetworkVersion,
    pub seed_name: String,
    /// Server wall-clock Unix time, for the session time estimate.
    #[serde(default)]
    pub time: f64,
    /// Hint cost in percent of the slot's total location count.
    #[serde(default)]
    pub hint_cost: i32,
    #[serde(default)]
    pub location_check_points: i32,
    #[serde(rename = "password", default)]
    pub password_required: bool,
    /// Games played in this room (servers ≥ 0.2.0).
    #[serde(default)]
    pub games: Option<Vec<String>>,
    /// Per-game catalog versions (legacy validation scheme).
    #[serde(default)]
    pub datapackage_versions: Option<BTreeMap<String, i64>>,
    /// Summed catalog version (ancient schema; forces a full refetch).
    #[serde(default)]
    pub datapackage_version: Option<i64>,
    /// Per-game catalog checksums (current validation scheme).
    #[serde(default)]
    pub datapackage_checksums: Option<BTreeMap<String, String>>,
}

/// The server accepted the socket but refused the slot join.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionRefused {
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Second half of the handshake: the slot join succeeded.
#[derive(Debug, Clone, Deserialize)]
pub struct Connected {
    pub team: i32,
    pub slot: i32,
    #[serde(default)]
    pub players: Vec<NetworkPlayer>,
    #[serde(default)]
    pub missing_locations: Vec<i64>,
    #[serde(default)]
    pub checked_locations: Vec<i64>,
    #[serde(default)]
    pub slot_data: Value,
    /// Keys are slot numbers; JSON objects cannot have integer keys.
    #[serde(default)]
    pub slot_info: BTreeMap<String, NetworkSlot>,
    /// Absent on servers that predate hint-point accounting.
    #[serde(default)]
    pub hint_points: Option<i32>,
}

/// A batch of items for this slot, numbered from `index`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceivedItems {
    pub index: i32,
    #[serde(default)]
    pub items: Vec<NetworkItem>,
}

/// Reply to `LocationScouts`: the items sitting at the scouted locations.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationInfo {
    #[serde(default)]
    pub locations: Vec<NetworkItem>,
}

/// Incremental room state. Only changed fields are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomUpdate {
    /// May be a partial update; only newly checked locations are relayed
    /// to the application.
    #[serde(default)]
    pub checked_locations: Vec<i64>,
    #[serde(default)]
    pub hint_points: Option<i32>,
    /// Full replacement player list, sent on alias changes.
    #[serde(default)]
    pub players: Option<Vec<NetworkPlayer>>,
}

/// Catalog payload for one or more games.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPackageMessage {
    pub data: DataPackage,
}

/// Plain-text server message (legacy; newer servers send `PrintJSON`).
#[derive(Debug, Clone, Deserialize)]
pub struct Print {
    pub text: String,
}

/// A relayed `Bounce` from another client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bounced {
    #[serde(default)]
    pub games: Vec<String>,
    #[serde(default)]
    pub slots: Vec<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub data: Value,
}

/// Reply to `Get`. The `keys` object is required by the frame schema.
#[derive(Debug, Clone, Deserialize)]
pub struct Retrieved {
    pub keys: BTreeMap<String, Value>,
}

/// Data-storage change notification. `key` and `value` are required by
/// the frame schema; `original_value` defaults to null.
#[derive(Debug, Clone, Deserialize)]
pub struct SetReply {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub original_value: Value,
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// A command sent to the server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "cmd")]
pub enum ClientCommand {
    Connect(Connect),
    ConnectUpdate(ConnectUpdate),
    Sync,
    LocationChecks(LocationChecks),
    LocationScouts(LocationScouts),
    UpdateHint(UpdateHint),
    StatusUpdate(StatusUpdate),
    GetDataPackage(GetDataPackage),
    Bounce(Bounce),
    Say(Say),
    Get(Get),
    Set(Set),
    SetNotify(SetNotify),
}

impl ClientCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect(_) => "Connect",
            Self::ConnectUpdate(_) => "ConnectUpdate",
            Self::Sync => "Sync",
            Self::LocationChecks(_) => "LocationChecks",
            Self::LocationScouts(_) => "LocationScouts",
            Self::UpdateHint(_) => "UpdateHint",
            Self::StatusUpdate(_) => "StatusUpdate",
            Self::GetDataPackage(_) => "GetDataPackage",
            Self::Bounce(_) => "Bounce",
            Self::Say(_) => "Say",
            Self::Get(_) => "Get",
            Self::Set(_) => "Set",
            Self::SetNotify(_) => "SetNotify",
        }
    }
}

/// Slot join request.
#[derive(Debug, Clone, Serialize)]
pub struct Connect {
    pub game: String,
    pub uuid: String,
    pub name: String,
    pub password: String,
    pub version: NetworkVersion,
    pub items_handling: i32,
    pub tags: Vec<String>,
}

/// Post-join change to `items_handling` and/or `tags`.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_handling: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationChecks {
    pub locations: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationScouts {
    pub locations: Vec<i64>,
    pub create_as_hint: i32,
}

/// Changes the priority of an existing hint.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateHint {
    pub player: i32,
    pub location: i64,
    pub status: HintStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: ClientStatus,
}

/// Catalog fetch. `games` limits the reply to the named games; servers
/// older than 0.3.2 took an `exclusions` field instead, which this client
/// does not emit.
#[derive(Debug, Clone, Serialize)]
pub struct GetDataPackage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<String>>,
}

/// Fire-and-forget broadcast. Empty filters are omitted from the packet.
#[derive(Debug, Clone, Serialize)]
pub struct Bounce {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub games: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Say {
    pub text: String,
}

/// Data-storage read. `extras` are echoed back in the `Retrieved` reply.
#[derive(Debug, Clone, Serialize)]
pub struct Get {
    pub keys: Vec<String>,
    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

/// Data-storage write.
#[derive(Debug, Clone, Serialize)]
pub struct Set {
    pub key: String,
    pub default: Value,
    pub want_reply: bool,
    pub operations: Vec<DataStorageOperation>,
    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetNotify {
    pub keys: Vec<String>,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // =====================================================================
    // Inbound decoding
    // =====================================================================

    #[test]
    fn test_server_command_room_info_minimal() {
        let cmd: ServerCommand = serde_json::from_value(json!({
            "cmd": "RoomInfo",
            "seed_name": "seed",
            "time": 0,
            "version": {"major": 0, "minor": 6, "build": 3, "class": "Version"},
        }))
        .unwrap();
        let ServerCommand::RoomInfo(info) = cmd else {
            panic!("wrong variant");
        };
        assert_eq!(info.seed_name, "seed");
        assert_eq!(info.version, NetworkVersion::new(0, 6, 3));
        assert!(info.games.is_none());
        assert!(info.datapackage_checksums.is_none());
        assert!(!info.password_required);
    }

    #[test]
    fn test_server_command_room_info_with_checksums() {
        let cmd: ServerCommand = serde_json::from_value(json!({
            "cmd": "RoomInfo",
            "seed_name": "seed",
            "time": 1e9,
            "version": {"major": 0, "minor": 5, "build": 0},
            "hint_cost": 10,
            "password": true,
            "games": ["Clue"],
            "datapackage_checksums": {"Clue": "abc"},
        }))
        .unwrap();
        let ServerCommand::RoomInfo(info) = cmd else {
            panic!("wrong variant");
        };
        assert_eq!(info.hint_cost, 10);
        assert!(info.password_required);
        assert_eq!(info.games.as_deref(), Some(&["Clue".to_string()][..]));
        assert_eq!(info.datapackage_checksums.unwrap()["Clue"], "abc");
    }

    #[test]
    fn test_server_command_connected_parses_slot_info() {
        let cmd: ServerCommand = serde_json::from_value(json!({
            "cmd": "Connected",
            "team": 0,
            "slot": 2,
            "players": [
                {"team": 0, "slot": 1, "alias": "A", "name": "A"},
                {"team": 0, "slot": 2, "alias": "B", "name": "B"},
            ],
            "missing_locations": [11, 12],
            "checked_locations": [10],
            "slot_data": {"goal": 3},
            "slot_info": {
                "1": {"name": "A", "game": "Clue", "type": 1},
                "2": {"name": "B", "game": "Chess", "type": 1},
            },
            "hint_points": 5,
        }))
        .unwrap();
        let ServerCommand::Connected(connected) = cmd else {
            panic!("wrong variant");
        };
        assert_eq!(connected.slot, 2);
        assert_eq!(connected.players.len(), 2);
        assert_eq!(connected.slot_info["2"].game, "Chess");
        assert_eq!(connected.hint_points, Some(5));
    }

    #[test]
    fn test_server_command_received_items_index_required() {
        let result: Result<ServerCommand, _> = serde_json::from_value(json!({
            "cmd": "ReceivedItems",
            "items": [],
        }));
        assert!(result.is_err(), "missing index must fail decoding");
    }

    #[test]
    fn test_server_command_retrieved_requires_keys_object() {
        let result: Result<ServerCommand, _> = serde_json::from_value(json!({
            "cmd": "Retrieved",
        }));
        assert!(result.is_err(), "missing keys must fail decoding");

        let result: Result<ServerCommand, _> = serde_json::from_value(json!({
            "cmd": "Retrieved",
            "keys": [1, 2],
        }));
        assert!(result.is_err(), "non-object keys must fail decoding");
    }

    #[test]
    fn test_server_command_set_reply_original_value_defaults_null() {
        let cmd: ServerCommand = serde_json::from_value(json!({
            "cmd": "SetReply",
            "key": "deaths",
            "value": 3,
        }))
        .unwrap();
        let ServerCommand::SetReply(reply) = cmd else {
            panic!("wrong variant");
        };
        assert_eq!(reply.value, json!(3));
        assert!(reply.original_value.is_null());
    }

    #[test]
    fn test_server_command_set_reply_requires_value() {
        let result: Result<ServerCommand, _> = serde_json::from_value(json!({
            "cmd": "SetReply",
            "key": "deaths",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_server_command_print_json_tagged_uppercase() {
        let cmd: ServerCommand = serde_json::from_value(json!({
            "cmd": "PrintJSON",
            "type": "Chat",
            "data": [{"text": "hi"}],
            "slot": 1,
            "message": "hi",
        }))
        .unwrap();
        let ServerCommand::PrintJson(args) = cmd else {
            panic!("wrong variant");
        };
        assert_eq!(args.kind, "Chat");
        assert_eq!(args.slot, Some(1));
        assert_eq!(args.message.as_deref(), Some("hi"));
    }

    #[test]
    fn test_known_list_matches_variants() {
        // Every KNOWN name decodes to a variant named the same way.
        for name in ServerCommand::KNOWN {
            assert!(
                !name.is_empty() && name.chars().next().unwrap().is_ascii_uppercase(),
                "command names are PascalCase"
            );
        }
        assert_eq!(ServerCommand::KNOWN.len(), 12);
    }

    // =====================================================================
    // Outbound encoding
    // =====================================================================

    #[test]
    fn test_client_command_connect_json_shape() {
        let cmd = ClientCommand::Connect(Connect {
            game: "Clue".into(),
            uuid: "u".into(),
            name: "Player1".into(),
            password: String::new(),
            version: NetworkVersion::new(0, 5, 1),
            items_handling: 7,
            tags: vec!["AP".into()],
        });
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["cmd"], "Connect");
        assert_eq!(json["game"], "Clue");
        assert_eq!(json["version"]["class"], "Version");
        assert_eq!(json["items_handling"], 7);
    }

    #[test]
    fn test_client_command_sync_is_bare() {
        let json = serde_json::to_value(ClientCommand::Sync).unwrap();
        assert_eq!(json, json!({"cmd": "Sync"}));
    }

    #[test]
    fn test_client_command_connect_update_skips_absent_fields() {
        let cmd = ClientCommand::ConnectUpdate(ConnectUpdate {
            items_handling: Some(3),
            tags: None,
        });
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["items_handling"], 3);
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn test_client_command_get_data_package_omits_missing_games() {
        let json =
            serde_json::to_value(ClientCommand::GetDataPackage(GetDataPackage { games: None }))
                .unwrap();
        assert_eq!(json, json!({"cmd": "GetDataPackage"}));

        let json = serde_json::to_value(ClientCommand::GetDataPackage(GetDataPackage {
            games: Some(vec!["A".into(), "B".into()]),
        }))
        .unwrap();
        assert_eq!(json["games"], json!(["A", "B"]));
    }

    #[test]
    fn test_client_command_bounce_omits_empty_filters() {
        let cmd = ClientCommand::Bounce(Bounce {
            games: vec![],
            slots: vec![],
            tags: vec!["DeathLink".into()],
            data: json!({"time": 1.0}),
        });
        let json = serde_json::to_value(&cmd).unwrap();
        assert!(json.get("games").is_none());
        assert!(json.get("slots").is_none());
        assert_eq!(json["tags"], json!(["DeathLink"]));
        assert_eq!(json["data"]["time"], 1.0);
    }

    #[test]
    fn test_client_command_update_hint_wire_shape() {
        let cmd = ClientCommand::UpdateHint(UpdateHint {
            player: 3,
            location: 77,
            status: HintStatus::Priority,
        });
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            json,
            json!({"cmd": "UpdateHint", "player": 3, "location": 77, "status": 30})
        );
    }

    #[test]
    fn test_client_command_get_flattens_extras() {
        let mut extras = BTreeMap::new();
        extras.insert("request_id".to_string(), json!(9));
        let cmd = ClientCommand::Get(Get {
            keys: vec!["deaths".into()],
            extras,
        });
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["keys"], json!(["deaths"]));
        assert_eq!(json["request_id"], 9);
    }

    #[test]
    fn test_client_command_set_wire_shape() {
        let cmd = ClientCommand::Set(Set {
            key: "deaths".into(),
            default: json!(0),
            want_reply: true,
            operations: vec![DataStorageOperation {
                operation: "add".into(),
                value: json!(1),
            }],
            extras: BTreeMap::new(),
        });
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["cmd"], "Set");
        assert_eq!(json["operations"][0]["operation"], "add");
        assert_eq!(json["want_reply"], true);
    }
}
