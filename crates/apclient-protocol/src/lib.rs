//! Wire protocol for the Archipelago multiworld service.
//!
//! This crate defines the language clients and servers speak:
//!
//! - **Types** ([`NetworkItem`], [`NetworkVersion`], [`TextNode`], ...) —
//!   the structures that travel inside commands.
//! - **Commands** ([`ServerCommand`], [`ClientCommand`]) — the command
//!   objects themselves, tagged by their `cmd` field.
//! - **Codec** ([`encode_frame`], [`decode_frame`]) — the mapping between
//!   commands and the JSON-array text frames on the wire.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! The protocol layer knows nothing about sockets or client state; it
//! only converts between text frames and typed commands.

mod codec;
mod command;
mod error;
mod types;

pub use codec::{decode_frame, encode_frame};
pub use command::{
    Bounce, Bounced, ClientCommand, Connect, ConnectUpdate, Connected, ConnectionRefused,
    DataPackageMessage, Get, GetDataPackage, LocationChecks, LocationInfo, LocationScouts, Print,
    ReceivedItems, Retrieved, RoomInfo, RoomUpdate, Say, ServerCommand, Set, SetNotify, SetReply,
    StatusUpdate, UpdateHint,
};
pub use error::ProtocolError;
pub use types::{
    ClientStatus, DataPackage, DataStorageOperation, GameData, HintStatus, ItemFlags, NetworkItem,
    NetworkPlayer, NetworkSlot, NetworkVersion, PrintJsonArgs, SlotType, TextNode,
};
