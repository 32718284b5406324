//! # apclient
//!
//! A reconnecting, poll-driven client for the Archipelago multiworld
//! protocol.
//!
//! The client owns the whole session lifecycle: URI normalization with
//! ws↔wss fallback, exponential reconnect backoff, the two-phase server
//! handshake (`RoomInfo`, then the slot join), data package caching with
//! checksum/version validation, buffering of gameplay intents issued
//! before the join, and rendering of server text messages.
//!
//! Everything is driven by [`ApClient::poll`]: call it repeatedly (once
//! per frame is typical) and handle the returned [`ClientEvent`]s. No
//! threads touch application state and no callbacks are stored.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use apclient::prelude::*;
//!
//! let uuid = apclient::uuid::persistent_uuid(None);
//! let mut client = ApClient::new(&uuid, "MyGame", "archipelago.gg:38281");
//! loop {
//!     for event in client.poll() {
//!         match event {
//!             ClientEvent::RoomInfo => {
//!                 let _ = client.connect_slot("Player1", "", 7, &[]);
//!             }
//!             ClientEvent::ItemsReceived(items) => {
//!                 for item in items { /* grant item.item */ }
//!             }
//!             _ => {}
//!         }
//!     }
//!     // ... run a frame ...
//! }
//! ```

mod client;
mod connection;
mod error;
mod events;
mod render;
pub mod uuid;

pub use client::{
    ApClient, ApClientBuilder, ConnectionState, SendOutcome, DEFAULT_ADDRESS, PROTOCOL_VERSION,
};
pub use error::ClientError;
pub use events::ClientEvent;
pub use render::{render, RenderFormat, RenderSource};

/// Re-exports everything an integrating game needs.
pub mod prelude {
    pub use crate::{
        ApClient, ApClientBuilder, ClientError, ClientEvent, ConnectionState, RenderFormat,
        SendOutcome,
    };

    pub use apclient_datapackage::{DataPackageStore, FileDataPackageStore};
    pub use apclient_protocol::{
        ClientStatus, DataStorageOperation, HintStatus, ItemFlags, NetworkItem, NetworkPlayer,
        NetworkSlot, NetworkVersion, PrintJsonArgs, SlotType, TextNode,
    };
    pub use apclient_transport::{Connector, Transport, TransportEvent};
}
