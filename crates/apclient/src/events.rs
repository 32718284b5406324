//! Events returned from [`ApClient::poll`](crate::ApClient::poll).
//!
//! The client produces events synchronously while dispatching inbound
//! commands and hands them back from `poll` in receive order. The
//! application handles them after the call returns; there are no stored
//! callbacks, so the client never holds a reference back into
//! application state.

use std::collections::BTreeMap;

use apclient_protocol::{Bounced, NetworkItem, PrintJsonArgs};
use serde_json::Value;

/// Something the application should react to.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The socket (and WebSocket handshake) came up.
    SocketConnected,
    /// The socket went away after being connected.
    SocketDisconnected,
    /// The transport reported a failure; reconnection is automatic.
    SocketError(String),
    /// `RoomInfo` arrived; server metadata getters are now populated.
    RoomInfo,
    /// The slot join was accepted. Carries the game-specific slot data.
    SlotConnected(Value),
    /// The slot join was refused, with the server's reason tokens.
    SlotRefused(Vec<String>),
    /// Items received from the server, in stream order. Never empty.
    ItemsReceived(Vec<NetworkItem>),
    /// Scout results; the items keep `index == -1`. Never empty.
    LocationInfo(Vec<NetworkItem>),
    /// Locations newly observed as checked (server-confirmed or from the
    /// initial `Connected` snapshot). Never empty.
    LocationsChecked(Vec<i64>),
    /// Every outstanding data package request has been merged; names are
    /// fully resolvable again.
    DataPackageChanged,
    /// Plain-text message from a legacy server.
    Print(String),
    /// A structured text message to render or inspect.
    PrintJson(PrintJsonArgs),
    /// A relayed `Bounce` (DeathLink and friends).
    Bounced(Bounced),
    /// Reply to a `Get`.
    Retrieved(BTreeMap<String, Value>),
    /// A watched data-storage key changed.
    SetReply {
        key: String,
        value: Value,
        original_value: Value,
    },
}
