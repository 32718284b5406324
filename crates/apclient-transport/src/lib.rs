//! Transport abstraction for the Archipelago client.
//!
//! The client core is single-threaded and driven entirely by `poll()`,
//! so the transport does not invoke callbacks: it posts
//! [`TransportEvent`]s to an internal queue, and the client drains that
//! queue during its own `poll`. One transport value represents one
//! connection attempt; reconnecting means constructing a new transport
//! through the [`Connector`].
//!
//! The default implementation is [`WebSocketTransport`], built on
//! `tungstenite` with a background reader thread.

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{WebSocketConnector, WebSocketTransport};

use std::time::Duration;

/// An edge observed on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection (including any TLS and WebSocket handshake) is up.
    Opened,
    /// A complete text frame arrived.
    Message(String),
    /// Something went wrong; the reason is human-readable. Usually
    /// followed by `Closed`.
    Error(String),
    /// The connection is gone, cleanly or not. Terminal.
    Closed,
}

/// A single connection attempt's lifecycle.
///
/// `poll` never blocks; it drains whatever events have accumulated since
/// the last call, in the order they occurred.
pub trait Transport {
    /// Queues a text frame for delivery.
    ///
    /// # Errors
    /// Returns [`TransportError::SendFailed`] when the connection is no
    /// longer writable. Small frames never block.
    fn send(&mut self, text: &str) -> Result<(), TransportError>;

    /// Drains pending connection events.
    fn poll(&mut self) -> Vec<TransportEvent>;

    /// Starts a graceful shutdown. Further events may still drain.
    fn close(&mut self);

    /// The minimum reconnect spacing the transport asks for, if it has
    /// an opinion (browser WebSocket backends rate-limit connects).
    fn ok_connect_interval(&self) -> Option<Duration> {
        None
    }
}

/// Builds transports from URIs. The client calls this once per
/// (re)connect attempt.
pub trait Connector {
    type Transport: Transport;

    /// Starts a connection attempt to `uri` (`ws://...` or `wss://...`).
    ///
    /// Must return promptly: implementations do the blocking work on a
    /// background thread and report the outcome through the transport's
    /// event queue.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectFailed`] only for failures that
    /// can be detected synchronously (e.g. an unusable URI).
    fn connect(&mut self, uri: &str) -> Result<Self::Transport, TransportError>;
}
