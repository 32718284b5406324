//! WebSocket transport implementation using `tungstenite`.
//!
//! One background thread per connection attempt: it performs the
//! blocking connect (TCP, optional TLS, WebSocket upgrade), then flips
//! the socket to non-blocking and alternates between draining the
//! outbound queue and reading frames. Everything observable crosses to
//! the owning thread as [`TransportEvent`]s over an mpsc channel, so the
//! owner's `poll` never blocks.

use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Error as WsError, Message, WebSocket};

use crate::{Connector, Transport, TransportError, TransportEvent};

/// Sleep between read attempts once the socket has nothing buffered.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(20);

enum WorkerCommand {
    Send(String),
    Close,
}

/// Builds [`WebSocketTransport`]s. Stateless; one value can serve every
/// reconnect attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    fn connect(&mut self, uri: &str) -> Result<WebSocketTransport, TransportError> {
        Ok(WebSocketTransport::start(uri))
    }
}

/// A WebSocket connection attempt backed by a worker thread.
///
/// Dropping the transport abandons the connection: the worker notices
/// the closed command channel and shuts the socket down.
pub struct WebSocketTransport {
    events: Receiver<TransportEvent>,
    commands: Sender<WorkerCommand>,
    _worker: JoinHandle<()>,
}

impl WebSocketTransport {
    fn start(uri: &str) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        let (command_tx, command_rx) = mpsc::channel();
        let uri = uri.to_string();
        let worker = thread::spawn(move || run_worker(&uri, &event_tx, &command_rx));
        Self {
            events: event_rx,
            commands: command_tx,
            _worker: worker,
        }
    }
}

impl Transport for WebSocketTransport {
    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.commands
            .send(WorkerCommand::Send(text.to_string()))
            .map_err(|_| TransportError::SendFailed("connection is gone".into()))
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        self.events.try_iter().collect()
    }

    fn close(&mut self) {
        let _ = self.commands.send(WorkerCommand::Close);
    }
}

fn run_worker(uri: &str, events: &Sender<TransportEvent>, commands: &Receiver<WorkerCommand>) {
    let (mut socket, _response) = match tungstenite::connect(uri) {
        Ok(pair) => pair,
        Err(error) => {
            tracing::debug!(uri, %error, "websocket connect failed");
            let _ = events.send(TransportEvent::Error(error.to_string()));
            let _ = events.send(TransportEvent::Closed);
            return;
        }
    };

    if let Err(error) = set_nonblocking(socket.get_mut()) {
        let _ = events.send(TransportEvent::Error(error.to_string()));
        let _ = events.send(TransportEvent::Closed);
        return;
    }

    tracing::debug!(uri, "websocket open");
    let _ = events.send(TransportEvent::Opened);

    loop {
        if !drain_outbound(&mut socket, commands, events) {
            return;
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                if events.send(TransportEvent::Message(text.to_string())).is_err() {
                    return;
                }
            }
            // Ping/pong replies are queued internally by tungstenite;
            // binary frames are not part of this protocol.
            Ok(Message::Close(_)) => {
                let _ = events.send(TransportEvent::Closed);
                return;
            }
            Ok(_) => {}
            Err(WsError::Io(ref error)) if error.kind() == ErrorKind::WouldBlock => {
                thread::sleep(IDLE_POLL_INTERVAL);
            }
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                let _ = events.send(TransportEvent::Closed);
                return;
            }
            Err(error) => {
                let _ = events.send(TransportEvent::Error(error.to_string()));
                let _ = events.send(TransportEvent::Closed);
                return;
            }
        }
    }
}

/// Forwards queued sends to the socket. Returns `false` when the worker
/// should exit (owner gone and socket shut down).
fn drain_outbound(
    socket: &mut WebSocket<MaybeTlsStream<TcpStream>>,
    commands: &Receiver<WorkerCommand>,
    events: &Sender<TransportEvent>,
) -> bool {
    loop {
        match commands.try_recv() {
            Ok(WorkerCommand::Send(text)) => {
                match socket.send(Message::Text(text.into())) {
                    Ok(()) => {}
                    // Flush stalled; tungstenite keeps the frame queued
                    // and finishes it on a later read/write.
                    Err(WsError::Io(ref error)) if error.kind() == ErrorKind::WouldBlock => {}
                    Err(error) => {
                        let _ = events.send(TransportEvent::Error(error.to_string()));
                        let _ = events.send(TransportEvent::Closed);
                        return false;
                    }
                }
            }
            Ok(WorkerCommand::Close) => {
                // Start the close handshake; the read loop surfaces the
                // final Closed event.
                let _ = socket.close(None);
            }
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => {
                let _ = socket.close(None);
                return false;
            }
        }
    }
}

fn set_nonblocking(stream: &mut MaybeTlsStream<TcpStream>) -> std::io::Result<()> {
    match stream {
        MaybeTlsStream::Plain(stream) => stream.set_nonblocking(true),
        MaybeTlsStream::NativeTls(stream) => stream.get_ref().set_nonblocking(true),
        _ => Ok(()),
    }
}
