//! The Archipelago client: connection state machine, intent queueing and
//! inbound command dispatch.
//!
//! One [`ApClient`] value is one logical session with a server. The
//! application calls [`ApClient::poll`] on its own schedule (once per
//! frame is typical); every state transition and every returned
//! [`ClientEvent`] happens synchronously inside that call. Gameplay
//! intents issued before the slot join completes are buffered and
//! flushed on `Connected`, so callers never need to sequence their own
//! calls against the handshake.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use apclient_datapackage::{
    sync_plan, Catalog, DataPackageStore, FileDataPackageStore, RoomCatalog, SyncPlan,
};
use apclient_protocol::{
    self as protocol, ClientCommand, ClientStatus, DataPackage, DataStorageOperation, HintStatus,
    NetworkPlayer, NetworkSlot, NetworkVersion, ServerCommand, TextNode,
};
use apclient_transport::{Connector, Transport, TransportEvent, WebSocketConnector};
use serde_json::Value;

use crate::connection::{ReconnectPolicy, SessionUri};
use crate::render::{self, RenderFormat, RenderSource};
use crate::{ClientError, ClientEvent};

/// The protocol version this client reports in `Connect`.
pub const PROTOCOL_VERSION: NetworkVersion = NetworkVersion::new(0, 5, 1);

/// Address used when the application does not supply one.
pub const DEFAULT_ADDRESS: &str = "localhost:38281";

/// Server versions from which a non-zero hint cost is at least one point.
const HINT_COST_FLOOR_VERSION: NetworkVersion = NetworkVersion::new(0, 3, 9);

/// How many games to ask for per `GetDataPackage` request.
const DATA_PACKAGE_BATCH: usize = 2;

/// Connection lifecycle. Forward transitions only within one attempt;
/// any state can fall back to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    Disconnected,
    SocketConnecting,
    SocketConnected,
    RoomInfoReceived,
    SlotConnected,
}

/// What happened to an outbound operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SendOutcome {
    /// Written to the wire.
    Sent,
    /// Buffered; it will be replayed after the slot join.
    Queued,
    /// Dropped: the operation needs a connection state this client is
    /// not in (and is not one of the buffered kinds).
    NotSent,
}

impl SendOutcome {
    pub fn is_sent(self) -> bool {
        self == Self::Sent
    }

    /// Sent or buffered for later delivery.
    pub fn is_accepted(self) -> bool {
        self != Self::NotSent
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and constructs an [`ApClient`].
///
/// # Example
///
/// ```rust,no_run
/// use apclient::ApClient;
///
/// let mut client = ApClient::builder("my-uuid", "Clue", "ap.example.org").build();
/// loop {
///     for event in client.poll() {
///         // react to events
///     }
/// }
/// ```
pub struct ApClientBuilder {
    uuid: String,
    game: String,
    address: String,
    store: Option<Box<dyn DataPackageStore>>,
    tls_capable: bool,
    prefer_unencrypted: bool,
}

impl ApClientBuilder {
    pub fn new(uuid: &str, game: &str, address: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
            game: game.to_string(),
            address: address.to_string(),
            store: None,
            tls_capable: true,
            prefer_unencrypted: false,
        }
    }

    /// Replaces the default file-backed data package cache.
    pub fn data_package_store(mut self, store: Box<dyn DataPackageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Declares that the transport cannot do TLS; scheme-less addresses
    /// then start (and stay) on `ws://`.
    pub fn tls_capable(mut self, capable: bool) -> Self {
        self.tls_capable = capable;
        self
    }

    /// For scheme-less addresses, try `ws://` before `wss://`.
    pub fn prefer_unencrypted(mut self, prefer: bool) -> Self {
        self.prefer_unencrypted = prefer;
        self
    }

    /// Builds a client on the default WebSocket transport.
    pub fn build(self) -> ApClient<WebSocketConnector> {
        self.build_with(WebSocketConnector)
    }

    /// Builds a client on a custom connector (tests, embedders with
    /// their own socket stack).
    pub fn build_with<C: Connector>(self, connector: C) -> ApClient<C> {
        let uri = SessionUri::parse(&self.address, self.tls_capable, self.prefer_unencrypted);
        let store = self
            .store
            .unwrap_or_else(|| Box::new(FileDataPackageStore::new()));
        ApClient {
            connector,
            transport: None,
            uri,
            reconnect: ReconnectPolicy::new(),
            state: ConnectionState::Disconnected,
            scheme_flipped: false,
            game: self.game,
            uuid: self.uuid,
            store,
            package: DataPackage::default(),
            catalog: Catalog::default(),
            package_valid: false,
            pending_package_requests: 0,
            check_queue: BTreeSet::new(),
            scout_queues: BTreeMap::new(),
            hint_queue: Vec::new(),
            deferred_status: None,
            seed: String::new(),
            slot_name: String::new(),
            team: -1,
            slot: -1,
            players: Vec::new(),
            slot_info: BTreeMap::new(),
            checked_locations: BTreeSet::new(),
            missing_locations: BTreeSet::new(),
            location_count: 0,
            hint_cost_percent: 0,
            hint_points: 0,
            password_required: false,
            server_version: NetworkVersion::default(),
            generator_version: NetworkVersion::default(),
            server_time_base: 0.0,
            server_time_anchor: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A reconnecting Archipelago client.
pub struct ApClient<C: Connector = WebSocketConnector> {
    connector: C,
    transport: Option<C::Transport>,
    uri: Option<SessionUri>,
    reconnect: ReconnectPolicy,
    state: ConnectionState,
    /// Set once the current attempt has consumed its scheme flip.
    scheme_flipped: bool,

    game: String,
    uuid: String,

    store: Box<dyn DataPackageStore>,
    package: DataPackage,
    catalog: Catalog,
    package_valid: bool,
    pending_package_requests: usize,

    check_queue: BTreeSet<i64>,
    scout_queues: BTreeMap<i32, BTreeSet<i64>>,
    hint_queue: Vec<(i32, i64, HintStatus)>,
    deferred_status: Option<ClientStatus>,

    seed: String,
    slot_name: String,
    team: i32,
    slot: i32,
    players: Vec<NetworkPlayer>,
    slot_info: BTreeMap<i32, NetworkSlot>,
    checked_locations: BTreeSet<i64>,
    missing_locations: BTreeSet<i64>,
    location_count: usize,
    hint_cost_percent: i32,
    hint_points: i32,
    password_required: bool,
    server_version: NetworkVersion,
    generator_version: NetworkVersion,
    server_time_base: f64,
    server_time_anchor: Option<Instant>,
}

impl ApClient<WebSocketConnector> {
    /// Creates a client with default settings. See [`ApClient::builder`]
    /// for the knobs.
    pub fn new(uuid: &str, game: &str, address: &str) -> Self {
        Self::builder(uuid, game, address).build()
    }

    pub fn builder(uuid: &str, game: &str, address: &str) -> ApClientBuilder {
        ApClientBuilder::new(uuid, game, address)
    }
}

impl<C: Connector> ApClient<C> {
    // -----------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------

    /// Pumps the transport, dispatches inbound commands and paces
    /// reconnection. Never blocks. Returns the events produced by this
    /// call, in the order they occurred.
    pub fn poll(&mut self) -> Vec<ClientEvent> {
        let mut events = Vec::new();

        let transport_events = self
            .transport
            .as_mut()
            .map(|transport| transport.poll())
            .unwrap_or_default();
        for event in transport_events {
            self.handle_transport_event(event, &mut events);
        }
        if self.state == ConnectionState::Disconnected {
            self.transport = None;
        }

        if self.state < ConnectionState::SocketConnected && self.reconnect.due(Instant::now()) {
            self.connect_socket(&mut events);
        }

        events
    }

    /// Tears down the connection and clears all session state. The next
    /// `poll` starts a fresh connect cycle.
    pub fn reset(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.state = ConnectionState::Disconnected;
        self.reconnect.reset();
        self.scheme_flipped = false;

        self.check_queue.clear();
        self.scout_queues.clear();
        self.hint_queue.clear();
        self.deferred_status = None;

        self.seed.clear();
        self.slot_name.clear();
        self.team = -1;
        self.slot = -1;
        self.players.clear();
        self.slot_info.clear();
        self.checked_locations.clear();
        self.missing_locations.clear();
        self.location_count = 0;
        self.hint_cost_percent = 0;
        self.hint_points = 0;
        self.password_required = false;
        self.server_version = NetworkVersion::default();
        self.generator_version = NetworkVersion::default();
        self.server_time_base = 0.0;
        self.server_time_anchor = None;

        self.package = DataPackage::default();
        self.catalog.clear();
        self.package_valid = false;
        self.pending_package_requests = 0;
    }

    fn connect_socket(&mut self, events: &mut Vec<ClientEvent>) {
        let Some(uri) = self.uri.as_ref() else {
            return;
        };
        let uri_string = uri.uri();
        if self.state == ConnectionState::Disconnected {
            tracing::info!(uri = %uri_string, "connecting to server");
        } else {
            tracing::info!(uri = %uri_string, "connect attempt timed out, retrying");
        }
        self.reconnect.begin_attempt(Instant::now());
        self.state = ConnectionState::SocketConnecting;
        self.scheme_flipped = false;

        match self.connector.connect(&uri_string) {
            Ok(transport) => {
                self.reconnect.note_transport_hint(transport.ok_connect_interval());
                self.transport = Some(transport);
            }
            Err(error) => {
                tracing::warn!(%error, "could not start connection attempt");
                self.transport = None;
                self.try_scheme_fallback();
                events.push(ClientEvent::SocketError(error.to_string()));
            }
        }
    }

    /// Flips ws↔wss after a failure, at most once per attempt
    /// (transports commonly report an error and then a close for the
    /// same failure). While the attempt is still in flight, the flipped
    /// scheme is probed immediately instead of waiting out the backoff
    /// interval.
    fn try_scheme_fallback(&mut self) {
        if self.scheme_flipped {
            return;
        }
        let Some(uri) = self.uri.as_mut() else {
            return;
        };
        if uri.flip_scheme() {
            self.scheme_flipped = true;
            if self.state == ConnectionState::SocketConnecting {
                self.reconnect.arm_immediate();
            }
        }
    }

    fn handle_transport_event(&mut self, event: TransportEvent, events: &mut Vec<ClientEvent>) {
        match event {
            TransportEvent::Opened => {
                tracing::info!("server connected");
                self.state = ConnectionState::SocketConnected;
                self.reconnect.note_open();
                self.pending_package_requests = 0;
                events.push(ClientEvent::SocketConnected);
            }
            TransportEvent::Message(text) => self.handle_frame(&text, events),
            TransportEvent::Error(reason) => {
                tracing::warn!(%reason, "socket error");
                events.push(ClientEvent::SocketError(reason));
                self.try_scheme_fallback();
            }
            TransportEvent::Closed => {
                // A close before the handshake finished counts as a
                // failed attempt for scheme fallback, whether or not an
                // error was reported first.
                if self.state == ConnectionState::SocketConnecting {
                    self.try_scheme_fallback();
                }
                if self.state > ConnectionState::SocketConnecting {
                    tracing::info!("server disconnected");
                    events.push(ClientEvent::SocketDisconnected);
                }
                self.state = ConnectionState::Disconnected;
                self.seed.clear();
            }
        }
    }

    fn handle_frame(&mut self, text: &str, events: &mut Vec<ClientEvent>) {
        // Decode the whole frame before dispatching anything, so a bad
        // command cannot leave earlier commands half-applied.
        let commands = match protocol::decode_frame(text) {
            Ok(commands) => commands,
            Err(error) => {
                tracing::warn!(%error, "dropping invalid frame");
                return;
            }
        };
        for command in commands {
            tracing::debug!(cmd = command.name(), "< recv");
            self.handle_command(command, events);
        }
    }

    fn handle_command(&mut self, command: ServerCommand, events: &mut Vec<ClientEvent>) {
        match command {
            ServerCommand::RoomInfo(info) => self.on_room_info(info, events),
            ServerCommand::ConnectionRefused(refused) => {
                events.push(ClientEvent::SlotRefused(refused.errors));
            }
            ServerCommand::Connected(connected) => self.on_connected(connected, events),
            ServerCommand::ReceivedItems(mut received) => {
                let mut index = received.index;
                for item in &mut received.items {
                    item.index = index;
                    index += 1;
                }
                if !received.items.is_empty() {
                    events.push(ClientEvent::ItemsReceived(received.items));
                }
            }
            ServerCommand::LocationInfo(info) => {
                if !info.locations.is_empty() {
                    events.push(ClientEvent::LocationInfo(info.locations));
                }
            }
            ServerCommand::RoomUpdate(update) => {
                let mut newly_checked = Vec::new();
                for location in update.checked_locations {
                    if self.checked_locations.insert(location) {
                        newly_checked.push(location);
                    }
                    self.missing_locations.remove(&location);
                }
                if !newly_checked.is_empty() {
                    events.push(ClientEvent::LocationsChecked(newly_checked));
                }
                if let Some(hint_points) = update.hint_points {
                    self.hint_points = hint_points;
                }
                if let Some(players) = update.players {
                    self.players = players;
                }
            }
            ServerCommand::DataPackage(message) => self.on_data_package(message.data, events),
            ServerCommand::Print(print) => events.push(ClientEvent::Print(print.text)),
            ServerCommand::PrintJson(args) => events.push(ClientEvent::PrintJson(args)),
            ServerCommand::Bounced(bounced) => events.push(ClientEvent::Bounced(bounced)),
            ServerCommand::Retrieved(retrieved) => {
                events.push(ClientEvent::Retrieved(retrieved.keys));
            }
            ServerCommand::SetReply(reply) => events.push(ClientEvent::SetReply {
                key: reply.key,
                value: reply.value,
                original_value: reply.original_value,
            }),
        }
    }

    fn on_room_info(&mut self, info: protocol::RoomInfo, events: &mut Vec<ClientEvent>) {
        self.server_time_anchor = Some(Instant::now());
        self.server_time_base = info.time;
        self.server_version = info.version;
        self.generator_version = info.generator_version;
        self.seed = info.seed_name.clone();
        self.hint_cost_percent = info.hint_cost;
        self.password_required = info.password_required;
        if self.state < ConnectionState::RoomInfoReceived {
            self.state = ConnectionState::RoomInfoReceived;
        }
        events.push(ClientEvent::RoomInfo);

        let plan = sync_plan(&RoomCatalog::from_room_info(&info), self.store.as_mut());
        self.apply_sync_plan(plan);
    }

    fn apply_sync_plan(&mut self, plan: SyncPlan) {
        self.package_valid = plan.is_valid();
        if !plan.accepted.is_empty() {
            for (game, data) in plan.accepted {
                self.package.games.insert(game, data);
            }
            // Cached names resolve even while fetches are outstanding.
            self.catalog.rebuild(&self.package);
        }

        if self.package_valid {
            tracing::debug!("data package up to date");
            return;
        }

        if plan.fetch_all {
            self.pending_package_requests = 1;
            let _ = self.send_command(ClientCommand::GetDataPackage(protocol::GetDataPackage {
                games: None,
            }));
            return;
        }

        let batches: Vec<Vec<String>> = plan
            .fetch
            .chunks(DATA_PACKAGE_BATCH)
            .map(<[String]>::to_vec)
            .collect();
        self.pending_package_requests = batches.len();
        tracing::debug!(
            games = plan.fetch.len(),
            requests = batches.len(),
            "fetching data package"
        );
        for games in batches {
            let _ = self.send_command(ClientCommand::GetDataPackage(protocol::GetDataPackage {
                games: Some(games),
            }));
        }
    }

    fn on_data_package(&mut self, data: DataPackage, events: &mut Vec<ClientEvent>) {
        for (game, game_data) in data.games {
            if let Err(error) = self.store.save(&game, &game_data) {
                tracing::warn!(%game, %error, "could not cache data package");
            }
            self.package.games.insert(game, game_data);
        }
        self.package.version = data.version;
        self.catalog.rebuild(&self.package);

        self.pending_package_requests = self.pending_package_requests.saturating_sub(1);
        if self.pending_package_requests == 0 {
            self.package_valid = true;
            events.push(ClientEvent::DataPackageChanged);
        }
    }

    fn on_connected(&mut self, connected: protocol::Connected, events: &mut Vec<ClientEvent>) {
        self.state = ConnectionState::SlotConnected;
        self.team = connected.team;
        self.slot = connected.slot;
        self.hint_points = connected
            .hint_points
            .unwrap_or(connected.checked_locations.len() as i32);
        self.location_count =
            connected.missing_locations.len() + connected.checked_locations.len();
        self.players = connected.players;
        self.slot_info = connected
            .slot_info
            .into_iter()
            .filter_map(|(slot, info)| slot.parse::<i32>().ok().map(|slot| (slot, info)))
            .collect();
        self.checked_locations = connected.checked_locations.iter().copied().collect();
        self.missing_locations = connected.missing_locations.iter().copied().collect();

        // Replay buffered intents. Sending the queued checks through the
        // normal path re-applies them to checked/missing on top of the
        // server's snapshot.
        if !self.check_queue.is_empty() {
            let queued: Vec<i64> = std::mem::take(&mut self.check_queue).into_iter().collect();
            let _ = self.location_checks(&queued);
        }
        for (create_as_hint, locations) in std::mem::take(&mut self.scout_queues) {
            let locations: Vec<i64> = locations.into_iter().collect();
            let _ = self.location_scouts(&locations, create_as_hint);
        }
        for (player, location, status) in std::mem::take(&mut self.hint_queue) {
            let _ = self.update_hint(player, location, status);
        }

        tracing::info!(slot = self.slot, team = self.team, "slot connected");
        events.push(ClientEvent::SlotConnected(connected.slot_data));
        if !connected.checked_locations.is_empty() {
            events.push(ClientEvent::LocationsChecked(connected.checked_locations));
        }
    }

    // -----------------------------------------------------------------
    // Outbound operations
    // -----------------------------------------------------------------

    /// Requests the slot join. Requires the socket to be connected;
    /// call it from the `RoomInfo` (or `SocketConnected`) event.
    pub fn connect_slot(
        &mut self,
        name: &str,
        password: &str,
        items_handling: i32,
        tags: &[String],
    ) -> SendOutcome {
        if self.state < ConnectionState::SocketConnected {
            return SendOutcome::NotSent;
        }
        self.slot_name = name.to_string();
        self.send_command(ClientCommand::Connect(protocol::Connect {
            game: self.game.clone(),
            uuid: self.uuid.clone(),
            name: name.to_string(),
            password: password.to_string(),
            version: PROTOCOL_VERSION,
            items_handling,
            tags: tags.to_vec(),
        }))
    }

    /// Changes `items_handling` and/or `tags` after the join. Not sent
    /// when both are `None`.
    pub fn connect_update(
        &mut self,
        items_handling: Option<i32>,
        tags: Option<Vec<String>>,
    ) -> SendOutcome {
        if items_handling.is_none() && tags.is_none() {
            return SendOutcome::NotSent;
        }
        if self.state < ConnectionState::SocketConnected {
            return SendOutcome::NotSent;
        }
        self.send_command(ClientCommand::ConnectUpdate(protocol::ConnectUpdate {
            items_handling,
            tags,
        }))
    }

    /// Asks the server to resend all received items.
    pub fn sync(&mut self) -> SendOutcome {
        if self.state < ConnectionState::SlotConnected {
            return SendOutcome::NotSent;
        }
        self.send_command(ClientCommand::Sync)
    }

    /// Claims locations. Always accepted: before the slot join the set
    /// is buffered, and the local checked/missing view is updated
    /// immediately either way so the application sees its own checks.
    pub fn location_checks(&mut self, locations: &[i64]) -> SendOutcome {
        let outcome = if self.state == ConnectionState::SlotConnected {
            self.send_command(ClientCommand::LocationChecks(protocol::LocationChecks {
                locations: locations.to_vec(),
            }))
        } else {
            self.check_queue.extend(locations.iter().copied());
            SendOutcome::Queued
        };
        for location in locations {
            self.checked_locations.insert(*location);
            self.missing_locations.remove(location);
        }
        outcome
    }

    /// Scouts locations without claiming them. `create_as_hint` follows
    /// the wire convention (0 = no hint, 1 = hint, 2 = only new hints).
    pub fn location_scouts(&mut self, locations: &[i64], create_as_hint: i32) -> SendOutcome {
        if self.state == ConnectionState::SlotConnected {
            self.send_command(ClientCommand::LocationScouts(protocol::LocationScouts {
                locations: locations.to_vec(),
                create_as_hint,
            }))
        } else {
            self.scout_queues
                .entry(create_as_hint)
                .or_default()
                .extend(locations.iter().copied());
            SendOutcome::Queued
        }
    }

    /// Updates the status of an existing hint. `HintStatus::Found` is
    /// owned by the server and cannot be assigned from here in any
    /// meaningful way; requests are replayed in call order after a
    /// deferred join.
    pub fn update_hint(&mut self, player: i32, location: i64, status: HintStatus) -> SendOutcome {
        if self.state == ConnectionState::SlotConnected {
            self.send_command(ClientCommand::UpdateHint(protocol::UpdateHint {
                player,
                location,
                status,
            }))
        } else {
            self.hint_queue.push((player, location, status));
            SendOutcome::Queued
        }
    }

    /// Reports the client's game status. Below `SlotConnected` the value
    /// is remembered (see [`deferred_status`](Self::deferred_status))
    /// but intentionally not auto-sent on join.
    pub fn status_update(&mut self, status: ClientStatus) -> SendOutcome {
        if self.state == ConnectionState::SlotConnected {
            return self.send_command(ClientCommand::StatusUpdate(protocol::StatusUpdate {
                status,
            }));
        }
        self.deferred_status = Some(status);
        SendOutcome::NotSent
    }

    /// Requests data package payloads; `None` fetches the full catalog.
    pub fn get_data_package(&mut self, games: Option<Vec<String>>) -> SendOutcome {
        if self.state < ConnectionState::RoomInfoReceived {
            return SendOutcome::NotSent;
        }
        self.send_command(ClientCommand::GetDataPackage(protocol::GetDataPackage {
            games,
        }))
    }

    /// Sends a chat line.
    pub fn say(&mut self, text: &str) -> SendOutcome {
        if self.state < ConnectionState::RoomInfoReceived {
            return SendOutcome::NotSent;
        }
        self.send_command(ClientCommand::Say(protocol::Say {
            text: text.to_string(),
        }))
    }

    /// Broadcasts arbitrary data to matching clients (DeathLink rides on
    /// this).
    pub fn bounce(
        &mut self,
        data: Value,
        games: Vec<String>,
        slots: Vec<i32>,
        tags: Vec<String>,
    ) -> SendOutcome {
        if self.state < ConnectionState::RoomInfoReceived {
            return SendOutcome::NotSent;
        }
        self.send_command(ClientCommand::Bounce(protocol::Bounce {
            games,
            slots,
            tags,
            data,
        }))
    }

    /// Reads data-storage keys; extras are echoed in the reply.
    pub fn get(&mut self, keys: Vec<String>, extras: BTreeMap<String, Value>) -> SendOutcome {
        if self.state < ConnectionState::SlotConnected {
            return SendOutcome::NotSent;
        }
        self.send_command(ClientCommand::Get(protocol::Get { keys, extras }))
    }

    /// Writes a data-storage key through a list of operations.
    pub fn set(
        &mut self,
        key: &str,
        default: Value,
        want_reply: bool,
        operations: Vec<DataStorageOperation>,
        extras: BTreeMap<String, Value>,
    ) -> SendOutcome {
        if self.state < ConnectionState::SlotConnected {
            return SendOutcome::NotSent;
        }
        self.send_command(ClientCommand::Set(protocol::Set {
            key: key.to_string(),
            default,
            want_reply,
            operations,
            extras,
        }))
    }

    /// Subscribes to `SetReply` notifications for the given keys.
    pub fn set_notify(&mut self, keys: Vec<String>) -> SendOutcome {
        if self.state < ConnectionState::SlotConnected {
            return SendOutcome::NotSent;
        }
        self.send_command(ClientCommand::SetNotify(protocol::SetNotify { keys }))
    }

    fn send_command(&mut self, command: ClientCommand) -> SendOutcome {
        let Some(transport) = self.transport.as_mut() else {
            return SendOutcome::NotSent;
        };
        let frame = match protocol::encode_frame(std::slice::from_ref(&command)) {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!(cmd = command.name(), %error, "could not encode command");
                return SendOutcome::NotSent;
            }
        };
        tracing::debug!(cmd = command.name(), "> send");
        match transport.send(&frame) {
            Ok(()) => SendOutcome::Sent,
            Err(error) => {
                tracing::warn!(cmd = command.name(), %error, "send failed");
                SendOutcome::NotSent
            }
        }
    }

    // -----------------------------------------------------------------
    // State inspection
    // -----------------------------------------------------------------

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The multiworld's seed identifier; empty until `RoomInfo`.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// The slot name passed to the last `connect_slot`.
    pub fn slot_name(&self) -> &str {
        &self.slot_name
    }

    /// The connected slot number, or -1.
    pub fn player_number(&self) -> i32 {
        self.slot
    }

    /// The connected team number, or -1.
    pub fn team_number(&self) -> i32 {
        self.team
    }

    pub fn players(&self) -> &[NetworkPlayer] {
        &self.players
    }

    pub fn checked_locations(&self) -> &BTreeSet<i64> {
        &self.checked_locations
    }

    pub fn missing_locations(&self) -> &BTreeSet<i64> {
        &self.missing_locations
    }

    /// Current hint points. Servers without per-update accounting report
    /// the checked-location count from the join instead.
    pub fn hint_points(&self) -> i32 {
        self.hint_points
    }

    pub fn hint_cost_percent(&self) -> i32 {
        self.hint_cost_percent
    }

    /// Cost of one hint in points. Zero when hints are free; newer
    /// servers price any non-zero percentage at one point minimum.
    pub fn hint_cost_points(&self) -> i32 {
        if self.hint_cost_percent == 0 {
            return 0;
        }
        let points = self.hint_cost_percent * self.location_count as i32 / 100;
        if self.server_version >= HINT_COST_FLOOR_VERSION {
            points.max(1)
        } else {
            points
        }
    }

    pub fn password_required(&self) -> bool {
        self.password_required
    }

    pub fn server_version(&self) -> NetworkVersion {
        self.server_version
    }

    pub fn generator_version(&self) -> NetworkVersion {
        self.generator_version
    }

    /// Whether every game's catalog matches what the server announced.
    /// Name lookups fall back to "Unknown" while this is false.
    pub fn is_data_package_valid(&self) -> bool {
        self.package_valid
    }

    /// A status remembered from `status_update` while disconnected. The
    /// client never sends it automatically; reissue it after the join if
    /// wanted.
    pub fn deferred_status(&self) -> Option<ClientStatus> {
        self.deferred_status
    }

    /// Estimated server Unix time: the `RoomInfo` wall clock plus the
    /// monotonic time elapsed since. Not corrected for drift.
    pub fn server_time(&self) -> f64 {
        match self.server_time_anchor {
            Some(anchor) => self.server_time_base + anchor.elapsed().as_secs_f64(),
            None => 0.0,
        }
    }

    // -----------------------------------------------------------------
    // Name resolution
    // -----------------------------------------------------------------

    /// Alias of a slot on the own team: "Server" for 0, "Unknown" when
    /// absent.
    pub fn player_alias(&self, slot: i32) -> String {
        if slot == 0 {
            return "Server".to_string();
        }
        self.players
            .iter()
            .find(|player| player.team == self.team && player.slot == slot)
            .map(|player| player.alias.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// The game a slot plays, from `slot_info`.
    pub fn player_game(&self, slot: i32) -> Option<&str> {
        self.slot_info.get(&slot).map(|info| info.game.as_str())
    }

    /// Item display name. `game` of `None` means the own game.
    pub fn item_name(&self, id: i64, game: Option<&str>) -> String {
        let game = game.or(Some(self.game.as_str()));
        self.catalog
            .item_name(id, game)
            .unwrap_or("Unknown")
            .to_string()
    }

    /// Location display name. `game` of `None` means the own game.
    pub fn location_name(&self, id: i64, game: Option<&str>) -> String {
        let game = game.or(Some(self.game.as_str()));
        self.catalog
            .location_name(id, game)
            .unwrap_or("Unknown")
            .to_string()
    }

    /// Reverse lookup in the own game's catalog.
    pub fn item_id(&self, name: &str) -> Option<i64> {
        self.package
            .games
            .get(&self.game)
            .and_then(|data| data.item_name_to_id.get(name))
            .copied()
    }

    /// Reverse lookup in the own game's catalog.
    pub fn location_id(&self, name: &str) -> Option<i64> {
        self.package
            .games
            .get(&self.game)
            .and_then(|data| data.location_name_to_id.get(name))
            .copied()
    }

    /// The merged data package (for diagnostics or custom persistence).
    pub fn data_package(&self) -> &DataPackage {
        &self.package
    }

    /// Renders `PrintJSON` nodes against this client's catalog and
    /// player tables.
    ///
    /// # Errors
    /// [`ClientError::UnsupportedRenderFormat`] for HTML.
    pub fn render_json(
        &self,
        nodes: &[TextNode],
        format: RenderFormat,
    ) -> Result<String, ClientError> {
        render::render(nodes, format, self)
    }
}

impl<C: Connector> RenderSource for ApClient<C> {
    fn own_slot(&self) -> i32 {
        self.slot
    }

    fn player_alias(&self, slot: i32) -> String {
        ApClient::player_alias(self, slot)
    }

    fn player_game(&self, slot: i32) -> Option<String> {
        ApClient::player_game(self, slot).map(str::to_string)
    }

    fn item_name(&self, id: i64, game: Option<&str>) -> String {
        ApClient::item_name(self, id, game)
    }

    fn location_name(&self, id: i64, game: Option<&str>) -> String {
        ApClient::location_name(self, id, game)
    }
}

// =========================================================================
// Tests
// =========================================================================
