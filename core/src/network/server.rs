//! The networking server: wires the dial queue, peer registry, event bus
//! and protocol registry over the secure transport, and owns the lifecycle
//! of every networking task.
use color_eyre::{eyre::WrapErr, Result};
use dashmap::DashMap;
use libp2p::PeerId;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use crate::config::Config;
use crate::error::NetworkError;
use crate::host::{Host, HostEvent, Stream, StreamHandler, ADDRESS_TTL};
use crate::network::bootnodes::BootnodeSet;
use crate::network::connections::ConnectionCounters;
use crate::network::dial::{DialPriority, DialQueue};
use crate::network::discovery::{DiscoveryFactory, DiscoveryService, RoutingEvent};
use crate::network::event::{EventBus, PeerEvent, PeerEventType, Subscription};
use crate::network::identity;
use crate::network::protocols::{ClientHandle, Protocol, ProtocolRegistry};
use crate::network::watch::JoinWatchers;
use crate::secrets;
use crate::shutdown::Controller;
use crate::telemetry::{MetricCounter, MetricValue, Metrics};
use crate::types::{AddrInfo, Connectedness, Direction, PeerRecord};
use crate::utils::spawn_in_span;

/// Peer count floor the maintainer tops up towards.
pub const MIN_PEER_CONNECTIONS: i64 = 1;

/// Minimum bootstrap entries remaining after self-filtering.
pub const MIN_BOOTNODES: usize = 1;

// Anything below 35s is prone to false timeouts, as seen from empirical
// test data
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(40);
pub const DEFAULT_BUFFER_TIMEOUT: Duration = Duration::from_secs(45);

const PEER_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(10);

/// Cheap-clone handle over the networking server.
///
/// Spawned tasks hold clones; external collaborators that must not keep the
/// server alive get a [`NetworkHandle`] instead.
#[derive(Clone)]
pub struct Server {
	pub(crate) inner: Arc<ServerInner>,
}

pub(crate) struct ServerInner {
	config: crate::config::NetworkConfig,

	host: Arc<dyn Host>,
	/// Advertised addresses, after the NAT/DNS rewrite policy.
	addrs: Vec<libp2p::Multiaddr>,

	/// Connected peer set; mutations funnel through `add_peer`/`del_peer`.
	peers: Mutex<HashMap<PeerId, PeerRecord>>,

	metrics: Arc<dyn Metrics>,

	pub(crate) dial_queue: DialQueue,
	protocols: ProtocolRegistry,
	event_bus: EventBus,
	join_watchers: JoinWatchers,
	pub(crate) connection_counts: ConnectionCounters,

	/// Peers dialed for one-off exchanges; test-and-set only.
	temporary_dials: DashMap<PeerId, bool>,

	/// Set once during `start` when discovery is enabled.
	bootnodes: OnceLock<BootnodeSet>,

	discovery: Mutex<Option<Arc<dyn DiscoveryService>>>,
	discovery_factory: Mutex<Option<DiscoveryFactory>>,

	/// Taken by the notification pump on `start`.
	host_events: Mutex<Option<UnboundedReceiver<HostEvent>>>,

	pub(crate) shutdown: Controller<String>,
}

impl Server {
	/// Builds the networking stack: loads the identity key, creates the
	/// transport and binds the listener, and registers the identity
	/// protocol. No tasks run until [`Server::start`].
	pub fn new(config: Config) -> Result<Server> {
		let Config {
			network,
			secrets_manager,
			metrics,
			transport,
			discovery,
		} = config;

		let key = secrets::setup_network_key(secrets_manager.as_ref())?;

		let (host, host_events) =
			transport(key).wrap_err("failed to create the transport stack")?;
		host.listen(network.listen_multiaddr())
			.wrap_err("unable to bind the transport listener")?;

		let addrs = network.advertised_addrs(host.addrs());
		let connection_counts =
			ConnectionCounters::new(network.max_inbound_peers, network.max_outbound_peers);

		let server = Server {
			inner: Arc::new(ServerInner {
				config: network,
				host,
				addrs,
				peers: Mutex::new(HashMap::new()),
				metrics: metrics.clone(),
				dial_queue: DialQueue::new(),
				protocols: ProtocolRegistry::default(),
				event_bus: EventBus::new(metrics),
				join_watchers: JoinWatchers::default(),
				connection_counts,
				temporary_dials: DashMap::new(),
				bootnodes: OnceLock::new(),
				discovery: Mutex::new(None),
				discovery_factory: Mutex::new(discovery),
				host_events: Mutex::new(Some(host_events)),
				shutdown: Controller::new(),
			}),
		};

		identity::setup(&server);

		Ok(server)
	}

	/// Starts discovery (when enabled) and the dial worker, peer maintainer
	/// and join watcher tasks.
	pub async fn start(&self) -> Result<()> {
		info!(addr = %self.addr_info(), "networking server running");

		if !self.inner.config.no_discover {
			self.setup_bootnodes()?;
			self.setup_discovery().await?;

			// seed the dial queue with the bootstrap set
			if let Some(bootnodes) = self.inner.bootnodes.get() {
				for bootnode in bootnodes.get_all() {
					self.add_to_dial_queue(bootnode, DialPriority::RandomDial);
				}
			}
		}

		self.run_notifications();
		self.run_dial()?;
		self.run_peer_maintainer();
		self.run_join_watcher()?;

		Ok(())
	}

	/// Orderly shutdown: close the transport (firing disconnect
	/// notifications), close the dial queue, stop discovery, then signal
	/// every task to drain.
	pub async fn close(&self) -> Result<()> {
		info!("closing networking server");

		let close_result = self.inner.host.close().await;
		self.inner.dial_queue.close();

		let discovery = self.inner.discovery.lock().unwrap().take();
		if let Some(discovery) = discovery {
			discovery.close().await;
		}

		let _ = self
			.inner
			.shutdown
			.trigger_shutdown("networking server closed".to_string());

		close_result
	}

	/// Parses a `/p2p` multiaddress and joins the peer, waiting up to
	/// `timeout` for the outcome. A zero timeout is fire-and-forget.
	pub async fn join_addr(&self, addr: &str, timeout: Duration) -> Result<()> {
		let addr_info: AddrInfo = addr.parse()?;
		self.join(addr_info, timeout).await
	}

	pub async fn join(&self, addr_info: AddrInfo, timeout: Duration) -> Result<()> {
		info!(addr = %addr_info, "join request");

		let peer_id = addr_info.peer_id;
		self.add_to_dial_queue(&addr_info, DialPriority::RequestedDial);

		if timeout.is_zero() {
			return Ok(());
		}

		self.inner
			.join_watchers
			.watch(self.inner.host.id(), peer_id, timeout)
			.await
	}

	/// Closes the transport connection to the peer, logging the reason.
	pub async fn disconnect(&self, peer_id: PeerId, reason: &str) {
		if self.inner.host.connectedness(peer_id) == Connectedness::Connected {
			info!(peer = %peer_id, reason, "closing connection to peer");

			if let Err(error) = self.inner.host.close_peer(peer_id).await {
				error!(peer = %peer_id, "unable to gracefully close peer connection: {error:#}");
			}
		}
	}

	pub fn peers(&self) -> Vec<PeerRecord> {
		self.inner.peers.lock().unwrap().values().cloned().collect()
	}

	pub fn num_peers(&self) -> usize {
		self.inner.peers.lock().unwrap().len()
	}

	pub fn has_peer(&self, peer_id: PeerId) -> bool {
		self.inner.peers.lock().unwrap().contains_key(&peer_id)
	}

	pub fn is_connected(&self, peer_id: PeerId) -> bool {
		self.inner.host.connectedness(peer_id) == Connectedness::Connected
	}

	/// Local identity and advertised addresses.
	pub fn addr_info(&self) -> AddrInfo {
		AddrInfo::new(self.inner.host.id(), self.inner.addrs.clone())
	}

	pub fn chain_id(&self) -> u64 {
		self.inner.config.chain.chain_id
	}

	pub fn add_to_peer_store(&self, addr_info: &AddrInfo) {
		if let Some(addr) = addr_info.addrs.first() {
			self.inner
				.host
				.add_addr(addr_info.peer_id, addr.clone(), ADDRESS_TTL);
		}
	}

	pub fn get_peer_info(&self, peer_id: PeerId) -> AddrInfo {
		self.inner.host.peer_info(peer_id)
	}

	pub fn get_protocols(&self, peer_id: PeerId) -> Vec<String> {
		self.inner.host.protocols(peer_id)
	}

	/// Test-and-set on the temporary-dials map; returns whether the peer
	/// was already marked.
	pub fn fetch_and_set_temporary_dial(&self, peer_id: PeerId, new_value: bool) -> bool {
		match self.inner.temporary_dials.entry(peer_id) {
			dashmap::mapref::entry::Entry::Occupied(_) => true,
			dashmap::mapref::entry::Entry::Vacant(slot) => {
				slot.insert(new_value);
				false
			},
		}
	}

	pub fn has_temporary_dial(&self, peer_id: PeerId) -> bool {
		self.inner.temporary_dials.contains_key(&peer_id)
	}

	pub fn remove_temporary_dial(&self, peer_id: &PeerId) {
		self.inner.temporary_dials.remove(peer_id);
	}

	pub fn update_pending_conn_count(&self, delta: i64, direction: Direction) {
		self.inner.connection_counts.update_pending(delta, direction);
		self.update_pending_conn_count_metrics(direction);
	}

	pub fn has_free_outbound_connections(&self) -> bool {
		self.inner.connection_counts.has_free_outbound()
	}

	pub fn has_free_connection_slot(&self, direction: Direction) -> bool {
		self.inner
			.connection_counts
			.has_free_connection_slot(direction)
	}

	pub fn is_bootnode(&self, peer_id: &PeerId) -> bool {
		self.inner
			.bootnodes
			.get()
			.is_some_and(|bootnodes| bootnodes.is_bootnode(peer_id))
	}

	pub fn get_bootnode_conn_count(&self) -> i64 {
		self.inner
			.bootnodes
			.get()
			.map_or(0, BootnodeSet::connected_count)
	}

	/// A uniformly random bootnode that is currently not connected, if any.
	pub fn get_random_bootnode(&self) -> Option<AddrInfo> {
		let bootnodes = self.inner.bootnodes.get()?;
		let non_connected: Vec<&AddrInfo> = bootnodes
			.get_all()
			.iter()
			.filter(|bootnode| !self.has_peer(bootnode.peer_id))
			.collect();

		non_connected
			.choose(&mut rand::thread_rng())
			.map(|bootnode| (*bootnode).clone())
	}

	pub fn subscribe(&self) -> Result<Subscription> {
		Ok(self.inner.event_bus.subscribe())
	}

	/// Runs `handler` for every peer event on a dedicated pump task until
	/// shutdown. A panicking handler is logged, not fatal to the pump.
	pub fn subscribe_fn<F>(&self, handler: F) -> Result<()>
	where
		F: Fn(PeerEvent) + Send + 'static,
	{
		let mut subscription = self.subscribe()?;
		let shutdown = self.inner.shutdown.clone();

		spawn_in_span(async move {
			loop {
				tokio::select! {
					event = subscription.next() => match event {
						Some(event) => {
							let call = std::panic::catch_unwind(AssertUnwindSafe(|| handler(event)));
							if call.is_err() {
								error!(peer = %event.peer_id, event = %event.event_type, "peer event handler panicked");
							}
						},
						None => break,
					},
					_ = shutdown.triggered_shutdown() => break,
				}
			}
		});

		Ok(())
	}

	/// Channel-flavored subscription; the channel closes on shutdown.
	pub fn subscribe_ch(&self) -> Result<mpsc::UnboundedReceiver<PeerEvent>> {
		let (sender, receiver) = mpsc::unbounded_channel();
		self.subscribe_fn(move |event| {
			let _ = sender.send(event);
		})?;
		Ok(receiver)
	}

	/// Installs the protocol: stores the handler pair and wires the
	/// server-side handler into the transport.
	pub fn register_protocol(&self, protocol_id: &str, protocol: Arc<dyn Protocol>) {
		self.inner.protocols.register(protocol_id, protocol.clone());
		self.wrap_stream(protocol_id, protocol.handler());
	}

	fn wrap_stream(&self, protocol_id: &str, handler: StreamHandler) {
		let id = protocol_id.to_string();
		self.inner.host.set_stream_handler(
			protocol_id,
			Arc::new(move |peer_id, stream| {
				debug!(protocol = %id, peer = %peer_id, "open stream");
				handler(peer_id, stream);
			}),
		);
	}

	/// Opens a stream for a registered protocol and wraps it into the
	/// protocol's client handle.
	pub async fn new_proto_stream(
		&self,
		protocol_id: &str,
		peer_id: PeerId,
	) -> Result<ClientHandle> {
		let protocol = self
			.inner
			.protocols
			.lookup(protocol_id)
			.ok_or_else(|| NetworkError::ProtocolNotFound(protocol_id.to_string()))?;

		// the registry lock is released by now; the stream opens outside it
		let stream = self.new_stream(protocol_id, peer_id).await?;
		Ok(protocol.client(stream))
	}

	pub async fn new_stream(&self, protocol_id: &str, peer_id: PeerId) -> Result<Stream> {
		self.inner.host.new_stream(peer_id, protocol_id).await
	}

	/// Non-owning handle for collaborators that call back into the server.
	pub fn handle(&self) -> NetworkHandle {
		NetworkHandle {
			inner: Arc::downgrade(&self.inner),
		}
	}

	pub(crate) fn host(&self) -> &Arc<dyn Host> {
		&self.inner.host
	}

	pub(crate) fn add_to_dial_queue(&self, addr_info: &AddrInfo, priority: DialPriority) {
		self.inner.dial_queue.add(addr_info.clone(), priority);
		self.emit_event(addr_info.peer_id, PeerEventType::AddedToDialQueue);
	}

	pub(crate) fn emit_event(&self, peer_id: PeerId, event_type: PeerEventType) {
		self.inner.event_bus.emit(PeerEvent {
			peer_id,
			event_type,
		});
	}

	/// Registers a peer that completed the identity handshake. The
	/// lifecycle event is emitted outside the registry lock.
	pub(crate) fn add_peer(&self, peer_id: PeerId, direction: Direction) {
		{
			let mut peers = self.inner.peers.lock().unwrap();
			info!(peer = %peer_id, %direction, "peer connected");

			peers.insert(
				peer_id,
				PeerRecord {
					info: self.inner.host.peer_info(peer_id),
					direction,
				},
			);

			self.inner.connection_counts.update_active(1, direction);
			self.update_conn_count_metrics(direction);
			self.update_bootnode_conn_count(&peer_id, 1);
			self.inner
				.metrics
				.record(MetricValue::TotalPeerCount(peers.len()));
		}

		self.emit_event(peer_id, PeerEventType::Connected);
	}

	/// Removes a peer. Idempotent: an unknown peer leaves the registry and
	/// counters untouched, but the transport connection is still closed and
	/// the disconnect event still fires.
	pub(crate) async fn del_peer(&self, peer_id: PeerId) {
		{
			let mut peers = self.inner.peers.lock().unwrap();
			info!(peer = %peer_id, "peer disconnected");

			if let Some(record) = peers.remove(&peer_id) {
				self.inner
					.connection_counts
					.update_active(-1, record.direction);
				self.update_conn_count_metrics(record.direction);
				self.update_bootnode_conn_count(&peer_id, -1);
			}

			self.inner
				.metrics
				.record(MetricValue::TotalPeerCount(peers.len()));
		}

		// the transport may still hold connection state for the peer
		if let Err(error) = self.inner.host.close_peer(peer_id).await {
			error!(peer = %peer_id, "unable to gracefully close connection to peer: {error:#}");
		}

		self.emit_event(peer_id, PeerEventType::Disconnected);
	}

	fn update_bootnode_conn_count(&self, peer_id: &PeerId, delta: i64) {
		if self.inner.config.no_discover {
			return;
		}

		if let Some(bootnodes) = self.inner.bootnodes.get() {
			if bootnodes.is_bootnode(peer_id) {
				bootnodes.increase_connected(delta);
			}
		}
	}

	fn update_conn_count_metrics(&self, direction: Direction) {
		let count = self.inner.connection_counts.active_count(direction);
		let value = match direction {
			Direction::Inbound => MetricValue::InboundConnections(count),
			Direction::Outbound => MetricValue::OutboundConnections(count),
		};
		self.inner.metrics.record(value);
	}

	fn update_pending_conn_count_metrics(&self, direction: Direction) {
		let count = self.inner.connection_counts.pending_count(direction);
		let value = match direction {
			Direction::Inbound => MetricValue::PendingInboundConnections(count),
			Direction::Outbound => MetricValue::PendingOutboundConnections(count),
		};
		self.inner.metrics.record(value);
	}

	fn setup_bootnodes(&self) -> Result<()> {
		let raw_bootnodes = self
			.inner
			.config
			.chain
			.bootnodes
			.as_ref()
			.ok_or(NetworkError::NoBootnodes)?;

		let local_id = self.inner.host.id();
		let mut bootnodes = Vec::new();

		for raw_addr in raw_bootnodes {
			let bootnode: AddrInfo = raw_addr
				.parse()
				.wrap_err_with(|| format!("failed to parse bootnode {raw_addr}"))?;

			if bootnode.peer_id == local_id {
				info!(id = %bootnode.peer_id, "omitting bootnode with same id as host");
				continue;
			}

			bootnodes.push(bootnode);
		}

		if bootnodes.len() < MIN_BOOTNODES {
			return Err(NetworkError::MinBootnodes.into());
		}

		let _ = self.inner.bootnodes.set(BootnodeSet::new(bootnodes));
		Ok(())
	}

	async fn setup_discovery(&self) -> Result<()> {
		let factory = self.inner.discovery_factory.lock().unwrap().take();
		let Some(factory) = factory else {
			return Ok(());
		};

		let parts = factory(self.handle()).wrap_err("unable to set up discovery")?;

		let service = parts.service.clone();
		self.subscribe_fn(move |event| service.handle_peer_event(event))
			.wrap_err("unable to subscribe discovery to network events")?;

		if let Some((protocol_id, protocol)) = parts.protocol {
			self.register_protocol(&protocol_id, protocol);
		}

		if let Some(bootnodes) = self.inner.bootnodes.get() {
			parts.service.connect_to_bootnodes(bootnodes.get_all());
		}

		parts
			.service
			.start()
			.await
			.wrap_err("unable to start discovery")?;

		self.run_routing_events(parts.routing_events);
		*self.inner.discovery.lock().unwrap() = Some(parts.service);

		Ok(())
	}

	/// Pumps routing table membership changes into the dial queue.
	fn run_routing_events(&self, mut events: UnboundedReceiver<RoutingEvent>) {
		let server = self.clone();
		spawn_in_span(async move {
			loop {
				tokio::select! {
					event = events.recv() => match event {
						Some(RoutingEvent::PeerAdded(peer_id)) => {
							let info = server.inner.host.peer_info(peer_id);
							server.add_to_dial_queue(&info, DialPriority::RandomDial);
						},
						Some(RoutingEvent::PeerRemoved(peer_id)) => {
							server.inner.dial_queue.del(&peer_id);
						},
						None => break,
					},
					_ = server.inner.shutdown.triggered_shutdown() => break,
				}
			}
		});
	}

	/// Pumps transport connection notifications into the identity
	/// handshake and the peer registry.
	fn run_notifications(&self) {
		let Some(mut events) = self.inner.host_events.lock().unwrap().take() else {
			warn!("transport notifications are already being consumed");
			return;
		};

		let server = self.clone();
		spawn_in_span(async move {
			loop {
				tokio::select! {
					event = events.recv() => match event {
						Some(HostEvent::ConnectionEstablished { peer_id, direction }) => {
							spawn_in_span(identity::handle_connected(
								server.clone(),
								peer_id,
								direction,
							));
						},
						Some(HostEvent::ConnectionClosed { peer_id }) => {
							let server = server.clone();
							spawn_in_span(async move { server.del_peer(peer_id).await });
						},
						None => break,
					},
					_ = server.inner.shutdown.triggered_shutdown() => break,
				}
			}
		});
	}

	/// The dial worker: drains the dial queue while outbound slots are
	/// free, then parks until a peer state change might free one.
	fn run_dial(&self) -> Result<()> {
		let (notify_sender, mut notify_receiver) = mpsc::channel::<()>(1);
		self.subscribe_fn(move |event| {
			// only state changes that may free or consume a dial slot
			if matches!(
				event.event_type,
				PeerEventType::Connected
					| PeerEventType::FailedToConnect
					| PeerEventType::Disconnected
					| PeerEventType::DialCompleted
					| PeerEventType::AddedToDialQueue
			) {
				let _ = notify_sender.try_send(());
			}
		})?;

		let server = self.clone();
		spawn_in_span(async move {
			loop {
				// TODO: dials run one at a time because connect blocks
				// through the handshake; lift this to a bounded set of
				// concurrent dials
				while server.inner.connection_counts.has_free_outbound() {
					let Some(task) = server.inner.dial_queue.pop().await else {
						trace!("dial queue closed");
						return;
					};

					debug!(local = %server.inner.host.id(), addr = %task.addr_info, "dial");

					if server.is_connected(task.addr_info.peer_id) {
						// wake any join watchers for the peer
						server.emit_event(
							task.addr_info.peer_id,
							PeerEventType::AlreadyConnected,
						);
						continue;
					}

					if let Err(error) = server.inner.host.connect(task.addr_info.clone()).await {
						debug!(addr = %task.addr_info, "failed to dial: {error:#}");
						server.inner.metrics.count(MetricCounter::FailedDials);
						server.emit_event(
							task.addr_info.peer_id,
							PeerEventType::FailedToConnect,
						);
					}
				}

				tokio::select! {
					_ = notify_receiver.recv() => {},
					_ = server.inner.shutdown.triggered_shutdown() => return,
				}
			}
		});

		Ok(())
	}

	/// Periodic peer top-up from the bootstrap set.
	fn run_peer_maintainer(&self) {
		let server = self.clone();
		spawn_in_span(async move {
			let mut tick = tokio::time::interval(PEER_MAINTENANCE_INTERVAL);
			tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
			// the first tick completes immediately; the cadence starts after
			tick.tick().await;

			loop {
				tokio::select! {
					_ = tick.tick() => {},
					_ = server.inner.shutdown.triggered_shutdown() => return,
				}

				server.check_peer_connections();
			}
		});
	}

	fn check_peer_connections(&self) {
		if self.num_peers() as i64 >= MIN_PEER_CONNECTIONS {
			return;
		}

		let has_bootnodes = self
			.inner
			.bootnodes
			.get()
			.is_some_and(BootnodeSet::has_any);

		if self.inner.config.no_discover || !has_bootnodes {
			if self.inner.config.peerstore_top_up {
				// future hook: needs a persistent peerstore to draw
				// candidates from
				debug!("peerstore top-up requested, but no persistent peerstore is available");
			}
			return;
		}

		if let Some(bootnode) = self.get_random_bootnode() {
			self.add_to_dial_queue(&bootnode, DialPriority::RandomDial);
		}
	}

	/// Resolves join watchers from dial outcome events.
	fn run_join_watcher(&self) -> Result<()> {
		let server = self.clone();
		self.subscribe_fn(move |event| {
			if matches!(
				event.event_type,
				PeerEventType::Connected
					| PeerEventType::FailedToConnect
					| PeerEventType::AlreadyConnected
			) {
				server.inner.join_watchers.complete(&event.peer_id);
			}
		})
	}
}

/// Non-owning server handle given to external collaborators (discovery,
/// protocol handlers). Operations become no-ops once the server is gone.
#[derive(Clone)]
pub struct NetworkHandle {
	inner: Weak<ServerInner>,
}

impl NetworkHandle {
	fn upgrade(&self) -> Option<Server> {
		self.inner.upgrade().map(|inner| Server { inner })
	}

	pub fn local_peer_id(&self) -> Option<PeerId> {
		self.upgrade().map(|server| server.inner.host.id())
	}

	pub fn chain_id(&self) -> Option<u64> {
		self.upgrade().map(|server| server.chain_id())
	}

	pub fn add_to_dial_queue(&self, addr_info: &AddrInfo, priority: DialPriority) {
		if let Some(server) = self.upgrade() {
			server.add_to_dial_queue(addr_info, priority);
		}
	}

	pub fn add_to_peer_store(&self, addr_info: &AddrInfo) {
		if let Some(server) = self.upgrade() {
			server.add_to_peer_store(addr_info);
		}
	}

	pub fn peer_info(&self, peer_id: PeerId) -> Option<AddrInfo> {
		self.upgrade().map(|server| server.get_peer_info(peer_id))
	}

	pub fn get_protocols(&self, peer_id: PeerId) -> Vec<String> {
		self.upgrade()
			.map(|server| server.get_protocols(peer_id))
			.unwrap_or_default()
	}

	pub fn get_random_bootnode(&self) -> Option<AddrInfo> {
		self.upgrade().and_then(|server| server.get_random_bootnode())
	}

	pub fn is_bootnode(&self, peer_id: &PeerId) -> bool {
		self.upgrade()
			.is_some_and(|server| server.is_bootnode(peer_id))
	}

	pub fn has_free_outbound_connections(&self) -> bool {
		self.upgrade()
			.is_some_and(|server| server.has_free_outbound_connections())
	}

	pub fn is_connected(&self, peer_id: PeerId) -> bool {
		self.upgrade().is_some_and(|server| server.is_connected(peer_id))
	}

	pub fn fetch_and_set_temporary_dial(&self, peer_id: PeerId, new_value: bool) -> bool {
		self.upgrade()
			.is_some_and(|server| server.fetch_and_set_temporary_dial(peer_id, new_value))
	}

	pub fn has_temporary_dial(&self, peer_id: PeerId) -> bool {
		self.upgrade()
			.is_some_and(|server| server.has_temporary_dial(peer_id))
	}

	pub fn remove_temporary_dial(&self, peer_id: &PeerId) {
		if let Some(server) = self.upgrade() {
			server.remove_temporary_dial(peer_id);
		}
	}

	pub async fn disconnect(&self, peer_id: PeerId, reason: &str) {
		if let Some(server) = self.upgrade() {
			server.disconnect(peer_id, reason).await;
		}
	}
}
