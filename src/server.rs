//! TCP game server and its event loop.
//!
//! Background tasks only read: one accepts connections, one receives
//! discovery probes, and one per connection reads bytes. They forward what
//! they see over a single channel to the loop task, which owns the
//! [`SessionPool`] and every write half, so session state is never shared.

use crate::config::ServerConfig;
use crate::discovery;
use crate::error::ServerError;
use crate::machine::{self, Action};
use crate::pool::SessionPool;
use crate::session::SessionId;
use crate::supervisor::{self, TimeoutPolicy};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};
use tracing::{debug, error, info, instrument, trace, warn};

const EVENT_QUEUE: usize = 256;
const READ_CHUNK: usize = 512;

/// Something a background task saw.
#[derive(Debug)]
enum LoopEvent {
    Probe {
        payload: Vec<u8>,
        from: SocketAddr,
    },
    Connection {
        stream: TcpStream,
        peer: SocketAddr,
    },
    Data {
        slot: SessionId,
        generation: u64,
        bytes: Vec<u8>,
    },
    Disconnected {
        slot: SessionId,
        generation: u64,
    },
}

/// Transport bound to a session slot.
///
/// Dropping it stops the reader task and closes the write half.
#[derive(Debug)]
struct Connection {
    writer: OwnedWriteHalf,
    reader: JoinHandle<()>,
    generation: u64,
    peer: SocketAddr,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Bound, not yet running, game server.
#[derive(Debug)]
pub struct GameServer {
    config: ServerConfig,
    listener: TcpListener,
    discovery: Option<UdpSocket>,
    local_addr: SocketAddr,
}

impl GameServer {
    /// Binds the TCP listener and, if enabled, joins the discovery group.
    #[instrument(skip(config), fields(port = config.port()))]
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, *config.port()))
            .await
            .map_err(|e| ServerError::new(format!("Failed to bind TCP port: {}", e)))?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "Listening for clients");

        let discovery = if *config.discovery().enabled() {
            let group = *config.discovery().group();
            let interface = *config.discovery().interface();
            let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, *config.discovery().port()))
                .await
                .map_err(|e| ServerError::new(format!("Failed to bind discovery port: {}", e)))?;
            socket
                .join_multicast_v4(group, interface)
                .map_err(|e| ServerError::new(format!("Failed to join {}: {}", group, e)))?;
            info!(
                %group,
                %interface,
                port = config.discovery().port(),
                "Answering discovery probes"
            );
            Some(socket)
        } else {
            debug!("Discovery disabled");
            None
        };

        Ok(Self {
            config,
            listener,
            discovery,
            local_addr,
        })
    }

    /// Address the TCP listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the event loop with an entropy-seeded move generator.
    ///
    /// Only returns on a fatal error.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_rng(StdRng::from_entropy()).await
    }

    /// Runs the event loop with the given move generator.
    #[instrument(skip_all, fields(addr = %self.local_addr))]
    pub async fn run_with_rng(self, rng: StdRng) -> Result<(), ServerError> {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE);

        let discovery = self.discovery.map(Arc::new);
        if let Some(socket) = &discovery {
            tokio::spawn(receive_probes(Arc::clone(socket), tx.clone()));
        }
        tokio::spawn(accept_connections(self.listener, tx.clone()));

        let mut event_loop = EventLoop {
            pool: SessionPool::new(*self.config.pool_size()),
            policy: self.config.timeout_policy(),
            poll_interval: self.config.poll_interval(),
            port: self.local_addr.port(),
            discovery,
            tx,
            rng,
            next_generation: 0,
        };
        info!(pool_size = event_loop.pool.capacity(), "Server ready");
        event_loop.run(rx).await
    }
}

/// State owned by the loop task.
struct EventLoop {
    pool: SessionPool<Connection>,
    policy: TimeoutPolicy,
    poll_interval: Duration,
    port: u16,
    discovery: Option<Arc<UdpSocket>>,
    tx: mpsc::Sender<LoopEvent>,
    rng: StdRng,
    next_generation: u64,
}

impl EventLoop {
    async fn run(&mut self, mut rx: mpsc::Receiver<LoopEvent>) -> Result<(), ServerError> {
        let mut last = Instant::now();
        loop {
            let mut events = Vec::new();
            match timeout(self.poll_interval, rx.recv()).await {
                Ok(Some(event)) => events.push(event),
                Ok(None) => return Err(ServerError::new("Event channel closed")),
                Err(_) => trace!("Poll interval elapsed with no activity"),
            }
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }

            let now = Instant::now();
            let elapsed = now - last;
            last = now;
            self.iterate(events, elapsed).await;
        }
    }

    /// One pass over everything that happened since the last pass.
    async fn iterate(&mut self, events: Vec<LoopEvent>, elapsed: Duration) {
        let mut probes = Vec::new();
        let mut connections = Vec::new();
        let mut session_events = Vec::new();
        for event in events {
            match event {
                LoopEvent::Probe { payload, from } => probes.push((payload, from)),
                LoopEvent::Connection { stream, peer } => connections.push((stream, peer)),
                LoopEvent::Data { slot, .. } | LoopEvent::Disconnected { slot, .. } => {
                    session_events.push((slot, event))
                }
            }
        }

        for (payload, from) in probes {
            self.answer_probe(&payload, from).await;
        }

        for (stream, peer) in connections {
            self.accept(stream, peer);
        }

        supervisor::advance_idle(&mut self.pool, elapsed);

        session_events.sort_by_key(|(slot, _)| *slot);
        for (_, event) in session_events {
            self.session_event(event).await;
        }

        for (slot, action) in supervisor::sweep(&mut self.pool, &self.policy) {
            self.apply(slot, action).await;
        }
    }

    async fn answer_probe(&self, payload: &[u8], from: SocketAddr) {
        let Some(socket) = &self.discovery else {
            return;
        };
        let Some(reply) = discovery::respond(payload, self.pool.has_free_slot(), self.port) else {
            return;
        };
        match socket.send_to(&reply, from).await {
            Ok(_) => debug!(%from, "Answered discovery probe"),
            Err(e) => warn!(%from, error = %e, "Failed to answer discovery probe"),
        }
    }

    #[instrument(skip(self, stream))]
    fn accept(&mut self, stream: TcpStream, peer: SocketAddr) {
        let Some(slot) = self.pool.free_slot() else {
            warn!("Session pool full, closing new connection");
            return;
        };

        let generation = self.next_generation;
        self.next_generation += 1;

        let (read_half, writer) = stream.into_split();
        let reader = tokio::spawn(read_connection(read_half, slot, generation, self.tx.clone()));
        let connection = Connection {
            writer,
            reader,
            generation,
            peer,
        };

        match self.pool.attach(connection) {
            Ok(id) => info!(session_id = id, "Client connected"),
            Err(connection) => {
                warn!(peer = %connection.peer, "Lost free slot, closing new connection")
            }
        }
    }

    async fn session_event(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::Data {
                slot,
                generation,
                bytes,
            } => {
                if !self.is_current(slot, generation) {
                    trace!(session_id = slot, "Dropping bytes from a closed connection");
                    return;
                }
                let Some(session) = self.pool.session_mut(slot) else {
                    return;
                };
                session.idle = Duration::ZERO;
                let actions = machine::process_bytes(session, &bytes, &mut self.rng);
                for action in actions {
                    self.apply(slot, action).await;
                }
            }
            LoopEvent::Disconnected { slot, generation } => {
                if self.is_current(slot, generation) {
                    info!(session_id = slot, "Client disconnected");
                    self.pool.release(slot);
                }
            }
            LoopEvent::Probe { .. } | LoopEvent::Connection { .. } => {}
        }
    }

    fn is_current(&self, slot: SessionId, generation: u64) -> bool {
        self.pool
            .transport(slot)
            .is_some_and(|c| c.generation == generation)
    }

    async fn apply(&mut self, slot: SessionId, action: Action) {
        match action {
            Action::Reply(msg) => {
                let Some(connection) = self.pool.transport_mut(slot) else {
                    debug!(session_id = slot, %msg, "Session closed, reply not sent");
                    return;
                };
                trace!(session_id = slot, %msg, "SENT");
                let encoded = msg.encode();
                let write = connection.writer.write_all(&encoded);
                match timeout(self.poll_interval, write).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        warn!(session_id = slot, error = %e, "Write failed, releasing session");
                        self.pool.release(slot);
                    }
                    Err(_) => {
                        warn!(session_id = slot, "Client is not reading, releasing session");
                        self.pool.release(slot);
                    }
                }
            }
            Action::Close => {
                if let Some(connection) = self.pool.release(slot) {
                    info!(session_id = slot, peer = %connection.peer, "Closed session");
                }
            }
            Action::Nothing => {}
        }
    }
}

async fn accept_connections(listener: TcpListener, tx: mpsc::Sender<LoopEvent>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "Accepted TCP connection");
                if tx.send(LoopEvent::Connection { stream, peer }).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                error!(error = %e, "Accept failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

async fn receive_probes(socket: Arc<UdpSocket>, tx: mpsc::Sender<LoopEvent>) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match socket.recv_from(&mut buf).await {
            Ok((len, from)) => {
                trace!(%from, len, "Discovery datagram");
                let probe = LoopEvent::Probe {
                    payload: buf[..len].to_vec(),
                    from,
                };
                if tx.send(probe).await.is_err() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "Discovery receive failed"),
        }
    }
}

async fn read_connection(
    mut reader: OwnedReadHalf,
    slot: SessionId,
    generation: u64,
    tx: mpsc::Sender<LoopEvent>,
) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let event = match reader.read(&mut buf).await {
            Ok(0) => LoopEvent::Disconnected { slot, generation },
            Ok(len) => LoopEvent::Data {
                slot,
                generation,
                bytes: buf[..len].to_vec(),
            },
            Err(e) => {
                debug!(session_id = slot, error = %e, "Read failed");
                LoopEvent::Disconnected { slot, generation }
            }
        };
        let done = matches!(event, LoopEvent::Disconnected { .. });
        if tx.send(event).await.is_err() || done {
            return;
        }
    }
}
