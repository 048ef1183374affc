//! Application-facing client handle.

use std::sync::Arc;
use std::thread;

use linkwire_protocol::Envelope;
use linkwire_transfer::TransferEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::connector::{Connector, TcpConnector};
use crate::error::ClientError;
use crate::reactor::{Command, Reactor};
use crate::shared::Shared;
use crate::types::{ClientConfig, ConnectionState};

const REACTOR_THREAD_NAME: &str = "linkwire-reactor";

/// Handle to a persistent connection.
///
/// Every method is safe to call from any thread. Callbacks run on the
/// reactor thread, one at a time, and may call back into the handle.
/// Dropping the handle shuts the reactor down.
pub struct SocketClient {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<Command>,
    reactor: Option<thread::JoinHandle<()>>,
}

impl SocketClient {
    /// Starts a TCP client on its own reactor thread.
    pub fn start(config: ClientConfig) -> Result<Self, ClientError> {
        Self::start_with(TcpConnector, config)
    }

    /// Starts a client with a custom connector on its own reactor thread.
    pub fn start_with<C: Connector>(connector: C, config: ClientConfig) -> Result<Self, ClientError> {
        let (mut client, reactor) = Self::new(connector, config);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let handle = thread::Builder::new()
            .name(REACTOR_THREAD_NAME.into())
            .spawn(move || runtime.block_on(reactor.run()))?;

        client.reactor = Some(handle);
        Ok(client)
    }

    /// Creates a client and its reactor without starting anything.
    ///
    /// The caller drives the reactor, e.g. `tokio::spawn(reactor.run())`.
    pub fn new<C: Connector>(connector: C, config: ClientConfig) -> (Self, Reactor<C>) {
        let shared = Arc::new(Shared::default());
        let (commands, rx) = mpsc::unbounded_channel();
        let reactor = Reactor::new(connector, config, shared.clone(), rx);

        let client = Self {
            shared,
            commands,
            reactor: None,
        };
        (client, reactor)
    }

    /// Connects to `host:port`.
    ///
    /// An existing connection is closed first (the disconnect callback
    /// fires); a pending attempt is replaced. Failed attempts are retried a
    /// bounded number of times before the client gives up.
    pub fn connect(&self, host: impl Into<String>, port: u16) -> Result<(), ClientError> {
        self.command(Command::Connect {
            host: host.into(),
            port,
        })
    }

    /// Closes the connection and cancels any pending reconnect.
    /// Does nothing when already disconnected.
    pub fn disconnect(&self) {
        if self.command(Command::Disconnect).is_err() {
            debug!("disconnect after reactor stopped");
        }
    }

    /// Queues `envelope` for transmission.
    ///
    /// Fails immediately when not connected, when the envelope has no
    /// type, or when its payload exceeds the maximum message size.
    pub fn send(&self, envelope: &Envelope) -> Result<(), ClientError> {
        self.shared.enqueue(envelope)
    }

    pub fn send_chat(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.send(&Envelope::chat(text))
    }

    /// Asks the server to push every file it has.
    pub fn request_files(&self) -> Result<(), ClientError> {
        self.send(&Envelope::file_request("all"))
    }

    /// Reports network quality. NaN and infinities are rejected, since
    /// the server expects a JSON number.
    pub fn send_network_quality(&self, quality: f64) -> Result<(), ClientError> {
        if !quality.is_finite() {
            warn!(quality, "refusing to send non-finite network quality");
            return Err(ClientError::NonFiniteQuality(quality));
        }
        self.send(&Envelope::network_quality(quality))
    }

    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn set_on_connect(&self, f: impl Fn() + Send + Sync + 'static) {
        self.shared.callbacks.set_on_connect(Arc::new(f));
    }

    pub fn set_on_disconnect(&self, f: impl Fn() + Send + Sync + 'static) {
        self.shared.callbacks.set_on_disconnect(Arc::new(f));
    }

    /// Called with every decoded inbound envelope, including file-transfer
    /// ones.
    pub fn set_on_receive(&self, f: impl Fn(&Envelope) + Send + Sync + 'static) {
        self.shared.callbacks.set_on_receive(Arc::new(f));
    }

    /// Called with the payload length after each message is fully written.
    pub fn set_on_send_complete(&self, f: impl Fn(usize) + Send + Sync + 'static) {
        self.shared.callbacks.set_on_send_complete(Arc::new(f));
    }

    pub fn set_on_transfer(&self, f: impl Fn(&TransferEvent) + Send + Sync + 'static) {
        self.shared.callbacks.set_on_transfer(Arc::new(f));
    }

    /// Disconnects and waits for the reactor thread to exit.
    ///
    /// When called from a callback the reactor is told to stop but not
    /// awaited.
    pub fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.reactor.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("reactor thread panicked");
            }
        }
    }

    fn command(&self, command: Command) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::ReactorStopped)
    }
}

impl Drop for SocketClient {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}
