//! Connection state machine.
//!
//! The [`Reactor`] owns the socket for its whole life. It consumes commands
//! from the [`SocketClient`](crate::SocketClient) handle, runs the bounded
//! reconnect loop when a connect attempt fails, and supervises the read,
//! write and heartbeat pumps of an established connection.
//!
//! A failure on an established connection ends it without reconnecting;
//! only failed connect attempts are retried.

use std::path::PathBuf;
use std::sync::Arc;

use linkwire_transfer::Reassembler;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connector::{Connector, TcpConnector};
use crate::dispatch::Dispatcher;
use crate::pumps::SessionFault;
use crate::pumps::heartbeat::heartbeat_pump;
use crate::pumps::read::read_pump;
use crate::pumps::write::write_pump;
use crate::shared::Shared;
use crate::types::{ClientConfig, ConnectionState};

/// Requests from the client handle.
#[derive(Debug)]
pub(crate) enum Command {
    Connect { host: String, port: u16 },
    Disconnect,
    Shutdown,
}

enum SessionEnd {
    Command(Option<Command>),
    Fault(SessionFault),
}

/// Drives one client's connection. Obtain one from
/// [`SocketClient::new`](crate::SocketClient::new) and run it on a tokio
/// runtime with [`Reactor::run`].
pub struct Reactor<C: Connector = TcpConnector> {
    connector: C,
    config: ClientConfig,
    download_dir: PathBuf,
    shared: Arc<Shared>,
    commands: mpsc::UnboundedReceiver<Command>,
    sessions: u64,
}

impl<C: Connector> Reactor<C> {
    pub(crate) fn new(
        connector: C,
        config: ClientConfig,
        shared: Arc<Shared>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        let download_dir = config.resolve_download_dir();
        Self {
            connector,
            config,
            download_dir,
            shared,
            commands,
            sessions: 0,
        }
    }

    /// Processes commands until the client shuts down or is dropped.
    pub async fn run(mut self) {
        debug!(download_dir = %self.download_dir.display(), "reactor started");
        let mut next = None;

        loop {
            let command = match next.take() {
                Some(command) => command,
                None => match self.commands.recv().await {
                    Some(command) => command,
                    None => break,
                },
            };

            match command {
                Command::Connect { host, port } => next = self.connect_cycle(host, port).await,
                Command::Disconnect => debug!("disconnect requested while already disconnected"),
                Command::Shutdown => break,
            }
        }

        self.enter_disconnected();
        debug!("reactor stopped");
    }

    /// One initial attempt plus up to `max_reconnect_attempts` retries.
    ///
    /// Returns a command that interrupted the cycle and still needs handling.
    async fn connect_cycle(&mut self, host: String, port: u16) -> Option<Command> {
        let mut attempt: u32 = 0;

        loop {
            if attempt == 0 {
                self.shared.set_state(ConnectionState::Connecting);
                info!(%host, port, "connecting");
            } else {
                info!(%host, port, attempt, max = self.config.max_reconnect_attempts, "reconnecting");
            }

            let outcome = tokio::select! {
                biased;
                command = self.commands.recv() => Err(command),
                result = self.connector.connect(&host, port) => Ok(result),
            };
            let result = match outcome {
                Ok(result) => result,
                Err(command) => return self.interrupt(command),
            };

            match result {
                Ok(stream) => return self.run_session(stream, &host, port).await,
                Err(e) => warn!(%host, port, error = %e, "connection failed"),
            }

            if attempt >= self.config.max_reconnect_attempts {
                warn!(%host, port, attempts = attempt, "reconnect attempts exhausted, giving up");
                self.enter_disconnected();
                return None;
            }

            attempt += 1;
            self.shared
                .set_state(ConnectionState::Reconnecting { attempt });
            debug!(
                attempt,
                delay_ms = self.config.reconnect_delay.as_millis() as u64,
                "scheduling reconnect"
            );

            let interrupted = tokio::select! {
                biased;
                command = self.commands.recv() => Some(command),
                _ = tokio::time::sleep(self.config.reconnect_delay) => None,
            };
            if let Some(command) = interrupted {
                return self.interrupt(command);
            }
        }
    }

    /// Runs an established connection until a pump faults or a command
    /// ends it.
    async fn run_session(&mut self, stream: C::Stream, host: &str, port: u16) -> Option<Command> {
        self.sessions += 1;
        let session = self.sessions;

        let (reader, writer) = tokio::io::split(stream);
        let cancel = CancellationToken::new();
        let (fault_tx, mut fault_rx) = mpsc::channel(2);

        self.shared.queue.open(session);
        self.shared.set_state(ConnectionState::Connected);
        info!(%host, port, session, "connected");
        self.shared.callbacks.connected();

        let dispatcher = Dispatcher::new(
            self.shared.clone(),
            Reassembler::new(self.download_dir.clone()),
        );
        tokio::spawn(read_pump(reader, dispatcher, fault_tx.clone(), cancel.clone()));
        tokio::spawn(write_pump(
            writer,
            self.shared.clone(),
            session,
            fault_tx,
            cancel.clone(),
        ));
        tokio::spawn(heartbeat_pump(
            self.shared.clone(),
            self.config.heartbeat_interval,
            cancel.clone(),
        ));

        let end = tokio::select! {
            command = self.commands.recv() => SessionEnd::Command(command),
            Some(fault) = fault_rx.recv() => SessionEnd::Fault(fault),
        };
        cancel.cancel();

        match end {
            SessionEnd::Fault(fault) => {
                warn!(%host, port, session, reason = %fault, "connection lost");
                self.enter_disconnected();
                None
            }
            SessionEnd::Command(command) => self.interrupt(command),
        }
    }

    /// Applies a command that arrived while connecting, waiting to
    /// reconnect, or connected.
    fn interrupt(&mut self, command: Option<Command>) -> Option<Command> {
        match command {
            Some(Command::Disconnect) => {
                info!("disconnect requested");
                self.enter_disconnected();
                None
            }
            Some(connect @ Command::Connect { .. }) => {
                // A live connection is torn down fully; a pending attempt
                // is simply superseded.
                if self.shared.state() == ConnectionState::Connected {
                    self.enter_disconnected();
                }
                Some(connect)
            }
            Some(Command::Shutdown) | None => {
                self.enter_disconnected();
                Some(Command::Shutdown)
            }
        }
    }

    /// Moves to `Disconnected`, firing the disconnect callback only when
    /// this is an actual transition.
    fn enter_disconnected(&self) {
        let dropped = self.shared.queue.close();
        let previous = self.shared.set_state(ConnectionState::Disconnected);

        if dropped > 0 {
            debug!(dropped, "discarded unsent messages");
        }
        if previous != ConnectionState::Disconnected {
            info!("disconnected");
            self.shared.callbacks.disconnected();
        }
    }
}
