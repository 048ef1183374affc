//! In-memory connector and callback recorder for reactor tests.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use linkwire_protocol::Envelope;
use linkwire_transfer::TransferEvent;
use tempfile::TempDir;
use tokio::io::DuplexStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::client::SocketClient;
use crate::connector::Connector;
use crate::types::ClientConfig;

/// Fails the first `failures` attempts, then hands out duplex pipes whose
/// server ends arrive on [`MockHandle::servers`].
pub(crate) struct MockConnector {
    failures: AtomicU32,
    capacity: usize,
    attempts: Arc<Mutex<Vec<Instant>>>,
    servers: mpsc::UnboundedSender<DuplexStream>,
}

pub(crate) struct MockHandle {
    attempts: Arc<Mutex<Vec<Instant>>>,
    pub(crate) servers: mpsc::UnboundedReceiver<DuplexStream>,
}

impl MockHandle {
    /// Times at which connect attempts were made.
    pub(crate) fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }
}

pub(crate) fn mock_connector(failures: u32) -> (MockConnector, MockHandle) {
    mock_connector_with_capacity(failures, 256 * 1024)
}

/// Like [`mock_connector`], with pipes that buffer at most `capacity`
/// bytes in each direction.
pub(crate) fn mock_connector_with_capacity(
    failures: u32,
    capacity: usize,
) -> (MockConnector, MockHandle) {
    let attempts = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = mpsc::unbounded_channel();
    let connector = MockConnector {
        failures: AtomicU32::new(failures),
        capacity,
        attempts: attempts.clone(),
        servers: tx,
    };
    (connector, MockHandle { attempts, servers: rx })
}

impl Connector for MockConnector {
    type Stream = DuplexStream;

    async fn connect(&self, _host: &str, _port: u16) -> io::Result<DuplexStream> {
        self.attempts.lock().unwrap().push(Instant::now());

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(io::ErrorKind::ConnectionRefused.into());
        }

        let (client, server) = tokio::io::duplex(self.capacity);
        let _ = self.servers.send(server);
        Ok(client)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Connected,
    Disconnected,
    Received(Envelope),
    SendComplete(usize),
    Transfer(TransferEvent),
}

/// Records every callback invocation in order.
#[derive(Clone, Default)]
pub(crate) struct Recorder(Arc<Mutex<Vec<Event>>>);

impl Recorder {
    pub(crate) fn attach(client: &SocketClient) -> Self {
        let rec = Self::default();

        let r = rec.clone();
        client.set_on_connect(move || r.push(Event::Connected));
        let r = rec.clone();
        client.set_on_disconnect(move || r.push(Event::Disconnected));
        let r = rec.clone();
        client.set_on_receive(move |env| r.push(Event::Received(env.clone())));
        let r = rec.clone();
        client.set_on_send_complete(move |n| r.push(Event::SendComplete(n)));
        let r = rec.clone();
        client.set_on_transfer(move |ev| r.push(Event::Transfer(ev.clone())));

        rec
    }

    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    pub(crate) fn received(&self) -> Vec<Envelope> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Received(env) => Some(env),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn sent(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::SendComplete(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn transfers(&self) -> Vec<TransferEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Transfer(ev) => Some(ev),
                _ => None,
            })
            .collect()
    }
}

/// Builds a client over `connector` and spawns its reactor on the current
/// runtime. Downloads go to the returned temp dir.
pub(crate) fn start(
    connector: MockConnector,
) -> (SocketClient, Recorder, JoinHandle<()>, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = ClientConfig {
        download_dir: Some(dir.path().to_path_buf()),
        ..ClientConfig::default()
    };
    let (client, reactor) = SocketClient::new(connector, config);
    let rec = Recorder::attach(&client);
    let handle = tokio::spawn(reactor.run());
    (client, rec, handle, dir)
}

/// Lets every runnable task make progress.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
