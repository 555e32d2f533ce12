//! # Middleman - In-Process Network Coordinator
//!
//! The middleman owns every published listener. Actors never touch sockets
//! themselves; they send a request tuple to the middleman and await a single
//! reply tuple.
//!
//! ```text
//! caller task                     middleman task
//! ───────────                     ──────────────
//! request(tuple) ──Envelope──▶    mailbox.recv()
//!      │                              │ match shape
//!      │                              │ bind / release
//!   await ◀────── reply tuple ──── reply_to.send()
//! ```
//!
//! [`MiddlemanHandle`] is the injected dependency: any task holding one can
//! talk to the coordinator, and tests can answer requests themselves through
//! the raw mailbox returned by [`MiddlemanHandle::channel`].
//!
//! Requests served by [`Middleman`]:
//!
//! | Request                                   | Reply                                      |
//! |-------------------------------------------|--------------------------------------------|
//! | `(put, ActorId, u16, String, bool)`       | `(ok, u16)` bound port / `(error, String)` |
//! | `(delete, ActorId, u16)`                  | `(ok, u16)` released port / `(error, String)` |
//! | anything else                             | `(error, String)`                          |

use crate::config::NetworkConfig;
use crate::error::{Result, TransportError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use types::{ActorId, AnyTuple, Atom, TupleView, DELETE_ATOM, ERROR_ATOM, OK_ATOM, PUT_ATOM};

/// Address used when a publish request leaves the interface blank
pub const ALL_INTERFACES: &str = "0.0.0.0";

const LISTEN_BACKLOG: u32 = 1024;

/// A request and the slot its single reply goes to
#[derive(Debug)]
pub struct Envelope {
    pub request: AnyTuple,
    pub reply_to: oneshot::Sender<AnyTuple>,
}

impl Envelope {
    /// Answer the request; a requester that stopped waiting is not an error
    pub fn reply(self, reply: AnyTuple) {
        if self.reply_to.send(reply).is_err() {
            debug!("Requester dropped before the middleman replied");
        }
    }
}

/// Cloneable handle to the network coordinator
#[derive(Debug, Clone)]
pub struct MiddlemanHandle {
    sender: mpsc::Sender<Envelope>,
}

impl MiddlemanHandle {
    /// Create a handle and the mailbox it feeds
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Envelope>) {
        let (sender, mailbox) = mpsc::channel(capacity);
        (Self { sender }, mailbox)
    }

    /// Wrap an existing mailbox sender
    pub fn from_sender(sender: mpsc::Sender<Envelope>) -> Self {
        Self { sender }
    }

    /// True when the coordinator mailbox has been closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send `request` and suspend until the coordinator replies
    ///
    /// `timeout` bounds the whole exchange, including waiting for mailbox
    /// capacity. `None` waits indefinitely.
    pub async fn request(&self, request: AnyTuple, timeout: Option<Duration>) -> Result<AnyTuple> {
        let (reply_to, reply) = oneshot::channel();
        let exchange = async {
            self.sender
                .send(Envelope { request, reply_to })
                .await
                .map_err(|_| TransportError::connection("Middleman mailbox is closed"))?;
            reply
                .await
                .map_err(|_| TransportError::connection("Middleman dropped the request"))
        };

        match timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| TransportError::timeout("middleman request", saturating_millis(limit)))?,
            None => exchange.await,
        }
    }
}

/// Handle to a running middleman task
#[derive(Debug)]
pub struct Middleman {
    published: Arc<Mutex<HashMap<SocketAddr, ActorId>>>,
    task: JoinHandle<()>,
}

impl Middleman {
    /// Spawn the coordinator on the current tokio runtime
    ///
    /// The task stops once every [`MiddlemanHandle`] has been dropped,
    /// closing all listeners it still owns.
    pub fn spawn(config: &NetworkConfig) -> Result<(MiddlemanHandle, Middleman)> {
        config.validate()?;
        let (handle, mailbox) = MiddlemanHandle::channel(config.mailbox_capacity);
        let published = Arc::new(Mutex::new(HashMap::new()));
        let task = tokio::spawn(Self::run(mailbox, Arc::clone(&published)));

        info!(capacity = config.mailbox_capacity, "Middleman started");
        Ok((handle, Middleman { published, task }))
    }

    /// Snapshot of published listener addresses and the actors behind them
    pub fn published(&self) -> HashMap<SocketAddr, ActorId> {
        self.published.lock().clone()
    }

    /// Actors published on `port`, on any interface, ordered by address
    pub fn owners(&self, port: u16) -> Vec<ActorId> {
        let table = self.published.lock();
        let mut owners: Vec<(SocketAddr, ActorId)> = table
            .iter()
            .filter(|(addr, _)| addr.port() == port)
            .map(|(addr, whom)| (*addr, *whom))
            .collect();
        owners.sort_by_key(|(addr, _)| *addr);
        owners.into_iter().map(|(_, whom)| whom).collect()
    }

    /// True once the coordinator task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the coordinator task to exit
    pub async fn join(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| TransportError::connection(format!("Middleman task failed: {}", e)))
    }

    async fn run(mut mailbox: mpsc::Receiver<Envelope>, published: Arc<Mutex<HashMap<SocketAddr, ActorId>>>) {
        let mut listeners: HashMap<SocketAddr, TcpListener> = HashMap::new();

        while let Some(envelope) = mailbox.recv().await {
            let reply = Self::serve(&envelope.request, &mut listeners, &published).await;
            envelope.reply(reply);
        }

        published.lock().clear();
        info!(closed = listeners.len(), "Middleman stopped");
    }

    async fn serve(
        request: &AnyTuple,
        listeners: &mut HashMap<SocketAddr, TcpListener>,
        published: &Mutex<HashMap<SocketAddr, ActorId>>,
    ) -> AnyTuple {
        if let Some(put) = request.downcast::<(Atom, ActorId, u16, String, bool)>() {
            if *put.get::<0>() == PUT_ATOM {
                return Self::serve_put(&put, listeners, published).await;
            }
        }

        if let Some(delete) = request.downcast::<(Atom, ActorId, u16)>() {
            if *delete.get::<0>() == DELETE_ATOM {
                return Self::serve_delete(&delete, listeners, published);
            }
        }

        warn!(request = ?request, "Middleman received unexpected request");
        AnyTuple::from_values((ERROR_ATOM, format!("unexpected request: {:?}", request)))
    }

    async fn serve_put(
        put: &TupleView<(Atom, ActorId, u16, String, bool)>,
        listeners: &mut HashMap<SocketAddr, TcpListener>,
        published: &Mutex<HashMap<SocketAddr, ActorId>>,
    ) -> AnyTuple {
        let whom = *put.get::<1>();
        let port = *put.get::<2>();
        let host = put.get::<3>().as_str();
        let reuse_addr = *put.get::<4>();

        match bind_listener(host, port, reuse_addr).await {
            Ok(listener) => match listener.local_addr() {
                Ok(addr) => {
                    if listeners.contains_key(&addr) {
                        warn!(actor = %whom, %addr, "Address already published");
                        return AnyTuple::from_values((
                            ERROR_ATOM,
                            format!("address {} is already published", addr),
                        ));
                    }
                    info!(actor = %whom, %addr, reuse_addr, "Published actor");
                    listeners.insert(addr, listener);
                    published.lock().insert(addr, whom);
                    AnyTuple::from_values((OK_ATOM, addr.port()))
                }
                Err(e) => AnyTuple::from_values((ERROR_ATOM, e.to_string())),
            },
            Err(e) => {
                warn!(actor = %whom, host, port, error = %e, "Publish failed");
                AnyTuple::from_values((ERROR_ATOM, e.to_string()))
            }
        }
    }

    fn serve_delete(
        delete: &TupleView<(Atom, ActorId, u16)>,
        listeners: &mut HashMap<SocketAddr, TcpListener>,
        published: &Mutex<HashMap<SocketAddr, ActorId>>,
    ) -> AnyTuple {
        let whom = *delete.get::<1>();
        let port = *delete.get::<2>();

        let mut table = published.lock();
        let owned: Vec<SocketAddr> = table
            .iter()
            .filter(|(addr, owner)| addr.port() == port && **owner == whom)
            .map(|(addr, _)| *addr)
            .collect();
        if owned.is_empty() {
            debug!(actor = %whom, port, "Unpublish of a port the actor does not own");
            return AnyTuple::from_values((
                ERROR_ATOM,
                format!("port {} is not published by {}", port, whom),
            ));
        }

        // Listeners of other actors sharing the port number stay bound
        for addr in &owned {
            table.remove(addr);
            listeners.remove(addr);
            info!(actor = %whom, %addr, "Unpublished actor");
        }
        AnyTuple::from_values((OK_ATOM, port))
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Bind and listen on `host:port`, all interfaces when `host` is empty
async fn bind_listener(host: &str, port: u16, reuse_addr: bool) -> io::Result<TcpListener> {
    let host = if host.is_empty() { ALL_INTERFACES } else { host };
    let addr: SocketAddr = tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address found for {}", host),
            )
        })?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(reuse_addr)?;
    socket.bind(addr)?;
    trace!(%addr, reuse_addr, "Socket bound");
    socket.listen(LISTEN_BACKLOG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_reply_through_raw_mailbox() {
        let (handle, mut mailbox) = MiddlemanHandle::channel(4);
        tokio::spawn(async move {
            if let Some(envelope) = mailbox.recv().await {
                let echoed = envelope.request.clone();
                envelope.reply(echoed);
            }
        });

        let reply = handle
            .request(AnyTuple::from_values((OK_ATOM, 7u16)), None)
            .await
            .unwrap();
        assert_eq!(reply, AnyTuple::from_values((OK_ATOM, 7u16)));
    }

    #[tokio::test]
    async fn test_closed_mailbox_is_connection_error() {
        let (handle, mailbox) = MiddlemanHandle::channel(1);
        drop(mailbox);
        assert!(handle.is_closed());

        let err = handle
            .request(AnyTuple::from_values((PUT_ATOM,)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_dropped_reply_is_connection_error() {
        let (handle, mut mailbox) = MiddlemanHandle::channel(1);
        tokio::spawn(async move {
            let envelope = mailbox.recv().await;
            drop(envelope);
        });

        let err = handle
            .request(AnyTuple::from_values((PUT_ATOM,)), Some(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_silent_coordinator_times_out() {
        let (handle, _mailbox) = MiddlemanHandle::channel(1);
        let err = handle
            .request(AnyTuple::from_values((PUT_ATOM,)), Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout { timeout_ms: 20, .. }));
    }

    #[test]
    fn test_saturating_millis() {
        assert_eq!(saturating_millis(Duration::from_millis(250)), 250);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_unexpected_request_gets_error_reply() {
        let (handle, middleman) = Middleman::spawn(&NetworkConfig::default()).unwrap();
        let reply = handle
            .request(AnyTuple::from_values((Atom::new("ping"), 1u8)), None)
            .await
            .unwrap();

        let error: TupleView<(Atom, String)> = reply.downcast().unwrap();
        assert_eq!(*error.get::<0>(), ERROR_ATOM);
        assert!(error.get::<1>().starts_with("unexpected request"));
        assert!(middleman.published().is_empty());
    }

    #[tokio::test]
    async fn test_put_with_wrong_tag_is_unexpected() {
        let (handle, middleman) = Middleman::spawn(&NetworkConfig::default()).unwrap();
        let request = AnyTuple::from_values((OK_ATOM, ActorId::new(), 0u16, String::new(), false));
        let reply = handle.request(request, None).await.unwrap();

        assert_eq!(reply.get_as::<Atom>(0), Some(&ERROR_ATOM));
        assert!(middleman.published().is_empty());
    }

    #[tokio::test]
    async fn test_stops_when_handles_dropped() {
        let (handle, middleman) = Middleman::spawn(&NetworkConfig::default()).unwrap();
        let second = handle.clone();
        drop(handle);
        drop(second);

        middleman.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_spawn_rejects_invalid_config() {
        let config = NetworkConfig {
            mailbox_capacity: 0,
            ..NetworkConfig::default()
        };
        assert!(matches!(
            Middleman::spawn(&config),
            Err(TransportError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_bind_listener_resolves_loopback() {
        let listener = bind_listener("127.0.0.1", 0, true).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }
}
