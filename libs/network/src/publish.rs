//! # Publish Protocol
//!
//! Makes an actor reachable on a TCP port by asking the middleman to bind a
//! listener for it. One request, one reply:
//!
//! ```text
//! (put, ActorId, port: u16, bind: String, reuse_addr: bool)
//!     ──▶ (ok, bound_port: u16)        publish succeeded
//!     ──▶ (error, message: String)     publish failed, message verbatim
//! ```
//!
//! Port `0` asks the coordinator to pick a free port; the port it actually
//! bound comes back in the `ok` reply. An empty bind text means all
//! interfaces.
//!
//! `unpublish` is the inverse exchange:
//!
//! ```text
//! (delete, ActorId, port: u16)
//!     ──▶ (ok, released_port: u16) | (error, message: String)
//! ```
//!
//! Any other reply shape is a protocol violation and surfaces as
//! [`TransportError::Protocol`].

use crate::config::NetworkConfig;
use crate::error::{Result, TransportError};
use crate::middleman::MiddlemanHandle;
use std::fmt;
use tracing::{debug, info, trace, warn};
use types::{ActorId, AnyTuple, Atom, TupleView, DELETE_ATOM, ERROR_ATOM, OK_ATOM, PUT_ATOM};

/// Request to make `whom` reachable on `port`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Actor to expose
    pub whom: ActorId,
    /// Requested port, `0` for any free port
    pub port: u16,
    /// Interface to bind, `None` for all interfaces
    pub bind: Option<String>,
    /// Set `SO_REUSEADDR` on the listening socket
    pub reuse_addr: bool,
}

impl PublishRequest {
    /// Request on all interfaces without address reuse
    pub fn new(whom: ActorId, port: u16) -> Self {
        Self {
            whom,
            port,
            bind: None,
            reuse_addr: false,
        }
    }

    /// Request using the configured default interface and reuse flag
    pub fn with_config(whom: ActorId, port: u16, config: &NetworkConfig) -> Self {
        Self {
            whom,
            port,
            bind: config.default_bind.clone(),
            reuse_addr: config.reuse_addr,
        }
    }

    /// Bind a specific interface
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = Some(bind.into());
        self
    }

    /// Set the address reuse flag
    pub fn with_reuse_addr(mut self, reuse_addr: bool) -> Self {
        self.reuse_addr = reuse_addr;
        self
    }

    /// Wire tuple `(put, ActorId, u16, String, bool)`
    pub fn into_tuple(self) -> AnyTuple {
        AnyTuple::from_values((
            PUT_ATOM,
            self.whom,
            self.port,
            self.bind.unwrap_or_default(),
            self.reuse_addr,
        ))
    }

    /// Recover a request from its wire tuple
    pub fn from_tuple(tuple: &AnyTuple) -> Option<Self> {
        let put: TupleView<(Atom, ActorId, u16, String, bool)> = tuple.downcast()?;
        if *put.get::<0>() != PUT_ATOM {
            return None;
        }
        let bind = put.get::<3>();
        Some(Self {
            whom: *put.get::<1>(),
            port: *put.get::<2>(),
            bind: if bind.is_empty() { None } else { Some(bind.clone()) },
            reuse_addr: *put.get::<4>(),
        })
    }
}

/// Coordinator answer to a publish or unpublish request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishReply {
    /// The port actually bound, or released
    Ok(u16),
    /// Coordinator failure text
    Error(String),
}

impl PublishReply {
    /// Classify a reply tuple
    ///
    /// Only `(ok, u16)` with a non-zero port and `(error, String)` are
    /// accepted. Port 0 requests auto-assignment and is never a bound port.
    pub fn from_tuple(reply: &AnyTuple) -> Result<Self> {
        if let Some(ok) = reply.downcast::<(Atom, u16)>() {
            if *ok.get::<0>() == OK_ATOM {
                return match *ok.get::<1>() {
                    0 => Err(TransportError::protocol(
                        "middleman reported success with port 0",
                    )),
                    port => Ok(Self::Ok(port)),
                };
            }
        }

        if let Some(error) = reply.downcast::<(Atom, String)>() {
            if *error.get::<0>() == ERROR_ATOM {
                return Ok(Self::Error(error.get::<1>().clone()));
            }
        }

        Err(TransportError::protocol(format!(
            "unexpected reply from middleman: {:?}",
            reply
        )))
    }

    /// Wire tuple `(ok, u16)` or `(error, String)`
    pub fn into_tuple(self) -> AnyTuple {
        match self {
            Self::Ok(port) => AnyTuple::from_values((OK_ATOM, port)),
            Self::Error(message) => AnyTuple::from_values((ERROR_ATOM, message)),
        }
    }

    /// Port on success, [`TransportError::Publish`] on failure
    pub fn into_result(self) -> Result<u16> {
        match self {
            Self::Ok(port) => Ok(port),
            Self::Error(message) => Err(TransportError::publish(message)),
        }
    }
}

/// Progress of a single request/reply exchange
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PublishState {
    #[default]
    Idle,
    Sent,
    Fulfilled(u16),
    Failed(String),
}

impl PublishState {
    /// True once the exchange has an outcome
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fulfilled(_) | Self::Failed(_))
    }

    /// Whether `next` follows this state
    pub fn can_advance_to(&self, next: &PublishState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Sent)
                | (Self::Idle, Self::Failed(_))
                | (Self::Sent, Self::Fulfilled(_))
                | (Self::Sent, Self::Failed(_))
        )
    }

    /// Move to `next`
    ///
    /// # Panics
    /// If `next` does not follow the current state.
    #[track_caller]
    pub fn advance(&mut self, next: PublishState) {
        assert!(
            self.can_advance_to(&next),
            "illegal publish state transition: {} -> {}",
            self,
            next
        );
        trace!(from = %self, to = %next, "Publish state transition");
        *self = next;
    }
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Sent => write!(f, "sent"),
            Self::Fulfilled(port) => write!(f, "fulfilled({})", port),
            Self::Failed(message) => write!(f, "failed({})", message),
        }
    }
}

/// Expose `whom` on `port`, returning the port actually bound
///
/// A `None` bind falls back to `config.default_bind`, then to all
/// interfaces. Waits at most `config.request_timeout_ms` for the reply.
pub async fn publish(
    middleman: &MiddlemanHandle,
    whom: ActorId,
    port: u16,
    bind: Option<&str>,
    reuse_addr: bool,
    config: &NetworkConfig,
) -> Result<u16> {
    let request = PublishRequest {
        whom,
        port,
        bind: bind.map(str::to_string).or_else(|| config.default_bind.clone()),
        reuse_addr,
    };
    publish_request(middleman, request, config).await
}

/// Send a prepared [`PublishRequest`]
pub async fn publish_request(
    middleman: &MiddlemanHandle,
    request: PublishRequest,
    config: &NetworkConfig,
) -> Result<u16> {
    debug!(
        actor = %request.whom,
        port = request.port,
        bind = request.bind.as_deref().unwrap_or(""),
        reuse_addr = request.reuse_addr,
        "Publishing actor"
    );
    let whom = request.whom;
    let result = exchange(middleman, request.into_tuple(), config).await;
    match &result {
        Ok(port) => info!(actor = %whom, port, "Actor published"),
        Err(e) => warn!(actor = %whom, error = %e, "Publish failed"),
    }
    result
}

/// Release a port previously returned by [`publish`]
pub async fn unpublish(
    middleman: &MiddlemanHandle,
    whom: ActorId,
    port: u16,
    config: &NetworkConfig,
) -> Result<u16> {
    debug!(actor = %whom, port, "Unpublishing actor");
    let request = AnyTuple::from_values((DELETE_ATOM, whom, port));
    let result = exchange(middleman, request, config).await;
    if let Err(e) = &result {
        warn!(actor = %whom, port, error = %e, "Unpublish failed");
    }
    result
}

async fn exchange(middleman: &MiddlemanHandle, request: AnyTuple, config: &NetworkConfig) -> Result<u16> {
    let mut state = PublishState::Idle;

    if middleman.is_closed() {
        let err = TransportError::connection("Middleman mailbox is closed");
        state.advance(PublishState::Failed(err.to_string()));
        return Err(err);
    }
    state.advance(PublishState::Sent);

    let outcome = match middleman.request(request, config.request_timeout()).await {
        Ok(reply) => PublishReply::from_tuple(&reply).and_then(PublishReply::into_result),
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(port) => state.advance(PublishState::Fulfilled(*port)),
        Err(e) => state.advance(PublishState::Failed(e.to_string())),
    }
    outcome
}
