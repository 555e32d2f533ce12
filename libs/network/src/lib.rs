//! Network Coordination
//!
//! Publishing actors on TCP ports through an in-process coordinator, the
//! middleman. Callers hold a [`MiddlemanHandle`], send a request tuple and
//! suspend until the single reply tuple arrives.
//!
//! ```rust,no_run
//! use network::{publish, Middleman, NetworkConfig};
//! use types::ActorId;
//!
//! # async fn example() -> network::Result<()> {
//! let config = NetworkConfig::default();
//! let (middleman, _coordinator) = Middleman::spawn(&config)?;
//!
//! let port = publish(&middleman, ActorId::new(), 0, Some("127.0.0.1"), false, &config).await?;
//! assert_ne!(port, 0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod middleman;
pub mod publish;

pub use config::NetworkConfig;
pub use error::{Result, TransportError};
pub use middleman::{Envelope, Middleman, MiddlemanHandle, ALL_INTERFACES};
pub use publish::{
    publish, publish_request, unpublish, PublishReply, PublishRequest, PublishState,
};
