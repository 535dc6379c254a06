//! Proxy engine clients.
//!
//! [`ProxyEngineClient`] is the capability the benchmark drives. Two variants
//! implement it:
//!
//! - [`EmbeddedClient`] owns an [`Engine`] (normally a [`ProcessEngine`]) and
//!   tears it down on close;
//! - [`RemoteClient`] drives an engine that is already running, through its
//!   V2Ray `HandlerService` control channel.
//!
//! Both install routes built by [`outbound_config`] and probe through the
//! engine's HTTP proxy inbound.

pub mod bootstrap;
pub mod client;
pub mod control;
pub mod embedded;
pub mod engine;
pub mod error;
pub mod outbound;
pub mod probe;
pub mod proto;
pub mod remote;
pub mod route;

pub use bootstrap::BootstrapConfig;
pub use client::ProxyEngineClient;
pub use control::HandlerClient;
pub use embedded::EmbeddedClient;
pub use engine::{Engine, ProcessEngine};
pub use error::{BootstrapError, EngineError, ProbeError, ProbeErrorKind};
pub use outbound::outbound_config;
pub use probe::{ProbeMethod, ProbeOptions, Prober};
pub use remote::{RemoteClient, RemoteOptions};
pub use route::RouteSlot;
