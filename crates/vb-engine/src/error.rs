use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Failure to bring an engine client up. Always fatal.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("render engine config: {0}")]
    Render(#[from] serde_json::Error),
    #[error("write engine config: {0}")]
    Config(#[source] std::io::Error),
    #[error("spawn engine {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("address {addr} unavailable: {source}")]
    PortInUse {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("engine exited during startup: {0}")]
    Exited(String),
    #[error("engine control port {addr} not ready after {waited:?}")]
    NotReady { addr: SocketAddr, waited: Duration },
    #[error("invalid control address {0:?}")]
    InvalidAddr(String),
    #[error("dial control channel {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("build probe client: {0}")]
    ProbeClient(#[source] reqwest::Error),
}

/// Failure of a route operation against a running engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("add outbound {tag:?}: {status}")]
    AddOutbound {
        tag: String,
        #[source]
        status: tonic::Status,
    },
    #[error("remove outbound {tag:?}: {status}")]
    RemoveOutbound {
        tag: String,
        #[source]
        status: tonic::Status,
    },
    #[error("route {tag:?} already active for {active:?}")]
    RouteOccupied { tag: String, active: String },
    #[error("engine is not running")]
    NotRunning,
    #[error("engine client closed")]
    Closed,
    #[error("stop engine: {0}")]
    Stop(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeErrorKind {
    Connect,
    Timeout,
    Request,
    Body,
    /// The client was closed before the probe was issued.
    Unavailable,
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Request => "request",
            Self::Body => "body",
            Self::Unavailable => "unavailable",
        })
    }
}

/// Transport failure of a single probe. Recorded per endpoint, never fatal.
#[derive(Debug, Clone, Error)]
#[error("ping err: {message}")]
pub struct ProbeError {
    pub kind: ProbeErrorKind,
    pub message: String,
}

impl ProbeError {
    pub fn new(kind: ProbeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn from_send(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ProbeErrorKind::Timeout
        } else if err.is_connect() {
            ProbeErrorKind::Connect
        } else {
            ProbeErrorKind::Request
        };
        Self::new(kind, chain(err))
    }

    pub(crate) fn from_body(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ProbeErrorKind::Timeout
        } else {
            ProbeErrorKind::Body
        };
        Self::new(kind, chain(err))
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ProbeErrorKind::Timeout
    }
}

// reqwest's top-level message hides the interesting cause ("error sending request").
fn chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(cause) = cur {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        cur = cause.source();
    }
    out
}
