//! Engine lifecycle abstraction and the process-backed implementation.

use crate::bootstrap::BootstrapConfig;
use crate::control::HandlerClient;
use crate::error::{BootstrapError, EngineError};
use crate::proto::OutboundHandlerConfig;
use async_trait::async_trait;
use std::io::Write;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::{Child, Command};
use tokio::time::Instant;

/// A proxy engine the embedded client owns.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn start(&mut self, config: &BootstrapConfig) -> Result<(), BootstrapError>;

    async fn add_outbound(&mut self, outbound: OutboundHandlerConfig) -> Result<(), EngineError>;

    /// Returns `false` when nothing was registered under `tag`.
    async fn remove_outbound(&mut self, tag: &str) -> Result<bool, EngineError>;

    async fn stop(&mut self) -> Result<(), EngineError>;
}

/// Runs a V2Ray-compatible binary as a child process and drives it over its
/// `HandlerService` api.
#[derive(Debug)]
pub struct ProcessEngine {
    binary: PathBuf,
    control_addr: SocketAddr,
    startup_timeout: Duration,
    child: Option<Child>,
    config_file: Option<NamedTempFile>,
    control: Option<HandlerClient>,
}

impl ProcessEngine {
    pub fn new(binary: impl Into<PathBuf>, control_addr: SocketAddr) -> Self {
        Self {
            binary: binary.into(),
            control_addr,
            startup_timeout: Duration::from_secs(5),
            child: None,
            config_file: None,
            control: None,
        }
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    fn write_config(&self, config: &BootstrapConfig) -> Result<NamedTempFile, BootstrapError> {
        let rendered = serde_json::to_vec_pretty(&config.to_process_json(self.control_addr))?;
        let mut file = tempfile::Builder::new()
            .prefix("vb-engine-")
            .suffix(".json")
            .tempfile()
            .map_err(BootstrapError::Config)?;
        file.write_all(&rendered).map_err(BootstrapError::Config)?;
        file.flush().map_err(BootstrapError::Config)?;
        Ok(file)
    }

    /// The child must own both listeners, so neither may be bound beforehand.
    fn ensure_ports_free(&self, config: &BootstrapConfig) -> Result<(), BootstrapError> {
        let inbound = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.inbound_port));
        for addr in [self.control_addr, inbound] {
            std::net::TcpListener::bind(addr)
                .map(drop)
                .map_err(|source| BootstrapError::PortInUse { addr, source })?;
        }
        Ok(())
    }

    fn ensure_alive(&mut self) -> Result<(), BootstrapError> {
        if let Some(child) = self.child.as_mut() {
            if let Ok(Some(status)) = child.try_wait() {
                return Err(BootstrapError::Exited(status.to_string()));
            }
        }
        Ok(())
    }

    async fn wait_ready(&mut self) -> Result<(), BootstrapError> {
        let deadline = Instant::now() + self.startup_timeout;
        loop {
            self.ensure_alive()?;
            if tokio::net::TcpStream::connect(self.control_addr).await.is_ok() {
                return self.ensure_alive();
            }
            if Instant::now() >= deadline {
                return Err(BootstrapError::NotReady {
                    addr: self.control_addr,
                    waited: self.startup_timeout,
                });
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    fn control(&mut self) -> Result<&mut HandlerClient, EngineError> {
        self.control.as_mut().ok_or(EngineError::NotRunning)
    }
}

#[async_trait]
impl Engine for ProcessEngine {
    async fn start(&mut self, config: &BootstrapConfig) -> Result<(), BootstrapError> {
        self.ensure_ports_free(config)?;
        let file = self.write_config(config)?;
        let child = Command::new(&self.binary)
            .arg("run")
            .arg("-c")
            .arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BootstrapError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;
        tracing::info!(
            binary = %self.binary.display(),
            pid = child.id(),
            config = %file.path().display(),
            "engine process spawned"
        );
        self.child = Some(child);
        self.config_file = Some(file);

        if let Err(e) = self.wait_ready().await {
            let _ = self.stop().await;
            return Err(e);
        }
        let connected = HandlerClient::connect(&self.control_addr.to_string()).await;
        match connected.and_then(|control| self.ensure_alive().map(|()| control)) {
            Ok(control) => {
                self.control = Some(control);
                Ok(())
            }
            Err(e) => {
                let _ = self.stop().await;
                Err(e)
            }
        }
    }

    async fn add_outbound(&mut self, outbound: OutboundHandlerConfig) -> Result<(), EngineError> {
        self.control()?.add_route(outbound).await
    }

    async fn remove_outbound(&mut self, tag: &str) -> Result<bool, EngineError> {
        self.control()?.remove_route(tag).await
    }

    async fn stop(&mut self) -> Result<(), EngineError> {
        self.control = None;
        let result = match self.child.take() {
            Some(mut child) => {
                let pid = child.id();
                let killed = child.kill().await;
                tracing::info!(pid, "engine process stopped");
                killed.map_err(EngineError::Stop)
            }
            None => Ok(()),
        };
        self.config_file = None;
        result
    }
}
