use crate::bootstrap::BootstrapConfig;
use crate::client::ProxyEngineClient;
use crate::engine::Engine;
use crate::error::{BootstrapError, EngineError, ProbeError, ProbeErrorKind};
use crate::outbound::outbound_config;
use crate::probe::{ProbeOptions, Prober};
use crate::route::RouteSlot;
use async_trait::async_trait;
use std::time::Duration;
use vb_subscribe::VmessEndpoint;

/// Client that owns its engine: started on construction, stopped on close.
pub struct EmbeddedClient<E: Engine> {
    engine: E,
    prober: Prober,
    route: RouteSlot,
    closed: bool,
}

impl<E: Engine> EmbeddedClient<E> {
    pub async fn start(
        mut engine: E,
        config: BootstrapConfig,
        probe: &ProbeOptions,
    ) -> Result<Self, BootstrapError> {
        let prober = Prober::new(&format!("127.0.0.1:{}", config.inbound_port), probe)?;
        engine.start(&config).await?;
        tracing::info!(
            inbound_port = config.inbound_port,
            inbound_tag = %config.inbound_tag,
            outbound_tag = %config.outbound_tag,
            "embedded engine started"
        );
        Ok(Self {
            engine,
            prober,
            route: RouteSlot::new(config.outbound_tag),
            closed: false,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed {
            Err(EngineError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<E: Engine> ProxyEngineClient for EmbeddedClient<E> {
    fn outbound_tag(&self) -> &str {
        self.route.tag()
    }

    fn active_route(&self) -> Option<&str> {
        self.route.active()
    }

    async fn set_outbound(&mut self, endpoint: &VmessEndpoint) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.route.ensure_free()?;
        let outbound = outbound_config(endpoint, self.route.tag());
        self.engine.add_outbound(outbound).await?;
        self.route.occupy(endpoint.label());
        tracing::debug!(endpoint = %endpoint.label(), tag = %self.route.tag(), "route installed");
        Ok(())
    }

    async fn delete_outbound(&mut self) -> Result<(), EngineError> {
        self.ensure_open()?;
        let previous = self.route.release();
        let found = self.engine.remove_outbound(self.route.tag()).await?;
        if !found {
            tracing::debug!(tag = %self.route.tag(), "no route to remove");
        } else {
            tracing::debug!(endpoint = ?previous, tag = %self.route.tag(), "route removed");
        }
        Ok(())
    }

    async fn ping(&self, target: &str) -> Result<Duration, ProbeError> {
        if self.closed {
            return Err(ProbeError::new(
                ProbeErrorKind::Unavailable,
                EngineError::Closed.to_string(),
            ));
        }
        self.prober.probe(target).await
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.closed = true;
        self.route.release();
        self.engine.stop().await
    }
}
