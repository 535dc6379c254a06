use crate::client::ProxyEngineClient;
use crate::control::HandlerClient;
use crate::error::{BootstrapError, EngineError, ProbeError};
use crate::outbound::outbound_config;
use crate::probe::{ProbeOptions, Prober};
use crate::route::RouteSlot;
use async_trait::async_trait;
use std::time::Duration;
use vb_subscribe::VmessEndpoint;

#[derive(Debug, Clone)]
pub struct RemoteOptions {
    /// `HandlerService` address, `host:port`.
    pub control_addr: String,
    /// Host of the engine's HTTP proxy inbound, scheme optional.
    pub inbound_host: String,
    pub inbound_port: u16,
    pub outbound_tag: String,
    pub probe: ProbeOptions,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            control_addr: "127.0.0.1:10085".into(),
            inbound_host: "http://127.0.0.1".into(),
            inbound_port: 7891,
            outbound_tag: "proxy".into(),
            probe: ProbeOptions::default(),
        }
    }
}

/// Client for an engine someone else runs. Never starts or stops it.
#[derive(Debug)]
pub struct RemoteClient {
    control: HandlerClient,
    prober: Prober,
    route: RouteSlot,
}

impl RemoteClient {
    pub async fn connect(options: RemoteOptions) -> Result<Self, BootstrapError> {
        let proxy = format!("{}:{}", options.inbound_host, options.inbound_port);
        let prober = Prober::new(&proxy, &options.probe)?;
        let control = HandlerClient::connect(&options.control_addr).await?;
        tracing::info!(
            control = %options.control_addr,
            proxy = %prober.proxy(),
            outbound_tag = %options.outbound_tag,
            "connected to external engine"
        );
        Ok(Self {
            control,
            prober,
            route: RouteSlot::new(options.outbound_tag),
        })
    }
}

#[async_trait]
impl ProxyEngineClient for RemoteClient {
    fn outbound_tag(&self) -> &str {
        self.route.tag()
    }

    fn active_route(&self) -> Option<&str> {
        self.route.active()
    }

    async fn set_outbound(&mut self, endpoint: &VmessEndpoint) -> Result<(), EngineError> {
        self.route.ensure_free()?;
        let tag = self.route.tag().to_string();
        self.control
            .add_route(outbound_config(endpoint, &tag))
            .await?;
        self.route.occupy(endpoint.label());
        tracing::debug!(endpoint = %endpoint.label(), %tag, "route installed");
        Ok(())
    }

    async fn delete_outbound(&mut self) -> Result<(), EngineError> {
        self.route.release();
        let tag = self.route.tag().to_string();
        if !self.control.remove_route(&tag).await? {
            tracing::debug!(%tag, "no route to remove");
        }
        Ok(())
    }

    async fn ping(&self, target: &str) -> Result<Duration, ProbeError> {
        self.prober.probe(target).await
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}
