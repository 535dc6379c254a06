use crate::error::{EngineError, ProbeError};
use async_trait::async_trait;
use std::time::Duration;
use vb_subscribe::VmessEndpoint;

/// Capability the benchmark drives: swap the active route, probe through it,
/// shut down.
///
/// At most one route is active per client. `set_outbound` fails with
/// [`EngineError::RouteOccupied`] until `delete_outbound` frees the slot.
#[async_trait]
pub trait ProxyEngineClient: Send + Sync {
    /// Tag the route is installed under.
    fn outbound_tag(&self) -> &str;

    /// Label of the endpoint currently routed.
    fn active_route(&self) -> Option<&str>;

    async fn set_outbound(&mut self, endpoint: &VmessEndpoint) -> Result<(), EngineError>;

    /// Remove the route. Succeeds when nothing is installed.
    async fn delete_outbound(&mut self) -> Result<(), EngineError>;

    async fn ping(&self, target: &str) -> Result<Duration, ProbeError>;

    async fn close(&mut self) -> Result<(), EngineError>;
}
