//! Minimal `HandlerService` gRPC client.

use crate::error::{BootstrapError, EngineError};
use crate::proto::{
    AddOutboundRequest, AddOutboundResponse, OutboundHandlerConfig, RemoveOutboundRequest,
    RemoveOutboundResponse,
};
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Status};

pub const SERVICE_NAME: &str = "v2ray.core.app.proxyman.command.HandlerService";

const ADD_OUTBOUND: &str = "/v2ray.core.app.proxyman.command.HandlerService/AddOutbound";
const REMOVE_OUTBOUND: &str = "/v2ray.core.app.proxyman.command.HandlerService/RemoveOutbound";

#[derive(Debug, Clone)]
pub struct HandlerClient {
    inner: tonic::client::Grpc<Channel>,
    addr: String,
}

impl HandlerClient {
    /// Dial `addr` (`host:port` or `http://host:port`) over plaintext HTTP/2.
    pub async fn connect(addr: &str) -> Result<Self, BootstrapError> {
        let uri = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("http://{addr}")
        };
        let endpoint =
            Endpoint::from_shared(uri).map_err(|_| BootstrapError::InvalidAddr(addr.to_string()))?;
        let channel = endpoint
            .connect()
            .await
            .map_err(|source| BootstrapError::Dial {
                addr: addr.to_string(),
                source,
            })?;
        tracing::debug!(addr, "control channel connected");
        Ok(Self {
            inner: tonic::client::Grpc::new(channel),
            addr: addr.to_string(),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub async fn add_outbound(&mut self, outbound: OutboundHandlerConfig) -> Result<(), Status> {
        let req = AddOutboundRequest {
            outbound: Some(outbound),
        };
        let _: AddOutboundResponse = self.unary(ADD_OUTBOUND, req).await?;
        Ok(())
    }

    pub async fn remove_outbound(&mut self, tag: &str) -> Result<(), Status> {
        let req = RemoveOutboundRequest {
            tag: tag.to_string(),
        };
        let _: RemoveOutboundResponse = self.unary(REMOVE_OUTBOUND, req).await?;
        Ok(())
    }

    /// `add_outbound` with the failure tagged for the caller.
    pub async fn add_route(&mut self, outbound: OutboundHandlerConfig) -> Result<(), EngineError> {
        let tag = outbound.tag.clone();
        self.add_outbound(outbound)
            .await
            .map_err(|status| EngineError::AddOutbound { tag, status })
    }

    /// Returns `false` when the engine had nothing under `tag`.
    pub async fn remove_route(&mut self, tag: &str) -> Result<bool, EngineError> {
        match self.remove_outbound(tag).await {
            Ok(()) => Ok(true),
            Err(status) if is_not_found(&status) => Ok(false),
            Err(status) => Err(EngineError::RemoveOutbound {
                tag: tag.to_string(),
                status,
            }),
        }
    }

    async fn unary<Req, Resp>(&mut self, path: &'static str, req: Req) -> Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unavailable(format!("control channel not ready: {e}")))?;
        let codec = ProstCodec::<Req, Resp>::default();
        let resp = self
            .inner
            .unary(Request::new(req), PathAndQuery::from_static(path), codec)
            .await?;
        Ok(resp.into_inner())
    }
}

/// Whether a `RemoveOutbound` failure means nothing was registered under the tag.
///
/// V2Ray reports a missing handler as an unknown-code status whose message
/// reads "not enough information for making a decision"; other engines use
/// `NOT_FOUND` or a "not found" message.
pub fn is_not_found(status: &Status) -> bool {
    if status.code() == Code::NotFound {
        return true;
    }
    let msg = status.message().to_ascii_lowercase();
    msg.contains("not found") || msg.contains("not enough information")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_detection() {
        assert!(is_not_found(&Status::not_found("handler proxy")));
        assert!(is_not_found(&Status::unknown("outbound handler not found")));
        assert!(is_not_found(&Status::unknown(
            "app/proxyman/outbound: not enough information for making a decision"
        )));
        assert!(!is_not_found(&Status::unavailable("connection reset")));
    }

    #[test]
    fn method_paths_match_service() {
        assert!(ADD_OUTBOUND.starts_with(&format!("/{SERVICE_NAME}/")));
        assert!(REMOVE_OUTBOUND.starts_with(&format!("/{SERVICE_NAME}/")));
    }

    #[tokio::test]
    async fn dial_refused_is_bootstrap_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HandlerClient::connect(&addr.to_string()).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Dial { .. }), "{err}");
    }
}
