//! In-process V2Ray `HandlerService` for driving [`HandlerClient`] over a
//! real HTTP/2 channel.
//!
//! Keeps the installed outbounds by tag, records every call, and answers the
//! way V2Ray does: a duplicate tag on add and a missing tag on remove are
//! both `Unknown` statuses.
//!
//! [`HandlerClient`]: vb_engine::HandlerClient
#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::ProstCodec;
use tonic::codegen::{empty_body, http, BoxFuture, Service};
use tonic::server::{Grpc, NamedService, UnaryService};
use tonic::transport::{Body, Server};
use tonic::{Code, Request, Response, Status};
use vb_engine::proto::{
    AddOutboundRequest, AddOutboundResponse, OutboundHandlerConfig, RemoveOutboundRequest,
    RemoveOutboundResponse, TypedMessage, VmessOutboundConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Add(OutboundHandlerConfig),
    Remove(String),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    installed: Vec<OutboundHandlerConfig>,
    reject_adds: Option<(Code, String)>,
    fail_removes: Option<(Code, String)>,
}

#[derive(Clone, Default)]
pub struct FakeHandlerService {
    state: Arc<Mutex<State>>,
}

impl FakeHandlerService {
    /// Serve on an ephemeral loopback port and return its address.
    pub async fn spawn(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let svc = self.clone();
        tokio::spawn(async move {
            Server::builder()
                .add_service(svc)
                .serve_with_incoming(TcpListenerStream::new(listener))
                .await
        });
        addr
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn installed_tags(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.installed.iter().map(|o| o.tag.clone()).collect()
    }

    /// Receiver port of the outbound installed under `tag`.
    pub fn routed_port(&self, tag: &str) -> Option<u32> {
        let state = self.state.lock().unwrap();
        let outbound = state.installed.iter().find(|o| o.tag == tag)?;
        receiver_port(outbound)
    }

    pub fn reject_adds(&self, code: Code, message: &str) {
        self.state.lock().unwrap().reject_adds = Some((code, message.to_string()));
    }

    pub fn fail_removes(&self, code: Code, message: &str) {
        self.state.lock().unwrap().fail_removes = Some((code, message.to_string()));
    }

    /// Install `tag` without going through the wire.
    pub fn preinstall(&self, outbound: OutboundHandlerConfig) {
        self.state.lock().unwrap().installed.push(outbound);
    }

    fn add(&self, req: AddOutboundRequest) -> Result<AddOutboundResponse, Status> {
        let mut state = self.state.lock().unwrap();
        let outbound = req
            .outbound
            .ok_or_else(|| Status::invalid_argument("missing outbound"))?;
        state.calls.push(Call::Add(outbound.clone()));
        if let Some((code, message)) = &state.reject_adds {
            return Err(Status::new(*code, message.clone()));
        }
        if state.installed.iter().any(|o| o.tag == outbound.tag) {
            return Err(Status::unknown(format!(
                "app/proxyman/outbound: existing tag found: {}",
                outbound.tag
            )));
        }
        state.installed.push(outbound);
        Ok(AddOutboundResponse {})
    }

    fn remove(&self, req: RemoveOutboundRequest) -> Result<RemoveOutboundResponse, Status> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Remove(req.tag.clone()));
        if let Some((code, message)) = &state.fail_removes {
            return Err(Status::new(*code, message.clone()));
        }
        let before = state.installed.len();
        state.installed.retain(|o| o.tag != req.tag);
        if state.installed.len() == before {
            return Err(Status::unknown(
                "app/proxyman/outbound: not enough information for making a decision",
            ));
        }
        Ok(RemoveOutboundResponse {})
    }
}

pub fn receiver_port(outbound: &OutboundHandlerConfig) -> Option<u32> {
    let settings = outbound.proxy_settings.as_ref()?;
    let vmess = VmessOutboundConfig::from_any(settings)?;
    vmess.receiver.first().map(|r| r.port)
}

impl NamedService for FakeHandlerService {
    const NAME: &'static str = "v2ray.core.app.proxyman.command.HandlerService";
}

impl Service<http::Request<Body>> for FakeHandlerService {
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Body>) -> Self::Future {
        let svc = self.clone();
        match req.uri().path() {
            "/v2ray.core.app.proxyman.command.HandlerService/AddOutbound" => Box::pin(async move {
                let mut grpc = Grpc::new(ProstCodec::default());
                Ok(grpc.unary(AddOutbound(svc), req).await)
            }),
            "/v2ray.core.app.proxyman.command.HandlerService/RemoveOutbound" => {
                Box::pin(async move {
                    let mut grpc = Grpc::new(ProstCodec::default());
                    Ok(grpc.unary(RemoveOutbound(svc), req).await)
                })
            }
            _ => Box::pin(async move {
                Ok(http::Response::builder()
                    .status(200)
                    .header("grpc-status", "12")
                    .header("content-type", "application/grpc")
                    .body(empty_body())
                    .unwrap())
            }),
        }
    }
}

struct AddOutbound(FakeHandlerService);

impl UnaryService<AddOutboundRequest> for AddOutbound {
    type Response = AddOutboundResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<AddOutboundRequest>) -> Self::Future {
        let result = self.0.add(request.into_inner()).map(Response::new);
        Box::pin(async move { result })
    }
}

struct RemoveOutbound(FakeHandlerService);

impl UnaryService<RemoveOutboundRequest> for RemoveOutbound {
    type Response = RemoveOutboundResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<RemoveOutboundRequest>) -> Self::Future {
        let result = self.0.remove(request.into_inner()).map(Response::new);
        Box::pin(async move { result })
    }
}
