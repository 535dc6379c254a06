//! Hand-declared V2Ray protobuf messages.
//!
//! Only the subset needed to add and remove a VMess outbound through
//! `HandlerService` is declared. Field numbers match the upstream `.proto`
//! files; nested settings travel as `Any` with a V2Ray type URL.

use prost::Message;
use prost_types::Any;

/// Type URL prefix V2Ray uses when packing typed settings.
pub const TYPE_URL_PREFIX: &str = "types.v2fly.org/";

/// A message with a fully-qualified protobuf name, packable into `Any`.
pub trait TypedMessage: Message + Sized {
    const TYPE_NAME: &'static str;

    fn to_any(&self) -> Any {
        Any {
            type_url: format!("{TYPE_URL_PREFIX}{}", Self::TYPE_NAME),
            value: self.encode_to_vec(),
        }
    }

    /// Unpack from `Any`, returning `None` when the type URL names another message.
    fn from_any(any: &Any) -> Option<Self>
    where
        Self: Default,
    {
        let name = any.type_url.rsplit('/').next()?;
        if name != Self::TYPE_NAME {
            return None;
        }
        Self::decode(any.value.as_slice()).ok()
    }
}

macro_rules! typed {
    ($ty:ty, $name:literal) => {
        impl TypedMessage for $ty {
            const TYPE_NAME: &'static str = $name;
        }
    };
}

// v2ray.core (core/config.proto)

#[derive(Clone, PartialEq, Message)]
pub struct OutboundHandlerConfig {
    #[prost(string, tag = "1")]
    pub tag: String,
    #[prost(message, optional, tag = "2")]
    pub sender_settings: Option<Any>,
    #[prost(message, optional, tag = "3")]
    pub proxy_settings: Option<Any>,
    #[prost(int64, tag = "4")]
    pub expire: i64,
    #[prost(string, tag = "5")]
    pub comment: String,
}

// v2ray.core.app.proxyman.command

#[derive(Clone, PartialEq, Message)]
pub struct AddOutboundRequest {
    #[prost(message, optional, tag = "1")]
    pub outbound: Option<OutboundHandlerConfig>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AddOutboundResponse {}

#[derive(Clone, PartialEq, Message)]
pub struct RemoveOutboundRequest {
    #[prost(string, tag = "1")]
    pub tag: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct RemoveOutboundResponse {}

// v2ray.core.app.proxyman

#[derive(Clone, PartialEq, Message)]
pub struct SenderConfig {
    #[prost(message, optional, tag = "2")]
    pub stream_settings: Option<StreamConfig>,
}
typed!(SenderConfig, "v2ray.core.app.proxyman.SenderConfig");

// v2ray.core.transport.internet

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum TransportProtocol {
    Tcp = 0,
    Udp = 1,
    Mkcp = 2,
    WebSocket = 3,
    Http = 4,
    DomainSocket = 5,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransportConfig {
    #[prost(enumeration = "TransportProtocol", tag = "1")]
    pub protocol: i32,
    #[prost(message, optional, tag = "2")]
    pub settings: Option<Any>,
    #[prost(string, tag = "3")]
    pub protocol_name: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct StreamConfig {
    #[prost(enumeration = "TransportProtocol", tag = "1")]
    pub protocol: i32,
    #[prost(message, repeated, tag = "2")]
    pub transport_settings: Vec<TransportConfig>,
    #[prost(string, tag = "3")]
    pub security_type: String,
    #[prost(message, repeated, tag = "4")]
    pub security_settings: Vec<Any>,
    #[prost(string, tag = "5")]
    pub protocol_name: String,
}

// v2ray.core.transport.internet.tcp

#[derive(Clone, PartialEq, Message)]
pub struct TcpConfig {
    #[prost(message, optional, tag = "2")]
    pub header_settings: Option<Any>,
    #[prost(bool, tag = "3")]
    pub accept_proxy_protocol: bool,
}
typed!(TcpConfig, "v2ray.core.transport.internet.tcp.Config");

// v2ray.core.transport.internet.headers.http

#[derive(Clone, PartialEq, Message)]
pub struct Header {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, repeated, tag = "2")]
    pub value: Vec<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Version {
    #[prost(string, tag = "1")]
    pub value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Method {
    #[prost(string, tag = "1")]
    pub value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct RequestConfig {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
    #[prost(message, optional, tag = "2")]
    pub method: Option<Method>,
    #[prost(string, repeated, tag = "3")]
    pub uri: Vec<String>,
    #[prost(message, repeated, tag = "4")]
    pub header: Vec<Header>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Status {
    #[prost(string, tag = "1")]
    pub code: String,
    #[prost(string, tag = "2")]
    pub reason: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ResponseConfig {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
    #[prost(message, optional, tag = "2")]
    pub status: Option<Status>,
    #[prost(message, repeated, tag = "3")]
    pub header: Vec<Header>,
}

#[derive(Clone, PartialEq, Message)]
pub struct HttpHeaderConfig {
    #[prost(message, optional, tag = "1")]
    pub request: Option<RequestConfig>,
    #[prost(message, optional, tag = "2")]
    pub response: Option<ResponseConfig>,
}
typed!(
    HttpHeaderConfig,
    "v2ray.core.transport.internet.headers.http.Config"
);

// v2ray.core.common.net / v2ray.core.common.protocol

#[derive(Clone, PartialEq, Message)]
pub struct IpOrDomain {
    #[prost(oneof = "ip_or_domain::Address", tags = "1, 2")]
    pub address: Option<ip_or_domain::Address>,
}

pub mod ip_or_domain {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Address {
        #[prost(bytes, tag = "1")]
        Ip(Vec<u8>),
        #[prost(string, tag = "2")]
        Domain(String),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct User {
    #[prost(uint32, tag = "1")]
    pub level: u32,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(message, optional, tag = "3")]
    pub account: Option<Any>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ServerEndpoint {
    #[prost(message, optional, tag = "1")]
    pub address: Option<IpOrDomain>,
    #[prost(uint32, tag = "2")]
    pub port: u32,
    #[prost(message, repeated, tag = "3")]
    pub user: Vec<User>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SecurityType {
    Unknown = 0,
    Legacy = 1,
    Auto = 2,
    Aes128Gcm = 3,
    Chacha20Poly1305 = 4,
    None = 5,
    Zero = 6,
}

#[derive(Clone, PartialEq, Message)]
pub struct SecurityConfig {
    #[prost(enumeration = "SecurityType", tag = "1")]
    pub r#type: i32,
}

// v2ray.core.proxy.vmess

#[derive(Clone, PartialEq, Message)]
pub struct VmessAccount {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(uint32, tag = "2")]
    pub alter_id: u32,
    #[prost(message, optional, tag = "3")]
    pub security_settings: Option<SecurityConfig>,
    #[prost(string, tag = "4")]
    pub tests_enabled: String,
}
typed!(VmessAccount, "v2ray.core.proxy.vmess.Account");

#[derive(Clone, PartialEq, Message)]
pub struct VmessOutboundConfig {
    #[prost(message, repeated, tag = "1")]
    pub receiver: Vec<ServerEndpoint>,
}
typed!(VmessOutboundConfig, "v2ray.core.proxy.vmess.outbound.Config");
