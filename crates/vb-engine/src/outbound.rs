//! Outbound route configuration for a single endpoint.
//!
//! The route is a VMess outbound over TCP disguised as plain HTTP/1.1 traffic.

use crate::proto::{
    ip_or_domain, Header, HttpHeaderConfig, IpOrDomain, Method, OutboundHandlerConfig,
    RequestConfig, ResponseConfig, SecurityConfig, SecurityType, SenderConfig, ServerEndpoint,
    StreamConfig, TcpConfig, TransportConfig, TransportProtocol, TypedMessage, User, Version,
    VmessAccount, VmessOutboundConfig,
};
use std::net::IpAddr;
use vb_subscribe::VmessEndpoint;

pub const USER_AGENTS: [&str; 2] = [
    "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/53.0.2785.143 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 10_0_2 like Mac OS X) AppleWebKit/601.1 (KHTML, like Gecko) CriOS/53.0.2785.109 Mobile/14A456 Safari/601.1.46",
];

/// Build the handler config that routes traffic under `tag` through `endpoint`.
pub fn outbound_config(endpoint: &VmessEndpoint, tag: &str) -> OutboundHandlerConfig {
    let tcp = TcpConfig {
        header_settings: Some(http_disguise(endpoint).to_any()),
        ..Default::default()
    };
    let stream = StreamConfig {
        protocol: TransportProtocol::Tcp as i32,
        protocol_name: "tcp".into(),
        transport_settings: vec![TransportConfig {
            protocol: TransportProtocol::Tcp as i32,
            protocol_name: "tcp".into(),
            settings: Some(tcp.to_any()),
        }],
        ..Default::default()
    };
    let sender = SenderConfig {
        stream_settings: Some(stream),
    };

    OutboundHandlerConfig {
        tag: tag.to_string(),
        sender_settings: Some(sender.to_any()),
        proxy_settings: Some(vmess_settings(endpoint).to_any()),
        ..Default::default()
    }
}

fn vmess_settings(endpoint: &VmessEndpoint) -> VmessOutboundConfig {
    let account = VmessAccount {
        id: endpoint.id.clone(),
        security_settings: Some(SecurityConfig {
            r#type: SecurityType::Auto as i32,
        }),
        ..Default::default()
    };
    VmessOutboundConfig {
        receiver: vec![ServerEndpoint {
            address: Some(address(&endpoint.add)),
            port: endpoint.port,
            user: vec![User {
                account: Some(account.to_any()),
                ..Default::default()
            }],
        }],
    }
}

fn address(add: &str) -> IpOrDomain {
    let address = match add.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => ip_or_domain::Address::Ip(ip.octets().to_vec()),
        Ok(IpAddr::V6(ip)) => ip_or_domain::Address::Ip(ip.octets().to_vec()),
        Err(_) => ip_or_domain::Address::Domain(add.to_string()),
    };
    IpOrDomain {
        address: Some(address),
    }
}

fn http_disguise(endpoint: &VmessEndpoint) -> HttpHeaderConfig {
    let request = RequestConfig {
        version: Some(Version {
            value: "1.1".into(),
        }),
        method: Some(Method {
            value: "GET".into(),
        }),
        uri: vec![endpoint.path.clone()],
        header: vec![
            header("Accept-Encoding", &["gzip,deflate"]),
            header("Connection", &["keep-alive"]),
            header("Host", &[endpoint.host.as_str()]),
            header("Pragma", &["no-cache"]),
            header("User-Agent", &USER_AGENTS),
        ],
    };
    let response = ResponseConfig {
        header: vec![
            header("Content-Type", &["application/octet-stream", "video/mpeg"]),
            header("Transfer-Encoding", &["chunked"]),
            header("Connection", &["keep-alive"]),
            header("Pragma", &["no-cache"]),
            header("Cache-Control", &["private", "no-cache"]),
        ],
        ..Default::default()
    };
    HttpHeaderConfig {
        request: Some(request),
        response: Some(response),
    }
}

fn header(name: &str, values: &[&str]) -> Header {
    Header {
        name: name.to_string(),
        value: values.iter().map(|v| v.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> VmessEndpoint {
        VmessEndpoint {
            ps: "hk-01".into(),
            id: "b831381d-6324-4d53-ad4f-8cda48b30811".into(),
            add: "hk.example.net".into(),
            port: 8443,
            host: "cdn.example.org".into(),
            path: "/video".into(),
            ..Default::default()
        }
    }

    fn header_values<'a>(headers: &'a [Header], name: &str) -> Vec<&'a str> {
        headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn carries_tag_and_receiver() {
        let cfg = outbound_config(&endpoint(), "proxy");
        assert_eq!(cfg.tag, "proxy");

        let vmess = VmessOutboundConfig::from_any(cfg.proxy_settings.as_ref().unwrap()).unwrap();
        let receiver = &vmess.receiver[0];
        assert_eq!(receiver.port, 8443);
        assert_eq!(
            receiver.address.as_ref().unwrap().address,
            Some(ip_or_domain::Address::Domain("hk.example.net".into()))
        );
        let account =
            VmessAccount::from_any(receiver.user[0].account.as_ref().unwrap()).unwrap();
        assert_eq!(account.id, "b831381d-6324-4d53-ad4f-8cda48b30811");
        assert_eq!(
            account.security_settings.unwrap().r#type,
            SecurityType::Auto as i32
        );
    }

    #[test]
    fn literal_ip_is_sent_as_bytes() {
        let mut ep = endpoint();
        ep.add = "10.0.0.7".into();
        assert_eq!(
            address(&ep.add).address,
            Some(ip_or_domain::Address::Ip(vec![10, 0, 0, 7]))
        );
    }

    #[test]
    fn http_disguise_headers() {
        let cfg = outbound_config(&endpoint(), "proxy");
        let sender = SenderConfig::from_any(cfg.sender_settings.as_ref().unwrap()).unwrap();
        let stream = sender.stream_settings.unwrap();
        assert_eq!(stream.protocol_name, "tcp");

        let tcp = TcpConfig::from_any(stream.transport_settings[0].settings.as_ref().unwrap())
            .unwrap();
        let http = HttpHeaderConfig::from_any(tcp.header_settings.as_ref().unwrap()).unwrap();

        let request = http.request.unwrap();
        assert_eq!(request.method.unwrap().value, "GET");
        assert_eq!(request.version.unwrap().value, "1.1");
        assert_eq!(request.uri, ["/video"]);
        assert_eq!(header_values(&request.header, "Host"), ["cdn.example.org"]);
        assert_eq!(header_values(&request.header, "User-Agent"), USER_AGENTS);

        let response = http.response.unwrap();
        assert_eq!(
            header_values(&response.header, "Content-Type"),
            ["application/octet-stream", "video/mpeg"]
        );
        assert_eq!(
            header_values(&response.header, "Cache-Control"),
            ["private", "no-cache"]
        );
    }
}
