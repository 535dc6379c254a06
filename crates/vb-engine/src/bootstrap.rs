use serde_json::{json, Value};
use std::net::SocketAddr;

/// Tag of the loopback control inbound and the matching api outbound.
pub const CONTROL_TAG: &str = "vb-api";
/// Default outbound that drops traffic while no route is installed.
pub const BLACKHOLE_TAG: &str = "vb-blocked";

/// Static engine configuration used by the embedded client.
///
/// Only the inbound port and the two routing tags vary; everything else is
/// fixed: one HTTP proxy inbound on all interfaces, a single rule sending that
/// inbound to the outbound tag, warning-level error log and no access log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub inbound_port: u16,
    pub inbound_tag: String,
    pub outbound_tag: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            inbound_port: 7891,
            inbound_tag: "http".into(),
            outbound_tag: "proxy".into(),
        }
    }
}

impl BootstrapConfig {
    /// Engine config as V2Ray JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "log": { "loglevel": "warning", "access": "none" },
            "inbounds": [self.proxy_inbound()],
            "outbounds": [],
            "routing": {
                "domainStrategy": "IPIfNonMatch",
                "domainMatcher": "mph",
                "rules": [self.route_rule()],
            },
        })
    }

    /// Config for a spawned engine process: adds the `HandlerService` api on
    /// `control` and a blackhole default outbound.
    pub fn to_process_json(&self, control: SocketAddr) -> Value {
        json!({
            "log": { "loglevel": "warning", "access": "none" },
            "api": { "tag": CONTROL_TAG, "services": ["HandlerService"] },
            "inbounds": [
                self.proxy_inbound(),
                {
                    "tag": CONTROL_TAG,
                    "listen": control.ip().to_string(),
                    "port": control.port(),
                    "protocol": "dokodemo-door",
                    "settings": { "address": control.ip().to_string() },
                },
            ],
            "outbounds": [
                { "tag": BLACKHOLE_TAG, "protocol": "blackhole", "settings": {} },
            ],
            "routing": {
                "domainStrategy": "IPIfNonMatch",
                "domainMatcher": "mph",
                "rules": [
                    { "type": "field", "inboundTag": [CONTROL_TAG], "outboundTag": CONTROL_TAG },
                    self.route_rule(),
                ],
            },
        })
    }

    fn proxy_inbound(&self) -> Value {
        json!({
            "tag": self.inbound_tag,
            "listen": "0.0.0.0",
            "port": self.inbound_port,
            "protocol": "http",
            "settings": {},
        })
    }

    fn route_rule(&self) -> Value {
        json!({
            "type": "field",
            "inboundTag": [self.inbound_tag],
            "outboundTag": self.outbound_tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_port_and_tags_vary() {
        let cfg = BootstrapConfig {
            inbound_port: 18080,
            inbound_tag: "in".into(),
            outbound_tag: "out".into(),
        };
        let v = cfg.to_json();
        assert_eq!(v["inbounds"][0]["port"], 18080);
        assert_eq!(v["inbounds"][0]["listen"], "0.0.0.0");
        assert_eq!(v["inbounds"][0]["tag"], "in");
        assert_eq!(v["routing"]["domainStrategy"], "IPIfNonMatch");
        assert_eq!(v["routing"]["rules"][0]["inboundTag"][0], "in");
        assert_eq!(v["routing"]["rules"][0]["outboundTag"], "out");
        assert_eq!(v["log"]["loglevel"], "warning");
        assert_eq!(v["log"]["access"], "none");

        let mut other = cfg.clone();
        other.inbound_port = 1;
        other.inbound_tag = "a".into();
        other.outbound_tag = "b".into();
        let mut w = other.to_json();
        w["inbounds"][0]["port"] = json!(18080);
        w["inbounds"][0]["tag"] = json!("in");
        w["routing"]["rules"][0]["inboundTag"][0] = json!("in");
        w["routing"]["rules"][0]["outboundTag"] = json!("out");
        assert_eq!(v, w);
    }

    #[test]
    fn process_config_routes_api_first() {
        let control: SocketAddr = "127.0.0.1:10085".parse().unwrap();
        let v = BootstrapConfig::default().to_process_json(control);
        assert_eq!(v["api"]["services"][0], "HandlerService");
        assert_eq!(v["inbounds"][1]["protocol"], "dokodemo-door");
        assert_eq!(v["inbounds"][1]["port"], 10085);
        assert_eq!(v["outbounds"][0]["protocol"], "blackhole");
        assert_eq!(v["routing"]["rules"][0]["outboundTag"], CONTROL_TAG);
        assert_eq!(v["routing"]["rules"][1]["outboundTag"], "proxy");
    }
}
