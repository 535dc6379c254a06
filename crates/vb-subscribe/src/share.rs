//! Encoding side of the subscription format.

use crate::model::{VmessEndpoint, VMESS_SCHEME};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

impl VmessEndpoint {
    /// Render as a `vmess://<base64 json>` share link.
    pub fn to_share_link(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(format!("{VMESS_SCHEME}{}", STANDARD.encode(json)))
    }
}

/// Build a subscription document: one share link per line, base64 wrapped.
pub fn encode_subscription(endpoints: &[VmessEndpoint]) -> Result<String, serde_json::Error> {
    let mut plain = String::new();
    for v in endpoints {
        plain.push_str(&v.to_share_link()?);
        plain.push('\n');
    }
    Ok(STANDARD.encode(plain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::parse_share_link;

    #[test]
    fn share_link_parses_back() {
        let v = VmessEndpoint {
            v: "2".into(),
            ps: "node".into(),
            id: "b831381d-6324-4d53-ad4f-8cda48b30811".into(),
            add: "node.example.com".into(),
            port: 443,
            net: "tcp".into(),
            kind: "http".into(),
            ..Default::default()
        };
        let link = v.to_share_link().unwrap();
        assert!(link.starts_with("vmess://"));
        assert_eq!(parse_share_link(&link).unwrap(), v);
    }
}
