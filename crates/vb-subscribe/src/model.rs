use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Scheme prefix every subscription entry starts with.
pub const VMESS_SCHEME: &str = "vmess://";

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The outer base64 envelope (or the bytes inside it) could not be read.
    #[error("subscription envelope: {0}")]
    Envelope(#[source] std::io::Error),
    #[error("share: {line}, err: missing vmess:// prefix")]
    MissingScheme { line: String },
    #[error("share: {line}, err: {source}")]
    EntryBase64 {
        line: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("share: {line}, err: {source}")]
    EntryJson {
        line: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("share: {line}, err: invalid utf-8 at line {line_no}: {source}")]
    EntryUtf8 {
        line_no: usize,
        /// Lossy rendering of the raw line.
        line: String,
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("fetch error: {0}")]
    Fetch(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// Raw subscription line that caused the failure, when there is one.
    pub fn offending_line(&self) -> Option<&str> {
        match self {
            Self::MissingScheme { line }
            | Self::EntryBase64 { line, .. }
            | Self::EntryJson { line, .. }
            | Self::EntryUtf8 { line, .. } => Some(line),
            _ => None,
        }
    }
}

/// One decoded `vmess://` entry.
///
/// Field names follow the share-link JSON schema; every field is a string
/// except `port`. Missing fields decode to empty values, unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmessEndpoint {
    /// Config version tag.
    pub v: String,
    /// Display label (postscript).
    pub ps: String,
    /// User UUID.
    pub id: String,
    /// Server address, IP or domain.
    pub add: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u32,
    /// alterId.
    pub aid: String,
    /// Transport network (tcp, kcp, ws, h2, quic).
    pub net: String,
    /// Obfuscation type (none, http, srtp, utp, wechat-video).
    #[serde(rename = "type")]
    pub kind: String,
    /// Host header override.
    pub host: String,
    pub path: String,
    pub tls: String,
}

impl VmessEndpoint {
    pub fn label(&self) -> &str {
        &self.ps
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.eq_ignore_ascii_case("tls")
    }
}

fn port_from_number_or_string<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Num(u32),
        Text(String),
    }

    match Port::deserialize(de)? {
        Port::Num(n) => Ok(n),
        Port::Text(s) if s.trim().is_empty() => Ok(0),
        Port::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
