//! Subscription decoding pipeline.
//!
//! A subscription is one base64 document whose plaintext is a list of
//! `vmess://<base64 json>` lines. Decoding runs as three stages over the
//! byte source: envelope decode (streaming), line split, per-line parse.
//! The first bad entry aborts the whole decode; nothing partial is returned.

use crate::filter::retain_matching;
use crate::model::{DecodeError, VmessEndpoint, VMESS_SCHEME};
use base64::engine::general_purpose::STANDARD;
use base64::read::DecoderReader;
use base64::Engine as _;
use std::io::{self, BufRead, BufReader, Read};

/// Decode a subscription and keep only entries whose label contains one of
/// `keywords`. An empty keyword list keeps everything.
pub fn decode<R: Read>(reader: R, keywords: &[String]) -> Result<Vec<VmessEndpoint>, DecodeError> {
    let endpoints = parse_subscription(reader)?;
    let total = endpoints.len();
    let kept = retain_matching(endpoints, keywords);
    tracing::debug!(total, kept = kept.len(), "subscription decoded");
    Ok(kept)
}

/// Decode every entry of a subscription, in order.
pub fn parse_subscription<R: Read>(reader: R) -> Result<Vec<VmessEndpoint>, DecodeError> {
    let envelope = DecoderReader::new(SkipLineBreaks::new(reader), &STANDARD);
    let mut lines = BufReader::new(envelope);
    let mut buf = Vec::new();
    let mut line_no = 0;
    let mut endpoints = Vec::new();
    loop {
        buf.clear();
        let n = lines
            .read_until(b'\n', &mut buf)
            .map_err(DecodeError::Envelope)?;
        if n == 0 {
            break;
        }
        line_no += 1;
        let raw = trim_line_end(&buf);
        if raw.is_empty() {
            continue;
        }
        let line = std::str::from_utf8(raw).map_err(|source| DecodeError::EntryUtf8 {
            line_no,
            line: String::from_utf8_lossy(raw).into_owned(),
            source,
        })?;
        endpoints.push(parse_share_link(line)?);
    }
    Ok(endpoints)
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parse a single `vmess://` share link.
pub fn parse_share_link(line: &str) -> Result<VmessEndpoint, DecodeError> {
    let payload = line
        .strip_prefix(VMESS_SCHEME)
        .ok_or_else(|| DecodeError::MissingScheme {
            line: line.to_string(),
        })?;
    let json = STANDARD
        .decode(payload)
        .map_err(|source| DecodeError::EntryBase64 {
            line: line.to_string(),
            source,
        })?;
    serde_json::from_slice(&json).map_err(|source| DecodeError::EntryJson {
        line: line.to_string(),
        source,
    })
}

/// Drops CR/LF bytes so line-wrapped base64 decodes as one document.
struct SkipLineBreaks<R> {
    inner: R,
}

impl<R> SkipLineBreaks<R> {
    fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for SkipLineBreaks<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.inner.read(buf)?;
            if n == 0 {
                return Ok(0);
            }
            let mut kept = 0;
            for i in 0..n {
                let b = buf[i];
                if b != b'\n' && b != b'\r' {
                    buf[kept] = b;
                    kept += 1;
                }
            }
            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}
