use crate::model::{DecodeError, VmessEndpoint};

/// Fetch a subscription body. Non-2xx responses are treated as failures.
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, DecodeError> {
    let resp = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| DecodeError::Fetch(e.to_string()))?;
    let body = resp
        .bytes()
        .await
        .map_err(|e| DecodeError::Fetch(e.to_string()))?;
    tracing::debug!(url, bytes = body.len(), "subscription fetched");
    Ok(body.to_vec())
}

/// Fetch and decode a subscription URL.
pub async fn decode_url(url: &str, keywords: &[String]) -> Result<Vec<VmessEndpoint>, DecodeError> {
    let body = fetch_bytes(url).await?;
    crate::decode::decode(body.as_slice(), keywords)
}
