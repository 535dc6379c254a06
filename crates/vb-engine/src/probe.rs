use crate::error::{BootstrapError, ProbeError};
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbeMethod {
    #[default]
    Head,
    Get,
}

impl FromStr for ProbeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "head" => Ok(Self::Head),
            "get" => Ok(Self::Get),
            other => Err(format!("unsupported probe method: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Whole-request timeout. `None` leaves the HTTP client default (no limit).
    pub timeout: Option<Duration>,
    pub method: ProbeMethod,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(10)),
            method: ProbeMethod::Head,
        }
    }
}

/// Issues timed requests through a fixed HTTP proxy.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
    method: ProbeMethod,
    proxy: String,
}

impl Prober {
    pub fn new(proxy: &str, options: &ProbeOptions) -> Result<Self, BootstrapError> {
        let proxy = proxy_url(proxy);
        let mut builder = reqwest::Client::builder()
            .proxy(reqwest::Proxy::all(&proxy).map_err(BootstrapError::ProbeClient)?);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(BootstrapError::ProbeClient)?;
        Ok(Self {
            client,
            method: options.method,
            proxy,
        })
    }

    pub fn proxy(&self) -> &str {
        &self.proxy
    }

    /// Time one request to `target`, from send until the body is drained.
    ///
    /// Any HTTP status counts as success; only transport failures are errors.
    pub async fn probe(&self, target: &str) -> Result<Duration, ProbeError> {
        let request = match self.method {
            ProbeMethod::Head => self.client.head(target),
            ProbeMethod::Get => self.client.get(target),
        };
        let start = Instant::now();
        let mut response = request
            .send()
            .await
            .map_err(|e| ProbeError::from_send(&e))?;
        let status = response.status();
        while response
            .chunk()
            .await
            .map_err(|e| ProbeError::from_body(&e))?
            .is_some()
        {}
        let elapsed = start.elapsed();
        tracing::debug!(
            url = target,
            proxy = %self.proxy,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "probe finished"
        );
        Ok(elapsed)
    }
}

/// Proxy URL from an `inbound_host` that may or may not carry a scheme.
pub fn proxy_url(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
