//! Sequential activate, probe, deactivate loop.

use crate::error::BenchError;
use crate::result::BenchReport;
use vb_engine::ProxyEngineClient;
use vb_subscribe::VmessEndpoint;

/// Probe every endpoint through `client`, one at a time, in input order.
///
/// A failed activation aborts the run. Probe failures are recorded. Route
/// removal runs after every probe; its errors are logged and ignored.
pub async fn run<C, I>(client: &mut C, endpoints: I, target: &str) -> Result<BenchReport, BenchError>
where
    C: ProxyEngineClient + ?Sized,
    I: IntoIterator<Item = VmessEndpoint>,
{
    let mut report = BenchReport::default();
    for endpoint in endpoints {
        client
            .set_outbound(&endpoint)
            .await
            .map_err(|source| BenchError::SetOutbound {
                label: endpoint.label().to_string(),
                source,
            })?;

        let result = client.ping(target).await;
        match &result {
            Ok(elapsed) => tracing::debug!(
                endpoint = %endpoint.label(),
                elapsed_ms = elapsed.as_millis() as u64,
                "probe ok"
            ),
            Err(e) => tracing::debug!(endpoint = %endpoint.label(), error = %e, "probe failed"),
        }

        if let Err(e) = client.delete_outbound().await {
            tracing::warn!(endpoint = %endpoint.label(), error = %e, "remove outbound failed");
        }
        report.record(endpoint, result);
    }
    report.rank();
    tracing::info!(
        normal = report.normal.len(),
        errors = report.errors.len(),
        "benchmark finished"
    );
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The fastest endpoint is now routed and left active.
    Committed(VmessEndpoint),
    /// No endpoint probed successfully.
    NoCandidate,
}

/// Route traffic through the fastest endpoint of `report` and leave it active.
pub async fn commit_fastest<C>(client: &mut C, report: &BenchReport) -> Result<CommitOutcome, BenchError>
where
    C: ProxyEngineClient + ?Sized,
{
    let Some(fastest) = report.fastest() else {
        return Ok(CommitOutcome::NoCandidate);
    };
    let endpoint = &fastest.endpoint;
    client
        .set_outbound(endpoint)
        .await
        .map_err(|source| BenchError::SetOutbound {
            label: endpoint.label().to_string(),
            source,
        })?;
    tracing::info!(endpoint = %endpoint.label(), tag = %client.outbound_tag(), "fastest route committed");
    Ok(CommitOutcome::Committed(endpoint.clone()))
}
