use std::time::Duration;
use vb_engine::ProbeError;
use vb_subscribe::VmessEndpoint;

/// A successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeStat {
    pub endpoint: VmessEndpoint,
    pub elapsed: Duration,
}

/// A probe that failed at the transport level.
#[derive(Debug, Clone)]
pub struct ProbeFailure {
    pub endpoint: VmessEndpoint,
    pub error: ProbeError,
}

/// Outcome of one benchmark run.
///
/// `normal` is sorted by ascending latency once the run ends; `errors` keeps
/// probe order. An endpoint lands in exactly one of the two.
#[derive(Debug, Clone, Default)]
pub struct BenchReport {
    pub normal: Vec<ProbeStat>,
    pub errors: Vec<ProbeFailure>,
}

impl BenchReport {
    pub(crate) fn record(&mut self, endpoint: VmessEndpoint, result: Result<Duration, ProbeError>) {
        match result {
            Ok(elapsed) => self.normal.push(ProbeStat { endpoint, elapsed }),
            Err(error) => self.errors.push(ProbeFailure { endpoint, error }),
        }
    }

    /// Stable sort, so equal latencies keep probe order.
    pub(crate) fn rank(&mut self) {
        self.normal.sort_by_key(|s| s.elapsed);
    }

    pub fn fastest(&self) -> Option<&ProbeStat> {
        self.normal.first()
    }

    pub fn len(&self) -> usize {
        self.normal.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
