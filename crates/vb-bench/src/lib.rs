//! Latency benchmark over proxy engine routes.
//!
//! [`run`] walks the endpoints strictly one after another: install the route,
//! probe the target through it, remove the route. Successes are ranked by
//! latency; failures keep probe order. [`commit_fastest`] re-installs the
//! winner and leaves it active.

pub mod error;
pub mod orchestrator;
pub mod report;
pub mod result;

pub use error::BenchError;
pub use orchestrator::{commit_fastest, run, CommitOutcome};
pub use result::{BenchReport, ProbeFailure, ProbeStat};
