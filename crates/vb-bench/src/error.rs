use thiserror::Error;
use vb_engine::EngineError;

#[derive(Debug, Error)]
pub enum BenchError {
    /// Activating a route failed; the run is aborted.
    #[error("set outbound for {label}: {source}")]
    SetOutbound {
        label: String,
        #[source]
        source: EngineError,
    },
}
