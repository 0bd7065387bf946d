//! Error types for symbol probing and invocation planning.

/// The boundary could not answer a probe at all.
///
/// Distinct from a symbol being unresolved: this means the question never got
/// an answer (the worker died, spoke garbage, or was never started).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("symbol probe failed: {message}")]
pub struct ProbeError {
    /// Description of the failure.
    pub message: String,
}

impl ProbeError {
    /// Creates a probe error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors produced while planning a compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// None of the candidate compiler classes exist in the boundary.
    #[error("no compiler class could be resolved (tried {})", .attempted.join(", "))]
    CompilerNotResolved {
        /// Every identifier that was tried, in priority order.
        attempted: Vec<String>,
    },

    /// The boundary failed to answer.
    #[error(transparent)]
    Probe(#[from] ProbeError),
}
