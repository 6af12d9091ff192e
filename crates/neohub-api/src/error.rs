use thiserror::Error;

/// Top-level error type for the `neohub-api` crate.
///
/// Covers every failure mode of one request/response exchange with the hub:
/// connect/write/read faults, the overall exchange deadline, and payload
/// decoding. `neohub-core` treats all of them uniformly as a communication
/// failure -- the distinctions exist for logging, not for control flow.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Socket-level error (connection refused, DNS failure, reset, etc.)
    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    /// The whole exchange exceeded its deadline.
    #[error("Exchange timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The hub closed the connection before sending any payload.
    #[error("Hub closed the connection without a response")]
    ConnectionClosed,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transport-level fault (as opposed to a
    /// decode failure). Purely informational -- callers handle both the
    /// same way.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Timeout { .. } | Self::ConnectionClosed
        )
    }
}
