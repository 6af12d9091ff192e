// ── Core error types ──
//
// User-facing errors from neohub-core. Consumers never see socket error
// kinds or JSON parse failures directly -- the `From<neohub_api::Error>`
// impl collapses every transport-layer fault into `Communication`, which
// is exactly how the supervisor treats them.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid connection parameters. Fatal for the current lifecycle;
    /// requires a new supervisor with corrected parameters.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A command was issued before the supervisor was started.
    #[error("Hub connection is not initialized")]
    NotInitialized,

    /// A transport or decode fault during an exchange. Transient; the next
    /// scheduled cycle retries implicitly.
    #[error("Communication with the hub failed: {message}")]
    Communication { message: String },
}

impl From<neohub_api::Error> for CoreError {
    fn from(err: neohub_api::Error) -> Self {
        Self::Communication {
            message: err.to_string(),
        }
    }
}
