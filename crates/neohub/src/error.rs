//! CLI error type and exit codes.

use thiserror::Error;

use neohub_config::ConfigError;
use neohub_core::CoreError;

/// Exit codes, stable for scripting.
pub mod exit_code {
    pub const CONFIG: i32 = 2;
    pub const NOT_INITIALIZED: i32 = 3;
    pub const COMMUNICATION: i32 = 7;
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no hub configured: pass --host or create {path}")]
    NoHub { path: String },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::NoHub { .. } | Self::Core(CoreError::Config { .. }) => {
                exit_code::CONFIG
            }
            Self::Core(CoreError::NotInitialized) => exit_code::NOT_INITIALIZED,
            Self::Core(CoreError::Communication { .. }) => exit_code::COMMUNICATION,
        }
    }
}
