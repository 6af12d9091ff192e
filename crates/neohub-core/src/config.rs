// ── Runtime connection configuration ──
//
// Describes *how* to reach one hub. Carries address and timing only and
// never touches disk -- the CLI (or any other host) builds a `HubConfig`
// and hands it in. Validated once at supervisor start; immutable for the
// lifetime of the connection.

use std::time::Duration;

use crate::error::CoreError;

/// Fixed fast-cadence polling period, in seconds. Also the lower bound for
/// the configurable slow-cadence period.
pub const FAST_POLL_INTERVAL_SECS: u64 = 5;

/// Upper bound for the configurable slow-cadence period, in seconds.
pub const LAZY_POLL_INTERVAL_SECS: u64 = 60;

/// How many fast-cadence cycles one burst lasts.
pub const FAST_POLL_CYCLES: u32 = 10;

/// Configuration for supervising a single hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub host name or IP address.
    pub host: String,
    /// Hub TCP port. The NeoHub legacy API listens on 4242.
    pub port: u16,
    /// Slow-cadence polling period (seconds). Must lie within
    /// [`FAST_POLL_INTERVAL_SECS`, `LAZY_POLL_INTERVAL_SECS`].
    pub poll_interval_secs: u64,
    /// Deadline for one request/response exchange.
    pub timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 4242,
            poll_interval_secs: LAZY_POLL_INTERVAL_SECS,
            timeout: Duration::from_secs(5),
        }
    }
}

impl HubConfig {
    /// Check the invariants the supervisor relies on.
    ///
    /// A violation here is fatal for the lifecycle: the supervisor reports
    /// a configuration-error health state and starts nothing.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.host.trim().is_empty() {
            return Err(CoreError::Config {
                message: "host must be set".into(),
            });
        }

        if self.port == 0 {
            return Err(CoreError::Config {
                message: "port is invalid".into(),
            });
        }

        if self.poll_interval_secs < FAST_POLL_INTERVAL_SECS
            || self.poll_interval_secs > LAZY_POLL_INTERVAL_SECS
        {
            return Err(CoreError::Config {
                message: format!(
                    "poll_interval_secs must lie in [{FAST_POLL_INTERVAL_SECS}..{LAZY_POLL_INTERVAL_SECS}]"
                ),
            });
        }

        Ok(())
    }
}
