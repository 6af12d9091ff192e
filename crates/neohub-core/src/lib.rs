// neohub-core: Polling supervisor and command gateway between neohub-api
// and per-device consumers.

pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod model;
pub mod supervisor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{FAST_POLL_CYCLES, FAST_POLL_INTERVAL_SECS, HubConfig, LAZY_POLL_INTERVAL_SECS};
pub use dispatch::{SinkRegistry, SinkSet, StatusSink};
pub use error::CoreError;
pub use health::{HubHealth, OfflineCause};
pub use model::{DeviceStatus, StatusSnapshot, TemperatureUnit};
pub use supervisor::Supervisor;
