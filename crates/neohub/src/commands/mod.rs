//! Command handlers: bridge CLI args to the supervisor and config layers.

pub mod config_cmd;
pub mod send;
pub mod watch;

use neohub_core::HubConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build a `HubConfig` from the config file, profile, and CLI overrides.
pub fn build_hub_config(global: &GlobalOpts) -> Result<HubConfig, CliError> {
    let cfg = neohub_config::load_config_or_default();
    let profile_name = neohub_config::active_profile_name(global.profile.as_deref(), &cfg);

    let mut hub = if let Some(profile) = cfg.profiles.get(&profile_name) {
        neohub_config::profile_to_hub_config(profile, &profile_name)?
    } else if global.host.is_some() {
        // No profile -- build from CLI flags alone
        HubConfig::default()
    } else {
        return Err(CliError::NoHub {
            path: neohub_config::config_path().display().to_string(),
        });
    };

    if let Some(ref host) = global.host {
        hub.host = host.clone();
    }
    if let Some(port) = global.port {
        hub.port = port;
    }
    if let Some(interval) = global.interval {
        hub.poll_interval_secs = interval;
    }

    // Re-validate: CLI overrides may have broken a valid profile.
    hub.validate()?;
    Ok(hub)
}
