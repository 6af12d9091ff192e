//! `neohub config`: inspect and scaffold the config file.

use neohub_config::{Config, ConfigError, Profile};

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;

pub fn handle(args: &ConfigArgs) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Path => {
            println!("{}", neohub_config::config_path().display());
            Ok(())
        }

        ConfigAction::Show => {
            let cfg = neohub_config::load_config()?;
            let text = toml::to_string_pretty(&cfg).map_err(ConfigError::from)?;
            print!("{text}");
            Ok(())
        }

        ConfigAction::Init => {
            let mut cfg: Config = neohub_config::load_config_or_default();
            cfg.profiles
                .entry("default".into())
                .or_insert_with(|| Profile {
                    host: "192.168.1.10".into(),
                    port: 4242,
                    poll_interval: 60,
                    timeout: None,
                });
            neohub_config::save_config(&cfg)?;
            println!("wrote {}", neohub_config::config_path().display());
            Ok(())
        }
    }
}
