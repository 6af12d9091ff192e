//! `neohub watch`: run the supervisor and print what it sees.

use std::sync::Arc;

use owo_colors::OwoColorize;

use neohub_core::{SinkSet, StatusSink, StatusSnapshot, Supervisor, TemperatureUnit};

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::build_hub_config;

/// Sink that renders every snapshot to stdout.
struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn on_poll(&self, snapshot: &StatusSnapshot, unit: TemperatureUnit) {
        for device in &snapshot.devices {
            let temperature = format_temperature(device.temperature, unit);
            let set_point = format_temperature(device.set_temperature, unit);

            let mut flags = Vec::new();
            if device.heating {
                flags.push("heating");
            }
            if device.standby {
                flags.push("standby");
            }
            if device.offline {
                flags.push("offline");
            }
            if device.low_battery {
                flags.push("low battery");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!("  [{}]", flags.join(", "))
            };

            println!(
                "{:<24} {:>8}  (set {:>8}){}",
                device.name.bold(),
                temperature,
                set_point,
                flags.dimmed()
            );
        }
        println!();
    }
}

fn format_temperature(value: Option<f64>, unit: TemperatureUnit) -> String {
    value.map_or_else(|| "--".into(), |t| format!("{t:.1}{}", unit.symbol()))
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = build_hub_config(global)?;

    let sinks = Arc::new(SinkSet::new());
    sinks.register("console", Arc::new(ConsoleSink));

    let supervisor = Supervisor::new(config, sinks);
    supervisor.start().await?;

    println!(
        "{} {} (Ctrl-C to stop)",
        "watching".green().bold(),
        supervisor.config().host
    );

    let mut health = supervisor.health();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = health.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = health.borrow_and_update().clone();
                eprintln!("{} {state}", "health:".dimmed());
            }
        }
    }

    supervisor.stop().await;
    Ok(())
}
