//! `neohub send`: forward one raw command through the gateway.

use std::sync::Arc;

use owo_colors::OwoColorize;

use neohub_core::{SinkSet, Supervisor};

use crate::cli::{GlobalOpts, SendArgs};
use crate::error::CliError;

use super::build_hub_config;

pub async fn handle(args: &SendArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = build_hub_config(global)?;

    tracing::debug!(command = %args.command, "sending hub command");

    // One-shot: no sinks, start just installs the connection.
    let supervisor = Supervisor::new(config, Arc::new(SinkSet::new()));
    supervisor.start().await?;

    let result = supervisor.send_command(&args.command).await;
    supervisor.stop().await;
    result?;

    println!("{}", "sent".green().bold());
    Ok(())
}
