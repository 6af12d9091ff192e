//! Clap derive structures for the `neohub` CLI.

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// neohub -- poll and command a Heatmiser NeoHub from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "neohub",
    version,
    about = "Supervise and command a Heatmiser NeoHub",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Hub profile to use
    #[arg(long, short = 'p', env = "NEOHUB_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Hub host name or IP address (overrides profile)
    #[arg(long, env = "NEOHUB_HOST", global = true)]
    pub host: Option<String>,

    /// Hub TCP port (overrides profile)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Slow-cadence polling interval in seconds (overrides profile)
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the polling supervisor and print snapshots until Ctrl-C
    Watch,

    /// Forward one raw command string to the hub
    Send(SendArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Command string, forwarded to the hub verbatim
    /// (e.g. '{"SET_TEMP":[20.5,"Living Room"]}')
    pub command: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Show the loaded configuration
    Show,
    /// Write a starter config with an example profile
    Init,
}
