// src/cli.rs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line client for the stormreplay advisory replay service.
///
/// `asgs-global.conf` supplies credentials and defaults.
/// CLI flags only override config values.
#[derive(Parser, Debug)]
#[command(
    name = "replaycli",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Path to the INI config file
    ///
    /// Defaults to $HOME/asgs-global.conf
    #[arg(long, global = true, env = "REPLAYD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the replay service base URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Log requests and responses to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// All supported CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the storms the service can replay.
    Storms {
        /// Print the catalog as JSON
        #[arg(long = "as", value_enum)]
        render: Option<StormsFormat>,
    },

    /// Start replaying a storm.
    ///
    /// Advisories outside the storm's range are clamped to it.
    Start {
        #[command(flatten)]
        args: StartArgs,
    },

    /// Show running replays.
    Status {
        /// Output format
        ///
        /// json: raw server response
        /// config: shell configuration block for --name
        #[arg(long = "as", value_enum)]
        render: Option<StatusFormat>,

        /// Storm to render (required with --as config)
        #[arg(long)]
        name: Option<String>,
    },

    /// Issue the next advisory of a running replay immediately.
    #[command(name = "nextAdv")]
    NextAdv {
        #[arg(long)]
        name: Option<String>,
    },

    /// Stop and remove a running replay.
    Delete {
        #[arg(long)]
        name: Option<String>,
    },

    /// Show the identity bound to the configured API key.
    Uuid,
}

/// Flags accepted by `start`.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct StartArgs {
    /// Storm to replay
    #[arg(long)]
    pub name: Option<String>,

    /// First advisory to issue
    #[arg(long)]
    pub startadv: Option<u32>,

    /// Last advisory to issue
    #[arg(long)]
    pub endadv: Option<u32>,

    /// Seconds between advisories
    #[arg(long)]
    pub frequency: Option<u64>,

    /// Restart from the first advisory after the last one
    #[arg(long = "loop")]
    pub loop_replay: bool,

    /// Email a notification for every advisory
    #[arg(long)]
    pub notify: bool,

    /// Notification address
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormsFormat {
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFormat {
    Json,
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_flags() {
        let cli = Cli::try_parse_from([
            "replaycli", "start", "--name", "irma", "--startadv", "3", "--loop", "--email",
            "ops@example.com",
        ])
        .unwrap();

        match cli.command {
            Command::Start { args } => {
                assert_eq!(args.name.as_deref(), Some("irma"));
                assert_eq!(args.startadv, Some(3));
                assert_eq!(args.endadv, None);
                assert!(args.loop_replay);
                assert!(!args.notify);
                assert_eq!(args.email.as_deref(), Some("ops@example.com"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn next_adv_keeps_camel_case_name() {
        let cli = Cli::try_parse_from(["replaycli", "nextAdv", "--name", "irma"]).unwrap();
        assert!(matches!(cli.command, Command::NextAdv { name: Some(ref n) } if n == "irma"));
    }

    #[test]
    fn status_accepts_render_modes() {
        let cli =
            Cli::try_parse_from(["replaycli", "status", "--as", "config", "--name", "irma"]).unwrap();
        match cli.command {
            Command::Status { render, name } => {
                assert_eq!(render, Some(StatusFormat::Config));
                assert_eq!(name.as_deref(), Some("irma"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn storms_rejects_config_mode() {
        assert!(Cli::try_parse_from(["replaycli", "storms", "--as", "config"]).is_err());
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli =
            Cli::try_parse_from(["replaycli", "uuid", "--url", "http://localhost:9000", "-v"])
                .unwrap();
        assert_eq!(cli.url.as_deref(), Some("http://localhost:9000"));
        assert!(cli.verbose);
    }
}
