//! PortSentinel CLI - Watch local ports and the processes bound to them
//!
//! A command-line tool for scanning a configured set of ports, killing the
//! processes that own them and managing which ports are watched.

mod commands;
mod redact;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "portsentinel")]
#[command(author, version, about = "Watch local ports and the processes bound to them")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log level written to stderr (default: warn); ignored when RUST_LOG is set
    #[arg(long, global = true)]
    log_level: Option<tracing::Level>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan all configured ports (default)
    #[command(alias = "ls")]
    List,

    /// Scan a single port
    Scan {
        /// Port number to scan
        port: u32,
    },

    /// Kill a process by PID
    Kill {
        /// Process ID to terminate
        pid: u32,

        /// Force kill (SIGKILL / taskkill /F) without graceful shutdown
        #[arg(short, long, conflicts_with = "graceful")]
        force: bool,

        /// Graceful termination even when force kill is the configured default
        #[arg(short, long)]
        graceful: bool,
    },

    /// Manage the watched ports
    Ports {
        #[command(subcommand)]
        action: PortsAction,
    },

    /// Rescan periodically until Ctrl-C
    Watch {
        /// Refresh interval in milliseconds (defaults to the configured one)
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum PortsAction {
    /// List preset and custom ports
    #[command(alias = "ls")]
    List,
    /// Add a custom port
    Add { port: u32 },
    /// Remove a custom port
    #[command(alias = "rm")]
    Remove { port: u32 },
    /// Pin a port to the top of the list
    Pin { port: u32 },
    /// Unpin a port
    Unpin { port: u32 },
    /// Enable a preset port
    Enable { port: u32 },
    /// Disable a preset port
    Disable { port: u32 },
}

/// Build the log filter: RUST_LOG when it is set and valid, otherwise
/// `--log-level`, otherwise `warn`.
fn log_filter(rust_log: Option<&str>, level: Option<tracing::Level>) -> EnvFilter {
    let from_env = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok());

    from_env.unwrap_or_else(|| {
        EnvFilter::default().add_directive(level.unwrap_or(tracing::Level::WARN).into())
    })
}

fn init_logging(level: Option<tracing::Level>) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(rust_log.as_deref(), level);
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let service = commands::open_service().await?;

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => commands::list::run(&service, cli.json).await?,
        Commands::Scan { port } => commands::scan::run(&service, port, cli.json).await?,
        Commands::Kill {
            pid,
            force,
            graceful,
        } => {
            let force = match (force, graceful) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::kill::run(&service, pid, force).await?;
        }
        Commands::Ports { action } => match action {
            PortsAction::List => commands::ports::list(&service, cli.json)?,
            PortsAction::Add { port } => commands::ports::add(&service, port).await?,
            PortsAction::Remove { port } => commands::ports::remove(&service, port).await?,
            PortsAction::Pin { port } => commands::ports::pin(&service, port, true).await?,
            PortsAction::Unpin { port } => commands::ports::pin(&service, port, false).await?,
            PortsAction::Enable { port } => {
                commands::ports::set_enabled(&service, port, true).await?
            }
            PortsAction::Disable { port } => {
                commands::ports::set_enabled(&service, port, false).await?
            }
        },
        Commands::Watch { interval_ms } => {
            commands::watch::run(Arc::new(service), interval_ms, cli.json).await?;
        }
        Commands::Config => commands::config::show(&service, cli.json).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_list() {
        let cli = Cli::try_parse_from(["portsentinel"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
        assert!(cli.log_level.is_none());

        let cli = Cli::try_parse_from(["portsentinel", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, Some(tracing::Level::DEBUG));
    }

    #[test]
    fn test_rust_log_takes_precedence_over_log_level() {
        let filter = log_filter(Some("debug"), Some(tracing::Level::ERROR));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = log_filter(Some("debug"), None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_log_level_applies_without_rust_log() {
        let filter = log_filter(None, Some(tracing::Level::TRACE));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));

        let filter = log_filter(Some("   "), Some(tracing::Level::INFO));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_default_log_level_is_warn() {
        let filter = log_filter(None, None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        // Unparseable RUST_LOG falls back to the flag or the default.
        let filter = log_filter(Some("portsentinel=loudest"), None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_kill_force_conflicts_with_graceful() {
        assert!(Cli::try_parse_from(["portsentinel", "kill", "42", "-f", "-g"]).is_err());

        let cli = Cli::try_parse_from(["portsentinel", "kill", "42", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Kill {
                pid: 42,
                force: true,
                graceful: false
            })
        ));
    }

    #[test]
    fn test_ports_subcommands_parse() {
        let cli = Cli::try_parse_from(["portsentinel", "ports", "rm", "9000", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Some(Commands::Ports {
                action: PortsAction::Remove { port: 9000 }
            })
        ));
    }
}
