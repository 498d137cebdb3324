mod commands;
mod display;
mod session;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nessus")]
#[command(about = "Nessus Manager command line client", long_about = None)]
struct Cli {
    #[arg(short, long, global = true, help = "Path to a YAML config file")]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    #[command(about = "Manage linked agents")]
    Agents {
        #[command(subcommand)]
        command: commands::AgentsCommand,
    },

    #[command(name = "agent-groups", about = "Manage agent groups")]
    AgentGroups {
        #[command(subcommand)]
        command: commands::AgentGroupsCommand,
    },

    #[command(about = "Manage scan folders")]
    Folders {
        #[command(subcommand)]
        command: commands::FoldersCommand,
    },

    #[command(about = "Work with scans")]
    Scans {
        #[command(subcommand)]
        command: commands::ScansCommand,
    },

    #[command(about = "Show the filters the manager accepts")]
    Filters(commands::Filters),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let nessus = session::connect(cli.config.as_deref())?;

    match cli.command {
        Commands::Agents { command } => command.run(&nessus).await?,
        Commands::AgentGroups { command } => command.run(&nessus).await?,
        Commands::Folders { command } => command.run(&nessus).await?,
        Commands::Scans { command } => command.run(&nessus).await?,
        Commands::Filters(cmd) => cmd.run(&nessus).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent_list_filters() {
        let cli = Cli::try_parse_from([
            "nessus",
            "agents",
            "list",
            "--filter",
            "platform:eq:LINUX",
            "-f",
            "name:match:web",
            "--any",
        ])
        .unwrap();

        match cli.command {
            Commands::Agents {
                command: commands::AgentsCommand::List(list),
            } => {
                assert_eq!(list.filters.len(), 2);
                assert_eq!(list.filters[1].operator, "match");
                assert!(list.any);
            }
            _ => panic!("expected agents list"),
        }
    }

    #[test]
    fn test_rejects_malformed_filter() {
        assert!(Cli::try_parse_from(["nessus", "agents", "list", "-f", "platform"]).is_err());
    }

    #[test]
    fn test_unlink_requires_ids() {
        assert!(Cli::try_parse_from(["nessus", "agents", "unlink"]).is_err());
        assert!(Cli::try_parse_from(["nessus", "agents", "unlink", "1", "2"]).is_ok());
    }

    #[test]
    fn test_global_config_flag() {
        let args = ["nessus", "folders", "list", "--config", "n.yaml", "-vv"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("n.yaml")));
        assert_eq!(cli.verbose, 2);
    }
}
