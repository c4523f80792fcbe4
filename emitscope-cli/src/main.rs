//! Emitscope CLI - region-scoped emissions inventories from the command line.

mod commands;
mod error;
mod progress;
mod runner;

use clap::{Parser, Subcommand};

use commands::classify::ClassifyArgs;
use commands::config::ConfigCommands;
use commands::inventory::InventoryArgs;

#[derive(Debug, Parser)]
#[command(name = "emitscope", version, about, long_about = None)]
struct Cli {
    /// Log filter, e.g. debug or emitscope=trace (overrides config)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the emissions inventory of a region
    Inventory(InventoryArgs),

    /// Show the IPCC category of sector labels
    Classify(ClassifyArgs),

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inventory(args) => commands::inventory::run(args, cli.log_level),
        Commands::Classify(args) => commands::classify::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use commands::common::OutputFormat;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_inventory() {
        let cli = Cli::try_parse_from([
            "emitscope",
            "inventory",
            "Misiones",
            "--year",
            "2022",
            "--scope",
            "extended",
            "--max-pages",
            "5",
            "--format",
            "json",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Commands::Inventory(args) = cli.command else {
            panic!("expected inventory command");
        };
        assert_eq!(args.region.as_deref(), Some("Misiones"));
        assert_eq!(args.year.as_deref(), Some("2022"));
        assert_eq!(args.max_pages, Some(5));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from(["emitscope", "config", "set", "api.country", "URY"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { ref key, ref value }
            } if key == "api.country" && value == "URY"
        ));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = Cli::try_parse_from(["emitscope", "inventory", "X", "--format", "xml"]);
        assert!(result.is_err());
    }
}
