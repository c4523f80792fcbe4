//! Configuration management CLI commands.
//!
//! `config get`, `config set`, `config list` and `config path` view and
//! modify `~/.emitscope/config.ini` from the command line.

use std::io::{self, Write};
use std::path::Path;

use clap::Subcommand;
use emitscope::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., budget.max_pages)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., budget.max_pages)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        ConfigCommands::Get { key } => run_get(&mut out, &path, &key),
        ConfigCommands::Set { key, value } => run_set(&mut out, &path, &key, &value),
        ConfigCommands::List => run_list(&mut out, &path),
        ConfigCommands::Path => {
            writeln!(out, "{}", path.display())?;
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'emitscope config list' to see available keys.",
            key
        ))
    })
}

fn run_get<W: Write>(out: &mut W, path: &Path, key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load_from(path).unwrap_or_default();
    let value = config_key.get(&config);

    if value.is_empty() {
        writeln!(out, "(not set)")?;
    } else {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}

fn run_set<W: Write>(out: &mut W, path: &Path, key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load_from(path).unwrap_or_default();
    config_key
        .set(&mut config, value)
        .map_err(|e| CliError::Config(e.to_string()))?;
    config.save_to(path)?;

    writeln!(out, "Set {} = {}", config_key.name(), config_key.get(&config))?;
    Ok(())
}

fn run_list<W: Write>(out: &mut W, path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path).unwrap_or_default();

    writeln!(out, "Configuration Settings")?;
    writeln!(out, "======================")?;

    let mut current_section = "";
    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            writeln!(out)?;
            writeln!(out, "[{}]", section)?;
            current_section = section;
        }

        let value = key.get(&config);
        if value.is_empty() {
            writeln!(out, "  {} = (not set)", key.key_name())?;
        } else {
            writeln!(out, "  {} = {}", key.key_name(), value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<(), CliError>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let set = output(|out| run_set(out, &path, "budget.max_pages", "25"));
        assert_eq!(set.trim(), "Set budget.max_pages = 25");

        let get = output(|out| run_get(out, &path, "budget.max_pages"));
        assert_eq!(get.trim(), "25");
        assert!(path.exists());
    }

    #[test]
    fn test_set_rejects_invalid_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let mut out = Vec::new();
        let err = run_set(&mut out, &path, "inventory.level", "planet").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_unknown_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let mut out = Vec::new();
        let err = run_get(&mut out, &path, "api.token").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key 'api.token'"));
    }

    #[test]
    fn test_list_groups_by_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.ini");

        let list = output(|out| run_list(out, &path));
        assert!(list.contains("[api]\n  base_url = https://api.climatetrace.org"));
        assert!(list.contains("[logging]"));
        assert!(list.contains("  file = (not set)"));
    }
}
