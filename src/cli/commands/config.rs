//! `innkeeper config` command - Configuration management
//!
//! Provides commands to view and modify innkeeper configuration.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::core::config::LOCAL_CONFIG_FILE;
use crate::core::{Config, SessionStore};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration and session files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., api_url, author)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of ./.innkeeper.yaml
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of ./.innkeeper.yaml
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("api_url", "Base URL of the marketplace backend"),
    ("author", "Fallback createdBy when nobody is logged in"),
    ("timeout_secs", "Request timeout in seconds"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, _global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Unset(args) => run_unset(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs) -> Result<()> {
    let config = Config::load();

    if let Some(key) = &args.key {
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Unknown configuration key '{}'", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        let explicit = match *key {
            "api_url" => config.api_url.is_some(),
            "author" => config.author.is_some(),
            _ => config.timeout_secs.is_some(),
        };
        let value = get_config_value(&config, key).unwrap_or_default();
        if explicit {
            println!("  {}: {}", style(key).cyan(), style(value).yellow());
        } else {
            println!(
                "  {}: {} {}",
                style(key).cyan(),
                style(value).yellow(),
                style("(default)").dim()
            );
        }
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (INNKEEPER_API_URL, INNKEEPER_AUTHOR, INNKEEPER_TIMEOUT_SECS)");
    println!("  2. Local config ({})", LOCAL_CONFIG_FILE);
    println!("  3. Global config (~/.config/innkeeper/config.yaml)");
    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    let value = parse_value(&args.key, &args.value)?;
    let config_path = target_path(args.global)?;
    let mut config_map = read_mapping(&config_path)?;

    if let serde_yml::Value::Mapping(map) = &mut config_map {
        map.insert(serde_yml::Value::String(args.key.clone()), value);
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }
    }
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    println!(
        "{} Set {} {} {} in {}",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        config_path.display()
    );
    Ok(())
}

fn run_unset(args: UnsetArgs) -> Result<()> {
    let config_path = target_path(args.global)?;
    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    let removed = match &mut config_map {
        serde_yml::Value::Mapping(map) => map
            .remove(&serde_yml::Value::String(args.key.clone()))
            .is_some(),
        _ => false,
    };
    if !removed {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    println!(
        "{} Removed {} from {}",
        style("✓").green(),
        style(&args.key).cyan(),
        config_path.display()
    );
    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();
    match Config::global_config_path() {
        Some(path) => print_path("Global:", &path),
        None => println!("  {} {}", style("Global:").cyan(), style("(unavailable)").dim()),
    }
    print_path("Local:", Path::new(LOCAL_CONFIG_FILE));
    match SessionStore::default_location().path() {
        Some(path) => print_path("Session:", path),
        None => println!("  {} {}", style("Session:").cyan(), style("(unavailable)").dim()),
    }
    Ok(())
}

fn print_path(label: &str, path: &Path) {
    let state = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("  {:<9} {} {}", style(label).cyan(), path.display(), state);
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }
    println!();
    println!(
        "{}",
        style("Use 'innkeeper config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

fn target_path(global: bool) -> Result<PathBuf> {
    if global {
        Config::global_config_path()
            .ok_or_else(|| miette::miette!("Could not determine global config directory"))
    } else {
        Ok(PathBuf::from(LOCAL_CONFIG_FILE))
    }
}

fn read_mapping(path: &Path) -> Result<serde_yml::Value> {
    if !path.exists() {
        return Ok(serde_yml::Value::Mapping(Default::default()));
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    let parsed: serde_yml::Value =
        serde_yml::from_str(&content).unwrap_or(serde_yml::Value::Mapping(Default::default()));
    if matches!(parsed, serde_yml::Value::Mapping(_)) {
        Ok(parsed)
    } else {
        Ok(serde_yml::Value::Mapping(Default::default()))
    }
}

/// Check a key and turn its text into the YAML value stored for it
fn parse_value(key: &str, value: &str) -> Result<serde_yml::Value> {
    match key {
        "api_url" => {
            reqwest::Url::parse(value)
                .map_err(|e| miette::miette!("'{}' is not a valid URL: {}", value, e))?;
            Ok(serde_yml::Value::String(value.to_string()))
        }
        "author" => Ok(serde_yml::Value::String(value.to_string())),
        "timeout_secs" => {
            let secs: u64 = value
                .trim()
                .parse()
                .map_err(|_| miette::miette!("timeout_secs must be a whole number of seconds"))?;
            Ok(serde_yml::Value::Number(secs.into()))
        }
        _ => Err(miette::miette!(
            help = "Run `innkeeper config keys` to list valid keys",
            "Unknown configuration key '{}'",
            key
        )),
    }
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "api_url" => Some(config.api_url()),
        "author" => Some(config.author()),
        "timeout_secs" => Some(config.timeout().as_secs().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_checks_keys() {
        assert!(parse_value("colour", "blue").is_err());
        assert!(parse_value("api_url", "not a url").is_err());
        assert!(parse_value("timeout_secs", "soon").is_err());
        assert_eq!(
            parse_value("timeout_secs", "45").unwrap(),
            serde_yml::Value::Number(45u64.into())
        );
    }

    #[test]
    fn test_get_config_value_uses_defaults() {
        let config = Config::default();
        assert_eq!(
            get_config_value(&config, "api_url").as_deref(),
            Some(crate::core::config::DEFAULT_API_URL)
        );
        assert_eq!(get_config_value(&config, "timeout_secs").as_deref(), Some("30"));
        assert!(get_config_value(&config, "editor").is_none());
    }
}
