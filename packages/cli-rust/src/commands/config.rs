//! Config subcommand implementations
//!
//! `config show` prints the loaded configuration, `config path` its location.

use anyhow::{Result, anyhow};
use canary_deploy_core::{Config, config};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, Table};

/// Configuration command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Output as JSON instead of table format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Show current configuration
    Show {
        /// Output as JSON instead of table format
        #[arg(long)]
        json: bool,
    },
    /// Print the config file path
    Path,
}

/// Handle config command
///
/// Defaults to `show` when no subcommand is given.
pub fn cmd_config(args: ConfigArgs, config: &Config) -> Result<()> {
    match args.command {
        Some(ConfigSubcommands::Show { json }) => cmd_config_show(config, json || args.json),
        Some(ConfigSubcommands::Path) => cmd_config_path(),
        None => cmd_config_show(config, args.json),
    }
}

fn cmd_config_path() -> Result<()> {
    let path = config::get_config_path()
        .ok_or_else(|| anyhow!("Could not determine config file path"))?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_config_show(config: &Config, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("{}", config_table(config));

    if let Some(path) = config::get_config_path() {
        println!();
        println!("Config file: {}", path.display());
    }

    Ok(())
}

/// Key/value table of every setting
fn config_table(config: &Config) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Value"]);

    let rows: Vec<(&str, String)> = vec![
        ("version", config.version.to_string()),
        ("ssh_user", config.ssh_user.clone()),
        ("identity_file", format_optional(&config.identity_file)),
        ("ssh_connect_timeout", config.ssh_connect_timeout.to_string()),
        ("canary_image", config.canary_image.clone()),
        ("config_server_image", config.config_server_image.clone()),
        ("provision_sync", config.provision_sync.to_string()),
        ("repo_url", config.repo_url.clone()),
        ("app_dir", config.app_dir.clone()),
        ("cm_dir", config.cm_dir.clone()),
        (
            "port_forward",
            format!(
                "{} {} {} -> {}",
                config.port_forward.name,
                config.port_forward.protocol,
                config.port_forward.host_port,
                config.port_forward.guest_port
            ),
        ),
        ("cloud.api_base_url", config.cloud.api_base_url.clone()),
        ("cloud.region", config.cloud.region.clone()),
        ("cloud.size", config.cloud.size.clone()),
        ("cloud.image", config.cloud.image.clone()),
        ("cloud.services", format_list(&config.cloud.services)),
        (
            "cloud.ssh_key_fingerprints",
            format_list(&config.cloud.ssh_key_fingerprints),
        ),
    ];

    for (key, address, color) in [
        ("proxy_address", &config.proxy_address, Color::Red),
        ("blue_address", &config.blue_address, Color::Blue),
        ("green_address", &config.green_address, Color::Green),
        ("config_server_address", &config.config_server_address, Color::Cyan),
    ] {
        table.add_row(vec![Cell::new(key), Cell::new(address).fg(color)]);
    }

    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }

    table
}

fn format_optional(value: &Option<String>) -> String {
    match value {
        Some(s) if !s.is_empty() => s.clone(),
        _ => "(not set)".to_string(),
    }
}

fn format_list(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}
