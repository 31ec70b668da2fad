//! canary-deploy CLI - Provision a blue/green VM fleet and stage canary deployments
//!
//! This module contains the CLI implementation used by the binary.

mod commands;
mod output;

use anyhow::Result;
use canary_deploy_core::deploy::DeployError;
use canary_deploy_core::{config, get_version, get_version_long, load_config};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

/// Provision a blue/green VM fleet and stage canary deployments
#[derive(Parser)]
#[command(name = "canary-deploy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Provision a blue/green VM fleet and stage canary deployments",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the configuration server and install Jenkins
    Setup(commands::SetupArgs),
    /// Stage two branches on the blue and green hosts
    Canary(commands::CanaryArgs),
    /// Create one cloud instance per service
    Prod(commands::ProdArgs),
    /// Manage configuration
    Config(commands::ConfigArgs),
}

/// Log filter for a `-v` count; `RUST_LOG` takes precedence when set
fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "canary_deploy={level},canary_deploy_core={level}"
        ))
    })
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    // Configure color output
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    // Load config (creates default if missing)
    let config_path = config::get_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            // Display rich error for invalid config
            eprintln!("{} Configuration error", style("Error:").red().bold());
            eprintln!();
            eprintln!("  {e:#}");
            eprintln!();
            eprintln!("  Config file: {}", style(config_path.display()).yellow());
            eprintln!();
            eprintln!(
                "  {} Check the config file for syntax errors or unknown fields.",
                style("Tip:").cyan()
            );
            eprintln!(
                "  {} Delete the file to regenerate the defaults.",
                style("Tip:").cyan()
            );
            std::process::exit(1);
        }
    };

    if cli.verbose > 0 {
        eprintln!(
            "{} canary-deploy {}",
            style("[info]").cyan(),
            get_version_long()
        );
        eprintln!(
            "{} Config loaded from: {}",
            style("[info]").cyan(),
            config_path.display()
        );
    }

    match cli.command {
        Some(Commands::Setup(args)) => commands::cmd_setup(&args, &config, cli.quiet),
        Some(Commands::Canary(args)) => commands::cmd_canary(&args, &config, cli.quiet),
        Some(Commands::Prod(args)) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_prod(&args, &config, cli.quiet))
        }
        Some(Commands::Config(args)) => commands::cmd_config(args, &config),
        None => {
            // No command - show a welcome message and hint to use --help
            if !cli.quiet {
                println!(
                    "{} {}",
                    style("canary-deploy").cyan().bold(),
                    style(get_version()).dim()
                );
                println!();
                println!("Run {} for available commands.", style("--help").green());
            }
            Ok(())
        }
    }
}

/// Print a failed run's error and return the process exit code
///
/// Deployment failures keep the failing tool's exit code; anything else exits with 1.
pub fn report_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<DeployError>() {
        Some(deploy_err) => {
            output::show_deploy_error(deploy_err);
            deploy_err.exit_code()
        }
        None => {
            eprintln!("{} {err:#}", style("Error:").red().bold());
            1
        }
    }
}
