//! Canary command implementation
//!
//! Stages two branches side by side: one on the blue host, one on green.

use anyhow::Result;
use canary_deploy_core::Config;
use canary_deploy_core::deploy::{CanaryParams, build_canary_plan};
use clap::Args;

use super::run::execute_plan;

/// Arguments for the canary command
#[derive(Args)]
pub struct CanaryArgs {
    /// Branch deployed to the blue host
    pub blue: String,

    /// Branch deployed to the green host
    pub green: String,

    /// SSH identity for reaching the blue and green hosts
    #[arg(long = "privateKey", value_name = "PATH")]
    pub private_key: Option<String>,

    /// List the steps without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the canary scenario
pub fn cmd_canary(args: &CanaryArgs, config: &Config, quiet: bool) -> Result<()> {
    if let Some(path) = args.private_key.as_deref() {
        super::require_local_file(path)?;
    }

    let params = CanaryParams {
        blue_branch: args.blue.clone(),
        green_branch: args.green.clone(),
        private_key: args.private_key.clone(),
    };
    let plan = build_canary_plan(config, &params)?;

    tracing::debug!(
        "Canary plan: {} on blue, {} on green",
        params.blue_branch,
        params.green_branch
    );
    execute_plan(&plan, config, args.dry_run, quiet)
}
