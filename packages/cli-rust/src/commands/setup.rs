//! Setup command implementation
//!
//! Provisions the configuration server and installs Jenkins on it.

use anyhow::Result;
use canary_deploy_core::Config;
use canary_deploy_core::deploy::{SetupParams, build_setup_plan};
use clap::Args;

use super::run::execute_plan;

/// Arguments for the setup command
#[derive(Args)]
pub struct SetupArgs {
    /// Private key to install on the configuration server
    #[arg(long = "privateKey", value_name = "PATH")]
    pub private_key: Option<String>,

    /// GitHub username passed to the ansible playbook
    #[arg(long = "gh-user", env = "GH_USER", value_name = "USER")]
    pub gh_user: Option<String>,

    /// GitHub password passed to the ansible playbook
    #[arg(long = "gh-pass", env = "GH_PASS", value_name = "PASS", hide_env_values = true)]
    pub gh_pass: Option<String>,

    /// List the steps without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the setup scenario
pub fn cmd_setup(args: &SetupArgs, config: &Config, quiet: bool) -> Result<()> {
    if let Some(path) = args.private_key.as_deref() {
        super::require_local_file(path)?;
    }

    let params = SetupParams {
        github_user: args.gh_user.clone(),
        github_pass: args.gh_pass.clone(),
        private_key: args.private_key.clone(),
    };
    let plan = build_setup_plan(config, &params)?;

    tracing::debug!("Setup plan has {} steps", plan.len());
    execute_plan(&plan, config, args.dry_run, quiet)
}
