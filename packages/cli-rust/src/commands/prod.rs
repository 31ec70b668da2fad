//! Prod command implementation
//!
//! Creates one cloud instance per configured service. Every request is
//! attempted even after failures; failures are summarized at the end.

use anyhow::{Result, bail};
use canary_deploy_core::Config;
use canary_deploy_core::cloud::{
    DigitalOceanClient, InstanceEvent, ProdParams, build_prod_plan, provision_all,
};
use clap::Args;
use console::style;

use crate::output::{StepSpinner, print_prod_plan, show_cloud_failures};

/// Arguments for the prod command
#[derive(Args)]
pub struct ProdArgs {
    /// Label for this provisioning run
    pub name: String,

    /// Cloud API token
    #[arg(
        long = "API_TOKEN",
        visible_alias = "api-token",
        env = "API_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true
    )]
    pub api_token: Option<String>,

    /// SSH key fingerprint used when the config lists none
    #[arg(long, env = "FINGERPRINT", value_name = "FINGERPRINT")]
    pub fingerprint: Option<String>,

    /// Exit with an error if any instance could not be created
    #[arg(long)]
    pub strict: bool,

    /// List the requests without sending them
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the prod provisioning scenario
pub async fn cmd_prod(args: &ProdArgs, config: &Config, quiet: bool) -> Result<()> {
    let params = ProdParams {
        name: args.name.clone(),
        api_token: args.api_token.clone(),
        fallback_fingerprint: args.fingerprint.clone(),
    };
    let plan = build_prod_plan(&config.cloud, &params)?;

    if args.dry_run {
        print_prod_plan(&plan);
        return Ok(());
    }

    if !quiet {
        println!(
            "Provisioning {} with token {}",
            style(plan.name()).cyan().bold(),
            style(plan.token().preview()).dim()
        );
    }

    let client = DigitalOceanClient::new(plan.token(), &config.cloud.api_base_url)?;

    let mut spinner: Option<StepSpinner> = None;
    let report = provision_all(&client, &plan, |event| match event {
        InstanceEvent::Requesting {
            index,
            total,
            request,
        } => {
            spinner = Some(StepSpinner::start(
                index,
                total,
                &format!("Creating {}", request.name),
                quiet,
            ));
        }
        InstanceEvent::Created { request, id } => {
            if let Some(s) = spinner.take() {
                s.success(&format!("{} created (id {})", request.name, id));
            }
        }
        InstanceEvent::Failed { request, error } => {
            if let Some(s) = spinner.take() {
                s.fail(&format!("{}: {}", request.name, error));
            }
        }
    })
    .await;

    if !report.is_success() {
        eprintln!();
        show_cloud_failures(&report.failed, report.attempted());
        if args.strict {
            bail!(
                "{} of {} instances failed",
                report.failed.len(),
                report.attempted()
            );
        }
        return Ok(());
    }

    if !quiet {
        println!();
        println!(
            "{} {} instances created",
            style("Success:").green().bold(),
            report.created.len()
        );
    }

    Ok(())
}
