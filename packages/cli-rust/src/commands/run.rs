//! Shared execution path for the local VM scenarios

use anyhow::Result;
use canary_deploy_core::Config;
use canary_deploy_core::deploy::{ScenarioPlan, Sequencer};
use canary_deploy_core::host::{BakerxProvisioner, ScpTransfer, SshExecutor};
use console::style;

use crate::output::{print_scenario_plan, print_step_event};

/// Run `plan` against the real hypervisor, ssh and scp tools
///
/// With `dry_run` the plan is only listed. A failed step surfaces as a
/// `DeployError` inside the returned error so the caller can map its exit code.
pub fn execute_plan(plan: &ScenarioPlan, config: &Config, dry_run: bool, quiet: bool) -> Result<()> {
    if dry_run {
        print_scenario_plan(plan);
        return Ok(());
    }

    let provisioner = BakerxProvisioner::new();
    let executor = SshExecutor::new(config.ssh_connect_timeout);
    let transfer = ScpTransfer::new(config.ssh_connect_timeout);
    let sequencer = Sequencer::new(&provisioner, &executor, &transfer);

    let report = sequencer.run(plan, |event| print_step_event(&event, quiet))?;

    if !quiet {
        println!();
        println!(
            "{} {} finished: {} steps",
            style("Success:").green().bold(),
            plan.scenario(),
            report.executed
        );
    }

    Ok(())
}
