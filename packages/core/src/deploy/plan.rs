//! Scenario plans
//!
//! Pure builders turning configuration plus per-run parameters into an
//! ordered list of steps. The same inputs always produce the same plan.

use std::fmt;

use super::command::{CommandLine, RemoteCommand};
use super::error::DeployError;
use super::step::{DeploymentStep, FileCopySpec, PortForwardRule, ProvisionSpec};
use crate::config::Config;
use crate::host::{Fleet, Role};

/// Where the private key is installed on the configuration server
///
/// Relative to the login user's home directory.
pub const REMOTE_KEY_PATH: &str = ".ssh/id_rsa";

/// A local VM workflow run by the sequencer
///
/// Both scenarios stop at the first failed step. The cloud scenario is
/// best-effort instead and lives in `cloud` with its own loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Configuration server with Jenkins
    Setup,
    /// Blue and green app hosts plus proxy
    Canary,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Setup => write!(f, "setup"),
            Scenario::Canary => write!(f, "canary"),
        }
    }
}

/// Ordered steps of one scenario run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPlan {
    scenario: Scenario,
    steps: Vec<DeploymentStep>,
}

impl ScenarioPlan {
    pub fn new(scenario: Scenario, steps: Vec<DeploymentStep>) -> Self {
        Self { scenario, steps }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn steps(&self) -> &[DeploymentStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Parameters of the setup scenario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupParams {
    pub github_user: Option<String>,
    pub github_pass: Option<String>,
    /// Local private key to install on the configuration server
    pub private_key: Option<String>,
}

/// Parameters of the canary scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanaryParams {
    pub blue_branch: String,
    pub green_branch: String,
    /// SSH identity used to reach the blue and green hosts
    pub private_key: Option<String>,
}

fn required(value: Option<&str>, what: &str) -> Result<String, DeployError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(DeployError::Validation(format!("{what} is required"))),
    }
}

/// Reject a remote directory that is not absolute
///
/// Paths are quoted for the remote shell, so `~` or `$HOME` would never expand.
fn absolute_dir(value: &str, key: &str) -> Result<(), DeployError> {
    if value.starts_with('/') {
        Ok(())
    } else {
        Err(DeployError::Validation(format!(
            "{key} must be an absolute path on the remote host, got '{value}'"
        )))
    }
}

/// Credential handed to the ansible script, empty when not given
///
/// The playbook takes its arguments positionally, so a missing value is still
/// passed (as `''`) to keep the later ones in place.
fn credential(value: Option<&str>, what: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => {
            tracing::warn!("{what} not set; passing an empty value to the ansible script");
            String::new()
        }
    }
}

/// Build the configuration-server plan
///
/// provision → port forward → init script → ansible, plus a key install when
/// a private key was given.
pub fn build_setup_plan(config: &Config, params: &SetupParams) -> Result<ScenarioPlan, DeployError> {
    absolute_dir(&config.cm_dir, "cm_dir")?;
    let github_user = credential(params.github_user.as_deref(), "GitHub username (--gh-user)");
    let github_pass = credential(params.github_pass.as_deref(), "GitHub password (--gh-pass)");

    let fleet = Fleet::from_config(config)?;
    let server = fleet.host(Role::ConfigServer);

    let mut steps = vec![
        DeploymentStep::provision(
            "Provisioning configuration server",
            server.clone(),
            ProvisionSpec::Run {
                vm_name: Role::ConfigServer.vm_name().to_string(),
                image: config.config_server_image.clone(),
                address: server.address,
                sync: config.provision_sync,
            },
        ),
        DeploymentStep::provision(
            "Port forwarding",
            server.clone(),
            ProvisionSpec::PortForward {
                vm_name: Role::ConfigServer.vm_name().to_string(),
                rule: PortForwardRule {
                    name: config.port_forward.name.clone(),
                    protocol: config.port_forward.protocol.clone(),
                    host_port: config.port_forward.host_port,
                    guest_port: config.port_forward.guest_port,
                },
            },
        ),
        DeploymentStep::remote(
            "Running init script",
            server.clone(),
            RemoteCommand::new(CommandLine::new(config.init_script())),
        ),
        DeploymentStep::remote(
            "Running ansible script to install jenkins",
            server.clone(),
            RemoteCommand::new(
                CommandLine::new(config.ansible_script())
                    .arg(config.playbook_path())
                    .arg(config.inventory_path())
                    .arg(github_user)
                    .secret_arg(github_pass),
            ),
        ),
    ];

    if let Some(key) = params.private_key.as_deref() {
        let key = required(Some(key), "Private key path (--privateKey)")?;
        steps.push(DeploymentStep::copy(
            "Installing private key on configuration server",
            server.clone(),
            FileCopySpec {
                local_path: key,
                remote_path: REMOTE_KEY_PATH.to_string(),
            },
        ));
    }

    Ok(ScenarioPlan::new(Scenario::Setup, steps))
}

/// Build the blue/green staging plan
///
/// Provisions blue, green and proxy, then clones and starts one branch on
/// blue and another on green. Both versions end up serving side by side.
pub fn build_canary_plan(
    config: &Config,
    params: &CanaryParams,
) -> Result<ScenarioPlan, DeployError> {
    let blue_branch = required(Some(params.blue_branch.as_str()), "Blue branch")?;
    let green_branch = required(Some(params.green_branch.as_str()), "Green branch")?;
    absolute_dir(&config.app_dir, "app_dir")?;

    let fleet = Fleet::from_config(config)?.with_identity_file(params.private_key.as_deref());
    let app = repo_name(&config.repo_url);

    let mut steps = Vec::with_capacity(7);

    for role in [Role::Blue, Role::Green, Role::Proxy] {
        let host = fleet.host(role);
        steps.push(DeploymentStep::provision(
            format!("Provisioning {} server", role.label()),
            host.clone(),
            ProvisionSpec::Run {
                vm_name: role.vm_name().to_string(),
                image: config.canary_image.clone(),
                address: host.address,
                sync: config.provision_sync,
            },
        ));
    }

    for (role, branch) in [(Role::Blue, &blue_branch), (Role::Green, &green_branch)] {
        steps.push(DeploymentStep::remote(
            format!("Cloning {app} ({branch}) on {} server", role.label()),
            fleet.host(role).clone(),
            clone_command(config, branch),
        ));
    }

    for role in [Role::Blue, Role::Green] {
        steps.push(DeploymentStep::remote(
            format!("Running {app} on {} server", role.label()),
            fleet.host(role).clone(),
            start_command(config),
        ));
    }

    Ok(ScenarioPlan::new(Scenario::Canary, steps))
}

/// Reset the checkout directory, then clone `branch` into it
///
/// `rm -rf` on a missing directory succeeds, so the step can be re-run.
fn clone_command(config: &Config, branch: &str) -> RemoteCommand {
    RemoteCommand::new(CommandLine::new("rm").arg("-rf").arg(&config.app_dir)).then(
        CommandLine::new("git")
            .args(["clone", "-b"])
            .arg(branch)
            .arg(&config.repo_url)
            .arg(&config.app_dir),
    )
}

/// Install dependencies and start the service under pm2
fn start_command(config: &Config) -> RemoteCommand {
    RemoteCommand::new(CommandLine::new("cd").arg(&config.app_dir))
        .then(CommandLine::new("sudo").args(["npm", "install"]))
        .then(CommandLine::new("sudo").args(["npm", "install", "pm2", "-g"]))
        .then(CommandLine::new("pm2").args(["start", "index.js"]))
}

/// Last path segment of a repository URL, without `.git`
fn repo_name(url: &str) -> &str {
    let name = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    name.strip_suffix(".git").unwrap_or(name)
}
