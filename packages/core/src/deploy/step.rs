//! Deployment steps and their results

use std::fmt;
use std::net::IpAddr;
use std::process::ExitStatus;

use super::command::RemoteCommand;
use crate::host::Host;

/// What kind of collaborator a step is dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Hypervisor: bring up or reconfigure a VM
    Provision,
    /// Remote shell on the target host
    RemoteCommand,
    /// File transfer to the target host
    FileCopy,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Provision => write!(f, "provision"),
            StepKind::RemoteCommand => write!(f, "remote"),
            StepKind::FileCopy => write!(f, "copy"),
        }
    }
}

/// NAT port-forwarding rule in VirtualBox `natpf` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortForwardRule {
    pub name: String,
    pub protocol: String,
    pub host_port: u16,
    pub guest_port: u16,
}

impl PortForwardRule {
    /// Rule string understood by `VBoxManage controlvm <vm> natpf1`
    ///
    /// Host IP and guest IP are left empty: `name,proto,,host_port,,guest_port`
    pub fn natpf_spec(&self) -> String {
        format!(
            "{},{},,{},,{}",
            self.name, self.protocol, self.host_port, self.guest_port
        )
    }
}

/// Request sent to the hypervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionSpec {
    /// Create (or with `sync`, reconcile) a VM with a fixed address
    Run {
        vm_name: String,
        image: String,
        address: IpAddr,
        sync: bool,
    },
    /// Add a port-forwarding rule to a running VM
    PortForward {
        vm_name: String,
        rule: PortForwardRule,
    },
}

impl fmt::Display for ProvisionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionSpec::Run {
                vm_name,
                image,
                address,
                sync,
            } => {
                write!(f, "run {vm_name} {image} --ip {address}")?;
                if *sync {
                    write!(f, " --sync")?;
                }
                Ok(())
            }
            ProvisionSpec::PortForward { vm_name, rule } => {
                write!(f, "natpf1 {vm_name} {}", rule.natpf_spec())
            }
        }
    }
}

/// Local file pushed to the target host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCopySpec {
    pub local_path: String,
    pub remote_path: String,
}

/// Work carried by a step; determines its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepPayload {
    Provision(ProvisionSpec),
    Remote(RemoteCommand),
    Copy(FileCopySpec),
}

impl fmt::Display for StepPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepPayload::Provision(spec) => write!(f, "{spec}"),
            StepPayload::Remote(command) => write!(f, "{command}"),
            StepPayload::Copy(spec) => write!(f, "{} -> {}", spec.local_path, spec.remote_path),
        }
    }
}

/// One ordered unit of work bound to a single host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentStep {
    description: String,
    target: Host,
    payload: StepPayload,
}

impl DeploymentStep {
    pub fn provision(description: impl Into<String>, target: Host, spec: ProvisionSpec) -> Self {
        Self {
            description: description.into(),
            target,
            payload: StepPayload::Provision(spec),
        }
    }

    pub fn remote(description: impl Into<String>, target: Host, command: RemoteCommand) -> Self {
        Self {
            description: description.into(),
            target,
            payload: StepPayload::Remote(command),
        }
    }

    pub fn copy(description: impl Into<String>, target: Host, spec: FileCopySpec) -> Self {
        Self {
            description: description.into(),
            target,
            payload: StepPayload::Copy(spec),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target(&self) -> &Host {
        &self.target
    }

    pub fn payload(&self) -> &StepPayload {
        &self.payload
    }

    pub fn kind(&self) -> StepKind {
        match self.payload {
            StepPayload::Provision(_) => StepKind::Provision,
            StepPayload::Remote(_) => StepKind::RemoteCommand,
            StepPayload::Copy(_) => StepKind::FileCopy,
        }
    }
}

/// Outcome of one step, produced by a collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub succeeded: bool,
    /// Present when an external process ran to completion
    pub exit_code: Option<i32>,
    pub error_detail: Option<String>,
}

impl StepResult {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            exit_code: Some(0),
            error_detail: None,
        }
    }

    pub fn failure(exit_code: Option<i32>, detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            exit_code,
            error_detail: Some(detail.into()),
        }
    }

    /// Map a finished process to a result
    ///
    /// Any non-zero status, or no status at all (killed by a signal), fails.
    pub fn from_status(status: ExitStatus, program: &str) -> Self {
        match status.code() {
            Some(0) => Self::success(),
            Some(code) => Self::failure(Some(code), format!("{program} exited with status {code}")),
            None => Self::failure(None, format!("{program} was terminated by a signal")),
        }
    }

    /// Map a spawn/wait error to a result
    pub fn spawn_failed(program: &str, err: &std::io::Error) -> Self {
        let detail = if err.kind() == std::io::ErrorKind::NotFound {
            format!("{program} not found. Is it installed and on PATH?")
        } else {
            format!("Failed to run {program}: {err}")
        };
        Self::failure(None, detail)
    }
}
