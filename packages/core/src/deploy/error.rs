//! Deployment error types
//!
//! Every failure a scenario can end with, plus the process exit code it maps to.

use thiserror::Error;

use super::step::{DeploymentStep, StepKind, StepResult};
use crate::host::HostError;

/// Errors that end (or, under a best-effort policy, are collected by) a scenario run
#[derive(Error, Debug)]
pub enum DeployError {
    /// The hypervisor tool failed to bring up or reconfigure a VM
    #[error("Provisioning failed at '{step}' ({}): {detail}", describe_code(.exit_code))]
    Provisioning {
        step: String,
        exit_code: Option<i32>,
        detail: String,
    },

    /// A remote command failed or the host could not be reached
    #[error("Remote command failed at '{step}' ({}): {detail}", describe_code(.exit_code))]
    RemoteExecution {
        step: String,
        exit_code: Option<i32>,
        detail: String,
    },

    /// Copying a file to a host failed
    #[error("File copy failed at '{step}' ({}): {detail}", describe_code(.exit_code))]
    FileCopy {
        step: String,
        exit_code: Option<i32>,
        detail: String,
    },

    /// A required parameter or credential was missing or malformed
    #[error("{0}")]
    Validation(String),

    /// The fleet could not be built from configuration
    #[error(transparent)]
    Host(#[from] HostError),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

impl DeployError {
    /// Build the error for a failed step, classified by the step's kind
    pub fn from_step(step: &DeploymentStep, result: &StepResult) -> Self {
        let step_name = step.description().to_string();
        let exit_code = result.exit_code;
        let detail = result
            .error_detail
            .clone()
            .unwrap_or_else(|| "no further detail".to_string());

        match step.kind() {
            StepKind::Provision => DeployError::Provisioning {
                step: step_name,
                exit_code,
                detail,
            },
            StepKind::RemoteCommand => DeployError::RemoteExecution {
                step: step_name,
                exit_code,
                detail,
            },
            StepKind::FileCopy => DeployError::FileCopy {
                step: step_name,
                exit_code,
                detail,
            },
        }
    }

    /// Process exit code for this failure
    ///
    /// Step failures pass the underlying tool's code through; everything else
    /// (including a zero or missing code) exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::Provisioning { exit_code, .. }
            | DeployError::RemoteExecution { exit_code, .. }
            | DeployError::FileCopy { exit_code, .. } => match exit_code {
                Some(code) if *code != 0 => *code,
                _ => 1,
            },
            DeployError::Validation(_) | DeployError::Host(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::{CommandLine, RemoteCommand};
    use crate::host::{Host, Role};

    fn remote_step() -> DeploymentStep {
        DeploymentStep::remote(
            "Running init script",
            Host::new(
                Role::ConfigServer,
                "192.168.33.20".parse().unwrap(),
                "vagrant",
            ),
            RemoteCommand::new(CommandLine::new("/bakerx/cm/server-init.sh")),
        )
    }

    #[test]
    fn test_from_step_classifies_by_kind() {
        let err = DeployError::from_step(&remote_step(), &StepResult::failure(Some(3), "boom"));
        assert!(matches!(err, DeployError::RemoteExecution { .. }));
        assert_eq!(err.exit_code(), 3);
        let msg = err.to_string();
        assert!(msg.contains("Running init script"));
        assert!(msg.contains("exit code 3"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_missing_exit_code_maps_to_one() {
        let err = DeployError::from_step(&remote_step(), &StepResult::failure(None, "ssh not found"));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("no exit code"));
    }

    #[test]
    fn test_validation_exits_one() {
        let err = DeployError::Validation("API token is required".to_string());
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "API token is required");
    }
}
