//! Remote command execution over ssh
//!
//! Runs one structured command per ssh invocation and reports its exit status.

use std::process::{Command, Stdio};

use super::schema::Host;
use crate::deploy::{RemoteCommand, StepResult};

/// Runs a command on a remote host
pub trait RemoteExecutor {
    /// Run `command` on `host` and block until it exits
    ///
    /// A non-zero or missing exit status must yield a failed result.
    fn execute(&self, command: &RemoteCommand, host: &Host) -> StepResult;
}

/// Remote executor backed by the OpenSSH client
///
/// Output streams straight to the terminal. There is no retry and no command
/// timeout; `connect_timeout` only bounds TCP connection setup.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    connect_timeout: u32,
}

impl SshExecutor {
    pub fn new(connect_timeout: u32) -> Self {
        Self { connect_timeout }
    }

    /// Build the ssh invocation without running it
    pub fn build_command(&self, command: &RemoteCommand, host: &Host) -> Command {
        let mut cmd = Command::new("ssh");
        push_ssh_options(&mut cmd, host, self.connect_timeout);
        cmd.arg(host.identity());
        cmd.arg(command.render());
        cmd
    }
}

impl RemoteExecutor for SshExecutor {
    fn execute(&self, command: &RemoteCommand, host: &Host) -> StepResult {
        let mut cmd = self.build_command(command, host);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::debug!("Running on {}: {}", host.identity(), command);

        match cmd.status() {
            Ok(status) => {
                let result = StepResult::from_status(status, "ssh");
                if !result.succeeded {
                    tracing::warn!(
                        "Remote command on {} failed (exit code {:?})",
                        host.identity(),
                        result.exit_code
                    );
                }
                result
            }
            Err(e) => StepResult::spawn_failed("ssh", &e),
        }
    }
}

/// Options shared by ssh and scp
///
/// The VMs are recreated often, so host keys are neither checked nor stored.
pub(crate) fn push_ssh_options(cmd: &mut Command, host: &Host, connect_timeout: u32) {
    cmd.arg("-o")
        .arg("BatchMode=yes")
        .arg("-o")
        .arg("StrictHostKeyChecking=no")
        .arg("-o")
        .arg("UserKnownHostsFile=/dev/null")
        .arg("-o")
        .arg("LogLevel=ERROR")
        .arg("-o")
        .arg(format!("ConnectTimeout={connect_timeout}"));

    if let Some(key) = &host.identity_file {
        cmd.arg("-i").arg(key);
    }
}
