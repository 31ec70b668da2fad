//! File transfer to fleet hosts over scp

use std::process::{Command, Stdio};

use super::schema::Host;
use super::ssh::push_ssh_options;
use crate::deploy::{FileCopySpec, StepResult};

/// Copies a local file onto a remote host
pub trait FileTransfer {
    fn copy(&self, host: &Host, spec: &FileCopySpec) -> StepResult;
}

/// File transfer backed by the OpenSSH `scp` client
#[derive(Debug, Clone)]
pub struct ScpTransfer {
    connect_timeout: u32,
}

impl ScpTransfer {
    pub fn new(connect_timeout: u32) -> Self {
        Self { connect_timeout }
    }

    pub fn build_command(&self, host: &Host, spec: &FileCopySpec) -> Command {
        let mut cmd = Command::new("scp");
        push_ssh_options(&mut cmd, host, self.connect_timeout);
        cmd.arg(&spec.local_path);
        cmd.arg(host.scp_target(&spec.remote_path));
        cmd
    }
}

impl FileTransfer for ScpTransfer {
    fn copy(&self, host: &Host, spec: &FileCopySpec) -> StepResult {
        let mut cmd = self.build_command(host, spec);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::debug!(
            "Copying {} to {}",
            spec.local_path,
            host.scp_target(&spec.remote_path)
        );

        match cmd.status() {
            Ok(status) => StepResult::from_status(status, "scp"),
            Err(e) => StepResult::spawn_failed("scp", &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Role;

    #[test]
    fn test_scp_args_end_with_source_and_target() {
        let host = Host::new(
            Role::ConfigServer,
            "192.168.33.20".parse().unwrap(),
            "vagrant",
        );
        let spec = FileCopySpec {
            local_path: "/home/me/.ssh/deploy".to_string(),
            remote_path: ".ssh/id_rsa".to_string(),
        };

        let cmd = ScpTransfer::new(30).build_command(&host, &spec);
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(cmd.get_program(), "scp");
        let n = args.len();
        assert_eq!(args[n - 2], "/home/me/.ssh/deploy");
        assert_eq!(args[n - 1], "vagrant@192.168.33.20:.ssh/id_rsa");
    }
}
