//! Local VM provisioning
//!
//! Brings up fleet VMs with bakerx and adjusts their VirtualBox networking.

use std::process::{Command, Stdio};

use super::schema::Host;
use crate::deploy::{ProvisionSpec, StepResult};

/// Creates or reconfigures a virtual host
pub trait HostProvisioner {
    /// Apply `spec` for `host` and block until the hypervisor tool returns
    fn provision(&self, host: &Host, spec: &ProvisionSpec) -> StepResult;
}

/// Provisioner backed by the `bakerx` and `VBoxManage` command-line tools
#[derive(Debug, Clone)]
pub struct BakerxProvisioner {
    bakerx: String,
    vboxmanage: String,
}

impl Default for BakerxProvisioner {
    fn default() -> Self {
        Self {
            bakerx: "bakerx".to_string(),
            vboxmanage: "VBoxManage".to_string(),
        }
    }
}

impl BakerxProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the hypervisor invocation for `spec` without running it
    pub fn build_command(&self, spec: &ProvisionSpec) -> Command {
        match spec {
            ProvisionSpec::Run {
                vm_name,
                image,
                address,
                sync,
            } => {
                let mut cmd = Command::new(&self.bakerx);
                cmd.arg("run")
                    .arg(vm_name)
                    .arg(image)
                    .arg("--ip")
                    .arg(address.to_string());
                if *sync {
                    cmd.arg("--sync");
                }
                cmd
            }
            ProvisionSpec::PortForward { vm_name, rule } => {
                let mut cmd = Command::new(&self.vboxmanage);
                cmd.arg("controlvm")
                    .arg(vm_name)
                    .arg("natpf1")
                    .arg(rule.natpf_spec());
                cmd
            }
        }
    }
}

impl HostProvisioner for BakerxProvisioner {
    fn provision(&self, host: &Host, spec: &ProvisionSpec) -> StepResult {
        let mut cmd = self.build_command(spec);
        let program = cmd.get_program().to_string_lossy().into_owned();

        cmd.stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::debug!("Provisioning {} host: {} {}", host.role, program, spec);

        match cmd.status() {
            Ok(status) => StepResult::from_status(status, &program),
            Err(e) => StepResult::spawn_failed(&program, &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::PortForwardRule;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_bakerx_run_args() {
        let spec = ProvisionSpec::Run {
            vm_name: "green-srv".to_string(),
            image: "queues".to_string(),
            address: "192.168.33.3".parse().unwrap(),
            sync: true,
        };
        let cmd = BakerxProvisioner::new().build_command(&spec);
        assert_eq!(cmd.get_program(), "bakerx");
        assert_eq!(
            args_of(&cmd),
            vec!["run", "green-srv", "queues", "--ip", "192.168.33.3", "--sync"]
        );
    }

    #[test]
    fn test_bakerx_run_without_sync() {
        let spec = ProvisionSpec::Run {
            vm_name: "proxy-srv".to_string(),
            image: "queues".to_string(),
            address: "192.168.33.1".parse().unwrap(),
            sync: false,
        };
        let args = args_of(&BakerxProvisioner::new().build_command(&spec));
        assert!(!args.contains(&"--sync".to_string()));
    }

    #[test]
    fn test_port_forward_args() {
        let spec = ProvisionSpec::PortForward {
            vm_name: "config-srv".to_string(),
            rule: PortForwardRule {
                name: "jenkins".to_string(),
                protocol: "tcp".to_string(),
                host_port: 9000,
                guest_port: 9000,
            },
        };
        let cmd = BakerxProvisioner::new().build_command(&spec);
        assert_eq!(cmd.get_program(), "VBoxManage");
        assert_eq!(
            args_of(&cmd),
            vec!["controlvm", "config-srv", "natpf1", "jenkins,tcp,,9000,,9000"]
        );
    }
}
