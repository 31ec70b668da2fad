//! Error display for failed scenarios
//!
//! Prints an `Error:` headline followed by detail and `Tip:` lines, in the
//! same shape as the configuration error shown at startup.

use canary_deploy_core::cloud::CloudError;
use canary_deploy_core::config;
use canary_deploy_core::deploy::DeployError;
use console::style;

/// Headline for a deployment error
pub fn error_headline(err: &DeployError) -> &'static str {
    match err {
        DeployError::Provisioning { .. } => "Provisioning failed",
        DeployError::RemoteExecution { .. } => "Remote command failed",
        DeployError::FileCopy { .. } => "File copy failed",
        DeployError::Validation(_) => "Invalid arguments",
        DeployError::Host(_) => "Invalid fleet configuration",
    }
}

/// Tips printed under a deployment error
pub fn error_tips(err: &DeployError) -> Vec<String> {
    match err {
        DeployError::Provisioning { .. } => vec![
            "Check that bakerx and VirtualBox are installed: bakerx --version".to_string(),
            "Rerun with -v to see the exact hypervisor command".to_string(),
        ],
        DeployError::RemoteExecution { exit_code, .. } => {
            let mut tips = Vec::new();
            if *exit_code == Some(255) {
                tips.push("ssh exited with 255: the host was unreachable or refused the key".to_string());
                tips.push("Check identity_file in the config or pass --privateKey".to_string());
            }
            tips.push("Rerun with -v to see the remote command".to_string());
            tips
        }
        DeployError::FileCopy { .. } => {
            vec!["Check that the local file exists and the host is reachable".to_string()]
        }
        DeployError::Validation(_) => vec!["Run with --help for usage".to_string()],
        DeployError::Host(_) => {
            let mut tips = vec!["Each role needs its own IP address".to_string()];
            if let Some(path) = config::get_config_path() {
                tips.push(format!("Edit the addresses in {}", path.display()));
            }
            tips
        }
    }
}

/// Print a deployment error with tips to stderr
pub fn show_deploy_error(err: &DeployError) {
    eprintln!("{} {}", style("Error:").red().bold(), error_headline(err));
    eprintln!();
    eprintln!("  {err}");
    eprintln!();
    for tip in error_tips(err) {
        eprintln!("  {} {}", style("Tip:").cyan(), tip);
    }
}

/// Print the aggregated failures of a prod run
pub fn show_cloud_failures(failed: &[(String, CloudError)], attempted: usize) {
    eprintln!(
        "{} {} of {} instances could not be created",
        style("Warning:").yellow().bold(),
        failed.len(),
        attempted
    );
    eprintln!();
    for (name, error) in failed {
        eprintln!("  {} {}", style(name).yellow(), error);
    }
    if failed
        .iter()
        .any(|(_, e)| matches!(e, CloudError::UnexpectedStatus { status: 401, .. }))
    {
        eprintln!();
        eprintln!(
            "  {} The API token was rejected; check --API_TOKEN or API_TOKEN",
            style("Tip:").cyan()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_matches_variant() {
        let err = DeployError::Validation("Blue branch is required".to_string());
        assert_eq!(error_headline(&err), "Invalid arguments");

        let err = DeployError::Provisioning {
            step: "Provisioning BLUE server".to_string(),
            exit_code: Some(1),
            detail: "bakerx exited with status 1".to_string(),
        };
        assert_eq!(error_headline(&err), "Provisioning failed");
    }

    #[test]
    fn unreachable_host_gets_ssh_tip() {
        let err = DeployError::RemoteExecution {
            step: "Cloning v1 on BLUE".to_string(),
            exit_code: Some(255),
            detail: "ssh exited with status 255".to_string(),
        };
        let tips = error_tips(&err);
        assert!(tips.iter().any(|t| t.contains("--privateKey")));

        let err = DeployError::RemoteExecution {
            step: "Cloning v1 on BLUE".to_string(),
            exit_code: Some(2),
            detail: "ssh exited with status 2".to_string(),
        };
        assert!(!error_tips(&err).iter().any(|t| t.contains("--privateKey")));
    }
}
