//! CLI command implementations
//!
//! One module per scenario plus `config`.

mod canary;
mod config;
mod prod;
mod run;
mod setup;

use std::path::Path;

use canary_deploy_core::deploy::DeployError;

pub use canary::{CanaryArgs, cmd_canary};
pub use config::{ConfigArgs, cmd_config};
pub use prod::{ProdArgs, cmd_prod};
pub use setup::{SetupArgs, cmd_setup};

/// Reject a `--privateKey` path that is not a readable local file
fn require_local_file(path: &str) -> Result<(), DeployError> {
    if Path::new(path).is_file() {
        Ok(())
    } else {
        Err(DeployError::Validation(format!(
            "Private key not found: {path}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_local_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(require_local_file(&file.path().to_string_lossy()).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let err = require_local_file(&dir.path().to_string_lossy()).unwrap_err();
        assert!(matches!(err, DeployError::Validation(_)));
        assert!(require_local_file("/nonexistent/key").is_err());
    }
}
