//! canary-deploy-core - Core library for canary-deploy
//!
//! Models the VM fleet, builds the setup/canary/prod scenario plans, and runs
//! them through the deployment sequencer against ssh, bakerx and the cloud API.

pub mod cloud;
pub mod config;
pub mod deploy;
pub mod host;
pub mod version;

pub use config::{Config, load_config, save_config};
pub use version::{get_version, get_version_long};
