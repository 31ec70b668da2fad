//! Deployment sequencing
//!
//! - Structured remote command model
//! - Deployment steps and step results
//! - Scenario plan builders (setup, canary)
//! - The fail-fast sequencer that executes a plan in order

mod command;
mod error;
pub mod plan;
mod sequencer;
mod step;

pub use command::{CommandLine, MASK, RemoteCommand, shell_quote};
pub use error::DeployError;
pub use plan::{
    CanaryParams, Scenario, ScenarioPlan, SetupParams, build_canary_plan,
    build_setup_plan,
};
pub use sequencer::{RunReport, Sequencer, StepEvent};
pub use step::{
    DeploymentStep, FileCopySpec, PortForwardRule, ProvisionSpec, StepKind, StepPayload,
    StepResult,
};
