//! Output utilities for CLI commands
//!
//! Terminal helpers shared by the scenario commands: role and step-kind
//! colors, per-step progress lines, a spinner for cloud requests, plan
//! tables for `--dry-run`, and rich error display.

pub mod colors;
pub mod errors;
pub mod plan;
pub mod progress;
pub mod spinner;

pub use errors::{show_cloud_failures, show_deploy_error};
pub use plan::{print_prod_plan, print_scenario_plan};
pub use progress::print_step_event;
pub use spinner::StepSpinner;
