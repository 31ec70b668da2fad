//! Progress lines for sequencer events

use canary_deploy_core::deploy::{DeploymentStep, StepEvent, StepResult};
use console::style;

use super::colors::{kind_style, role_style};

/// One-based `[n/total]` counter
fn step_prefix(index: usize, total: usize) -> String {
    format!("[{}/{}]", index + 1, total)
}

/// Print a sequencer event
///
/// `Started` lines go to stdout unless quiet; failures always go to stderr.
pub fn print_step_event(event: &StepEvent<'_>, quiet: bool) {
    match event {
        StepEvent::Started { index, total, step } => {
            if quiet {
                return;
            }
            println!(
                "{} {} {}",
                style(step_prefix(*index, *total)).dim(),
                kind_style(step.kind()),
                role_style(step.target().role, step.description()).bold()
            );
            println!(
                "      {} {}",
                style(step.target().identity()).dim(),
                style(step.payload()).dim()
            );
        }
        StepEvent::Finished { step, result, .. } => {
            if result.succeeded {
                if !quiet {
                    println!("{}", finished_line(step, result));
                }
            } else {
                eprintln!("{}", finished_line(step, result));
            }
        }
    }
}

/// Outcome line for a finished step
///
/// The failure detail is left to the error report printed when the run ends.
fn finished_line(step: &DeploymentStep, result: &StepResult) -> String {
    if result.succeeded {
        format!("  {} {}", style("\u{2713}").green(), step.description())
    } else {
        format!(
            "  {} {} failed",
            style("\u{2717}").red().bold(),
            step.description()
        )
    }
}
