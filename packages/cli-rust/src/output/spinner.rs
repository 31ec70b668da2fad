//! Spinner for network-bound steps
//!
//! Cloud requests produce no terminal output of their own, so each one gets
//! an animated spinner with a `[n/total]` counter and elapsed time. Steps that
//! stream tool output (bakerx, ssh) print plain progress lines instead.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_CHARS: &str = "\u{280B}\u{2819}\u{2839}\u{2838}\u{283C}\u{2834}\u{2826}\u{2827}\u{2807}\u{280F}";

/// Spinner bound to one step of a run
///
/// Becomes a no-op in quiet mode.
pub struct StepSpinner {
    bar: Option<ProgressBar>,
}

impl StepSpinner {
    /// Start a spinner for step `index` (zero-based) of `total`
    pub fn start(index: usize, total: usize, message: &str, quiet: bool) -> Self {
        if quiet {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template(
            "{prefix:.dim} {spinner:.cyan} {msg} ({elapsed_precise:.dim})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(TICK_CHARS);
        bar.set_style(style);
        bar.set_prefix(format!("[{}/{}]", index + 1, total));
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    /// Finish with a green checkmark
    pub fn success(self, message: &str) {
        if let Some(bar) = self.bar {
            bar.finish_with_message(format!(
                "{} {}",
                console::style("\u{2713}").green(),
                message
            ));
        }
    }

    /// Finish with a red cross
    pub fn fail(self, message: &str) {
        if let Some(bar) = self.bar {
            bar.finish_with_message(format!("{} {}", console::style("\u{2717}").red(), message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_start_does_not_panic() {
        let spinner = StepSpinner::start(0, 3, "Creating checkbox", false);
        spinner.success("Created checkbox");
    }

    #[test]
    fn spinner_quiet_mode_is_noop() {
        let spinner = StepSpinner::start(1, 3, "Creating iTrust", true);
        assert!(spinner.bar.is_none());
        spinner.fail("failed");
    }
}
