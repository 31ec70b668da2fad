//! Color utilities for CLI output
//!
//! Provides consistent color styling for fleet roles and step outcomes.

use canary_deploy_core::deploy::StepKind;
use canary_deploy_core::host::Role;
use console::{Style, StyledObject};

/// Style text in the color associated with a host role
///
/// - blue -> blue
/// - green -> green
/// - proxy -> red
/// - config server -> cyan
pub fn role_style<D>(role: Role, text: D) -> StyledObject<D> {
    let style = match role {
        Role::Blue => Style::new().blue().bright(),
        Role::Green => Style::new().green().bright(),
        Role::Proxy => Style::new().red().bright(),
        Role::ConfigServer => Style::new().cyan(),
    };
    style.apply_to(text)
}

/// Style a step kind tag, e.g. `[provision]`
pub fn kind_style(kind: StepKind) -> StyledObject<String> {
    let style = match kind {
        StepKind::Provision => Style::new().magenta(),
        StepKind::RemoteCommand => Style::new().yellow(),
        StepKind::FileCopy => Style::new().cyan(),
    };
    style.apply_to(format!("[{kind}]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: StyledObject::to_string() includes ANSI escape codes when colors are enabled.
    // Tests use contains() to check the text content regardless of styling.

    #[test]
    fn role_style_keeps_text() {
        for role in Role::ALL {
            let styled = role_style(role, role.label());
            assert!(styled.to_string().contains(role.label()));
        }
    }

    #[test]
    fn kind_style_wraps_in_brackets() {
        assert!(kind_style(StepKind::Provision).to_string().contains("[provision]"));
        assert!(kind_style(StepKind::RemoteCommand).to_string().contains("[remote]"));
        assert!(kind_style(StepKind::FileCopy).to_string().contains("[copy]"));
    }
}
