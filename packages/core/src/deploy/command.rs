//! Structured remote commands
//!
//! Remote work is described as a list of program invocations rather than a
//! pre-built shell string. Every argument is quoted when the command is
//! rendered for the remote shell, so branch names or credentials containing
//! spaces or quotes cannot break out of their argument.

use std::borrow::Cow;
use std::fmt;

/// Placeholder shown instead of secret arguments
pub const MASK: &str = "********";

/// A single argument of a command line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Arg {
    value: String,
    secret: bool,
}

/// One program invocation: `program arg1 arg2 ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<Arg>,
}

impl CommandLine {
    /// Start a command line for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builder pattern: append an argument
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg {
            value: value.into(),
            secret: false,
        });
        self
    }

    /// Builder pattern: append several arguments
    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self = self.arg(value);
        }
        self
    }

    /// Builder pattern: append an argument that is masked when displayed
    pub fn secret_arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg {
            value: value.into(),
            secret: true,
        });
        self
    }

    /// Render for execution by a POSIX shell
    pub fn render(&self) -> String {
        let mut out = shell_quote(&self.program).into_owned();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&shell_quote(&arg.value));
        }
        out
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            if arg.secret {
                write!(f, " {MASK}")?;
            } else {
                write!(f, " {}", shell_quote(&arg.value))?;
            }
        }
        Ok(())
    }
}

/// An ordered list of command lines run as one remote shell invocation
///
/// Lines are chained with `&&`: the first failing line stops the rest and its
/// exit status becomes the status of the whole command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    lines: Vec<CommandLine>,
}

impl RemoteCommand {
    /// Create a command from its first line
    pub fn new(line: CommandLine) -> Self {
        Self { lines: vec![line] }
    }

    /// Builder pattern: run `line` after the previous lines succeed
    pub fn then(mut self, line: CommandLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines(&self) -> &[CommandLine] {
        &self.lines
    }

    /// Render the full script handed to the remote shell
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(CommandLine::render)
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str(" && ")?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Quote a word for a POSIX shell
///
/// Words made only of safe characters are returned unchanged; anything else
/// is wrapped in single quotes with embedded quotes escaped as `'\''`.
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c);

    if !word.is_empty() && word.chars().all(is_safe) {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}
