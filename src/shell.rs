//! Command-line quoting for the external client launched by asynchronous
//! rollbacks.
//!
//! The detached command is handed to the platform shell as one string, so
//! every argument is quoted for that shell before it is joined.

/// Shell family the detached command is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFamily {
    /// `/bin/sh` on POSIX hosts.
    Posix,
    /// `cmd.exe` on Windows hosts.
    Windows,
}

impl ShellFamily {
    /// Returns the family of the running host.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Posix }
    }

    /// Quotes one argument for this shell.
    #[must_use]
    pub fn quote(self, value: &str) -> String {
        match self {
            Self::Posix => shell_escape(value),
            Self::Windows => cmd_escape(value),
        }
    }

    /// Renders `program args... > report 2>&1` so that it runs in the
    /// background and the launching shell returns immediately.
    #[must_use]
    pub fn detached_command(self, program: &str, args: &[String], report: &str) -> String {
        let mut command = self.quote(program);
        for arg in args {
            command.push(' ');
            command.push_str(&self.quote(arg));
        }
        let redirected = format!("{command} > {} 2>&1", self.quote(report));
        match self {
            Self::Posix => format!("{redirected} &"),
            Self::Windows => format!("start \"\" /B {redirected}"),
        }
    }
}

/// Quotes a value for `/bin/sh`: single quotes around the value, each
/// embedded single quote closed, escaped and reopened as `'\''`.
#[must_use]
pub fn shell_escape(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Escapes a value for a `cmd /C` command line.
///
/// Wraps the value in double quotes and doubles embedded double quotes.
/// `%` is left alone: outside batch files `cmd` has no escape for it.
#[must_use]
pub fn cmd_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for ch in value.chars() {
        if ch == '"' {
            escaped.push_str("\"\"");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('"');
    escaped
}
