//! Launcher that hands a backgrounded command line to the platform shell.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::rollback::ports::{LaunchError, LaunchResult, LaunchSpec, ProcessLauncher};
use crate::shell::ShellFamily;

/// Starts the client through `/bin/sh -c` or `cmd /C`.
///
/// The rendered command line backgrounds the client and redirects its
/// output to the report file, so the shell exits at once and the client is
/// left running on its own. Only the shell's exit status is awaited.
#[derive(Debug, Clone, Copy)]
pub struct DetachedProcessLauncher {
    shell: ShellFamily,
}

impl Default for DetachedProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl DetachedProcessLauncher {
    /// Creates a launcher for the running host.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            shell: ShellFamily::host(),
        }
    }

    /// Creates a launcher for an explicit shell family.
    #[must_use]
    pub const fn with_shell(shell: ShellFamily) -> Self {
        Self { shell }
    }

    /// Returns the shell family commands are rendered for.
    #[must_use]
    pub const fn shell(&self) -> ShellFamily {
        self.shell
    }

    fn shell_command(&self, command_line: &str) -> Command {
        let mut command = match self.shell {
            ShellFamily::Posix => {
                let mut sh = Command::new("/bin/sh");
                sh.arg("-c").arg(command_line);
                sh
            }
            ShellFamily::Windows => cmd_command(command_line),
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

/// `cmd` parses its own command line, so the rendered line is appended
/// verbatim instead of being re-quoted as a program argument.
#[cfg(windows)]
fn cmd_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.raw_arg("/C").raw_arg(command_line);
    cmd
}

#[cfg(not(windows))]
fn cmd_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}

#[async_trait]
impl ProcessLauncher for DetachedProcessLauncher {
    async fn launch_detached(&self, spec: &LaunchSpec) -> LaunchResult<()> {
        let command_line = self.shell.detached_command(
            spec.program.as_str(),
            &spec.args,
            spec.report_path.as_str(),
        );
        let mut command = self.shell_command(&command_line);
        command.envs(spec.env.iter().map(|(key, value)| (key, value)));
        debug!(program = %spec.program, report = %spec.report_path, "launching detached client");
        let status = command.status().await.map_err(LaunchError::spawn)?;
        if status.success() {
            Ok(())
        } else {
            Err(LaunchError::ShellFailed {
                status: status.to_string(),
            })
        }
    }
}
