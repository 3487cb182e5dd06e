//! Detached process launch port.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type for process launches.
pub type LaunchResult<T> = Result<T, LaunchError>;

/// Everything needed to start the external client once.
#[derive(Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Client executable.
    pub program: Utf8PathBuf,
    /// Client arguments, unquoted.
    pub args: Vec<String>,
    /// Environment added to the child, typically the `PG*` connection
    /// variables.
    pub env: Vec<(String, String)>,
    /// File receiving the client's standard output and error.
    pub report_path: Utf8PathBuf,
}

impl std::fmt::Debug for LaunchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_keys: Vec<&str> = self.env.iter().map(|(key, _)| key.as_str()).collect();
        f.debug_struct("LaunchSpec")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &env_keys)
            .field("report_path", &self.report_path)
            .finish()
    }
}

/// Starts a process that outlives the call.
///
/// Implementations return as soon as the process is started. They keep no
/// handle to it: the caller tracks the work through server-side state only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Launches `spec` in the background.
    async fn launch_detached(&self, spec: &LaunchSpec) -> LaunchResult<()>;
}

/// Errors returned by process launchers.
#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    /// The launching shell could not be spawned.
    #[error("failed to spawn launcher shell: {0}")]
    Spawn(Arc<std::io::Error>),

    /// The launching shell reported a failure.
    #[error("launcher shell exited with status {status}")]
    ShellFailed {
        /// Exit status as rendered by the platform.
        status: String,
    },

    /// Launcher-specific failure.
    #[error("launcher error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl LaunchError {
    /// Wraps a spawn failure.
    #[must_use]
    pub fn spawn(err: std::io::Error) -> Self {
        Self::Spawn(Arc::new(err))
    }

    /// Wraps a launcher-specific failure.
    #[must_use]
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
