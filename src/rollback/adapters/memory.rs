//! In-memory launcher that records launches instead of running them.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::rollback::ports::{LaunchError, LaunchResult, LaunchSpec, ProcessLauncher};

/// Records every [`LaunchSpec`] it receives.
///
/// Useful where no client binary exists, such as integration tests against
/// the scripted executor. A configured failure is returned for every launch
/// after it is set.
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    state: Arc<RwLock<RecorderState>>,
}

#[derive(Debug, Default)]
struct RecorderState {
    launched: Vec<LaunchSpec>,
    failure: Option<LaunchError>,
}

impl RecordingLauncher {
    /// Creates a launcher that accepts every launch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a launcher that rejects every launch with `failure`.
    #[must_use]
    pub fn failing(failure: LaunchError) -> Self {
        let launcher = Self::default();
        if let Ok(mut state) = launcher.state.write() {
            state.failure = Some(failure);
        }
        launcher
    }

    /// Returns the launches recorded so far.
    #[must_use]
    pub fn launched(&self) -> Vec<LaunchSpec> {
        self.state
            .read()
            .map(|state| state.launched.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProcessLauncher for RecordingLauncher {
    async fn launch_detached(&self, spec: &LaunchSpec) -> LaunchResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| LaunchError::runtime(std::io::Error::other(err.to_string())))?;
        if let Some(failure) = &state.failure {
            return Err(failure.clone());
        }
        state.launched.push(spec.clone());
        Ok(())
    }
}
