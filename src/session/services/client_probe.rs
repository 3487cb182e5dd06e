//! Checks behind the asynchronous rollback capability.

use std::sync::LazyLock;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use regex::Regex;
use tracing::warn;

static VERSION_BANNER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)(?:\.\d+)?").ok());

/// Returns `true` when `--version` output carries a version number.
fn is_version_banner(output: &str) -> bool {
    VERSION_BANNER
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(output))
}

/// Runs `psql --version` and checks the banner.
pub(super) async fn client_reports_version(psql: &Utf8Path) -> bool {
    match tokio::process::Command::new(psql.as_str())
        .arg("--version")
        .output()
        .await
    {
        Ok(output) if output.status.success() => {
            is_version_banner(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            warn!(client = %psql, status = %output.status, "client version check failed");
            false
        }
        Err(err) => {
            warn!(client = %psql, error = %err, "client cannot be started");
            false
        }
    }
}

fn create_and_remove_test_file(dir: &Utf8Path) -> std::io::Result<()> {
    let handle = Dir::open_ambient_dir(dir, ambient_authority())?;
    let file_name = format!("rlbk_report_test_{}", uuid::Uuid::new_v4());
    drop(handle.create(&file_name)?);
    handle.remove_file(&file_name)
}

/// Creates then removes a test file inside `dir`.
pub(super) async fn scratch_dir_writable(dir: &Utf8Path) -> bool {
    let owned = dir.to_owned();
    let outcome = tokio::task::spawn_blocking(move || create_and_remove_test_file(&owned)).await;
    match outcome {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            warn!(temp_dir = %dir, error = %err, "scratch directory is not writable");
            false
        }
        Err(err) => {
            warn!(temp_dir = %dir, error = %err, "scratch directory check aborted");
            false
        }
    }
}
