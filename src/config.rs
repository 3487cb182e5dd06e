//! Gateway configuration.
//!
//! Only two options influence behaviour: the path of the external command-line
//! client and a writable scratch directory. Both are required for
//! asynchronous rollbacks; without them the gateway runs rollbacks
//! synchronously only.

use std::io::Read;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default extension schema.
pub const DEFAULT_EXTENSION_SCHEMA: &str = "emaj";

/// Environment variable holding the client path.
pub const ENV_PSQL_PATH: &str = "EMAJ_PSQL_PATH";

/// Environment variable holding the scratch directory.
pub const ENV_TEMP_DIR: &str = "EMAJ_TEMP_DIR";

/// Environment variable holding the extension schema.
pub const ENV_SCHEMA: &str = "EMAJ_SCHEMA";

/// Errors raised while loading the configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration {path}: {source}")]
    Read {
        /// File that was read.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        source: Arc<std::io::Error>,
    },

    /// The configuration document is not valid.
    #[error("invalid configuration {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: Utf8PathBuf,
        /// Underlying decoding failure.
        source: Arc<serde_json::Error>,
    },
}

fn default_schema() -> String {
    DEFAULT_EXTENSION_SCHEMA.to_owned()
}

/// Gateway options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Path of the external command-line client.
    #[serde(default)]
    pub psql_path: Option<Utf8PathBuf>,
    /// Writable scratch directory for rollback reports.
    #[serde(default)]
    pub temp_dir: Option<Utf8PathBuf>,
    /// Schema the extension is installed in.
    #[serde(default = "default_schema")]
    pub extension_schema: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            psql_path: None,
            temp_dir: None,
            extension_schema: default_schema(),
        }
    }
}

impl GatewayConfig {
    /// Sets the client path.
    #[must_use]
    pub fn with_psql_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.psql_path = Some(path.into());
        self
    }

    /// Sets the scratch directory.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Sets the extension schema.
    #[must_use]
    pub fn with_extension_schema(mut self, schema: impl Into<String>) -> Self {
        self.extension_schema = schema.into();
        self
    }

    /// Returns the client path and scratch directory when both are set and
    /// non-empty.
    #[must_use]
    pub fn async_paths(&self) -> Option<(&Utf8Path, &Utf8Path)> {
        let psql = self.psql_path.as_deref().filter(|p| !p.as_str().is_empty())?;
        let temp = self.temp_dir.as_deref().filter(|p| !p.as_str().is_empty())?;
        Some((psql, temp))
    }

    /// Reads a JSON configuration file named `file_name` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not a valid configuration.
    pub fn load(dir: &Dir, file_name: &Utf8Path) -> Result<Self, ConfigError> {
        let read_error = |err: std::io::Error| ConfigError::Read {
            path: file_name.to_owned(),
            source: Arc::new(err),
        };
        let mut contents = String::new();
        dir.open(file_name)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(read_error)?;
        serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: file_name.to_owned(),
            source: Arc::new(err),
        })
    }

    /// Reads a JSON configuration file from an absolute or relative path.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::load`].
    pub fn load_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        let parent = path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = path.file_name().map_or(path, Utf8Path::new);
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| {
            ConfigError::Read {
                path: path.to_owned(),
                source: Arc::new(err),
            }
        })?;
        Self::load(&dir, file_name)
    }

    /// Builds a configuration from `EMAJ_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from any key lookup, using the `EMAJ_*`
    /// variable names.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            psql_path: non_empty(ENV_PSQL_PATH).map(Utf8PathBuf::from),
            temp_dir: non_empty(ENV_TEMP_DIR).map(Utf8PathBuf::from),
            extension_schema: non_empty(ENV_SCHEMA).unwrap_or_else(default_schema),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn async_paths_need_both_options() {
        let partial = GatewayConfig::default().with_psql_path("/usr/bin/psql");
        assert!(partial.async_paths().is_none());

        let empty_dir = partial.clone().with_temp_dir("");
        assert!(empty_dir.async_paths().is_none());

        let complete = partial.with_temp_dir("/tmp");
        assert_eq!(
            complete.async_paths(),
            Some((Utf8Path::new("/usr/bin/psql"), Utf8Path::new("/tmp")))
        );
    }

    #[test]
    fn environment_lookup_fills_known_keys() {
        let vars = HashMap::from([
            (ENV_PSQL_PATH, "/opt/pg/bin/psql"),
            (ENV_SCHEMA, "audit"),
            (ENV_TEMP_DIR, "  "),
        ]);

        let config = GatewayConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_owned()));

        assert_eq!(config.psql_path, Some(Utf8PathBuf::from("/opt/pg/bin/psql")));
        assert_eq!(config.temp_dir, None);
        assert_eq!(config.extension_schema, "audit");
    }

    #[test]
    fn json_file_is_loaded_with_defaults() {
        let base = Utf8PathBuf::try_from(std::env::temp_dir()).expect("utf-8 temp dir");
        let dir_name = format!("emaj_config_{}", uuid::Uuid::new_v4());
        let base_dir = Dir::open_ambient_dir(&base, ambient_authority()).expect("open temp dir");
        base_dir.create_dir(&dir_name).expect("create config dir");
        let dir = base_dir.open_dir(&dir_name).expect("open config dir");
        let mut file = dir.create("gateway.json").expect("create config file");
        file.write_all(br#"{"temp_dir": "/var/tmp"}"#)
            .expect("write config file");

        let config =
            GatewayConfig::load(&dir, Utf8Path::new("gateway.json")).expect("config loads");

        assert_eq!(config.temp_dir, Some(Utf8PathBuf::from("/var/tmp")));
        assert_eq!(config.psql_path, None);
        assert_eq!(config.extension_schema, DEFAULT_EXTENSION_SCHEMA);

        let missing = GatewayConfig::load(&dir, Utf8Path::new("absent.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
        base_dir.remove_dir_all(&dir_name).expect("cleanup");
    }
}
