//! Session-scoped capability and version context.

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::client_probe;
use crate::config::GatewayConfig;
use crate::database::ports::{ExecutorResult, QueryExecutor};
use crate::dialect::bootstrap::{self, ParamSource};
use crate::dialect::{Dialect, Statement};
use crate::session::domain::{AccessError, CapabilitySnapshot, ExtensionVersion, ServerIdentity};

/// Administrative session over one database connection.
///
/// Every probe and the version lookup run at most once; the first result,
/// including a negative one caused by a fault, is kept for the lifetime of
/// the session. Catalog and rollback services share the session through an
/// `Arc`.
pub struct EmajSession<E> {
    executor: E,
    identity: ServerIdentity,
    config: GatewayConfig,
    schema: OnceCell<Option<String>>,
    admin: OnceCell<bool>,
    viewer: OnceCell<bool>,
    cross_link: OnceCell<bool>,
    async_usable: OnceCell<bool>,
    version: OnceCell<ExtensionVersion>,
    dialect: OnceCell<Dialect>,
}

impl<E: QueryExecutor> EmajSession<E> {
    /// Creates a session; nothing is queried until the first probe.
    #[must_use]
    pub fn new(executor: E, identity: ServerIdentity, config: GatewayConfig) -> Self {
        Self {
            executor,
            identity,
            config,
            schema: OnceCell::new(),
            admin: OnceCell::new(),
            viewer: OnceCell::new(),
            cross_link: OnceCell::new(),
            async_usable: OnceCell::new(),
            version: OnceCell::new(),
            dialect: OnceCell::new(),
        }
    }

    /// Returns the query/execute interface of the session.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Returns the identity of the connected principal.
    #[must_use]
    pub const fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    /// Returns the gateway configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the resolved extension schema, or the configured name while
    /// the extension has not been found.
    #[must_use]
    pub fn extension_schema(&self) -> &str {
        self.schema
            .get()
            .and_then(Option::as_deref)
            .unwrap_or(&self.config.extension_schema)
    }

    async fn flag(&self, probe: &'static str, statement: &Statement, column: &str) -> bool {
        let outcome: ExecutorResult<bool> = async {
            match self.executor.select_field(statement, column).await? {
                Some(field) => field.flag(),
                None => Ok(false),
            }
        }
        .await;
        outcome.unwrap_or_else(|err| {
            warn!(probe, error = %err, "capability probe failed, treating as unavailable");
            false
        })
    }

    /// Reports whether the extension schema exists.
    ///
    /// Exactly one matching namespace row enables the extension and records
    /// its actual name for every later statement.
    pub async fn probe_enabled(&self) -> bool {
        self.schema
            .get_or_init(|| async {
                let statement = bootstrap::find_schema(&self.config.extension_schema);
                match self.executor.select_set(&statement).await {
                    Ok(rows) => match rows.as_slice() {
                        [row] => row.text("schema_name").ok(),
                        _ => None,
                    },
                    Err(err) => {
                        warn!(error = %err, "extension lookup failed, treating as not installed");
                        None
                    }
                }
            })
            .await
            .is_some()
    }

    /// Reports whether the principal administers the extension.
    ///
    /// Superusers always do; other roles need membership in the
    /// administrator role.
    pub async fn probe_admin(&self) -> bool {
        *self
            .admin
            .get_or_init(|| async {
                let superuser = bootstrap::is_superuser(self.identity.username());
                if self.flag("superuser", &superuser, "is_superuser").await {
                    return true;
                }
                let member = bootstrap::has_role(bootstrap::ADMIN_ROLE);
                self.flag("admin role", &member, "has_role").await
            })
            .await
    }

    /// Reports whether the principal may read the extension catalog.
    ///
    /// Administrators are viewers.
    pub async fn probe_viewer(&self) -> bool {
        *self
            .viewer
            .get_or_init(|| async {
                if self.probe_admin().await {
                    return true;
                }
                let member = bootstrap::has_role(bootstrap::VIEWER_ROLE);
                self.flag("viewer role", &member, "has_role").await
            })
            .await
    }

    /// Reports whether the extension is installed and readable by the
    /// principal.
    pub async fn probe_accessible(&self) -> bool {
        self.probe_enabled().await && (self.probe_admin().await || self.probe_viewer().await)
    }

    /// Reports whether a cross-session link can be opened.
    ///
    /// A test link is opened through the extension's helper and closed
    /// again, even when opening reported a failure.
    pub async fn probe_cross_link_usable(&self) -> bool {
        *self
            .cross_link
            .get_or_init(|| async {
                if !self.probe_enabled().await {
                    return false;
                }
                let schema = self.extension_schema();
                let usable = self
                    .flag("cross link", &bootstrap::open_cross_link(schema), "cnx_ok")
                    .await;
                if let Err(err) = self
                    .executor
                    .select_set(&bootstrap::close_cross_link(schema))
                    .await
                {
                    warn!(error = %err, "test cross-session link could not be closed");
                }
                usable
            })
            .await
    }

    /// Reports whether asynchronous rollbacks can be submitted.
    ///
    /// Both configured paths must be present, the client must print a
    /// version banner and a test file must be writable in the scratch
    /// directory.
    pub async fn probe_async_usable(&self) -> bool {
        *self
            .async_usable
            .get_or_init(|| async {
                let Some((psql, temp_dir)) = self.config.async_paths() else {
                    debug!("asynchronous rollback disabled by configuration");
                    return false;
                };
                client_probe::client_reports_version(psql).await
                    && client_probe::scratch_dir_writable(temp_dir).await
            })
            .await
    }

    /// Resolves the installed extension version.
    ///
    /// Reads the version parameter from the visible-parameter view when the
    /// release has one, from the legacy parameter table otherwise. Any fault
    /// or unparseable value yields [`ExtensionVersion::unknown`].
    pub async fn resolve_version(&self) -> &ExtensionVersion {
        self.version
            .get_or_init(|| async {
                if !self.probe_enabled().await {
                    return ExtensionVersion::unknown();
                }
                match self.read_version().await {
                    Ok(Some(raw)) => ExtensionVersion::parse(&raw),
                    Ok(None) => ExtensionVersion::unknown(),
                    Err(err) => {
                        warn!(error = %err, "extension version lookup failed");
                        ExtensionVersion::unknown()
                    }
                }
            })
            .await
    }

    async fn read_version(&self) -> ExecutorResult<Option<String>> {
        let schema = self.extension_schema();
        let source = match self
            .executor
            .select_field(&bootstrap::param_source(schema), "param_table")
            .await?
        {
            Some(field) => ParamSource::from_relation(&field.text()?),
            None => ParamSource::LegacyParam,
        };
        match self
            .executor
            .select_field(&bootstrap::read_version(schema, source), "version")
            .await?
        {
            Some(field) => field.opt_text(),
            None => Ok(None),
        }
    }

    /// Returns the statement renderer for the installed version.
    pub async fn dialect(&self) -> &Dialect {
        self.dialect
            .get_or_init(|| async {
                let numeric = self.resolve_version().await.numeric();
                Dialect::new(self.extension_schema(), numeric)
            })
            .await
    }

    /// Collects every probe into one snapshot.
    pub async fn snapshot(&self) -> CapabilitySnapshot {
        CapabilitySnapshot {
            installed: self.probe_enabled().await,
            schema_name: self.extension_schema().to_owned(),
            is_admin: self.probe_admin().await,
            is_viewer: self.probe_viewer().await,
            cross_link_usable: self.probe_cross_link_usable().await,
            async_usable: self.probe_async_usable().await,
        }
    }

    /// Fails unless the extension is installed and readable.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::ExtensionNotInstalled`] or
    /// [`AccessError::NotAccessible`].
    pub async fn ensure_accessible(&self) -> Result<(), AccessError> {
        if !self.probe_enabled().await {
            return Err(AccessError::ExtensionNotInstalled {
                schema: self.config.extension_schema.clone(),
            });
        }
        if !self.probe_accessible().await {
            return Err(AccessError::NotAccessible);
        }
        Ok(())
    }

    /// Fails unless the principal administers the extension.
    ///
    /// # Errors
    ///
    /// Returns any error of [`EmajSession::ensure_accessible`], or
    /// [`AccessError::AdminRequired`] for viewers.
    pub async fn ensure_admin(&self) -> Result<(), AccessError> {
        self.ensure_accessible().await?;
        if self.probe_admin().await {
            Ok(())
        } else {
            Err(AccessError::AdminRequired)
        }
    }
}
