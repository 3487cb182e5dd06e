//! Identity and connection target of the current database session.

use std::fmt;

/// Environment variable names understood by the command-line client.
const PGUSER: &str = "PGUSER";
const PGPASSWORD: &str = "PGPASSWORD";
const PGHOST: &str = "PGHOST";
const PGPORT: &str = "PGPORT";
const PGDATABASE: &str = "PGDATABASE";

/// Principal and connection target of the administrative session.
///
/// Used for the superuser probe and to authenticate the external client that
/// runs asynchronous rollbacks. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    username: String,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    database: String,
}

impl ServerIdentity {
    /// Creates an identity for `username` connected to `database` through
    /// the default local socket.
    #[must_use]
    pub fn new(username: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
            host: None,
            port: None,
            database: database.into(),
        }
    }

    /// Sets the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the server host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the server port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Returns the login role.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password, if one was supplied.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns the server host, if not the local socket.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the server port.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Returns the `PG*` variables a child client needs to reach the same
    /// server as this session.
    #[must_use]
    pub fn client_environment(&self) -> Vec<(String, String)> {
        let mut env = vec![(PGUSER.to_owned(), self.username.clone())];
        if let Some(password) = &self.password {
            env.push((PGPASSWORD.to_owned(), password.clone()));
        }
        if let Some(host) = &self.host {
            env.push((PGHOST.to_owned(), host.clone()));
        }
        if let Some(port) = self.port {
            env.push((PGPORT.to_owned(), port.to_string()));
        }
        env.push((PGDATABASE.to_owned(), self.database.clone()));
        env
    }
}

impl fmt::Debug for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerIdentity")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}
