//! Configuration for ObjectEngine
//!
//! Connection credentials arrive per request as an opaque bundle. This module
//! validates them and turns them into sqlx connect options.

use std::fmt;

use sqlx::postgres::PgConnectOptions;

use crate::error::{Result, StoreError};
use crate::sql::sanitize::validate_name;

/// Default name of the shared row table
pub const DEFAULT_TABLE_NAME: &str = "typetables";

/// Connection credentials and storage location
#[derive(Clone)]
pub struct ConnectionConfig {
    /// PostgreSQL database URL
    pub database_url: String,
    pub username: String,
    pub password: String,
    /// Name of the shared row table (default: "typetables")
    pub table_name: String,
}

impl ConnectionConfig {
    /// Create a new configuration builder
    pub fn builder(
        database_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new(database_url, username, password)
    }

    /// Check that every credential is present and the table name is safe
    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(StoreError::invalid_input(
                "ConnectionConfig.database_url cannot be blank",
            ));
        }
        if self.username.is_empty() {
            return Err(StoreError::invalid_input(
                "ConnectionConfig.username cannot be blank",
            ));
        }
        if self.password.is_empty() {
            return Err(StoreError::invalid_input(
                "ConnectionConfig.password cannot be blank",
            ));
        }
        if self.table_name.is_empty() {
            return Err(StoreError::invalid_input(
                "ConnectionConfig.table_name cannot be blank",
            ));
        }
        validate_name(&self.table_name)
    }

    /// Parse the URL and apply the configured credentials
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let options: PgConnectOptions = self.database_url.parse().map_err(|e| {
            StoreError::invalid_input(format!("ConnectionConfig.database_url is not valid: {}", e))
        })?;

        Ok(options.username(&self.username).password(&self.password))
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("database_url", &self.database_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("table_name", &self.table_name)
            .finish()
    }
}

/// Builder for ConnectionConfig
#[derive(Debug)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    pub fn new(
        database_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            config: ConnectionConfig {
                database_url: database_url.into(),
                username: username.into(),
                password: password.into(),
                table_name: DEFAULT_TABLE_NAME.to_string(),
            },
        }
    }

    /// Set the row table name (default: "typetables")
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.config.table_name = name.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}
