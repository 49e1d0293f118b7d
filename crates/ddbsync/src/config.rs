//! Run configuration.
//!
//! The CLI parses flags and environment variables with `clap`; this module
//! turns those raw settings into validated values. Validation happens before
//! any store is opened, so a bad configuration never touches a database.

use std::path::PathBuf;

use ddbsync_core::TableOptions;
use serde::Serialize;

use crate::error::{Result, SyncError};

/// Default number of parallel scan segments.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default MySQL port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// What to do when one table fails during a multi-table run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing table.
    #[default]
    Abort,
    /// Record the failure and move on to the next table.
    Continue,
}

/// Options controlling a synchronization run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Number of parallel scan segments.
    pub concurrency: usize,
    /// Empty the target table before copying.
    pub truncate: bool,
    /// Multi-table failure policy.
    pub failure_policy: FailurePolicy,
    /// Table options used when creating tables.
    pub table_options: TableOptions,
    /// Log statements without executing them and skip the copy phase.
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            truncate: false,
            failure_policy: FailurePolicy::Abort,
            table_options: TableOptions::default(),
            dry_run: false,
        }
    }
}

impl SyncOptions {
    /// Creates options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scan fan-out.
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Truncates target tables before copying.
    #[must_use]
    pub const fn truncate(mut self, enabled: bool) -> Self {
        self.truncate = enabled;
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub const fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the MySQL table options.
    #[must_use]
    pub fn table_options(mut self, options: TableOptions) -> Self {
        self.table_options = options;
        self
    }

    /// Enables dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Checks the options for values that can never work.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(SyncError::Configuration(String::from(
                "concurrency must be at least 1",
            )));
        }
        if self.table_options.engine.trim().is_empty() {
            return Err(SyncError::Configuration(String::from(
                "storage engine must not be empty",
            )));
        }
        if self.table_options.charset.trim().is_empty() {
            return Err(SyncError::Configuration(String::from(
                "charset must not be empty",
            )));
        }
        Ok(())
    }
}

/// Raw MySQL connection settings, each possibly unset.
#[derive(Debug, Clone, Default)]
pub struct MySqlSettings {
    /// Server host.
    pub host: Option<String>,
    /// Server port.
    pub port: Option<u16>,
    /// User name.
    pub user: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Database (schema) name.
    pub database: Option<String>,
}

/// Validated MySQL connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// User name.
    pub user: String,
    /// Password, if any.
    pub password: Option<String>,
    /// Database (schema) name.
    pub database: String,
}

/// Where records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetConfig {
    /// A MySQL server.
    MySql(MySqlConfig),
    /// A SQLite database URL such as `sqlite:out.db` or `sqlite::memory:`.
    Sqlite(String),
}

impl TargetConfig {
    /// Resolves the target from raw settings.
    ///
    /// A SQLite URL wins when given; otherwise MySQL host, user and database
    /// are all required.
    pub fn resolve(sqlite_url: Option<String>, mysql: MySqlSettings) -> Result<Self> {
        if let Some(url) = sqlite_url.filter(|u| !u.trim().is_empty()) {
            return Ok(Self::Sqlite(url));
        }

        let host = required(mysql.host, "MYSQL_HOST")?;
        let user = required(mysql.user, "MYSQL_USER")?;
        let database = required(mysql.database, "MYSQL_DATABASE")?;

        Ok(Self::MySql(MySqlConfig {
            host,
            port: mysql.port.unwrap_or(DEFAULT_MYSQL_PORT),
            user,
            password: mysql.password,
            database,
        }))
    }

    /// Returns a short description safe to log (no credentials).
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::MySql(c) => format!("mysql://{}@{}:{}/{}", c.user, c.host, c.port, c.database),
            Self::Sqlite(url) => url.clone(),
        }
    }
}

/// Where records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// A directory of `<table>.json` export files.
    JsonExport(PathBuf),
    /// Live DynamoDB, optionally in a specific region.
    DynamoDb {
        /// AWS region override.
        region: Option<String>,
    },
}

impl SourceConfig {
    /// Resolves the source from raw settings.
    ///
    /// An export directory wins when given. Otherwise DynamoDB is used, which
    /// requires the `dynamodb` feature.
    pub fn resolve(source_dir: Option<PathBuf>, region: Option<String>) -> Result<Self> {
        if let Some(dir) = source_dir {
            return Ok(Self::JsonExport(dir));
        }
        if cfg!(feature = "dynamodb") {
            Ok(Self::DynamoDb { region })
        } else {
            Err(SyncError::Configuration(String::from(
                "no source configured: pass --source-dir or build with the `dynamodb` feature",
            )))
        }
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SyncError::Configuration(format!("{name} is not set")))
}
