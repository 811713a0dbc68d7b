//! Connection boundary traits and the data-source connection manager.
//!
//! The record engine never talks to a database directly. It asks a
//! [`ConnectionProvider`] for the connection and query driver registered under a data
//! source id, prepares one statement per operation and executes it. Drivers implement
//! [`Connection`] and [`Statement`]; [`ConnectionManager`] is the stock provider.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::driver::{Dialect, QueryDriver};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;

/// A prepared statement.
pub trait Statement {
    /// Execute with positional parameters.
    fn execute(&mut self, params: &[Value]) -> Result<()>;

    /// Fetch the next row produced by the last execution, or `None` at the end.
    fn fetch_row(&mut self) -> Result<Option<Row>>;
}

/// A database connection.
pub trait Connection: Send + Sync {
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement + '_>>;

    /// The key generated by the most recent INSERT, if the driver tracks one.
    fn last_insert_id(&self) -> Result<Option<Value>>;
}

/// Resolves connections and query drivers by data source id.
pub trait ConnectionProvider: Send + Sync {
    fn connection(&self, source_id: &str) -> Result<Arc<dyn Connection>>;

    fn query_driver(&self, source_id: &str) -> Result<QueryDriver>;
}

/// Connection settings for one data source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub dsn: String,
    /// Explicit driver type; derived from the DSN prefix when absent.
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Driver-specific options, passed through untouched.
    #[serde(default)]
    pub query_options: IndexMap<String, String>,
    /// Quote identifiers in generated DML.
    #[serde(default)]
    pub quote_identifiers: bool,
}

impl DataSourceConfig {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// The driver type: the explicit `driver` setting, else the DSN prefix
    /// (`sqlite:/tmp/db` → `sqlite`).
    pub fn driver_type(&self) -> Option<&str> {
        if let Some(driver) = self.driver.as_deref() {
            return Some(driver);
        }
        self.dsn
            .split_once(':')
            .map(|(prefix, _)| prefix)
            .filter(|prefix| !prefix.is_empty())
    }

    pub fn dialect(&self) -> Option<Dialect> {
        self.driver_type().and_then(Dialect::from_driver_type)
    }

    pub fn query_driver(&self) -> Option<QueryDriver> {
        self.dialect()
            .map(|dialect| QueryDriver::new(dialect).quote_identifiers(self.quote_identifiers))
    }
}

/// Opens a connection for a configured data source.
pub type Connector =
    Arc<dyn Fn(&str, &DataSourceConfig) -> Result<Arc<dyn Connection>> + Send + Sync>;

struct Source {
    config: Option<DataSourceConfig>,
    driver: QueryDriver,
    connection: Option<Arc<dyn Connection>>,
}

/// The stock [`ConnectionProvider`].
///
/// Data sources are registered either with a ready connection or with a config;
/// configured sources are connected lazily through the [`Connector`] on first use and
/// the connection is cached until closed.
#[derive(Default)]
pub struct ConnectionManager {
    sources: Mutex<HashMap<String, Source>>,
    connector: Option<Connector>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connector<F>(connector: F) -> Self
    where
        F: Fn(&str, &DataSourceConfig) -> Result<Arc<dyn Connection>> + Send + Sync + 'static,
    {
        Self {
            sources: Mutex::new(HashMap::new()),
            connector: Some(Arc::new(connector)),
        }
    }

    fn sources(&self) -> MutexGuard<'_, HashMap<String, Source>> {
        self.sources.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a data source to be connected on first use.
    pub fn add_data_source(&self, id: impl Into<String>, config: DataSourceConfig) -> Result<()> {
        let id = id.into();
        let driver = config.query_driver().ok_or_else(|| {
            Error::storage(format!(
                "data source {id}: unsupported driver type {:?}",
                config.driver_type()
            ))
        })?;
        tracing::debug!(source = %id, dialect = driver.dialect.as_str(), "Registered data source");
        self.sources().insert(
            id,
            Source {
                config: Some(config),
                driver,
                connection: None,
            },
        );
        Ok(())
    }

    /// Register an already open connection.
    pub fn add_connection(
        &self,
        id: impl Into<String>,
        connection: Arc<dyn Connection>,
        driver: QueryDriver,
    ) {
        let id = id.into();
        tracing::debug!(source = %id, dialect = driver.dialect.as_str(), "Registered connection");
        self.sources().insert(
            id,
            Source {
                config: None,
                driver,
                connection: Some(connection),
            },
        );
    }

    pub fn has(&self, id: &str) -> bool {
        self.sources().contains_key(id)
    }

    /// Registered data source ids, sorted.
    pub fn data_source_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sources().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn data_source_config(&self, id: &str) -> Option<DataSourceConfig> {
        self.sources().get(id).and_then(|s| s.config.clone())
    }

    /// The driver type name of a data source.
    pub fn driver_type(&self, id: &str) -> Result<String> {
        let sources = self.sources();
        let source = sources
            .get(id)
            .ok_or_else(|| Error::DataSourceNotFound(id.to_string()))?;
        Ok(source
            .config
            .as_ref()
            .and_then(|c| c.driver_type().map(str::to_string))
            .unwrap_or_else(|| source.driver.dialect.as_str().to_string()))
    }

    /// Whether a connection is currently open for `id`.
    pub fn is_connected(&self, id: &str) -> bool {
        self.sources()
            .get(id)
            .is_some_and(|s| s.connection.is_some())
    }

    /// Drop the cached connection for `id`. Configured sources reconnect on next use.
    pub fn close(&self, id: &str) {
        if let Some(source) = self.sources().get_mut(id) {
            if source.connection.take().is_some() {
                tracing::debug!(source = %id, "Closed connection");
            }
        }
    }

    pub fn close_all(&self) {
        for source in self.sources().values_mut() {
            source.connection = None;
        }
    }

    /// Forget every data source.
    pub fn free(&self) {
        self.sources().clear();
    }
}

impl ConnectionProvider for ConnectionManager {
    fn connection(&self, source_id: &str) -> Result<Arc<dyn Connection>> {
        let mut sources = self.sources();
        let source = sources
            .get_mut(source_id)
            .ok_or_else(|| Error::DataSourceNotFound(source_id.to_string()))?;

        if let Some(conn) = &source.connection {
            return Ok(Arc::clone(conn));
        }

        let config = source
            .config
            .as_ref()
            .ok_or_else(|| Error::DataSourceNotFound(source_id.to_string()))?;
        let connector = self
            .connector
            .as_ref()
            .ok_or_else(|| Error::storage(format!("no connector for data source {source_id}")))?;

        tracing::info!(source = %source_id, dsn = %config.dsn, "Opening connection");
        let conn = connector(source_id, config)?;
        source.connection = Some(Arc::clone(&conn));
        Ok(conn)
    }

    fn query_driver(&self, source_id: &str) -> Result<QueryDriver> {
        self.sources()
            .get(source_id)
            .map(|s| s.driver)
            .ok_or_else(|| Error::DataSourceNotFound(source_id.to_string()))
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("data_sources", &self.data_source_ids())
            .field("has_connector", &self.connector.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConnection;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_driver_type_from_dsn_prefix() {
        let config = DataSourceConfig::new("sqlite:/tmp/books.db");
        assert_eq!(config.driver_type(), Some("sqlite"));
        assert_eq!(config.dialect(), Some(Dialect::Sqlite));

        let explicit = DataSourceConfig::new("host=localhost dbname=books").driver("pgsql");
        assert_eq!(explicit.driver_type(), Some("pgsql"));
        assert_eq!(explicit.dialect(), Some(Dialect::Postgres));
    }

    #[test]
    fn test_unknown_source() {
        let manager = ConnectionManager::new();
        let err = manager.connection("master").err().unwrap();
        assert_eq!(err, Error::DataSourceNotFound("master".into()));
        assert!(manager.query_driver("master").is_err());
    }

    #[test]
    fn test_lazy_connect_and_cache() {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opened);
        let manager = ConnectionManager::with_connector(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockConnection::new()) as Arc<dyn Connection>)
        });
        manager
            .add_data_source("default", DataSourceConfig::new("sqlite::memory:"))
            .unwrap();

        assert!(!manager.is_connected("default"));
        manager.connection("default").unwrap();
        manager.connection("default").unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert!(manager.is_connected("default"));

        manager.close("default");
        assert!(!manager.is_connected("default"));
        manager.connection("default").unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_registered_connection() {
        let manager = ConnectionManager::new();
        manager.add_connection(
            "reader",
            Arc::new(MockConnection::new()),
            QueryDriver::new(Dialect::Mysql),
        );
        assert!(manager.has("reader"));
        assert_eq!(
            manager.query_driver("reader").unwrap().dialect,
            Dialect::Mysql
        );
        assert_eq!(manager.driver_type("reader").unwrap(), "mysql");
        assert_eq!(manager.data_source_ids(), vec!["reader".to_string()]);

        manager.free();
        assert!(!manager.has("reader"));
    }

    #[test]
    fn test_unsupported_driver_is_rejected() {
        let manager = ConnectionManager::new();
        assert!(
            manager
                .add_data_source("x", DataSourceConfig::new("oracle:foo"))
                .is_err()
        );
    }
}
