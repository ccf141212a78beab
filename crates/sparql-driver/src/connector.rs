//! Driver and connector

use crate::conn::SparqlConn;
use crate::driver::{Conn, Connector, Driver};
use crate::error::DriverResult;
use async_trait::async_trait;
use sparql_client::{Client, ClientConfig};
use tracing::info;

/// Name the driver is known by
pub const DRIVER_NAME: &str = "sparql";

/// Driver for SPARQL endpoints. The data source name is the endpoint URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparqlDriver;

impl SparqlDriver {
    pub fn name(&self) -> &'static str {
        DRIVER_NAME
    }
}

#[async_trait]
impl Driver for SparqlDriver {
    async fn open(&self, name: &str) -> DriverResult<Box<dyn Conn>> {
        self.open_connector(name)?.connect().await
    }

    fn open_connector(&self, name: &str) -> DriverResult<Box<dyn Connector>> {
        Ok(Box::new(SparqlConnector::new(name)))
    }
}

/// Opens connections to one endpoint with fixed client settings
#[derive(Debug, Clone)]
pub struct SparqlConnector {
    driver: SparqlDriver,
    config: ClientConfig,
}

impl SparqlConnector {
    /// Connector with default pool and timeout settings
    pub fn new(endpoint: &str) -> Self {
        Self::with_config(ClientConfig::new(endpoint))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            driver: SparqlDriver,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a connection without boxing it
    pub fn connect_sparql(&self) -> DriverResult<SparqlConn> {
        let client = Client::with_config(self.config.clone())?;
        info!(endpoint = %client.endpoint(), "SPARQL connection opened");
        Ok(SparqlConn::new(client))
    }
}

#[async_trait]
impl Connector for SparqlConnector {
    async fn connect(&self) -> DriverResult<Box<dyn Conn>> {
        Ok(Box::new(self.connect_sparql()?))
    }

    fn driver(&self) -> &dyn Driver {
        &self.driver
    }
}
