//! Connections

use crate::driver::{Conn, Rows, Stmt, Tx};
use crate::error::{DriverError, DriverResult};
use crate::stmt::SparqlStmt;
use crate::value::NamedValue;
use async_trait::async_trait;
use sparql_client::Client;
use tracing::debug;

/// A connection to one SPARQL endpoint
///
/// HTTP holds no session, so a connection is a handle on a shared client.
#[derive(Debug, Clone)]
pub struct SparqlConn {
    client: Client,
}

impl SparqlConn {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Conn for SparqlConn {
    /// HEAD request; any 2xx status is healthy
    async fn ping(&self) -> DriverResult<()> {
        Ok(self.client.ping().await?)
    }

    fn prepare(&self, query: &str) -> DriverResult<Box<dyn Stmt>> {
        debug!(query, "Preparing SPARQL statement");
        Ok(Box::new(SparqlStmt::new(self.client.prepare(query))))
    }

    async fn query(&self, query: &str, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>> {
        let stmt = SparqlStmt::new(self.client.prepare(query));
        stmt.query(args).await
    }

    /// SPARQL queries over HTTP have no transactions
    fn begin(&self) -> DriverResult<Box<dyn Tx>> {
        Err(DriverError::Unsupported("transactions"))
    }

    fn close(&self) -> DriverResult<()> {
        Ok(self.client.close()?)
    }
}
