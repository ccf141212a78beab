//! Generic data-access surface
//!
//! Connection, statement and row traits a row-oriented database layer is
//! written against. [`SparqlDriver`](crate::SparqlDriver) and the types it
//! hands out implement them over a SPARQL endpoint.

use crate::error::DriverResult;
use crate::value::{NamedValue, Value};
use async_trait::async_trait;

/// Opens connections by data source name
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a connection to `name`
    async fn open(&self, name: &str) -> DriverResult<Box<dyn Conn>>;

    /// A connector for `name` that can open any number of connections
    fn open_connector(&self, name: &str) -> DriverResult<Box<dyn Connector>>;
}

/// A data source with fixed settings
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> DriverResult<Box<dyn Conn>>;

    /// The driver this connector belongs to
    fn driver(&self) -> &dyn Driver;
}

/// A connection to one data source
#[async_trait]
pub trait Conn: Send + Sync {
    /// Check that the data source is reachable
    async fn ping(&self) -> DriverResult<()>;

    /// Bind a query template to this connection
    fn prepare(&self, query: &str) -> DriverResult<Box<dyn Stmt>>;

    /// Prepare and execute in one step
    async fn query(&self, query: &str, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>>;

    /// Start a transaction
    fn begin(&self) -> DriverResult<Box<dyn Tx>>;

    fn close(&self) -> DriverResult<()>;
}

/// A prepared statement, reusable across executions
#[async_trait]
pub trait Stmt: Send + Sync {
    /// Number of placeholders, or `None` when unknown
    fn num_input(&self) -> Option<usize>;

    async fn query(&self, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>>;

    /// Execute without rows; returns the number of affected rows
    async fn exec(&self, args: &[NamedValue]) -> DriverResult<u64>;

    fn close(&self) -> DriverResult<()>;
}

/// Forward-only iterator over fixed-width rows
#[async_trait]
pub trait Rows: Send {
    /// Column names, in slot order
    fn columns(&self) -> Vec<String>;

    /// Fill `dest` with the next row. Returns `false` at the end of the rows.
    async fn next(&mut self, dest: &mut [Value]) -> DriverResult<bool>;

    fn close(&mut self) -> DriverResult<()>;
}

/// A transaction
#[async_trait]
pub trait Tx: Send {
    async fn commit(self: Box<Self>) -> DriverResult<()>;

    async fn rollback(self: Box<Self>) -> DriverResult<()>;
}
