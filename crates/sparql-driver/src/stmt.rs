//! Prepared statements

use crate::driver::{Rows, Stmt};
use crate::error::{DriverError, DriverResult};
use crate::rows::SparqlRows;
use crate::value::{to_params, NamedValue};
use async_trait::async_trait;
use sparql_client::Statement;

/// A query template bound to a connection's client
#[derive(Debug, Clone)]
pub struct SparqlStmt {
    statement: Statement,
}

impl SparqlStmt {
    pub fn new(statement: Statement) -> Self {
        Self { statement }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }
}

#[async_trait]
impl Stmt for SparqlStmt {
    /// Placeholders are matched textually, so their count is not known up front
    fn num_input(&self) -> Option<usize> {
        None
    }

    async fn query(&self, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>> {
        let result = self.statement.query(&to_params(args)).await?;
        Ok(Box::new(SparqlRows::new(result)))
    }

    async fn exec(&self, _args: &[NamedValue]) -> DriverResult<u64> {
        Err(DriverError::Unsupported("exec"))
    }

    /// Statements hold no server-side state
    fn close(&self) -> DriverResult<()> {
        Ok(())
    }
}
