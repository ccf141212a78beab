//! Row adapter over a decoded query result

use crate::driver::Rows;
use crate::error::{DriverError, DriverResult};
use crate::value::Value;
use async_trait::async_trait;
use sparql_client::QueryResult;
use tracing::error;

/// Column reported for an ASK result
pub const BOOLEAN_COLUMN: &str = "boolean";

/// Fixed-column view of a [`QueryResult`]
///
/// A result with no declared variables is an ASK result: it reports the
/// single column `boolean` and yields exactly one row holding the answer.
pub struct SparqlRows {
    result: Option<Box<dyn QueryResult>>,
    variables: Vec<String>,
    processed: u64,
}

impl SparqlRows {
    pub fn new(result: Box<dyn QueryResult>) -> Self {
        let variables = result.variables().to_vec();
        Self {
            result: Some(result),
            variables,
            processed: 0,
        }
    }

    pub fn is_ask(&self) -> bool {
        self.variables.is_empty()
    }

    /// Rows handed out so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Release the response stream after a failed read
    fn release(&mut self) {
        if let Some(mut result) = self.result.take() {
            if let Err(e) = result.close() {
                error!("Failed to release SPARQL response: {}", e);
            }
        }
    }

    async fn next_ask(&mut self, dest: &mut [Value]) -> DriverResult<bool> {
        if self.processed > 0 {
            return Ok(false);
        }
        let result = self.result.as_mut().ok_or(DriverError::RowsClosed)?;
        let slot = dest.first_mut().ok_or(DriverError::ColumnCount {
            expected: 1,
            got: 0,
        })?;
        match result.boolean().await {
            Ok(answer) => {
                *slot = Value::Bool(answer);
                self.processed += 1;
                Ok(true)
            }
            Err(e) => {
                self.release();
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl Rows for SparqlRows {
    fn columns(&self) -> Vec<String> {
        if self.is_ask() {
            return vec![BOOLEAN_COLUMN.to_string()];
        }
        self.variables.clone()
    }

    async fn next(&mut self, dest: &mut [Value]) -> DriverResult<bool> {
        if self.result.is_none() {
            return Err(DriverError::RowsClosed);
        }
        if self.is_ask() {
            return self.next_ask(dest).await;
        }
        if dest.len() < self.variables.len() {
            return Err(DriverError::ColumnCount {
                expected: self.variables.len(),
                got: dest.len(),
            });
        }

        let result = self.result.as_mut().ok_or(DriverError::RowsClosed)?;
        let row = match result.next().await {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(false),
            Err(e) => {
                self.release();
                return Err(e.into());
            }
        };
        for (slot, variable) in dest.iter_mut().zip(&self.variables) {
            *slot = Value::from_binding(row.get(variable));
        }
        self.processed += 1;
        Ok(true)
    }

    /// Close the underlying result. Closing twice is a no-op.
    fn close(&mut self) -> DriverResult<()> {
        match self.result.take() {
            Some(mut result) => Ok(result.close()?),
            None => Ok(()),
        }
    }
}
