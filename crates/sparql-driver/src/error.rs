//! Error types for the SPARQL driver

use sparql_client::SparqlError;
use thiserror::Error;

/// Errors surfaced through the driver surface
#[derive(Error, Debug)]
pub enum DriverError {
    /// Transport, status or decode failure from the client
    #[error(transparent)]
    Sparql(#[from] SparqlError),

    /// Operation the SPARQL protocol has no counterpart for
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    /// Destination slice shorter than the column list
    #[error("expected {expected} destination slots, got {got}")]
    ColumnCount { expected: usize, got: usize },

    /// Rows used after `close`
    #[error("rows are closed")]
    RowsClosed,
}

pub type DriverResult<T> = Result<T, DriverError>;
