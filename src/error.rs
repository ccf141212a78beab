//! Error types for the SPARQL client
//!
//! Every failure is surfaced to the immediate caller. Nothing here is retried.

use thiserror::Error;

/// SPARQL client errors
#[derive(Error, Debug)]
pub enum SparqlError {
    /// The HTTP call itself failed (network, timeout, cancelled request)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered a query with a non-2xx status
    #[error("SPARQL query error. status code: {status} msg: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// First line of the response body
        message: String,
    },

    /// The endpoint answered a ping with a non-2xx status
    #[error("SPARQL ping error. status code {0}")]
    PingStatus(u16),

    /// The endpoint URL could not be parsed
    #[error("Invalid endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// Client configuration was rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The placeholder table could not be compiled into a matcher
    #[error("Invalid placeholder pattern: {0}")]
    Placeholder(#[from] regex::Error),

    /// Malformed XML in a response body
    #[error("XML decode error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed JSON in a response body
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body ended before the expected element
    #[error("Unexpected end of response while reading {0}")]
    UnexpectedEof(&'static str),

    /// A binding held something other than uri, literal or bnode
    #[error("unknown binding {0}")]
    UnknownBinding(String),

    /// Structurally invalid response content
    #[error("Decode error: {0}")]
    Decode(String),

    /// The result set was used after it was closed
    #[error("Query result is already closed")]
    ResultClosed,

    /// The result set was used again after next or boolean failed
    #[error("Query result is unusable after a previous error")]
    ResultFailed,

    /// I/O error while reading a response body
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SparqlResult<T> = Result<T, SparqlError>;

impl SparqlError {
    /// Whether this error came from decoding a response body
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            SparqlError::Xml(_)
                | SparqlError::Json(_)
                | SparqlError::UnexpectedEof(_)
                | SparqlError::UnknownBinding(_)
                | SparqlError::Decode(_)
        )
    }
}
