//! SPARQL query results decoding
//!
//! Two interchangeable decoders sit behind [`QueryResult`]:
//!
//! - [`XmlQueryResult`]: [SPARQL Query Results XML Format](https://www.w3.org/TR/rdf-sparql-XMLres/),
//!   decoded as a forward-only stream
//! - [`JsonQueryResult`]: [SPARQL Query Results JSON Format](https://www.w3.org/TR/sparql11-results-json/),
//!   decoded eagerly
//!
//! A result set with no declared variables is treated as an ASK result and
//! answers [`QueryResult::boolean`]. That is a convention of this client, not
//! something the formats guarantee.

mod json;
mod xml;

pub use json::JsonQueryResult;
pub use xml::XmlQueryResult;

use crate::error::SparqlResult;
use crate::term::Solution;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncBufRead;

/// Response body handed to a decoder
pub type BodyReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// A decoded query result, consumed forward-only
#[async_trait]
pub trait QueryResult: Send {
    /// Variables declared in the head, in order. Empty for ASK results.
    fn variables(&self) -> &[String];

    /// Next row, or `None` once the results are exhausted
    async fn next(&mut self) -> SparqlResult<Option<Solution>>;

    /// The ASK answer
    async fn boolean(&mut self) -> SparqlResult<bool>;

    /// Release the response stream. Must be called exactly once.
    fn close(&mut self) -> SparqlResult<()>;
}

/// SPARQL result format requested from the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    /// XML results
    #[default]
    Xml,
    /// JSON results
    Json,
}

impl ResultFormat {
    /// Value of the `format` request parameter
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResultFormat::Xml => "application/sparql-results+xml",
            ResultFormat::Json => "application/sparql-results+json",
        }
    }

    /// Look up a format by MIME type, ignoring parameters such as `charset`
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let base = mime_type.split(';').next().unwrap_or_default().trim();
        match base.to_ascii_lowercase().as_str() {
            "application/sparql-results+xml" | "application/xml" | "text/xml" => {
                Some(ResultFormat::Xml)
            }
            "application/sparql-results+json" | "application/json" => Some(ResultFormat::Json),
            _ => None,
        }
    }

    /// Open a result set over a response body
    pub async fn decode(self, body: BodyReader) -> SparqlResult<Box<dyn QueryResult>> {
        Ok(match self {
            ResultFormat::Xml => Box::new(XmlQueryResult::decode(body).await?),
            ResultFormat::Json => Box::new(JsonQueryResult::decode(body).await?),
        })
    }
}
