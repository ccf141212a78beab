//! Decoder for the SPARQL Query Results JSON Format
//!
//! The whole document is read before the first row is handed out.

use super::QueryResult;
use crate::error::{SparqlError, SparqlResult};
use crate::iri::{Iri, IriRef};
use crate::term::{Literal, Solution, Term};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct JsonDocument {
    #[serde(default)]
    head: JsonHead,
    #[serde(default)]
    results: JsonResults,
    #[serde(default)]
    boolean: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct JsonHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct JsonResults {
    #[serde(default)]
    bindings: Vec<HashMap<String, JsonTerm>>,
}

#[derive(Debug, Deserialize)]
struct JsonTerm {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    datatype: Option<String>,
    #[serde(rename = "xml:lang", default)]
    lang: Option<String>,
}

fn value_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl JsonTerm {
    fn into_term(self) -> SparqlResult<Term> {
        match self.kind.as_str() {
            "uri" => Ok(Term::Iri(Iri::new(value_text(self.value)))),
            "bnode" => Ok(Term::BlankNode(value_text(self.value))),
            "literal" | "typed-literal" => match self.value {
                serde_json::Value::Bool(b) if self.datatype.is_none() && self.lang.is_none() => {
                    Ok(Term::Boolean(b))
                }
                value => Ok(Term::Literal(Literal {
                    value: value_text(value),
                    data_type: self.datatype.map(|dt| IriRef::Iri(Iri::new(dt))),
                    language_tag: self.lang,
                })),
            },
            other => Err(SparqlError::UnknownBinding(other.to_string())),
        }
    }
}

/// A fully decoded JSON results document, handed out row by row
#[derive(Debug)]
pub struct JsonQueryResult {
    variables: Vec<String>,
    rows: Option<std::vec::IntoIter<HashMap<String, JsonTerm>>>,
    boolean: Option<bool>,
    failed: bool,
}

impl JsonQueryResult {
    /// Read the whole body and parse it
    pub async fn decode<R: AsyncRead + Unpin>(mut read: R) -> SparqlResult<Self> {
        let mut body = Vec::new();
        read.read_to_end(&mut body).await?;
        Self::from_slice(&body)
    }

    /// Parse an in-memory document
    pub fn from_slice(body: &[u8]) -> SparqlResult<Self> {
        let document: JsonDocument = serde_json::from_slice(body)?;
        debug!(
            variables = ?document.head.vars,
            rows = document.results.bindings.len(),
            "Decoded JSON result"
        );
        Ok(Self {
            variables: document.head.vars,
            rows: Some(document.results.bindings.into_iter()),
            boolean: document.boolean,
            failed: false,
        })
    }

    fn rows(&mut self) -> SparqlResult<&mut std::vec::IntoIter<HashMap<String, JsonTerm>>> {
        match self.rows.as_mut() {
            Some(_) if self.failed => Err(SparqlError::ResultFailed),
            Some(rows) => Ok(rows),
            None => Err(SparqlError::ResultClosed),
        }
    }

    fn read_next(&mut self) -> SparqlResult<Option<Solution>> {
        let Some(row) = self.rows()?.next() else {
            return Ok(None);
        };
        let mut solution = Solution::with_capacity(row.len());
        for (name, term) in row {
            solution.insert(name, term.into_term()?);
        }
        Ok(Some(solution))
    }

    fn read_boolean(&mut self) -> SparqlResult<bool> {
        self.rows()?;
        self.boolean
            .ok_or_else(|| SparqlError::Decode("no boolean in response".to_string()))
    }

    fn poison_on_error<T>(&mut self, outcome: SparqlResult<T>) -> SparqlResult<T> {
        if outcome.is_err() && self.rows.is_some() {
            self.failed = true;
        }
        outcome
    }
}

#[async_trait]
impl QueryResult for JsonQueryResult {
    fn variables(&self) -> &[String] {
        &self.variables
    }

    async fn next(&mut self) -> SparqlResult<Option<Solution>> {
        let outcome = self.read_next();
        self.poison_on_error(outcome)
    }

    async fn boolean(&mut self) -> SparqlResult<bool> {
        let outcome = self.read_boolean();
        self.poison_on_error(outcome)
    }

    fn close(&mut self) -> SparqlResult<()> {
        match self.rows.take() {
            Some(_) => Ok(()),
            None => Err(SparqlError::ResultClosed),
        }
    }
}
