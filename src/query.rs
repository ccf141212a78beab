//! Query composition and execution
//!
//! A [`Statement`] is a query template bound to a client. Executing it
//! prepends the client's PREFIX declarations, substitutes parameters, sends
//! the result as a GET request and hands the response body to the client's
//! result decoder.

use crate::client::Client;
use crate::error::{SparqlError, SparqlResult};
use crate::param::Param;
use crate::results::{BodyReader, QueryResult};
use futures::TryStreamExt;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::io;
use tokio_util::io::StreamReader;
use tracing::debug;

/// Render `PREFIX name: <iri>` lines, one per prefix, in the given order.
pub fn render_prefixes(prefixes: &IndexMap<String, String>) -> String {
    let mut out = String::new();
    for (prefix, iri) in prefixes {
        out.push_str("PREFIX ");
        out.push_str(prefix);
        out.push_str(": ");
        out.push_str(&crate::iri::Iri::new(iri.as_str()).to_ref());
        out.push('\n');
    }
    out
}

/// Substitute every placeholder in `template` in a single pass.
///
/// Each parameter answers to `$<ordinal>` and, when named, `@<name>`. Where
/// placeholders overlap at one position the longest one is taken, so `$10`
/// is never read as `$1` followed by `0`. Replacement text is never rescanned.
/// Placeholders without a parameter are left as they are.
pub fn substitute(template: &str, params: &[Param]) -> SparqlResult<String> {
    let mut table: IndexMap<String, String> = IndexMap::new();
    for param in params {
        let serialized = param.serialize();
        for key in param.placeholders() {
            table.entry(key).or_insert_with(|| serialized.clone());
        }
    }
    if table.is_empty() {
        return Ok(template.to_string());
    }

    let mut keys: Vec<&str> = table.keys().map(String::as_str).collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = keys
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let matcher = Regex::new(&pattern)?;

    let replaced = matcher.replace_all(template, |caps: &Captures<'_>| {
        table
            .get(&caps[0])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}

/// Prefix block followed by the substituted template.
pub fn compose(prefix: &str, template: &str, params: &[Param]) -> SparqlResult<String> {
    let body = substitute(template, params)?;
    let mut out = String::with_capacity(prefix.len() + body.len());
    out.push_str(prefix);
    out.push_str(&body);
    Ok(out)
}

/// A query template bound to a client, reusable across executions
#[derive(Debug, Clone)]
pub struct Statement {
    client: Client,
    query: String,
    prefix: String,
}

impl Statement {
    pub(crate) fn new(client: Client, query: &str) -> Self {
        let prefix = render_prefixes(&client.config().prefixes);
        Self {
            client,
            query: query.to_string(),
            prefix,
        }
    }

    /// The template as given to `prepare`
    pub fn template(&self) -> &str {
        &self.query
    }

    /// Final query text for the given parameters
    pub fn compose(&self, params: &[Param]) -> SparqlResult<String> {
        compose(&self.prefix, &self.query, params)
    }

    /// Execute with the given parameters.
    ///
    /// Dropping the returned future cancels the request. Once a result is
    /// returned the caller owns the response stream and must `close` it.
    pub async fn query(&self, params: &[Param]) -> SparqlResult<Box<dyn QueryResult>> {
        let query = self.compose(params)?;
        let format = self.client.format();
        debug!(query = %query, format = format.mime_type(), "Sending SPARQL query");

        let mut url = self.client.endpoint().clone();
        url.query_pairs_mut()
            .append_pair("query", &query)
            .append_pair("format", format.mime_type());

        let response = self.client.http().get(url).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "SPARQL query response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = body.lines().next().unwrap_or_default().to_string();
            return Err(SparqlError::Status {
                status: status.as_u16(),
                message,
            });
        }

        format.decode(body_reader(response)).await
    }
}

/// Stream a response body without buffering it whole
fn body_reader(response: reqwest::Response) -> BodyReader {
    let stream = response
        .bytes_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
    Box::new(StreamReader::new(Box::pin(stream)))
}
