//! SPARQL endpoint client
//!
//! Holds the endpoint, the HTTP connection pool and the global PREFIX table.
//! Cloning is cheap and clones share the pool.

use crate::error::{SparqlError, SparqlResult};
use crate::param::Param;
use crate::query::Statement;
use crate::results::{QueryResult, ResultFormat};
use indexmap::IndexMap;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

fn default_max_idle_connections() -> usize {
    100
}

fn default_idle_timeout_ms() -> Option<u64> {
    Some(90_000)
}

fn default_request_timeout_ms() -> Option<u64> {
    Some(30_000)
}

/// Whole milliseconds, rounding a non-zero sub-millisecond duration up to one
fn duration_ms(duration: Duration) -> u64 {
    let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    if ms == 0 && !duration.is_zero() {
        1
    } else {
        ms
    }
}

/// A zero duration means no limit
fn limit_ms(duration: Duration) -> Option<u64> {
    if duration.is_zero() {
        None
    } else {
        Some(duration_ms(duration))
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// SPARQL endpoint URL
    pub endpoint: String,
    /// Idle connections kept per host
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
    /// Milliseconds an idle connection is kept; `None` keeps it indefinitely
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: Option<u64>,
    /// Milliseconds allowed for connecting and for a whole request; `None` waits indefinitely
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: Option<u64>,
    /// PREFIX declarations prepended to every query, in insertion order
    #[serde(default)]
    pub prefixes: IndexMap<String, String>,
    /// Result format requested from the endpoint
    #[serde(default)]
    pub format: ResultFormat,
}

impl Default for ClientConfig {
    /// Defaults without an endpoint; a client refuses to start until one is set
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl ClientConfig {
    /// Configuration with default pool and timeout settings
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            max_idle_connections: default_max_idle_connections(),
            idle_timeout_ms: default_idle_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            prefixes: IndexMap::new(),
            format: ResultFormat::default(),
        }
    }

    /// Add a global PREFIX. Re-adding a prefix replaces its IRI in place.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), iri.into());
        self
    }

    #[must_use]
    pub fn with_max_idle_connections(mut self, max: usize) -> Self {
        self.max_idle_connections = max;
        self
    }

    /// Idle connection lifetime. `Duration::ZERO` disables the limit.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout_ms = limit_ms(timeout);
        self
    }

    /// Request and connect timeout. `Duration::ZERO` disables the limit.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = limit_ms(timeout);
        self
    }

    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.request_timeout_ms = None;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: ResultFormat) -> Self {
        self.format = format;
        self
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms.map(Duration::from_millis)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    fn endpoint_url(&self) -> SparqlResult<Url> {
        if self.endpoint.trim().is_empty() {
            return Err(SparqlError::InvalidConfig("endpoint is required".to_string()));
        }
        Url::parse(&self.endpoint).map_err(|source| SparqlError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })
    }

    /// Build the pooled HTTP client described by this configuration
    pub fn build_http_client(&self) -> SparqlResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(self.max_idle_connections)
            .pool_idle_timeout(self.idle_timeout());
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout).connect_timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    endpoint: Url,
    config: ClientConfig,
}

/// Client for one SPARQL endpoint
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Client with default settings
    pub fn new(endpoint: &str) -> SparqlResult<Self> {
        Self::with_config(ClientConfig::new(endpoint))
    }

    /// Client with a pooled HTTP client built from `config`
    pub fn with_config(config: ClientConfig) -> SparqlResult<Self> {
        let http = config.build_http_client()?;
        Self::with_http_client(config, http)
    }

    /// Client using a caller-supplied HTTP client; pool settings in `config` are ignored
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> SparqlResult<Self> {
        let endpoint = config.endpoint_url()?;
        info!(
            endpoint = %endpoint,
            max_idle_connections = config.max_idle_connections,
            idle_timeout_ms = ?config.idle_timeout_ms,
            request_timeout_ms = ?config.request_timeout_ms,
            format = config.format.mime_type(),
            "SPARQL client created"
        );
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoint,
                config,
            }),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn format(&self) -> ResultFormat {
        self.inner.config.format
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Send a HEAD request to the endpoint. Any 2xx status is healthy.
    pub async fn ping(&self) -> SparqlResult<()> {
        let response = self.http().head(self.endpoint().clone()).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "SPARQL ping response");
        if status.is_success() {
            Ok(())
        } else {
            Err(SparqlError::PingStatus(status.as_u16()))
        }
    }

    /// Bind a query template to this client
    pub fn prepare(&self, query: &str) -> Statement {
        Statement::new(self.clone(), query)
    }

    /// Prepare and execute in one step
    pub async fn query(&self, query: &str, params: &[Param]) -> SparqlResult<Box<dyn QueryResult>> {
        self.prepare(query).query(params).await
    }

    /// Nothing is held open between requests; idle connections are
    /// released when the last clone is dropped.
    pub fn close(&self) -> SparqlResult<()> {
        debug!(endpoint = %self.endpoint(), "SPARQL client closed");
        Ok(())
    }
}
