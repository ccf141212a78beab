//! SPARQL client: query a SPARQL endpoint over HTTP
//!
//! Provides:
//!
//! - **`Client`**: endpoint, pooled HTTP transport and global PREFIX table
//! - **`Statement`**: a query template with `$1` / `@name` placeholders,
//!   composed and sent as an HTTP GET
//! - **`Param`**: typed query parameters serialized as SPARQL terms
//! - **`QueryResult`**: forward-only access to SELECT rows or an ASK answer,
//!   decoded from the XML or JSON results format
//!
//! # Quick Start
//!
//! ```no_run
//! use sparql_client::{Client, ClientConfig, Param};
//!
//! #[tokio::main]
//! async fn main() -> sparql_client::SparqlResult<()> {
//!     let client = Client::with_config(
//!         ClientConfig::new("http://ja.dbpedia.org/sparql")
//!             .with_prefix("dbpj", "http://ja.dbpedia.org/resource/")
//!             .with_prefix("dbp-owl", "http://dbpedia.org/ontology/"),
//!     )?;
//!
//!     let stmt = client.prepare("SELECT * WHERE { dbpj:東京都 dbp-owl:populationTotal $1 } LIMIT 1");
//!     let mut result = stmt.query(&[Param::new(1, 13_000_000)]).await?;
//!     while let Some(row) = result.next().await? {
//!         println!("{:?}", row);
//!     }
//!     result.close()?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod iri;
pub mod param;
pub mod query;
pub mod results;
pub mod term;

pub use client::{Client, ClientConfig};
pub use error::{SparqlError, SparqlResult};
pub use iri::{Iri, IriRef, PrefixedName};
pub use param::{Param, ParamValue, ToSparql};
pub use query::Statement;
pub use results::{JsonQueryResult, QueryResult, ResultFormat, XmlQueryResult};
pub use term::{xsd, Literal, Solution, Term};
