//! SPARQL driver: row-oriented data access over a SPARQL endpoint
//!
//! Adapts [`sparql_client`] to a generic connection / statement / rows
//! surface:
//!
//! - **`SparqlDriver`**: opens connections by endpoint URL (driver name `"sparql"`)
//! - **`SparqlConnector`**: fixed client settings (pool, timeouts, prefixes)
//! - **`SparqlConn`** / **`SparqlStmt`**: ping, prepare and query; transactions
//!   and `exec` fail with [`DriverError::Unsupported`]
//! - **`SparqlRows`**: fixed-width rows; an ASK result is one `boolean` column
//!
//! # Quick Start
//!
//! ```no_run
//! use sparql_driver::{Conn, Driver, NamedValue, Rows, SparqlDriver, Value};
//!
//! #[tokio::main]
//! async fn main() -> sparql_driver::DriverResult<()> {
//!     let conn = SparqlDriver.open("http://ja.dbpedia.org/sparql").await?;
//!     conn.ping().await?;
//!
//!     let mut rows = conn
//!         .query(
//!             "SELECT DISTINCT * WHERE { <http://ja.dbpedia.org/resource/東京都> ?p $1 } LIMIT 1",
//!             &[NamedValue::new(1, "東京都")],
//!         )
//!         .await?;
//!     let mut dest = vec![Value::Null; rows.columns().len()];
//!     while rows.next(&mut dest).await? {
//!         println!("{:?}", dest);
//!     }
//!     rows.close()?;
//!     conn.close()
//! }
//! ```

pub mod conn;
pub mod connector;
pub mod driver;
pub mod error;
pub mod rows;
pub mod stmt;
pub mod value;

pub use conn::SparqlConn;
pub use connector::{SparqlConnector, SparqlDriver, DRIVER_NAME};
pub use driver::{Conn, Connector, Driver, Rows, Stmt, Tx};
pub use error::{DriverError, DriverResult};
pub use rows::{SparqlRows, BOOLEAN_COLUMN};
pub use stmt::SparqlStmt;
pub use value::{NamedValue, Value};
