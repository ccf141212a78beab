//! SPARQL CLI: run queries against a SPARQL endpoint
//!
//! Uses the sparql-driver connection surface, so rows come out as fixed
//! columns with `xsd:dateTime` values already converted to timestamps.

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use sparql_client::{ClientConfig, ResultFormat};
use sparql_driver::{Conn, NamedValue, Rows, SparqlConn, SparqlConnector, Value};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sparql", version, about = "SPARQL endpoint CLI")]
struct Cli {
    /// SPARQL endpoint URL
    #[arg(
        long,
        default_value = "http://localhost:3030/sparql",
        global = true,
        env = "SPARQL_ENDPOINT"
    )]
    endpoint: String,

    /// PREFIX declaration prepended to every query, as name=iri
    #[arg(long = "prefix", value_parser = parse_prefix, global = true)]
    prefixes: Vec<(String, String)>,

    /// Result format requested from the endpoint
    #[arg(long, default_value = "xml", global = true)]
    format: WireFormat,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    timeout: u64,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum WireFormat {
    Xml,
    Json,
}

impl From<WireFormat> for ResultFormat {
    fn from(format: WireFormat) -> Self {
        match format {
            WireFormat::Xml => ResultFormat::Xml,
            WireFormat::Json => ResultFormat::Json,
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a SPARQL query
    Query {
        /// Query text; `$1`, `$2`, ... are filled from --param in order
        query: String,

        /// Parameter value, bound as a string literal
        #[arg(long = "param")]
        params: Vec<String>,
    },
    /// Check that the endpoint answers
    Ping,
    /// Start an interactive REPL
    Shell,
}

fn parse_prefix(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, iri)) if !name.is_empty() && !iri.is_empty() => {
            Ok((name.to_string(), iri.to_string()))
        }
        _ => Err(format!("expected name=iri, got '{}'", s)),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::new(cli.endpoint.as_str())
        .with_format(cli.format.into())
        .with_timeout(Duration::from_secs(cli.timeout));
    for (name, iri) in &cli.prefixes {
        config = config.with_prefix(name.as_str(), iri.as_str());
    }

    let conn = match SparqlConnector::with_config(config).connect_sparql() {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Query { query, params } => run_query(&conn, &query, params, &cli.output).await,
        Commands::Ping => run_ping(&conn).await,
        Commands::Shell => run_shell(&conn, &cli.output).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_query(
    conn: &SparqlConn,
    query: &str,
    params: Vec<String>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let args = NamedValue::positional(params);
    let mut rows = conn.query(query, &args).await?;
    let columns = rows.columns();

    let mut records = Vec::new();
    let mut dest = vec![Value::Null; columns.len()];
    while rows.next(&mut dest).await? {
        records.push(dest.clone());
    }
    rows.close()?;

    match format {
        OutputFormat::Json => {
            let objects: Vec<serde_json::Value> = records
                .iter()
                .map(|row| {
                    let map = columns
                        .iter()
                        .zip(row)
                        .map(|(c, v)| (c.clone(), json_value(v)))
                        .collect::<serde_json::Map<_, _>>();
                    serde_json::Value::Object(map)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&objects)?);
        }
        OutputFormat::Csv => {
            println!("{}", columns.join(","));
            for row in &records {
                let cells: Vec<String> = row.iter().map(format_csv_value).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(&columns);

            for row in &records {
                let cells: Vec<String> = row.iter().map(format_table_value).collect();
                table.add_row(cells);
            }

            println!("{}", table);
            println!("{} row(s)", records.len());
        }
    }

    Ok(())
}

async fn run_ping(conn: &SparqlConn) -> Result<(), Box<dyn std::error::Error>> {
    conn.ping().await?;
    println!("PONG {}", conn.client().endpoint());
    Ok(())
}

async fn run_shell(
    conn: &SparqlConn,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("SPARQL Interactive Shell ({})", conn.client().endpoint());
    println!("Type a query on one line, or :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("sparql> ");

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :ping     Ping the endpoint");
                println!("  :quit     Exit shell");
                println!("  <query>   Execute a SPARQL query");
            }
            ":ping" => {
                if let Err(e) = run_ping(conn).await {
                    eprintln!("Error: {}", e);
                }
            }
            query => {
                if let Err(e) = run_query(conn, query, Vec::new(), format).await {
                    eprintln!("Error: {}", e);
                }
            }
        }
    }

    conn.close()?;
    println!("Bye!");
    Ok(())
}

fn json_value(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
    }
}

fn format_table_value(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn format_csv_value(v: &Value) -> String {
    let s = v.to_string();
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s
    }
}
