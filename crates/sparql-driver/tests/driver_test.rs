//! Driver surface against a stub SPARQL endpoint

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::{FixedOffset, TimeZone};
use sparql_driver::{
    Conn, Connector, Driver, DriverError, NamedValue, Rows, SparqlConnector, SparqlDriver, Value,
};
use sparql_client::{ClientConfig, ResultFormat, SparqlError};
use std::collections::HashMap;

const BOB_QUERY: &str = "PREFIX foaf: <http://xmlns.com/foaf/0.1/>\n\
                         SELECT ?mbox WHERE { ?x foaf:name \"\"\"Bob\"\"\" . ?x foaf:mbox ?mbox }";

const BOB_XML: &str = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head><variable name="mbox"/></head>
  <results>
    <result><binding name="mbox"><uri>mailto:bob@work.example.org</uri></binding></result>
  </results>
</sparql>"#;

const TYPED_XML: &str = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head><variable name="age"/><variable name="born"/><variable name="missing"/></head>
  <results>
    <result>
      <binding name="age"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">30</literal></binding>
      <binding name="born"><literal datatype="http://www.w3.org/2001/XMLSchema#dateTime">2015-11-19T09:10:11+09:00</literal></binding>
    </result>
  </results>
</sparql>"#;

const ASK_XML: &str = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head/>
  <boolean>true</boolean>
</sparql>"#;

/// Answers only the queries it knows; anything else is a 400 naming the query
async fn sparql(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let query = params.get("query").cloned().unwrap_or_default();
    let json = params.get("format").map(String::as_str) == Some(ResultFormat::Json.mime_type());

    if query == BOB_QUERY {
        if json {
            let body = serde_json::json!({
                "head": { "vars": ["mbox"] },
                "results": { "bindings": [
                    { "mbox": { "type": "uri", "value": "mailto:bob@work.example.org" } }
                ] }
            });
            return (StatusCode::OK, body.to_string());
        }
        return (StatusCode::OK, BOB_XML.to_string());
    }
    if query.starts_with("ASK") {
        return (StatusCode::OK, ASK_XML.to_string());
    }
    if query.contains("?born") {
        return (StatusCode::OK, TYPED_XML.to_string());
    }
    (StatusCode::BAD_REQUEST, format!("unexpected query\n{}", query))
}

async fn start_server() -> String {
    let app = Router::new().route("/sparql", get(sparql));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/sparql", addr)
}

fn foaf_connector(endpoint: &str, format: ResultFormat) -> SparqlConnector {
    SparqlConnector::with_config(
        ClientConfig::new(endpoint)
            .with_format(format)
            .with_prefix("foaf", "http://xmlns.com/foaf/0.1/"),
    )
}

async fn collect(mut rows: Box<dyn Rows>) -> Vec<Vec<Value>> {
    let mut out = Vec::new();
    let mut dest = vec![Value::Null; rows.columns().len()];
    while rows.next(&mut dest).await.unwrap() {
        out.push(dest.clone());
    }
    rows.close().unwrap();
    out
}

#[tokio::test]
async fn test_round_trip_xml_and_json() {
    let endpoint = start_server().await;
    let template = "SELECT ?mbox WHERE { ?x foaf:name $1 . ?x foaf:mbox ?mbox }";

    for format in [ResultFormat::Xml, ResultFormat::Json] {
        let conn = foaf_connector(&endpoint, format).connect().await.unwrap();
        let rows = conn.query(template, &[NamedValue::new(1, "Bob")]).await.unwrap();
        assert_eq!(rows.columns(), vec!["mbox".to_string()]);
        assert_eq!(
            collect(rows).await,
            vec![vec![Value::Text("mailto:bob@work.example.org".to_string())]]
        );
        conn.close().unwrap();
    }
}

#[tokio::test]
async fn test_prepared_statement_with_named_argument() {
    let endpoint = start_server().await;
    let conn = foaf_connector(&endpoint, ResultFormat::Xml).connect().await.unwrap();

    let stmt = conn
        .prepare("SELECT ?mbox WHERE { ?x foaf:name @name . ?x foaf:mbox ?mbox }")
        .unwrap();
    for _ in 0..2 {
        let rows = stmt.query(&[NamedValue::named(1, "name", "Bob")]).await.unwrap();
        assert_eq!(collect(rows).await.len(), 1);
    }
    stmt.close().unwrap();
}

#[tokio::test]
async fn test_ask_reports_boolean_column() {
    let endpoint = start_server().await;
    let conn = SparqlDriver.open(&endpoint).await.unwrap();

    let rows = conn.query("ASK { ?s ?p ?o }", &[]).await.unwrap();
    assert_eq!(rows.columns(), vec!["boolean".to_string()]);
    assert_eq!(collect(rows).await, vec![vec![Value::Bool(true)]]);
}

#[tokio::test]
async fn test_value_coercion() {
    let endpoint = start_server().await;
    let conn = SparqlDriver.open(&endpoint).await.unwrap();

    let rows = conn
        .query("SELECT ?age ?born ?missing WHERE { ?s ?p ?born }", &[])
        .await
        .unwrap();
    let got = collect(rows).await;
    assert_eq!(got.len(), 1);

    let born = FixedOffset::east_opt(9 * 3600)
        .unwrap()
        .with_ymd_and_hms(2015, 11, 19, 9, 10, 11)
        .unwrap();
    assert_eq!(got[0][0], Value::Text("30".to_string()));
    match &got[0][1] {
        Value::Timestamp(ts) => assert_eq!(*ts, born),
        other => panic!("expected timestamp, got {:?}", other),
    }
    assert_eq!(got[0][2], Value::Null);
}

#[tokio::test]
async fn test_query_error_status() {
    let endpoint = start_server().await;
    let conn = SparqlDriver.open(&endpoint).await.unwrap();

    let err = conn.query("SELECT * WHERE { ?s ?p ?o }", &[]).await.err().unwrap();
    assert!(matches!(
        err,
        DriverError::Sparql(SparqlError::Status { status: 400, ref message }) if message == "unexpected query"
    ));
}

#[tokio::test]
async fn test_ping() {
    let endpoint = start_server().await;
    let connector = SparqlDriver.open_connector(&endpoint).unwrap();
    let conn = connector.connect().await.unwrap();
    conn.ping().await.unwrap();
    assert!(matches!(conn.begin(), Err(DriverError::Unsupported(_))));
}
