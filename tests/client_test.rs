//! End-to-end tests against a stub SPARQL endpoint

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use sparql_client::{
    Client, ClientConfig, Iri, Literal, Param, ResultFormat, SparqlError, Term,
};
use std::collections::HashMap;
use std::time::Duration;

const SELECT_XML: &str = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head>
    <variable name="s"/>
    <variable name="name"/>
  </head>
  <results>
    <result>
      <binding name="s"><uri>http://example.org/alice</uri></binding>
      <binding name="name"><literal xml:lang="en">Alice</literal></binding>
    </result>
    <result>
      <binding name="s"><bnode>b0</bnode></binding>
      <binding name="name"><literal>Bob</literal></binding>
    </result>
  </results>
</sparql>"#;

const ASK_XML: &str = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head></head>
  <boolean>true</boolean>
</sparql>"#;

/// Answers JSON requests by echoing the received query text back as a
/// literal, and XML requests with canned SELECT or ASK documents.
async fn sparql(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let query = params.get("query").cloned().unwrap_or_default();
    let format = params.get("format").cloned().unwrap_or_default();
    if format == ResultFormat::Json.mime_type() {
        let body = serde_json::json!({
            "head": { "vars": ["query"] },
            "results": { "bindings": [
                { "query": { "type": "literal", "value": query } }
            ] }
        });
        return (StatusCode::OK, body.to_string());
    }
    if query.contains("ASK") {
        (StatusCode::OK, ASK_XML.to_string())
    } else {
        (StatusCode::OK, SELECT_XML.to_string())
    }
}

async fn broken() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        "Parse error: unexpected token\nat line 2",
    )
}

async fn start_server() -> String {
    let app = Router::new()
        .route("/sparql", get(sparql))
        .route("/broken", get(broken));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn json_client(base: &str) -> Client {
    Client::with_config(
        ClientConfig::new(format!("{}/sparql", base))
            .with_format(ResultFormat::Json)
            .with_timeout(Duration::from_secs(5))
            .with_prefix("foaf", "http://xmlns.com/foaf/0.1/"),
    )
    .unwrap()
}

#[tokio::test]
async fn test_composed_query_reaches_endpoint() {
    let base = start_server().await;
    let client = json_client(&base);

    let stmt = client.prepare("SELECT * WHERE { ?s foaf:name $1 }");
    let mut result = stmt.query(&[Param::new(1, "Bob")]).await.unwrap();
    assert_eq!(result.variables(), ["query".to_string()]);

    let row = result.next().await.unwrap().unwrap();
    assert_eq!(
        row["query"],
        Term::Literal(Literal::new(
            "PREFIX foaf: <http://xmlns.com/foaf/0.1/>\nSELECT * WHERE { ?s foaf:name \"\"\"Bob\"\"\" }"
        ))
    );
    assert!(result.next().await.unwrap().is_none());
    result.close().unwrap();
}

#[tokio::test]
async fn test_statement_is_reusable() {
    let base = start_server().await;
    let client = json_client(&base);
    let stmt = client.prepare("SELECT * WHERE { ?s foaf:age @age }");

    for age in [20, 30] {
        let mut result = stmt.query(&[Param::named(1, "age", age)]).await.unwrap();
        let row = result.next().await.unwrap().unwrap();
        assert!(row["query"].as_text().ends_with(&format!("foaf:age {} }}", age)));
        result.close().unwrap();
    }
}

#[tokio::test]
async fn test_non_ascii_query_text() {
    let base = start_server().await;
    let client = json_client(&base);

    let mut result = client
        .query("SELECT * WHERE { <http://ja.dbpedia.org/resource/東京都> ?p $1 }", &[
            Param::new(1, "東京"),
        ])
        .await
        .unwrap();
    let row = result.next().await.unwrap().unwrap();
    assert!(row["query"].as_text().contains("東京都> ?p \"\"\"東京\"\"\""));
    result.close().unwrap();
}

#[tokio::test]
async fn test_select_xml() {
    let base = start_server().await;
    let client = Client::new(&format!("{}/sparql", base)).unwrap();

    let mut result = client.query("SELECT ?s ?name WHERE { ?s ?p ?name }", &[]).await.unwrap();
    assert_eq!(result.variables(), ["s".to_string(), "name".to_string()]);

    let row = result.next().await.unwrap().unwrap();
    assert_eq!(row["s"], Term::Iri(Iri::new("http://example.org/alice")));
    assert_eq!(row["name"], Term::Literal(Literal::with_language("Alice", "en")));

    let row = result.next().await.unwrap().unwrap();
    assert_eq!(row["s"], Term::BlankNode("b0".to_string()));
    assert_eq!(row["name"], Term::Literal(Literal::new("Bob")));

    assert!(result.next().await.unwrap().is_none());
    result.close().unwrap();
    assert!(matches!(result.close(), Err(SparqlError::ResultClosed)));
}

#[tokio::test]
async fn test_ask_xml() {
    let base = start_server().await;
    let client = Client::new(&format!("{}/sparql", base)).unwrap();

    let mut result = client.query("ASK { ?s ?p ?o }", &[]).await.unwrap();
    assert!(result.variables().is_empty());
    assert!(result.boolean().await.unwrap());
    result.close().unwrap();
}

#[tokio::test]
async fn test_error_status_keeps_first_line() {
    let base = start_server().await;
    let client = Client::new(&format!("{}/broken", base)).unwrap();

    let err = client.query("SELECT * WHERE {", &[]).await.err().unwrap();
    match err {
        SparqlError::Status { status, ref message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Parse error: unexpected token");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "SPARQL query error. status code: 400 msg: Parse error: unexpected token"
    );
}

#[tokio::test]
async fn test_ping() {
    let base = start_server().await;

    let client = Client::new(&format!("{}/sparql", base)).unwrap();
    client.ping().await.unwrap();

    let client = Client::new(&format!("{}/broken", base)).unwrap();
    assert!(matches!(client.ping().await, Err(SparqlError::PingStatus(400))));
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::new(&format!("http://{}/sparql", addr)).unwrap();
    assert!(matches!(
        client.query("ASK {}", &[]).await,
        Err(SparqlError::Transport(_))
    ));
}

#[tokio::test]
async fn test_sub_second_timeout_fires() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = Client::with_config(
        ClientConfig::new(format!("http://{}/sparql", addr))
            .with_timeout(Duration::from_millis(300)),
    )
    .unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(3), client.query("ASK {}", &[])).await;
    match outcome {
        Ok(Err(SparqlError::Transport(e))) => assert!(e.is_timeout()),
        Ok(Err(other)) => panic!("unexpected error: {:?}", other),
        Ok(Ok(_)) => panic!("silent endpoint produced a result"),
        Err(_) => panic!("request timeout did not fire"),
    }
}
