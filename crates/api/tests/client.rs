//! HTTP client tests using wiremock mock server.
//!
//! These tests verify:
//! - Query construction for the metadata endpoints
//! - Decoding of plugin, dataset and help payloads
//! - Degraded catalog loading when optional endpoints fail
//! - Raw fetches returning non-JSON bodies and error statuses untouched

use senpy_api::{ApiError, PluginQuery, SenpyClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for_server(server: &MockServer) -> SenpyClient {
    SenpyClient::new(&server.uri()).expect("client creation should succeed")
}

fn sentiment140() -> serde_json::Value {
    json!({
        "name": "sentiment140",
        "@type": "sentimentPlugin",
        "description": "Sentiment classifier using rule-based classification for English and Spanish.",
        "is_activated": true,
        "version": "0.2",
        "extra_params": {
            "language": { "options": ["en", "es"], "default": "en", "aliases": ["language", "l"], "required": false }
        }
    })
}

#[tokio::test]
async fn plugins_sends_verbose_and_type_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/plugins/"))
        .and(query_param("verbose", "1"))
        .and(query_param("plugin_type", "sentimentPlugin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "plugins": [sentiment140()] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for_server(&server);
    let plugins = client
        .plugins(&PluginQuery {
            verbose: true,
            plugin_type: Some("sentimentPlugin".into()),
        })
        .await
        .expect("plugins should load");

    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].name, "sentiment140");
    assert!(plugins[0].is_activated);
    assert_eq!(
        plugins[0].extra_params["language"].effective_options(),
        Some(vec!["en".to_string(), "es".to_string()])
    );
}

#[tokio::test]
async fn plugin_parameters_requests_help() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/sentiment140"))
        .and(query_param("help", "true"))
        .and(query_param_is_missing("verbose"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@type": "help",
            "valid_parameters": {
                "language": { "options": ["en", "es"], "default": "en" },
                "input": { "aliases": ["i"], "required": true }
            }
        })))
        .mount(&server)
        .await;

    let schema = client_for_server(&server)
        .plugin_parameters("sentiment140", None)
        .await
        .expect("help should load");

    assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["language", "input"]);
}

#[tokio::test]
async fn catalog_tolerates_missing_optional_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/plugins/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "plugins": [sentiment140()] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/plugins/default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sentiment140()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "gsitk is not installed" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("help", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid_parameters": { "outformat": { "options": ["json-ld", "turtle", "ntriples"], "default": "json-ld" } }
        })))
        .mount(&server)
        .await;

    let catalog = client_for_server(&server).catalog().await.expect("catalog should load");

    assert_eq!(catalog.plugins.len(), 1);
    assert_eq!(catalog.default_plugin.map(|plugin| plugin.name).as_deref(), Some("sentiment140"));
    assert!(catalog.datasets.is_empty());
    assert!(catalog.basic_parameters.contains_key("outformat"));
}

#[tokio::test]
async fn error_status_on_metadata_endpoint_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/plugins/default"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "No default plugin found" })))
        .mount(&server)
        .await;

    let error = client_for_server(&server)
        .default_plugin()
        .await
        .expect_err("404 should be an error");

    match error {
        ApiError::Status { status, .. } => assert_eq!(status, 404),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn fetch_returns_non_json_bodies_verbatim() {
    let server = MockServer::start().await;
    let ntriples = "<http://senpy.invalid/#char=0,5> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://persistence.uni-leipzig.org/nlp2rdf/ontologies/nif-core#Context> .\n";

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("algo", "sentiment140"))
        .and(query_param("outformat", "ntriples"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/n-triples")
                .set_body_string(ntriples),
        )
        .mount(&server)
        .await;

    let client = client_for_server(&server);
    let url = format!("{}/api?algo=sentiment140&i=hello&outformat=ntriples", client.base_url());
    let response = client.fetch(&url).await.expect("fetch should succeed");

    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type.as_deref(), Some("application/n-triples"));
    assert_eq!(response.body, ntriples);
}

#[tokio::test]
async fn fetch_keeps_error_statuses_as_responses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "@type": "error",
            "message": "Missing or invalid parameters",
            "status": 400
        })))
        .mount(&server)
        .await;

    let client = client_for_server(&server);
    let response = client
        .fetch(&format!("{}/api?algo=missing", client.base_url()))
        .await
        .expect("a 400 is still a response");

    assert_eq!(response.status_code, 400);
    assert!(!response.is_success());
    assert!(response.body.contains("Missing or invalid parameters"));
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    // Port 9 (discard) is closed on test hosts; the connection is refused.
    let client = SenpyClient::new("http://127.0.0.1:9").expect("client");
    let error = client
        .fetch("http://127.0.0.1:9/api?algo=sentiment140&i=hello")
        .await
        .expect_err("nothing listens there");
    assert!(error.is_network());
}
