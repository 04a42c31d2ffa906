//! Check outgoing requests against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes typed inputs and either the request the client
//! must send or the failure message it must return without sending anything.
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use std::sync::Mutex;

use async_trait::async_trait;
use paystack_core::{
    ApiResponse, ClientConfig, HttpMethod, HttpRequest, HttpResponse, InitializeTransaction,
    ListTransactionsQuery, Paystack, RequestOptions, Transport, TransportError,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";
const KEY: &str = "sk_test_vectors_0001";

/// Keeps every request and answers with an empty successful envelope.
#[derive(Default)]
struct Recorder {
    requests: Mutex<Vec<HttpRequest>>,
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: r#"{"status":true,"message":"ok","data":null}"#.to_string(),
        })
    }
}

fn client() -> Paystack<Recorder> {
    let config = ClientConfig::new(KEY).with_base_url(BASE_URL).unwrap();
    Paystack::with_transport(config, Recorder::default())
}

fn recorded(c: &Paystack<Recorder>) -> Vec<HttpRequest> {
    c.dispatcher().transport().requests.lock().unwrap().clone()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn options(case: &Value) -> RequestOptions {
    RequestOptions {
        subunit: case["options"]["subunit"].as_bool().unwrap_or(true),
    }
}

/// Either the request matches `expected_request`, or nothing was sent and the
/// response is the `expected_failure` message.
fn check_case<D: std::fmt::Debug>(name: &str, case: &Value, c: &Paystack<Recorder>, resp: &ApiResponse<D>) {
    let requests = recorded(c);

    if let Some(expected) = case.get("expected_failure") {
        assert!(!resp.status(), "{name}: expected failure, got {resp:?}");
        assert_eq!(resp.message(), expected.as_str().unwrap(), "{name}: message");
        assert!(requests.is_empty(), "{name}: nothing should be sent");
        return;
    }

    let expected_req = &case["expected_request"];
    assert_eq!(requests.len(), 1, "{name}: one request");
    let req = &requests[0];
    assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
    assert_eq!(req.header("authorization"), Some(format!("Bearer {KEY}").as_str()), "{name}: auth");
    assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content type");

    if let Some(body) = expected_req.get("body") {
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(&sent, body, "{name}: body");
    } else {
        assert!(req.body.is_none(), "{name}: body should be None");
    }

    if let Some(query) = expected_req.get("query") {
        let expected: Vec<(String, String)> = serde_json::from_value(query.clone()).unwrap();
        assert_eq!(req.query, expected, "{name}: query");
    }
}

// ---------------------------------------------------------------------------
// Initialize
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initialize_test_vectors() {
    let raw = include_str!("../../test-vectors/initialize.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: InitializeTransaction = serde_json::from_value(case["input"].clone()).unwrap();

        let c = client();
        let resp = c.transaction().initialize(&input, options(case)).await;
        check_case(name, case, &c, &resp);
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: ListTransactionsQuery = serde_json::from_value(case["input"].clone()).unwrap();

        let c = client();
        let resp = c.transaction().list(&input).await;
        check_case(name, case, &c, &resp);
    }
}
