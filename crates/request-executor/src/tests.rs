// Copyright 2022 Webb Technologies Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::*;

async fn spawn_server() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/json",
            get(|| async { Json(json!({ "zeta": 1, "alpha": [true, null] })) }),
        )
        .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "not here") }),
        )
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/flaky",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::SERVICE_UNAVAILABLE, "try later")
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        )
        .with_state(hits.clone());
    let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
        .serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(server);
    (addr, hits)
}

fn executor() -> HttpRequestExecutor {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    HttpRequestExecutor::new(client)
}

#[tokio::test]
async fn empty_body_is_a_get() {
    let (addr, _) = spawn_server().await;
    let outcome = executor()
        .execute(&format!("http://{addr}/json"), &Bytes::new())
        .await;
    assert_eq!(outcome.status_code, 200);
    assert_eq!(outcome.payload, r#"{"zeta":1,"alpha":[true,null]}"#);
}

#[tokio::test]
async fn json_body_is_posted() {
    let (addr, _) = spawn_server().await;
    let body = Bytes::from(br#"{"q": "fusion", "n": 2}"#.to_vec());
    let outcome = executor()
        .execute(&format!("http://{addr}/echo"), &body)
        .await;
    assert_eq!(outcome.status_code, 200);
    assert_eq!(outcome.payload, r#"{"q":"fusion","n":2}"#);
}

#[tokio::test]
async fn non_success_status_is_relayed_as_is() {
    let (addr, _) = spawn_server().await;
    let outcome = executor()
        .try_execute(&format!("http://{addr}/missing"), &Bytes::new())
        .await
        .unwrap();
    assert_eq!(outcome, HttpOutcome::new(404, r#""not here""#));
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn empty_response_is_an_empty_string() {
    let (addr, _) = spawn_server().await;
    let outcome = executor()
        .execute(&format!("http://{addr}/empty"), &Bytes::new())
        .await;
    assert_eq!(outcome, HttpOutcome::new(204, r#""""#));
}

#[tokio::test]
async fn failed_calls_are_not_retried() {
    let (addr, hits) = spawn_server().await;
    let outcome = executor()
        .execute(&format!("http://{addr}/flaky"), &Bytes::new())
        .await;
    assert_eq!(outcome.status_code, 503);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_host_is_a_500_error_outcome() {
    // grab a free port and close it again.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = format!("http://{addr}/json");
    let err = executor()
        .try_execute(&url, &Bytes::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::HttpTransport { status: None, .. }));

    let outcome = executor().execute(&url, &Bytes::new()).await;
    assert_eq!(outcome.status_code, 500);
    let payload: Value = serde_json::from_str(&outcome.payload).unwrap();
    assert!(payload["error"].as_str().is_some());
}

struct RejectingExecutor;

#[async_trait::async_trait]
impl RequestExecutor for RejectingExecutor {
    async fn try_execute(
        &self,
        _url: &str,
        _body: &Bytes,
    ) -> Result<HttpOutcome, RelayError> {
        Err(RelayError::HttpTransport {
            status: Some(502),
            message: "connection reset".into(),
        })
    }
}

#[tokio::test]
async fn execute_normalizes_the_tagged_failure() {
    let outcome = RejectingExecutor
        .execute("https://api.example.com/data", &Bytes::new())
        .await;
    assert_eq!(
        outcome,
        HttpOutcome {
            status_code: 502,
            payload: r#"{"error":"connection reset"}"#.to_string(),
        }
    );
}

#[tokio::test]
async fn malformed_url_is_a_500_error_outcome() {
    let outcome = executor().execute("not a url", &Bytes::new()).await;
    assert_eq!(outcome.status_code, 500);
    let payload: Value = serde_json::from_str(&outcome.payload).unwrap();
    assert!(payload.get("error").is_some());
}

#[tokio::test]
async fn timeouts_are_a_500_error_outcome() {
    let (addr, _) = spawn_server().await;
    let outcome = executor()
        .execute(&format!("http://{addr}/slow"), &Bytes::new())
        .await;
    assert_eq!(outcome.status_code, 500);
    assert!(outcome.payload.contains("timed out"), "{}", outcome.payload);
}

#[tokio::test]
async fn malformed_bodies_never_reach_the_network() {
    let (addr, _) = spawn_server().await;
    let url = format!("http://{addr}/echo");
    for body in [vec![0xff, 0xfe, 0x00], b"{oops".to_vec()] {
        let err = executor()
            .try_execute(&url, &Bytes::from(body.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "decode");
        let outcome = executor().execute(&url, &Bytes::from(body)).await;
        assert_eq!(outcome.status_code, 500);
        let payload: Value = serde_json::from_str(&outcome.payload).unwrap();
        assert!(payload["error"].as_str().unwrap().starts_with("body is not"));
    }
}

#[test]
fn payload_rules() {
    assert_eq!(response_payload(r#"{ "b": 1, "a": 2 }"#), r#"{"b":1,"a":2}"#);
    assert_eq!(response_payload("[1, 2]"), "[1,2]");
    assert_eq!(response_payload("plain \"text\""), r#""plain \"text\"""#);
    assert_eq!(response_payload(""), r#""""#);
}
