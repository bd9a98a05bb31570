//! End-to-end tests for the stdio loop against a mock HTTP service.
//!
//! Each test feeds NDJSON through an in-memory reader, lets the bridge run to
//! EOF, and checks the exact lines written plus the requests the mock saw.

use std::time::Duration;

use mcp_bridge::config::BridgeConfig;
use mcp_bridge::dispatch::Dispatcher;
use mcp_bridge::stdio::{LoopExit, StdioBridge};
use mcp_bridge::transport::UpstreamClient;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn dispatcher_for(base_url: &str) -> Dispatcher {
    let config = BridgeConfig::new(base_url).expect("valid base url");
    Dispatcher::new(UpstreamClient::new(config).expect("client builds"))
}

/// Run the bridge over `input` until EOF and return the raw stdout text.
async fn run_bridge(dispatcher: Dispatcher, input: &str) -> (LoopExit, String) {
    let mut bridge = StdioBridge::new(dispatcher, input.as_bytes(), Vec::new());
    let exit = bridge
        .run_until(std::future::pending())
        .await
        .expect("loop should not fail");
    let out = String::from_utf8(bridge.into_writer()).expect("stdout is UTF-8");
    (exit, out)
}

fn parse_lines(out: &str) -> Vec<Value> {
    out.lines()
        .map(|l| serde_json::from_str(l).expect("each output line is JSON"))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ping_round_trip_is_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp/ping"))
        .and(body_json(json!({"jsonrpc":"2.0","id":1,"method":"ping","params":{}})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"jsonrpc":"2.0","id":1,"result":"pong"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&format!("{}/mcp", server.uri()));
    let (exit, out) = run_bridge(
        dispatcher,
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\",\"params\":{}}\n",
    )
    .await;

    assert_eq!(exit, LoopExit::EndOfInput);
    assert_eq!(out, "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":\"pong\"}\n");
}

#[tokio::test]
async fn test_unknown_method_exact_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (_, out) = run_bridge(
        dispatcher_for(&server.uri()),
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"frobnicate\"}\n",
    )
    .await;

    assert_eq!(
        out,
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"error\":{\"code\":-32601,\"message\":\"Method not found: frobnicate\"}}\n"
    );
}

#[tokio::test]
async fn test_not_json_gives_parse_error() {
    let (_, out) = run_bridge(dispatcher_for("http://127.0.0.1:1"), "not json\n").await;
    let lines = parse_lines(&out);

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["jsonrpc"], "2.0");
    assert_eq!(lines[0]["id"], Value::Null);
    assert_eq!(lines[0]["error"]["code"], -32700);
    assert!(
        lines[0]["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Parse error: ")
    );
}

#[tokio::test]
async fn test_each_route_hits_its_endpoint_once() {
    let server = MockServer::start().await;
    for endpoint in ["/initialize", "/tools/list", "/tools/call", "/ping"] {
        Mock::given(method("POST"))
            .and(path(format!("/mcp{endpoint}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jsonrpc": "2.0", "id": endpoint, "result": {}})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"x","arguments":{}}}"#,
        r#"{"jsonrpc":"2.0","id":4,"method":"ping"}"#,
    ]
    .join("\n");

    let (_, out) = run_bridge(dispatcher_for(&format!("{}/mcp/", server.uri())), &input).await;
    let ids: Vec<Value> = parse_lines(&out).into_iter().map(|v| v["id"].clone()).collect();

    assert_eq!(
        ids,
        vec![
            json!("/initialize"),
            json!("/tools/list"),
            json!("/tools/call"),
            json!("/ping")
        ]
    );
    // MockServer verifies the `.expect(1)` counts on drop.
}

#[tokio::test]
async fn test_mixed_input_one_response_per_request_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tools/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"jsonrpc": "2.0", "id": "b", "result": {"tools": []}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let input = concat!(
        "\n",
        "{\"jsonrpc\":\"2.0\",\"id\":\"a\",\"method\":\"unknown/thing\"}\n",
        "   \n",
        "{broken\n",
        "{\"jsonrpc\":\"2.0\",\"id\":\"b\",\"method\":\"tools/list\"}\n",
        "\n",
    );

    let (_, out) = run_bridge(dispatcher_for(&server.uri()), input).await;
    let lines = parse_lines(&out);

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], "a");
    assert_eq!(lines[0]["error"]["code"], -32601);
    assert_eq!(lines[1]["id"], Value::Null);
    assert_eq!(lines[1]["error"]["code"], -32700);
    assert_eq!(lines[2]["id"], "b");
    assert_eq!(lines[2]["result"], json!({"tools": []}));
}

#[tokio::test]
async fn test_upstream_down_maps_to_internal_error() {
    let (_, out) = run_bridge(
        dispatcher_for("http://127.0.0.1:1/mcp"),
        "{\"jsonrpc\":\"2.0\",\"id\":\"req-7\",\"method\":\"tools/list\"}\n\
         {\"jsonrpc\":\"2.0\",\"id\":8,\"method\":\"ping\"}\n",
    )
    .await;
    let lines = parse_lines(&out);

    // The loop keeps going after a transport failure.
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], "req-7");
    assert_eq!(lines[0]["error"]["code"], -32603);
    assert_eq!(lines[1]["id"], 8);
    assert_eq!(lines[1]["error"]["code"], -32603);
}

#[tokio::test]
async fn test_upstream_server_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let (_, out) = run_bridge(
        dispatcher_for(&server.uri()),
        "{\"jsonrpc\":\"2.0\",\"id\":5,\"method\":\"initialize\"}\n",
    )
    .await;
    let lines = parse_lines(&out);

    assert_eq!(lines[0]["id"], 5);
    assert_eq!(lines[0]["error"]["code"], -32603);
    let message = lines[0]["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Internal error: "), "got: {message}");
    assert!(message.contains("502"), "got: {message}");
}

#[tokio::test]
async fn test_ping_timeout_maps_to_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": {}}))
                .set_delay(Duration::from_secs(12)),
        )
        .mount(&server)
        .await;

    // ping's budget is 10s; the mock answers after 12s.
    let started = std::time::Instant::now();
    let (_, out) = run_bridge(
        dispatcher_for(&server.uri()),
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
    )
    .await;
    let elapsed = started.elapsed();

    let lines = parse_lines(&out);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[0]["error"]["code"], -32603);
    assert!(
        lines[0]["error"]["message"]
            .as_str()
            .unwrap()
            .contains("timed out")
    );
    assert!(elapsed >= Duration::from_secs(9), "returned too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(12), "waited past the mock delay: {elapsed:?}");
}

#[tokio::test]
async fn test_pretty_printed_upstream_body_becomes_one_line() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "{\n  \"jsonrpc\": \"2.0\",\n  \"id\": 9,\n  \"result\": {\"z\": 1, \"a\": 2}\n}\n",
            "application/json",
        ))
        .mount(&server)
        .await;

    let (_, out) = run_bridge(
        dispatcher_for(&server.uri()),
        "{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"tools/list\"}\n",
    )
    .await;

    // Key order is preserved; whitespace is not.
    assert_eq!(
        out,
        "{\"jsonrpc\":\"2.0\",\"id\":9,\"result\":{\"z\":1,\"a\":2}}\n"
    );
}

#[tokio::test]
async fn test_non_json_upstream_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let (_, out) = run_bridge(
        dispatcher_for(&server.uri()),
        "{\"jsonrpc\":\"2.0\",\"id\":\"q\",\"method\":\"ping\"}\n",
    )
    .await;
    let lines = parse_lines(&out);

    assert_eq!(lines[0]["id"], "q");
    assert_eq!(lines[0]["error"]["code"], -32603);
}

#[tokio::test]
async fn test_final_line_without_newline_is_answered() {
    let (exit, out) = run_bridge(
        dispatcher_for("http://127.0.0.1:1"),
        "{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"nope\"}",
    )
    .await;

    assert_eq!(exit, LoopExit::EndOfInput);
    let lines = parse_lines(&out);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["id"], Value::Null);
    assert_eq!(lines[0]["error"]["message"], "Method not found: nope");
}

#[tokio::test]
async fn test_big_integer_id_echoed_exactly_on_unknown_method() {
    let (_, out) = run_bridge(
        dispatcher_for("http://127.0.0.1:1"),
        "{\"jsonrpc\":\"2.0\",\"id\":123456789012345678901234567890,\"method\":\"nope\"}\n",
    )
    .await;

    assert_eq!(
        out,
        "{\"jsonrpc\":\"2.0\",\"id\":123456789012345678901234567890,\"error\":{\"code\":-32601,\"message\":\"Method not found: nope\"}}\n"
    );
}

#[tokio::test]
async fn test_big_numbers_forwarded_and_returned_verbatim() {
    let request_line = "{\"jsonrpc\":\"2.0\",\"id\":123456789012345678901234567890,\"method\":\"tools/call\",\"params\":{\"name\":\"calc\",\"arguments\":{\"x\":1.10}}}";
    let reply = "{\"jsonrpc\":\"2.0\",\"id\":123456789012345678901234567890,\"result\":{\"value\":98765432109876543210.000}}";

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tools/call"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(reply, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let (_, out) = run_bridge(dispatcher_for(&server.uri()), &format!("{request_line}\n")).await;
    assert_eq!(out, format!("{reply}\n"));

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1);
    assert_eq!(
        std::str::from_utf8(&received[0].body).expect("body is UTF-8"),
        request_line
    );
}

#[tokio::test]
async fn test_non_string_method_named_in_error() {
    let (_, out) = run_bridge(
        dispatcher_for("http://127.0.0.1:1"),
        "{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":42}\n",
    )
    .await;

    assert_eq!(
        out,
        "{\"jsonrpc\":\"2.0\",\"id\":7,\"error\":{\"code\":-32601,\"message\":\"Method not found: 42\"}}\n"
    );
}
