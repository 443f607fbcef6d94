//! Integration tests for the translate service.
//!
//! Most tests drive the request handler directly; the rest go through a
//! real socket.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use strips_runner::{serve, ApiKeys, TranslateService};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

fn open_service() -> TranslateService {
    TranslateService::new(ApiKeys::default())
}

fn body_json(body: &str) -> Value {
    serde_json::from_str(body).expect("body should be JSON")
}

// ============================================================================
// Handler Tests
// ============================================================================

#[test]
fn test_uplink_translate() {
    let response = open_service().handle("/translate?p=1&d=0155");
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "application/json");

    let json = body_json(&response.body);
    assert_eq!(json["BatteryReport"], 85);
    assert_eq!(json["historyItemCount"], 0);
    assert!(json["timestamp"].is_string());
}

#[test]
fn test_downlink_translate() {
    let response = open_service().handle("/downlink?p=11&d=010200000003");
    assert_eq!(response.status, 200);

    let json = body_json(&response.body);
    assert_eq!(json["decoded"]["cmd"], "Set setting");
    assert_eq!(json["decoded"]["BASE_POLL_INTERVAL"]["value"], "3");
    assert_eq!(json["decoded"]["BASE_POLL_INTERVAL"]["unit"], "ms");
    assert_eq!(json["encoded"]["data"], "010200000003");
    assert_eq!(json["encoded"]["port"], 11);
}

#[test]
fn test_unknown_function() {
    let response = open_service().handle("/decode?p=1&d=0155");
    assert_eq!(response.status, 400);
    assert_eq!(response.body, "Unknown function /decode");
}

#[test]
fn test_parameter_errors() {
    let service = open_service();

    for target in ["/translate?d=0155", "/translate?p=x&d=0155", "/translate?p=0&d=0155"] {
        let response = service.handle(target);
        assert_eq!(response.status, 400, "{}", target);
        assert_eq!(response.body, "Missing parameter 'p' (port, integer)");
    }

    let response = service.handle("/translate?p=1");
    assert_eq!(
        response.body,
        "Missing parameter 'd' (data), should be string of hexadecimal digits"
    );

    for target in ["/translate?p=1&d=015", "/translate?p=1&d=01zz"] {
        let response = service.handle(target);
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            "Bad parameter 'd' (data), hexadecimal digits could not be converted"
        );
    }
}

#[test]
fn test_transcoder_errors_are_bad_requests() {
    let service = open_service();

    let response = service.handle("/translate?p=3&d=0155");
    assert_eq!(response.status, 400);
    assert_eq!(response.body, "No function for decoding uplinks on port 3");

    let response = service.handle("/downlink?p=11&d=02ff");
    assert_eq!(response.status, 400);
    assert_eq!(response.body, "Unknown setting: 255");
}

#[test]
fn test_api_keys() {
    let service = TranslateService::new(ApiKeys::from_keys(["secret"]));

    let response = service.handle("/translate?p=1&d=0155");
    assert_eq!(response.status, 400);
    assert_eq!(response.body, "API key does not match a registerred key");

    let response = service.handle("/translate?p=1&d=0155&k=wrong");
    assert_eq!(response.status, 400);

    let response = service.handle("/translate?p=1&d=0155&k=secret");
    assert_eq!(response.status, 200);
}

#[test]
fn test_api_keys_checked_after_parameters() {
    let service = TranslateService::new(ApiKeys::from_keys(["secret"]));
    let response = service.handle("/translate?p=1&d=zz");
    assert_eq!(
        response.body,
        "Bad parameter 'd' (data), hexadecimal digits could not be converted"
    );
}

#[test]
fn test_api_keys_loaded_from_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("k1"), b"").unwrap();
    let service = TranslateService::new(ApiKeys::load(dir.path()).unwrap());

    assert_eq!(service.handle("/translate?p=1&d=0155").status, 400);
    assert_eq!(service.handle("/translate?p=1&d=0155&k=k1").status, 200);
}

// ============================================================================
// Socket Tests
// ============================================================================

#[tokio::test]
async fn test_serve_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener, Arc::new(open_service())));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let response = client
        .get(format!("http://{}/translate?p=1&d=0155", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["BatteryReport"], 85);

    let response = client
        .get(format!("http://{}/downlink?p=10&d=0801", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body = response.text().await.unwrap();
    assert!(body.starts_with("Unjoin command: Bad package size"), "{}", body);

    server.abort();
}

/// Read until the server closes, failing if that takes longer than `limit`.
async fn read_until_closed(stream: &mut TcpStream, limit: Duration) -> String {
    let mut reply = Vec::new();
    timeout(limit, stream.read_to_end(&mut reply))
        .await
        .expect("server should close the connection")
        .unwrap();
    String::from_utf8(reply).unwrap()
}

#[tokio::test]
async fn test_idle_client_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = open_service().with_read_timeout(Duration::from_millis(200));
    let server = tokio::spawn(serve(listener, Arc::new(service)));

    // Connect and send nothing.
    let mut idle = TcpStream::connect(addr).await.unwrap();
    let reply = read_until_closed(&mut idle, Duration::from_secs(5)).await;
    assert!(reply.starts_with("HTTP/1.1 408 Request Timeout\r\n"), "{}", reply);

    // A head that never finishes is cut off the same way.
    let mut stalled = TcpStream::connect(addr).await.unwrap();
    stalled.write_all(b"GET /translate?p=1&d=0155 HTTP/1.1\r\n").await.unwrap();
    let reply = read_until_closed(&mut stalled, Duration::from_secs(5)).await;
    assert!(reply.starts_with("HTTP/1.1 408 Request Timeout\r\n"), "{}", reply);

    // The server still answers prompt clients.
    let mut prompt = TcpStream::connect(addr).await.unwrap();
    prompt
        .write_all(b"GET /translate?p=1&d=0155 HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    let reply = read_until_closed(&mut prompt, Duration::from_secs(5)).await;
    assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"), "{}", reply);

    server.abort();
}
