//! End-to-end tests of the reqwest transport against a throwaway local server.

#![cfg(feature = "reqwest")]

use std::io::Write;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use courier::{ClientConfig, Error, Executor, ReqwestTransport, Request};
use flate2::Compression;
use flate2::write::GzEncoder;
use futures_util::StreamExt;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// How the test server answers its single connection.
enum Reply {
    /// Write these bytes, then close.
    Raw(Vec<u8>),
    /// Read the request and then say nothing.
    Silent,
}

fn response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {status}\r\n").into_bytes();
    for (name, value) in headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(format!("content-length: {}\r\nconnection: close\r\n\r\n", body.len()).as_bytes());
    out.extend_from_slice(body);
    out
}

/// Accept one connection, answer it with `reply`, and hand back the raw
/// request that was received.
async fn serve_once(reply: Reply) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        match reply {
            Reply::Raw(bytes) => {
                let _ = socket.write_all(&bytes).await;
                let _ = socket.shutdown().await;
            }
            Reply::Silent => {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
        }
        request
    });

    (addr, handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return String::from_utf8_lossy(&buf).into_owned();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn executor() -> Executor<ReqwestTransport> {
    Executor::from_config(ClientConfig::default().use_env_proxy(false)).unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn query_path_and_headers_reach_the_wire() {
    let (addr, server) = serve_once(Reply::Raw(response("200 OK", &[], b"ok"))).await;

    let request = Request::get(&format!("http://{addr}/api"))
        .unwrap()
        .path("v1/items")
        .query("page", 2)
        .query("tag", "a")
        .query("tag", "b")
        .header("X-Trace", "abc");
    let buffer = executor().send(request).await.unwrap().into_buffered().unwrap();
    assert_eq!(buffer.text(), "ok");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /api/v1/items?page=2&tag=a&tag=b HTTP/1.1\r\n"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("x-trace: abc\r\n"), "{raw}");
}

#[tokio::test]
async fn json_body_is_written() {
    let (addr, server) = serve_once(Reply::Raw(response(
        "201 Created",
        &[("Content-Type", "application/json")],
        br#"{"id":7}"#,
    )))
    .await;

    let request = Request::post(&format!("http://{addr}/items"))
        .unwrap()
        .body(json!({ "name": "widget" }));
    let buffer = executor().send(request).await.unwrap().into_buffered().unwrap();

    assert_eq!(buffer.status, 201);
    assert_eq!(buffer.status_text, "Created");
    assert_eq!(buffer.json::<serde_json::Value>().unwrap(), json!({ "id": 7 }));

    let raw = server.await.unwrap();
    let lower = raw.to_ascii_lowercase();
    assert!(raw.starts_with("POST /items HTTP/1.1\r\n"));
    assert!(lower.contains("content-type: application/json\r\n"), "{raw}");
    assert!(lower.contains("content-length: 17\r\n"), "{raw}");
    assert!(raw.ends_with(r#"{"name":"widget"}"#), "{raw}");
}

#[tokio::test]
async fn gzip_response_is_decompressed() {
    let plain = b"over the wire and back ".repeat(40);
    let (addr, server) = serve_once(Reply::Raw(response(
        "200 OK",
        &[("Content-Encoding", "gzip")],
        &gzip(&plain),
    )))
    .await;

    let request = Request::get(&format!("http://{addr}/")).unwrap().compress();
    let buffer = executor().send(request).await.unwrap().into_buffered().unwrap();
    assert_eq!(buffer.body, plain);

    let raw = server.await.unwrap().to_ascii_lowercase();
    assert!(raw.contains("accept-encoding: gzip, deflate\r\n"), "{raw}");
}

#[tokio::test]
async fn streamed_response_is_drained_by_caller() {
    let plain = b"0123456789".repeat(1000);
    let (addr, _server) = serve_once(Reply::Raw(response(
        "200 OK",
        &[("Content-Encoding", "gzip")],
        &gzip(&plain),
    )))
    .await;

    let request = Request::get(&format!("http://{addr}/"))
        .unwrap()
        .stream()
        .compress()
        .max_buffer(Some(10));
    let mut stream = executor().send(request).await.unwrap().into_stream().unwrap();

    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(out, plain);
}

#[tokio::test]
async fn status_text_falls_back_to_unknown() {
    let (addr, _server) = serve_once(Reply::Raw(response("599 Whatever", &[], b""))).await;

    let buffer = executor()
        .send(Request::get(&format!("http://{addr}/")).unwrap())
        .await
        .unwrap()
        .into_buffered()
        .unwrap();
    assert_eq!(buffer.status, 599);
    assert_eq!(buffer.status_text, "Unknown");
    assert!(buffer.body.is_empty());
}

#[tokio::test]
async fn peer_abort_is_reported() {
    let mut reply = b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n".to_vec();
    reply.extend_from_slice(&[b'x'; 10]);
    let (addr, _server) = serve_once(Reply::Raw(reply)).await;

    let err = executor()
        .send(Request::get(&format!("http://{addr}/")).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AbortedByPeer), "{err:?}");
}

#[tokio::test]
async fn timeout_against_silent_server() {
    let (addr, _server) = serve_once(Reply::Silent).await;

    let started = Instant::now();
    let err = executor()
        .send(
            Request::get(&format!("http://{addr}/"))
                .unwrap()
                .timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TimeoutExceeded(d) if d == Duration::from_millis(50)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (addr, _server) = serve_once(Reply::Raw(response("200 OK", &[], &[b'z'; 1000]))).await;

    let err = executor()
        .send(
            Request::get(&format!("http://{addr}/"))
                .unwrap()
                .max_buffer(Some(100)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BufferLimitExceeded { limit: 100, .. }));
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let err = executor()
        .send(Request::get(&format!("http://{addr}/")).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn method_override_reaches_the_wire() {
    let (addr, server) = serve_once(Reply::Raw(response("200 OK", &[], b""))).await;

    let request = Request::get(&format!("http://{addr}/thing"))
        .unwrap()
        .option("method", "delete")
        .option("user_agent", "courier-test/1");
    let outcome = executor().send(request).await.unwrap();
    assert_eq!(outcome.status(), 200);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("DELETE /thing HTTP/1.1\r\n"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("user-agent: courier-test/1\r\n"), "{raw}");
}
