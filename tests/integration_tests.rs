//! End-to-end scenarios against a live listener (S1-S6).

use std::sync::Arc;

use icapd::handler::EchoHandler;
use icapd::log::root_logger;
use icapd::server::{IcapListener, ServiceTable};
use icapd::stats::IcapStats;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn start_server() -> std::net::SocketAddr {
    let logger = root_logger();
    let mut services: ServiceTable = ServiceTable::new();
    services.insert("svc".to_string(), Arc::new(EchoHandler::new(logger.clone())));
    let listener = IcapListener::bind("127.0.0.1", 0, services, Arc::new(IcapStats::new()), logger)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(tokio::sync::Notify::new());
    tokio::spawn(listener.serve(shutdown));
    addr
}

async fn send_and_read(addr: std::net::SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    stream.shutdown().await.ok();
    let mut out = Vec::new();
    let _ = stream.read_to_end(&mut out).await;
    out
}

#[tokio::test]
async fn s1_options_returns_200_with_capabilities() {
    let addr = start_server().await;
    let req = b"OPTIONS icap://h/svc ICAP/1.0\r\nHost: h\r\nEncapsulated: null-body=0\r\n\r\n";
    let resp = send_and_read(addr, req).await;
    let text = String::from_utf8_lossy(&resp);
    assert!(text.starts_with("ICAP/1.0 200 OK\r\n"));
    assert!(text.contains("methods: REQMOD"));
    assert!(text.contains("istag:"));
}

#[tokio::test]
async fn s2_reqmod_with_allow_204_shortcuts() {
    let addr = start_server().await;
    let http_req = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
    let req = [
        format!(
            "REQMOD icap://h/svc ICAP/1.0\r\nHost: h\r\nAllow: 204\r\nEncapsulated: req-hdr=0, req-body={}\r\n\r\n",
            http_req.len()
        )
        .into_bytes(),
        http_req.to_vec(),
        b"0\r\n\r\n".to_vec(),
    ]
    .concat();
    let resp = send_and_read(addr, &req).await;
    let text = String::from_utf8_lossy(&resp);
    assert!(text.starts_with("ICAP/1.0 204 No Content\r\n"));
}

#[tokio::test]
async fn s3_reqmod_without_allow_204_echoes_full_body() {
    let addr = start_server().await;
    let http_req = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
    let req = [
        format!(
            "REQMOD icap://h/svc ICAP/1.0\r\nHost: h\r\nEncapsulated: req-hdr=0, req-body={}\r\n\r\n",
            http_req.len()
        )
        .into_bytes(),
        http_req.to_vec(),
        b"4\r\nbody\r\n0\r\n\r\n".to_vec(),
    ]
    .concat();
    let resp = send_and_read(addr, &req).await;
    let text = String::from_utf8_lossy(&resp);
    assert!(text.starts_with("ICAP/1.0 200 OK\r\n"));
    assert!(text.contains(&format!("encapsulated: req-hdr=0, req-body={}", http_req.len())));
    assert!(text.ends_with("4\r\nbody\r\n0\r\n\r\n"));
}

#[tokio::test]
async fn s4_malformed_method_closes_connection_without_response() {
    let addr = start_server().await;
    let req = b"HELLO icap://h/svc ICAP/1.0\r\n\r\n";
    let resp = send_and_read(addr, req).await;
    assert!(resp.is_empty());
}

#[tokio::test]
async fn s5_keep_alive_then_connection_close() {
    let addr = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let opts = b"OPTIONS icap://h/svc ICAP/1.0\r\nHost: h\r\nEncapsulated: null-body=0\r\n\r\n";
    stream.write_all(opts).await.unwrap();
    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await.unwrap();
    assert!(String::from_utf8_lossy(&buf[..n]).starts_with("ICAP/1.0 200 OK\r\n"));

    let closing = b"OPTIONS icap://h/svc ICAP/1.0\r\nHost: h\r\nConnection: close\r\nEncapsulated: null-body=0\r\n\r\n";
    stream.write_all(closing).await.unwrap();
    let n = stream.read(&mut buf).await.unwrap();
    assert!(String::from_utf8_lossy(&buf[..n]).starts_with("ICAP/1.0 200 OK\r\n"));

    let n = stream.read(&mut buf).await.unwrap();
    assert_eq!(n, 0, "server should have closed the connection");
}

#[tokio::test]
async fn s6_non_increasing_offsets_closes_without_response() {
    let addr = start_server().await;
    let req = b"REQMOD icap://h/svc ICAP/1.0\r\nHost: h\r\nEncapsulated: req-hdr=0, req-body=0\r\n\r\n";
    let resp = send_and_read(addr, req).await;
    assert!(resp.is_empty());
}

#[tokio::test]
async fn unknown_service_returns_404() {
    let addr = start_server().await;
    let req = b"OPTIONS icap://h/missing ICAP/1.0\r\nHost: h\r\nEncapsulated: null-body=0\r\n\r\n";
    let resp = send_and_read(addr, req).await;
    assert!(String::from_utf8_lossy(&resp).starts_with("ICAP/1.0 404 Not Found\r\n"));
}
