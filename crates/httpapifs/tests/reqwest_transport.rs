//! Wire-level tests for the reqwest transport against a loopback listener.
//!
//! Each test serves one canned HTTP response and returns the raw request
//! text so the encoding of commands, headers and credentials can be checked.

use httpapifs::remote::RemoteApi;
use httpapifs::{HttpApiFsError, ReqwestTransport, TransportConfig};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const OK_STATUS: &str = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 18\r\nConnection: close\r\n\r\n{\"success\":\"true\"}";

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serves `response` to a single connection; the handle yields the request text.
fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        stream.write_all(response.as_bytes()).unwrap();
        request
    });
    (format!("http://{}/api.php", addr), handle)
}

fn api(url: String, username: Option<&str>, password: Option<&str>) -> RemoteApi<ReqwestTransport> {
    let config = TransportConfig {
        username: username.map(str::to_string),
        password: password.map(str::to_string),
        timeout: Some(Duration::from_secs(10)),
        ..TransportConfig::new(url)
    };
    RemoteApi::new(ReqwestTransport::new(config).unwrap())
}

#[test]
fn test_newdir_is_form_post_with_basic_auth() {
    let (url, server) = serve_once(OK_STATUS);
    api(url, Some("user"), Some("secret")).newdir("/a/b").unwrap();

    let request = server.join().unwrap().to_lowercase();
    assert!(request.starts_with("post /api.php http/1.1"));
    assert!(request.contains("authorization: basic dxnlcjpzzwnyzxq="));
    assert!(request.contains("cmd=newdir&dir=%2fa%2fb"));
}

#[test]
fn test_no_auth_without_password() {
    let (url, server) = serve_once(OK_STATUS);
    api(url, Some("user"), None).delete("/a").unwrap();

    let request = server.join().unwrap().to_lowercase();
    assert!(!request.contains("authorization:"));
    assert!(request.contains("cmd=delete&file=%2fa"));
}

#[test]
fn test_upload_uses_query_header_and_raw_body() {
    let (url, server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
    );
    api(url, None, None)
        .upload("/docs/a.txt", b"hello upload")
        .unwrap();

    let request = server.join().unwrap();
    let lower = request.to_lowercase();
    assert!(lower.starts_with("post /api.php?cmd=upload http/1.1"));
    assert!(lower.contains("x_file_name: /docs/a.txt"));
    assert!(request.ends_with("hello upload"));
}

#[test]
fn test_view_returns_body_bytes() {
    let (url, server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\nfile bytes!",
    );
    let data = api(url, None, None).view("/docs/a.txt").unwrap();
    assert_eq!(data, b"file bytes!");

    let request = server.join().unwrap().to_lowercase();
    assert!(request.starts_with("post /api.php?cmd=view&file=%2fdocs%2fa.txt http/1.1"));
}

#[test]
fn test_list_decodes_listing() {
    let (url, server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Length: 39\r\nConnection: close\r\n\r\n[{\"text\":\"a.txt\",\"leaf\":true,\"size\":3}]",
    );
    let entries = api(url, None, None).list("/docs").unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_leaf());
    assert_eq!(entries[0].size(), 3);

    let request = server.join().unwrap().to_lowercase();
    assert!(request.contains("cmd=get&path=%2fdocs"));
}

#[test]
fn test_http_error_status_is_remote_error() {
    let (url, server) = serve_once(
        "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    );
    let err = api(url, None, None).list("/docs").unwrap_err();
    assert!(matches!(err, HttpApiFsError::Remote { .. }));
    server.join().unwrap();
}

#[test]
fn test_connection_refused_is_remote_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = api(format!("http://{}/api.php", addr), None, None)
        .list("/")
        .unwrap_err();
    assert!(err.is_remote());
}
