//! HTTP Tests
//!
//! Request parsing and routing, then a live server on an ephemeral port.

#[path = "../common/mod.rs"]
mod common;

use std::fs;
use std::io::{BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use common::{container_path, options, StubCodec};
use imgfs::network::Server;
use imgfs::protocol::{
    get_query_var, read_request, write_response, Command, Request, Response, Route, Status,
};
use imgfs::{Config, Container, Engine, ImgfsError, Resolution};
use tempfile::TempDir;

// =============================================================================
// Request Parsing Tests
// =============================================================================

#[test]
fn test_read_get_request() {
    let raw = b"GET /imgfs/list HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let request = read_request(&mut BufReader::new(&raw[..])).unwrap();

    assert_eq!(request.method, "GET");
    assert_eq!(request.uri, "/imgfs/list");
    assert_eq!(request.header("host"), Some("localhost"));
    assert!(request.body.is_empty());
}

#[test]
fn test_read_post_with_body() {
    let raw = b"POST /imgfs/insert?name=a HTTP/1.1\r\nContent-Length: 5\r\n\r\nhelloEXTRA";
    let mut reader = BufReader::new(&raw[..]);
    let request = read_request(&mut reader).unwrap();

    assert_eq!(request.body, b"hello");
    assert_eq!(request.path(), "/imgfs/insert");
}

#[test]
fn test_read_two_pipelined_requests() {
    let raw = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\nConnection: close\r\n\r\n";
    let mut reader = BufReader::new(&raw[..]);

    let first = read_request(&mut reader).unwrap();
    let second = read_request(&mut reader).unwrap();

    assert_eq!(first.uri, "/a");
    assert!(!first.wants_close());
    assert_eq!(second.uri, "/b");
    assert!(second.wants_close());
}

#[test]
fn test_read_empty_stream_is_eof() {
    let result = read_request(&mut BufReader::new(&b""[..]));
    match result {
        Err(ImgfsError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected EOF, got {:?}", other),
    }
}

#[test]
fn test_read_malformed_request_line() {
    let result = read_request(&mut BufReader::new(&b"NONSENSE\r\n\r\n"[..]));
    assert!(matches!(result, Err(ImgfsError::Protocol(_))));
}

#[test]
fn test_read_oversized_headers() {
    let mut raw = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
    raw.extend(std::iter::repeat(b'a').take(imgfs::protocol::MAX_HEADER_SIZE));
    raw.extend_from_slice(b"\r\n\r\n");

    let result = read_request(&mut BufReader::new(&raw[..]));
    assert!(matches!(result, Err(ImgfsError::Protocol(_))));
}

#[test]
fn test_query_vars() {
    let uri = "/imgfs/read?res=small&img_id=my+pic%21";

    assert_eq!(get_query_var(uri, "res").unwrap().as_deref(), Some("small"));
    assert_eq!(get_query_var(uri, "img_id").unwrap().as_deref(), Some("my pic!"));
    assert_eq!(get_query_var(uri, "other").unwrap(), None);
    assert!(get_query_var("/imgfs/read", "res").is_err());
    assert!(get_query_var("/imgfs/read?res=", "res").is_err());
}

#[test]
fn test_response_encoding() {
    let mut out = Vec::new();
    write_response(&mut out, &Response::error("boom")).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(text.ends_with("\r\n\r\nError: boom\n"));
    assert!(text.contains("Content-Length: 12\r\n"));
}

// =============================================================================
// Routing Tests
// =============================================================================

fn request(method: &str, uri: &str, body: &[u8]) -> Request {
    Request {
        method: method.to_string(),
        uri: uri.to_string(),
        headers: Vec::new(),
        body: body.to_vec(),
    }
}

#[test]
fn test_route_commands() {
    assert_eq!(
        Route::from_request(request("GET", "/imgfs/list", b"")).unwrap(),
        Route::Command(Command::List)
    );
    assert_eq!(
        Route::from_request(request("GET", "/imgfs/read?res=thumb&img_id=x", b"")).unwrap(),
        Route::Command(Command::Read {
            img_id: "x".to_string(),
            resolution: Resolution::Thumbnail
        })
    );
    assert_eq!(
        Route::from_request(request("GET", "/imgfs/delete?img_id=x", b"")).unwrap(),
        Route::Command(Command::Delete {
            img_id: "x".to_string()
        })
    );
    assert_eq!(
        Route::from_request(request("POST", "/imgfs/insert?name=y", b"data")).unwrap(),
        Route::Command(Command::Insert {
            img_id: "y".to_string(),
            data: b"data".to_vec()
        })
    );
    assert_eq!(
        Route::from_request(request("GET", "/", b"")).unwrap(),
        Route::Index
    );
    assert_eq!(
        Route::from_request(request("GET", "/index.html", b"")).unwrap(),
        Route::Index
    );
}

#[test]
fn test_route_errors() {
    assert!(matches!(
        Route::from_request(request("GET", "/imgfs/insert?name=y", b"data")),
        Err(ImgfsError::InvalidCommand(_))
    ));
    assert!(matches!(
        Route::from_request(request("POST", "/imgfs/insert?name=y", b"")),
        Err(ImgfsError::InvalidArgument(_))
    ));
    assert!(matches!(
        Route::from_request(request("GET", "/imgfs/read?res=huge&img_id=x", b"")),
        Err(ImgfsError::InvalidResolution(_))
    ));
    assert!(matches!(
        Route::from_request(request("GET", "/imgfs/read?res=small", b"")),
        Err(ImgfsError::InvalidArgument(_))
    ));
    assert!(matches!(
        Route::from_request(request("GET", "/elsewhere", b"")),
        Err(ImgfsError::InvalidCommand(_))
    ));
}

// =============================================================================
// Live Server Tests
// =============================================================================

struct TestServer {
    _temp: TempDir,
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        let temp = TempDir::new().unwrap();
        let index = temp.path().join("index.html");
        fs::write(&index, "<html>imgfs</html>").unwrap();

        let container = Container::create_with_codec(
            container_path(&temp),
            options(4),
            Box::new(StubCodec::new()),
        )
        .unwrap();
        let engine = Arc::new(Engine::new(container));

        let config = Config::builder()
            .container_path(container_path(&temp))
            .index_file(&index)
            .port(0)
            .build();
        let mut server = Server::new(config, engine);
        let addr = server.bind().unwrap();
        let shutdown = server.shutdown_handle();
        let handle = thread::spawn(move || {
            server.run().unwrap();
        });

        Self {
            _temp: temp,
            addr,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Send one request and read the full reply
    fn send(&self, method: &str, uri: &str, body: &[u8]) -> (String, Vec<(String, String)>, Vec<u8>) {
        let mut stream = TcpStream::connect(self.addr).unwrap();
        let head = format!(
            "{} {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n",
            method,
            uri,
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(body).unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).unwrap();
        parse_reply(&raw)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn parse_reply(raw: &[u8]) -> (String, Vec<(String, String)>, Vec<u8>) {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("reply has no header terminator");
    let head = String::from_utf8(raw[..split].to_vec()).unwrap();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status = lines.next().unwrap().to_string();
    let headers = lines
        .filter_map(|l| l.split_once(": "))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (status, headers, body)
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[test]
fn test_server_insert_list_read_delete() {
    let server = TestServer::start();
    let port = server.addr.port();

    // Insert redirects to the index page
    let (status, headers, _) = server.send("POST", "/imgfs/insert?name=cat", b"meow bytes");
    assert_eq!(status, format!("HTTP/1.1 {}", Status::Found.line()));
    assert_eq!(
        header(&headers, "Location"),
        Some(format!("http://localhost:{}/index.html", port).as_str())
    );

    // Listing
    let (status, headers, body) = server.send("GET", "/imgfs/list", b"");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(header(&headers, "Content-Type"), Some("application/json"));
    assert_eq!(body, br#"{"Images":["cat"]}"#);

    // Original read
    let (status, headers, body) = server.send("GET", "/imgfs/read?res=orig&img_id=cat", b"");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(header(&headers, "Content-Type"), Some("image/jpeg"));
    assert_eq!(body, b"meow bytes");

    // Lazy small read
    let (_, _, body) = server.send("GET", "/imgfs/read?res=small&img_id=cat", b"");
    assert_eq!(body, common::stub_resized(b"meow bytes", 256, 256));

    // Delete
    let (status, _, _) = server.send("GET", "/imgfs/delete?img_id=cat", b"");
    assert_eq!(status, "HTTP/1.1 302 Found");
    let (_, _, body) = server.send("GET", "/imgfs/list", b"");
    assert_eq!(body, br#"{"Images":[]}"#);
}

#[test]
fn test_server_errors_are_500() {
    let server = TestServer::start();

    let (status, _, body) = server.send("GET", "/imgfs/read?res=orig&img_id=nobody", b"");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("Error: "));
    assert!(text.ends_with('\n'));

    let (status, _, _) = server.send("GET", "/no/such/route", b"");
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
}

#[test]
fn test_server_duplicate_insert_is_500() {
    let server = TestServer::start();
    server.send("POST", "/imgfs/insert?name=dup", b"one");

    let (status, _, _) = server.send("POST", "/imgfs/insert?name=dup", b"two");

    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
}

#[test]
fn test_server_serves_index() {
    let server = TestServer::start();

    let (status, headers, body) = server.send("GET", "/", b"");

    assert_eq!(status, "HTTP/1.1 200 OK");
    assert!(header(&headers, "Content-Type").unwrap().starts_with("text/html"));
    assert_eq!(body, b"<html>imgfs</html>");
}

#[test]
fn test_server_keep_alive() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();

    stream
        .write_all(b"GET /imgfs/list HTTP/1.1\r\n\r\nGET /imgfs/list HTTP/1.1\r\nConnection: close\r\n\r\n")
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();

    let text = String::from_utf8(raw).unwrap();
    assert_eq!(text.matches("HTTP/1.1 200 OK").count(), 2);
}

#[test]
fn test_response_parsing_helper() {
    let raw = Response::ok("text/plain", b"hi".to_vec()).encode();
    let (status, headers, body) = parse_reply(&raw);
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(header(&headers, "Content-Length"), Some("2"));
    assert_eq!(body, b"hi");
}
