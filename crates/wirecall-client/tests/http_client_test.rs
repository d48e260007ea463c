//! HTTP client integration tests.
//!
//! These drive a real [`RpcConnection`] over loopback TCP against a small
//! thread-backed HTTP server, verifying:
//! - success and server-error replies end to end
//! - keep-alive reuse of one connection across calls
//! - reconnect-and-retry when the server drops the connection
//! - retry exhaustion against a dead port
//! - protocol and Basic-Auth headers on the wire
//! - garbage replies surfacing as validation errors, unretried

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::TimeZone;
use serde_json::json;
use wirecall_client::{ConnectionConfig, ConnectionState, RpcConnection};
use wirecall_common::auth::Credentials;
use wirecall_common::marshal::Params;
use wirecall_common::protocol::WirecallError;

const SUCCESS_REPLY: &str = r#"{"rbody":{"replyStatus":0,"result":{"ok":true}}}"#;

/// One request as seen by the test server.
#[derive(Debug, Clone)]
struct Received {
    headers: Vec<(String, String)>,
    body: String,
}

impl Received {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal HTTP server answering every request with a canned reply body.
///
/// Runs on a background thread for the life of the test process. When
/// `close_after_response` is set, the server closes the connection after each
/// response, forcing the client through its reconnect path.
struct TestRpcServer {
    port: u16,
    received: Arc<Mutex<Vec<Received>>>,
    connections: Arc<AtomicUsize>,
}

impl TestRpcServer {
    fn start(reply_body: &'static str, close_after_response: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let received_in = Arc::clone(&received);
        let connections_in = Arc::clone(&connections);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                connections_in.fetch_add(1, Ordering::SeqCst);
                let received = Arc::clone(&received_in);
                thread::spawn(move || {
                    serve_connection(stream, reply_body, close_after_response, &received);
                });
            }
        });

        TestRpcServer {
            port,
            received,
            connections,
        }
    }

    fn config(&self) -> ConnectionConfig {
        ConnectionConfig::new("127.0.0.1", self.port).with_timeout(Duration::from_secs(2))
    }

    fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

fn serve_connection(
    stream: TcpStream,
    reply_body: &str,
    close_after_response: bool,
    received: &Mutex<Vec<Received>>,
) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut stream = stream;

    loop {
        let Some(request) = read_http_request(&mut reader) else {
            return;
        };
        received.lock().unwrap().push(request);

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            reply_body.len(),
            reply_body
        );
        if stream.write_all(response.as_bytes()).is_err() {
            return;
        }
        if close_after_response {
            return;
        }
    }
}

fn read_http_request(reader: &mut BufReader<TcpStream>) -> Option<Received> {
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).ok()? == 0 {
        return None;
    }

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_string();
            let value = value.trim().to_string();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((name, value));
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    Some(Received {
        headers,
        body: String::from_utf8(body).ok()?,
    })
}

#[test]
fn test_success_round_trip_over_http() {
    let server = TestRpcServer::start(SUCCESS_REPLY, false);
    let mut conn = RpcConnection::new(server.config());

    let result = conn.request("svc", "m", Params::new()).unwrap();
    assert_eq!(result, json!({"ok": true}));
    assert_eq!(conn.state(), ConnectionState::Connected);

    let received = server.received();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0].body,
        r#"{"header":{"xid":1,"msgType":0},"cbody":{"service":"svc","method":"m","params":[]}}"#
    );
}

#[test]
fn test_keep_alive_reuses_one_connection() {
    let server = TestRpcServer::start(SUCCESS_REPLY, false);
    let mut conn = RpcConnection::new(server.config());

    for _ in 0..3 {
        conn.request("svc", "m", Params::new()).unwrap();
    }

    assert_eq!(server.connection_count(), 1, "calls share one transport");

    let xids: Vec<u64> = server
        .received()
        .iter()
        .map(|r| {
            let parsed: serde_json::Value = serde_json::from_str(&r.body).unwrap();
            parsed["header"]["xid"].as_u64().unwrap()
        })
        .collect();
    assert_eq!(xids, vec![1, 2, 3]);
}

#[test]
fn test_reconnects_when_server_drops_connection() {
    let server = TestRpcServer::start(SUCCESS_REPLY, true);
    let mut conn = RpcConnection::new(server.config());

    // Each call succeeds; the server hangs up after every response, so the
    // client's next attempt finds a dead handle and reconnects inside its
    // retry loop.
    conn.request("svc", "m", Params::new()).unwrap();
    conn.request("svc", "m", Params::new()).unwrap();
    conn.request("svc", "m", Params::new()).unwrap();

    assert!(server.connection_count() >= 3);
    assert_eq!(conn.state(), ConnectionState::Connected);
}

#[test]
fn test_server_error_code_surfaced() {
    let server = TestRpcServer::start(r#"{"rbody":{"replyStatus":2,"result":null}}"#, false);
    let mut conn = RpcConnection::new(server.config());

    let err = conn.request("svc", "missing", Params::new()).unwrap_err();
    match err {
        WirecallError::Server { code } => assert_eq!(code, 2),
        other => panic!("expected Server error, got {:?}", other),
    }
    assert_eq!(server.received().len(), 1, "server errors are not retried");
}

#[test]
fn test_invalid_json_reply() {
    let server = TestRpcServer::start("not json", false);
    let mut conn = RpcConnection::new(server.config());

    let err = conn.request("svc", "m", Params::new()).unwrap_err();
    assert!(matches!(err, WirecallError::InvalidResponse(_)));
    assert_eq!(server.received().len(), 1);
}

#[test]
fn test_reply_without_rbody() {
    let server = TestRpcServer::start(r#"{"foo":"bar"}"#, false);
    let mut conn = RpcConnection::new(server.config());

    let err = conn.request("svc", "m", Params::new()).unwrap_err();
    assert!(matches!(err, WirecallError::MissingBody));
}

#[test]
fn test_retry_exhaustion_against_dead_port() {
    // Bind and drop a listener so the port is known-dead.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ConnectionConfig::new("127.0.0.1", port)
        .with_timeout(Duration::from_millis(500))
        .with_retries(3);
    let mut conn = RpcConnection::new(config);

    let err = conn.request("svc", "m", Params::new()).unwrap_err();
    match err {
        WirecallError::Transport { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected Transport error, got {:?}", other),
    }
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[test]
fn test_protocol_and_auth_headers_on_the_wire() {
    let server = TestRpcServer::start(SUCCESS_REPLY, false);
    let config = server
        .config()
        .with_credentials(Credentials::new("user", "pass"));
    let mut conn = RpcConnection::new(config);

    conn.request("svc", "m", Params::new()).unwrap();

    let received = server.received();
    let request = &received[0];
    assert_eq!(request.header("Rpc_Codec_Id"), Some("2"));
    assert_eq!(request.header("Keep-Alive"), Some("300"));
    assert_eq!(request.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
    assert_eq!(request.header("Content-Type"), Some("application/json"));
}

#[test]
fn test_marshalled_params_reach_the_server() {
    let server = TestRpcServer::start(SUCCESS_REPLY, false);
    let mut conn = RpcConnection::new(server.config());

    let when = chrono::Utc
        .with_ymd_and_hms(2009, 2, 13, 23, 31, 30)
        .unwrap();
    let params = Params::new()
        .arg(&vec![1_i64, 2])
        .unwrap()
        .arg(&when)
        .unwrap();
    conn.request("svc", "m", params).unwrap();

    let received = server.received();
    assert!(
        received[0].body.contains(r#""params":[[1,2],1234567890]"#),
        "got: {}",
        received[0].body
    );
}
