//! Blocking HTTP transport.
//!
//! Carries call envelopes as `POST` bodies over a keep-alive HTTP/1.1
//! connection. The TCP stream is established lazily, reused across calls,
//! and discarded by the connection whenever an attempt fails.
//!
//! # Timeouts
//!
//! Connect, read and write timeouts are installed on the socket when the
//! stream is established, so every transport attempt is individually
//! bounded. A caller needing a hard deadline across retries must impose it
//! externally.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::transport::{Transport, WireRequest};

/// Default timeout for connect, send and receive (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Replies larger than this are rejected before allocation (100 MB).
const MAX_REPLY_SIZE: usize = 100 * 1024 * 1024;

/// HTTP transport over a blocking TCP stream.
///
/// # Example
///
/// ```no_run
/// use wirecall_client::http::{HttpTransport, DEFAULT_TIMEOUT};
/// use wirecall_client::transport::{Transport, WireRequest};
///
/// let mut transport = HttpTransport::new("127.0.0.1", 8080, DEFAULT_TIMEOUT);
/// transport.connect().unwrap();
/// let reply = transport
///     .roundtrip(&WireRequest { path: "/rpc", headers: &[], body: "{}" })
///     .unwrap();
/// ```
pub struct HttpTransport {
    host: String,
    port: u16,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl HttpTransport {
    /// Creates a transport targeting `host:port`. No I/O happens until
    /// [`connect`](Transport::connect).
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        HttpTransport {
            host: host.into(),
            port,
            timeout,
            stream: None,
        }
    }

    /// Resolves the host and connects to the first address that accepts,
    /// with the configured timeout installed for connect, read and write.
    fn connect_stream(&self) -> io::Result<TcpStream> {
        let addrs = (self.host.as_str(), self.port).to_socket_addrs()?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no addresses resolved for {}:{}", self.host, self.port),
            )
        }))
    }
}

impl Transport for HttpTransport {
    fn connect(&mut self) -> io::Result<()> {
        if self.stream.is_none() {
            debug!(host = %self.host, port = self.port, "establishing transport");
            self.stream = Some(self.connect_stream()?);
        }
        Ok(())
    }

    fn roundtrip(&mut self, request: &WireRequest<'_>) -> io::Result<String> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "transport is not connected")
        })?;

        write_request(stream, &self.host, request)?;
        read_response(stream)
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

fn write_request(stream: &mut TcpStream, host: &str, request: &WireRequest<'_>) -> io::Result<()> {
    let mut head = format!(
        "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n",
        request.path,
        host,
        request.body.len()
    );
    for (name, value) in request.headers {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");

    stream.write_all(head.as_bytes())?;
    stream.write_all(request.body.as_bytes())?;
    stream.flush()
}

/// Reads one HTTP response and returns its body as text.
///
/// The body is returned regardless of the HTTP status code — the reply
/// envelope, not the status line, decides the outcome of the call. A
/// `Content-Length` header bounds the read; without one the body runs to
/// connection close.
fn read_response(stream: &mut TcpStream) -> io::Result<String> {
    let mut reader = BufReader::new(&mut *stream);

    let mut status_line = String::new();
    if reader.read_line(&mut status_line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before status line",
        ));
    }
    debug!(status = %status_line.trim_end(), "response received");

    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed inside response headers",
            ));
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok();
            }
        }
    }

    let body = match content_length {
        Some(len) if len > MAX_REPLY_SIZE => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("reply too large: {} bytes (max {} bytes)", len, MAX_REPLY_SIZE),
            ));
        }
        Some(len) => {
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf)?;
            buf
        }
        None => {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            buf
        }
    };

    String::from_utf8(body)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "reply is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_before_connect_fails() {
        let mut transport = HttpTransport::new("127.0.0.1", 1, DEFAULT_TIMEOUT);
        let err = transport
            .roundtrip(&WireRequest {
                path: "/rpc",
                headers: &[],
                body: "{}",
            })
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_connect_refused_port() {
        // Bind and immediately drop a listener so the port is known-dead.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut transport = HttpTransport::new("127.0.0.1", port, Duration::from_millis(500));
        assert!(transport.connect().is_err());
    }

    #[test]
    fn test_close_discards_stream() {
        let mut transport = HttpTransport::new("127.0.0.1", 1, DEFAULT_TIMEOUT);
        transport.close();
        let err = transport
            .roundtrip(&WireRequest {
                path: "/rpc",
                headers: &[],
                body: "{}",
            })
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }
}
