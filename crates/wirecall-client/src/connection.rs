//! The RPC connection: one transport, one call at a time.
//!
//! [`RpcConnection`] owns a single transport handle to a fixed host/port and
//! issues blocking calls over it. Each call assigns the next call identifier,
//! frames an envelope, and runs a bounded attempt loop: a transport fault
//! discards the handle, flips the state back to
//! [`ConnectionState::Disconnected`] and reconnects on the next attempt,
//! until the retry budget is spent. Reply-shape problems are never retried —
//! they are protocol faults, not transient ones.
//!
//! The connection is deliberately not shareable: `request` takes `&mut self`,
//! so the borrow checker enforces the one-in-flight-call discipline. Callers
//! wanting concurrent RPCs create one connection per worker.

use std::io;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use wirecall_common::auth::Credentials;
use wirecall_common::marshal::Params;
use wirecall_common::protocol::{parse_reply, CallEnvelope, CallId, Result, WirecallError};

use crate::http::{HttpTransport, DEFAULT_TIMEOUT};
use crate::transport::{Transport, WireRequest};

/// Codec identifier sent with every request; `2` names the JSON envelope
/// codec.
pub const CODEC_ID_JSON: u32 = 2;

/// Keep-alive hint (seconds) sent with every request.
const KEEP_ALIVE_SECS: u32 = 300;

/// Default retry budget: total transport attempts per call.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default URL path of the RPC endpoint.
pub const DEFAULT_PATH: &str = "/rpc";

/// Whether the connection currently holds an established transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No established transport; the next attempt connects first
    Disconnected,
    /// Transport established and reusable for the next call
    Connected,
}

/// Configuration for an RPC connection.
///
/// # Defaults
///
/// - `path`: `/rpc`
/// - `timeout`: 10 seconds per transport attempt
/// - `retries`: 3 attempts
/// - `credentials`: none
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wirecall_client::ConnectionConfig;
/// use wirecall_common::auth::Credentials;
///
/// let config = ConnectionConfig::new("rpc.example.com", 8080)
///     .with_path("/rpc/manager")
///     .with_timeout(Duration::from_secs(5))
///     .with_retries(5)
///     .with_credentials(Credentials::new("admin", "secret"));
/// assert_eq!(config.retries, 5);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Target host name or address
    pub host: String,
    /// Target port
    pub port: u16,
    /// URL path of the RPC endpoint
    pub path: String,
    /// Timeout applied to each individual transport attempt
    pub timeout: Duration,
    /// Retry budget: total transport attempts per call (minimum 1)
    pub retries: u32,
    /// Optional Basic-Auth credentials
    pub credentials: Option<Credentials>,
}

impl ConnectionConfig {
    /// Creates a configuration for `host:port` with default path, timeout,
    /// retry budget and no credentials.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ConnectionConfig {
            host: host.into(),
            port,
            path: DEFAULT_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            credentials: None,
        }
    }

    /// Sets the URL path of the RPC endpoint.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry budget (total transport attempts per call).
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the Basic-Auth credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// A blocking RPC connection to one server.
///
/// Generic over [`Transport`] so the attempt loop and state machine can be
/// exercised against a fake in tests; production code uses the
/// [`HttpTransport`] default through [`RpcConnection::new`].
///
/// # Example
///
/// ```no_run
/// use wirecall_client::{ConnectionConfig, RpcConnection};
/// use wirecall_common::marshal::Params;
///
/// let config = ConnectionConfig::new("127.0.0.1", 8080);
/// let mut conn = RpcConnection::new(config);
///
/// let params = Params::new().arg("camera-1").unwrap();
/// let result = conn.request("MediaMapper", "GetStream", params).unwrap();
/// println!("stream: {}", result);
/// ```
pub struct RpcConnection<T: Transport = HttpTransport> {
    config: ConnectionConfig,
    transport: T,
    state: ConnectionState,
    next_xid: CallId,
}

impl RpcConnection<HttpTransport> {
    /// Creates a connection using the HTTP transport.
    ///
    /// No I/O happens until the first [`request`](Self::request).
    pub fn new(config: ConnectionConfig) -> Self {
        let transport = HttpTransport::new(config.host.clone(), config.port, config.timeout);
        RpcConnection::with_transport(config, transport)
    }
}

impl<T: Transport> RpcConnection<T> {
    /// Creates a connection over a caller-supplied transport.
    pub fn with_transport(config: ConnectionConfig, transport: T) -> Self {
        RpcConnection {
            config,
            transport,
            state: ConnectionState::Disconnected,
            next_xid: 0,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The call identifier assigned to the most recent call, or 0 before the
    /// first call.
    pub fn last_xid(&self) -> CallId {
        self.next_xid
    }

    /// Issues one call and blocks until its reply is validated.
    ///
    /// The call identifier is incremented exactly once per invocation,
    /// whether or not the call succeeds. Transport faults are retried up to
    /// the configured budget with a fresh connection per attempt; every
    /// reply-shape fault and server-reported status is surfaced immediately.
    ///
    /// # Errors
    ///
    /// - [`WirecallError::Transport`] once the retry budget is exhausted
    /// - [`WirecallError::Server`] for a nonzero reply status
    /// - the reply-validation variants for malformed replies
    /// - [`WirecallError::Serialization`] if the envelope cannot be encoded
    pub fn request(&mut self, service: &str, method: &str, params: Params) -> Result<Value> {
        self.next_xid += 1;
        let envelope = CallEnvelope::new(self.next_xid, service, method, params.into_fragments());
        let wire = envelope.to_wire()?;

        debug!(xid = self.next_xid, service, method, "issuing call");

        let headers = self.protocol_headers();
        let reply = self.exchange(&wire, &headers)?;

        parse_reply(&reply)
    }

    /// Drops the transport handle and marks the connection closed.
    ///
    /// The connection remains usable; the next call reconnects.
    pub fn close(&mut self) {
        self.transport.close();
        self.state = ConnectionState::Disconnected;
    }

    /// Runs the bounded attempt loop for one serialized envelope.
    fn exchange(&mut self, body: &str, headers: &[(&'static str, String)]) -> Result<String> {
        let attempts = self.config.retries.max(1);
        let mut last_err: Option<io::Error> = None;

        for attempt in 1..=attempts {
            match self.try_once(body, headers) {
                Ok(reply) => return Ok(reply),
                Err(err) => {
                    warn!(attempt, budget = attempts, error = %err, "transport attempt failed");
                    self.transport.close();
                    self.state = ConnectionState::Disconnected;
                    last_err = Some(err);
                }
            }
        }

        let source = last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "no transport attempt was made")
        });
        Err(WirecallError::Transport { attempts, source })
    }

    /// One transport attempt: connect if needed, then send and receive.
    fn try_once(&mut self, body: &str, headers: &[(&'static str, String)]) -> io::Result<String> {
        if self.state == ConnectionState::Disconnected {
            self.transport.connect()?;
            self.state = ConnectionState::Connected;
        }
        self.transport.roundtrip(&WireRequest {
            path: &self.config.path,
            headers,
            body,
        })
    }

    fn protocol_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Rpc_Codec_Id", CODEC_ID_JSON.to_string()),
            ("Keep-Alive", KEEP_ALIVE_SECS.to_string()),
        ];
        if let Some(credentials) = &self.config.credentials {
            headers.push(("Authorization", credentials.authorization()));
        }
        headers
    }
}
