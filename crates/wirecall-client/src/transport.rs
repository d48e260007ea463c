//! Transport abstraction for the RPC connection.
//!
//! The connection drives exactly one transport at a time: `connect`, any
//! number of `roundtrip`s over the established channel, and `close` when the
//! handle goes bad or the caller is done. Failures are plain `io::Error`s —
//! the connection decides what is retried; the transport only moves bytes.
//!
//! [`HttpTransport`](crate::http::HttpTransport) is the production
//! implementation; tests drive the connection state machine through fakes.

use std::io;

/// One outgoing request as assembled by the connection.
///
/// `headers` carries only the protocol headers (codec id, keep-alive hint,
/// authorization); transport-level plumbing such as `Host` and
/// `Content-Length` is the transport's own business.
#[derive(Debug)]
pub struct WireRequest<'a> {
    /// URL path of the RPC endpoint
    pub path: &'a str,
    /// Protocol headers, in emission order
    pub headers: &'a [(&'static str, String)],
    /// Serialized call envelope
    pub body: &'a str,
}

/// A single-request/single-response channel to the server.
pub trait Transport {
    /// Establishes the underlying channel.
    ///
    /// Idempotent: connecting an already-connected transport is a no-op.
    fn connect(&mut self) -> io::Result<()>;

    /// Sends one serialized envelope and reads back the raw reply text.
    ///
    /// Blocks until the full response payload is available or the transport's
    /// timeout elapses.
    fn roundtrip(&mut self, request: &WireRequest<'_>) -> io::Result<String>;

    /// Discards the underlying channel.
    fn close(&mut self);
}
