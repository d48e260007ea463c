//! Wirecall Client
//!
//! A blocking, single-connection RPC client for the wirecall protocol: JSON
//! call envelopes POSTed over a keep-alive HTTP/1.1 connection, with a
//! bounded reconnect-and-retry loop for transport faults.
//!
//! # Architecture
//!
//! - **[`connection`]**: [`RpcConnection`] — call identifiers, connection
//!   state, the per-call attempt loop and protocol headers
//! - **[`transport`]**: the [`Transport`](transport::Transport) seam between
//!   the connection and the wire
//! - **[`http`]**: the production transport — blocking TCP with per-attempt
//!   timeouts and minimal HTTP/1.1 framing
//!
//! One call is in flight per connection at a time; for concurrency, create
//! one connection per worker.
//!
//! # Example
//!
//! ```no_run
//! use wirecall_client::{ConnectionConfig, RpcConnection};
//! use wirecall_common::marshal::Params;
//!
//! let mut conn = RpcConnection::new(ConnectionConfig::new("127.0.0.1", 8080));
//! let result = conn.request("Manager", "ListStreams", Params::new()).unwrap();
//! println!("{result}");
//! ```

pub mod connection;
pub mod http;
pub mod transport;

pub use connection::{ConnectionConfig, ConnectionState, RpcConnection, CODEC_ID_JSON};
pub use http::HttpTransport;
pub use transport::{Transport, WireRequest};
