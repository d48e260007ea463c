//! Wirecall Common Types and Protocol
//!
//! This crate provides the protocol layer shared by wirecall components: the
//! call envelope, reply validation, the reply-status enumeration, parameter
//! marshalling and Basic-Auth credentials.
//!
//! # Overview
//!
//! Wirecall is a synchronous RPC protocol carried as UTF-8 JSON envelopes
//! over HTTP POST. A client sends
//! `{"header":{"xid":N,"msgType":0},"cbody":{"service":...,"method":...,"params":[...]}}`
//! and the server answers `{"rbody":{"replyStatus":N,"result":...}}`. Only
//! status `0` is success; every other integer is a server-reported failure
//! category.
//!
//! # Components
//!
//! - [`protocol`] - Envelope types, reply validation, status codes, errors
//! - [`marshal`] - Parameter marshalling ([`marshal::WireEncode`], [`marshal::Params`])
//! - [`auth`] - Basic-Authentication credentials
//!
//! # Example
//!
//! ```
//! use wirecall_common::marshal::Params;
//! use wirecall_common::protocol::{parse_reply, CallEnvelope};
//!
//! // Client side: marshal arguments and frame a call.
//! let params = Params::new().arg(&42_i64).unwrap();
//! let envelope = CallEnvelope::new(1, "Sensor", "Read", params.into_fragments());
//! let wire = envelope.to_wire().unwrap();
//! assert!(wire.starts_with(r#"{"header":{"xid":1"#));
//!
//! // Client side: validate what came back.
//! let result = parse_reply(r#"{"rbody":{"replyStatus":0,"result":21.5}}"#).unwrap();
//! assert_eq!(result, serde_json::json!(21.5));
//! ```

pub mod auth;
pub mod marshal;
pub mod protocol;

pub use protocol::*;
