//! Call envelope types and wire serialization.
//!
//! A call travels as a two-part JSON envelope: a `header` carrying the call
//! identifier and message-type tag, and a `cbody` naming the target service,
//! method and parameters.
//!
//! # Wire Compatibility
//!
//! Servers are known to parse the envelope text positionally rather than
//! through the JSON object model, so field order is part of the protocol:
//! `header` precedes `cbody`, `xid` precedes `msgType`, and `service`,
//! `method`, `params` appear in that order. Struct field declaration order
//! below is therefore load-bearing — serde serializes fields in declaration
//! order. A call with no arguments emits `"params":[]`, never an empty
//! object.

use serde::Serialize;
use serde_json::value::RawValue;

use crate::protocol::error::Result;

/// Message-type tag marking an envelope as a call.
pub const MSG_TYPE_CALL: u32 = 0;

/// Message-type tag marking an envelope as a reply.
///
/// Emitted by servers only; the client never sends it. Kept here so both
/// tags of the enumeration are named.
pub const MSG_TYPE_REPLY: u32 = 1;

/// Per-call identifier assigned by the connection.
pub type CallId = u64;

/// Envelope header: call identifier plus message-type tag.
#[derive(Debug, Clone, Serialize)]
pub struct CallHeader {
    /// Call identifier, unique and strictly increasing per connection
    pub xid: CallId,
    /// Message-type tag (always [`MSG_TYPE_CALL`] for outgoing envelopes)
    #[serde(rename = "msgType")]
    pub msg_type: u32,
}

/// Envelope body: the call target and its marshalled arguments.
#[derive(Debug, Clone, Serialize)]
pub struct CallBody {
    /// Name of the target service
    pub service: String,
    /// Name of the target method
    pub method: String,
    /// Ordered, already-serialized argument fragments
    pub params: Vec<Box<RawValue>>,
}

/// One outgoing call envelope.
///
/// Constructed fresh per call and discarded after transmission.
///
/// # Example
///
/// ```
/// use wirecall_common::protocol::CallEnvelope;
/// use wirecall_common::marshal::Params;
///
/// let mut params = Params::new();
/// params.push(&1_i64).unwrap();
/// params.push("a").unwrap();
///
/// let envelope = CallEnvelope::new(1, "svc", "m", params.into_fragments());
/// assert_eq!(
///     envelope.to_wire().unwrap(),
///     r#"{"header":{"xid":1,"msgType":0},"cbody":{"service":"svc","method":"m","params":[1,"a"]}}"#
/// );
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CallEnvelope {
    /// Envelope header
    pub header: CallHeader,
    /// Envelope body
    pub cbody: CallBody,
}

impl CallEnvelope {
    /// Builds a call envelope for `service.method` under the given `xid`.
    pub fn new(
        xid: CallId,
        service: impl Into<String>,
        method: impl Into<String>,
        params: Vec<Box<RawValue>>,
    ) -> Self {
        CallEnvelope {
            header: CallHeader {
                xid,
                msg_type: MSG_TYPE_CALL,
            },
            cbody: CallBody {
                service: service.into(),
                method: method.into(),
                params,
            },
        }
    }

    /// Serializes the envelope to its wire text.
    ///
    /// The output is compact UTF-8 JSON in the fixed field order described in
    /// the module docs.
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
