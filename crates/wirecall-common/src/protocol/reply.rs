//! Reply envelope validation.
//!
//! A reply must be a JSON object of the shape
//! `{"rbody":{"replyStatus":<int>,"result":<any>}}`. Other top-level keys are
//! permitted and ignored. Validation runs as an ordered chain: each check is
//! attempted only after the previous one succeeds, and the first failing
//! check determines the error reported.

use serde_json::Value;

use crate::protocol::error::{Result, WirecallError};
use crate::protocol::status::ReplyStatus;

/// Validates a reply envelope and extracts its result.
///
/// Returns the value bound to `result` when `replyStatus` is zero, JSON null
/// when the server omitted `result` on success. Every malformed shape and
/// every nonzero status yields its own [`WirecallError`] variant; none of
/// them are transport conditions, so the caller must not retry on any error
/// from this function.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use wirecall_common::protocol::parse_reply;
///
/// let result = parse_reply(r#"{"rbody":{"replyStatus":0,"result":{"ok":true}}}"#).unwrap();
/// assert_eq!(result, json!({"ok": true}));
/// ```
pub fn parse_reply(text: &str) -> Result<Value> {
    let parsed: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => return Err(WirecallError::InvalidResponse(err)),
    };

    let top = match parsed {
        Value::Object(map) => map,
        _ => return Err(WirecallError::GarbageResponse),
    };

    let rbody = match top.get("rbody") {
        Some(value) => value,
        None => return Err(WirecallError::MissingBody),
    };

    let rbody = match rbody {
        Value::Object(map) => map,
        _ => return Err(WirecallError::GarbageBody),
    };

    if !rbody.contains_key("replyStatus") && !rbody.contains_key("result") {
        return Err(WirecallError::MalformedBody);
    }

    // A missing or non-integer replyStatus leaves the outcome unknowable;
    // never guess success.
    let status = rbody
        .get("replyStatus")
        .and_then(Value::as_i64)
        .ok_or(WirecallError::InvalidStatusType)?;

    if status != ReplyStatus::Success.code() {
        return Err(WirecallError::Server { code: status });
    }

    Ok(rbody.get("result").cloned().unwrap_or(Value::Null))
}
