use thiserror::Error;

use crate::protocol::status::ReplyStatus;

/// Errors surfaced by the wirecall protocol layer.
///
/// The reply-validation variants (`InvalidResponse` through
/// `InvalidStatusType`) map one-to-one onto the ordered checks in
/// [`parse_reply`](crate::protocol::parse_reply); none of them are retried.
/// Only `Transport` failures are retried, and only inside the connection's
/// attempt loop before the variant is ever constructed.
#[derive(Error, Debug)]
pub enum WirecallError {
    /// Connect/send/receive failed on every attempt; wraps the last fault.
    #[error("transport error after {attempts} attempt(s): {source}")]
    Transport {
        /// How many attempts were made before giving up
        attempts: u32,
        /// The last underlying I/O fault
        source: std::io::Error,
    },

    /// The reply text is not valid JSON.
    #[error("invalid JSON response from server: {0}")]
    InvalidResponse(serde_json::Error),

    /// The reply parsed, but the top-level value is not an object.
    #[error("non-object (i.e. garbage) response from server")]
    GarbageResponse,

    /// The reply object carries no `rbody` key.
    #[error("no rbody found in server response")]
    MissingBody,

    /// `rbody` is present but is not an object.
    #[error("wrong rbody found in server response")]
    GarbageBody,

    /// `rbody` carries neither `replyStatus` nor `result`.
    #[error("wrong keys in rbody from server response")]
    MalformedBody,

    /// `replyStatus` is missing or not an integer.
    #[error("reply status from server is missing or not an integer")]
    InvalidStatusType,

    /// The server reported a nonzero reply status.
    ///
    /// The code is preserved verbatim; [`reply_status`](Self::reply_status)
    /// maps the known codes back onto [`ReplyStatus`].
    #[error("server reported error {code} ({})", status_label(.code))]
    Server {
        /// The reply status code as received
        code: i64,
    },

    /// Local JSON encoding of the envelope or a parameter fragment failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WirecallError {
    /// The server-reported status behind this error, when it is one of the
    /// named codes.
    ///
    /// Returns `None` for every non-`Server` variant and for `Server` codes
    /// outside the known enumeration.
    ///
    /// # Example
    ///
    /// ```
    /// use wirecall_common::protocol::{ReplyStatus, WirecallError};
    ///
    /// let err = WirecallError::Server { code: 1 };
    /// assert_eq!(err.reply_status(), Some(ReplyStatus::ServiceUnavailable));
    ///
    /// let err = WirecallError::Server { code: 99 };
    /// assert_eq!(err.reply_status(), None);
    /// ```
    pub fn reply_status(&self) -> Option<ReplyStatus> {
        match self {
            WirecallError::Server { code } => ReplyStatus::from_code(*code),
            _ => None,
        }
    }
}

fn status_label(code: &i64) -> &'static str {
    ReplyStatus::from_code(*code).map_or("unrecognized status", ReplyStatus::label)
}

pub type Result<T> = std::result::Result<T, WirecallError>;
