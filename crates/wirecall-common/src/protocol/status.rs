//! Reply status codes reported by the server.

/// Closed enumeration of the reply status codes a server reports.
///
/// Only [`ReplyStatus::Success`] carries a result; every other code is a
/// server-side failure category. Servers may in principle emit integers
/// outside this enumeration — those are surfaced verbatim through
/// [`WirecallError::Server`](crate::protocol::WirecallError::Server) and
/// simply have no named counterpart here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// The call was executed and `result` is valid
    Success,
    /// The named service is not registered on the server
    ServiceUnavailable,
    /// The service exists but has no such method
    ProcedureUnavailable,
    /// The server could not decode the call arguments
    GarbageArguments,
    /// The call failed inside the server
    SystemError,
    /// The server closed the connection before completing the call
    ConnectionClosed,
}

impl ReplyStatus {
    /// Maps a wire code to its status, if the code is one of the known six.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ReplyStatus::Success),
            1 => Some(ReplyStatus::ServiceUnavailable),
            2 => Some(ReplyStatus::ProcedureUnavailable),
            3 => Some(ReplyStatus::GarbageArguments),
            4 => Some(ReplyStatus::SystemError),
            5 => Some(ReplyStatus::ConnectionClosed),
            _ => None,
        }
    }

    /// The numeric wire code of this status.
    pub fn code(self) -> i64 {
        match self {
            ReplyStatus::Success => 0,
            ReplyStatus::ServiceUnavailable => 1,
            ReplyStatus::ProcedureUnavailable => 2,
            ReplyStatus::GarbageArguments => 3,
            ReplyStatus::SystemError => 4,
            ReplyStatus::ConnectionClosed => 5,
        }
    }

    /// Short human-readable label, used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            ReplyStatus::Success => "success",
            ReplyStatus::ServiceUnavailable => "service unavailable",
            ReplyStatus::ProcedureUnavailable => "procedure unavailable",
            ReplyStatus::GarbageArguments => "garbage arguments",
            ReplyStatus::SystemError => "system error",
            ReplyStatus::ConnectionClosed => "connection closed",
        }
    }
}
