//! Parameter marshalling for call envelopes.
//!
//! Call arguments travel inside the envelope as pre-serialized JSON
//! fragments. The [`WireEncode`] trait is the capability "can produce its own
//! wire fragment": primitives and plain JSON values encode through the
//! standard serializer, sequences encode element by element, date/time values
//! collapse to epoch seconds, and application-defined argument types
//! implement the trait themselves to supply a custom fragment.
//!
//! Dispatch is decided by the type system up front — a type without an
//! implementation fails to compile instead of being probed at runtime through
//! a caught serializer failure.
//!
//! # Example
//!
//! ```
//! use wirecall_common::marshal::Params;
//!
//! let mut params = Params::new();
//! params.push(&vec![1_i64, 2]).unwrap();
//! params.push("label").unwrap();
//! assert_eq!(params.len(), 2);
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::Serialize;
use serde_json::value::RawValue;

use crate::protocol::error::Result;

/// A value that can render itself as a JSON parameter fragment.
///
/// Implementations must produce a complete, valid JSON value. Application
/// argument types implement this directly when their wire shape differs from
/// what the generic serializer would emit.
pub trait WireEncode {
    /// Produces the JSON fragment for this value.
    fn encode_wire(&self) -> Result<Box<RawValue>>;
}

/// Encodes any serde-serializable value through the generic JSON path.
///
/// This is the building block behind the primitive [`WireEncode`]
/// implementations and is available to custom implementations that only need
/// to reshape part of their output.
pub fn encode_serialized<T: Serialize + ?Sized>(value: &T) -> Result<Box<RawValue>> {
    let text = serde_json::to_string(value)?;
    Ok(RawValue::from_string(text)?)
}

macro_rules! encode_via_serde {
    ($($ty:ty),* $(,)?) => {
        $(
            impl WireEncode for $ty {
                fn encode_wire(&self) -> Result<Box<RawValue>> {
                    encode_serialized(self)
                }
            }
        )*
    };
}

encode_via_serde!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    str,
    String,
    serde_json::Value,
    serde_json::Map<String, serde_json::Value>,
);

impl<T: WireEncode + ?Sized> WireEncode for &T {
    fn encode_wire(&self) -> Result<Box<RawValue>> {
        (**self).encode_wire()
    }
}

impl<T: WireEncode> WireEncode for [T] {
    fn encode_wire(&self) -> Result<Box<RawValue>> {
        let mut fragments = Vec::with_capacity(self.len());
        for item in self {
            fragments.push(item.encode_wire()?);
        }
        encode_serialized(&fragments)
    }
}

impl<T: WireEncode> WireEncode for Vec<T> {
    fn encode_wire(&self) -> Result<Box<RawValue>> {
        self.as_slice().encode_wire()
    }
}

impl<T: WireEncode> WireEncode for Option<T> {
    fn encode_wire(&self) -> Result<Box<RawValue>> {
        match self {
            Some(value) => value.encode_wire(),
            None => encode_serialized(&serde_json::Value::Null),
        }
    }
}

/// Date/time values encode as whole seconds since the Unix epoch.
///
/// Lossy on purpose: fractional seconds and the timezone offset are
/// discarded, matching the historical wire output.
impl<Tz: TimeZone> WireEncode for DateTime<Tz> {
    fn encode_wire(&self) -> Result<Box<RawValue>> {
        encode_serialized(&self.timestamp())
    }
}

impl WireEncode for NaiveDateTime {
    fn encode_wire(&self) -> Result<Box<RawValue>> {
        encode_serialized(&self.and_utc().timestamp())
    }
}

/// Ordered parameter list for one call.
///
/// Arguments are marshalled as they are pushed and handed to the connection
/// as ready-made fragments; the envelope embeds them verbatim.
#[derive(Debug, Clone, Default)]
pub struct Params {
    fragments: Vec<Box<RawValue>>,
}

impl Params {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Params {
            fragments: Vec::new(),
        }
    }

    /// Marshals `value` and appends its fragment.
    pub fn push<T: WireEncode + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.fragments.push(value.encode_wire()?);
        Ok(())
    }

    /// Builder form of [`push`](Self::push).
    ///
    /// # Example
    ///
    /// ```
    /// use wirecall_common::marshal::Params;
    ///
    /// let params = Params::new().arg(&1_i64).unwrap().arg("a").unwrap();
    /// assert_eq!(params.len(), 2);
    /// ```
    pub fn arg<T: WireEncode + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.push(value)?;
        Ok(self)
    }

    /// Number of marshalled arguments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether no arguments have been marshalled.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Consumes the list, yielding the fragments in push order.
    pub fn into_fragments(self) -> Vec<Box<RawValue>> {
        self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn fragment<T: WireEncode + ?Sized>(value: &T) -> String {
        value.encode_wire().unwrap().get().to_string()
    }

    #[test]
    fn test_primitives_encode_via_serde() {
        assert_eq!(fragment(&1_i64), "1");
        assert_eq!(fragment(&true), "true");
        assert_eq!(fragment(&2.5_f64), "2.5");
        assert_eq!(fragment("a"), "\"a\"");
        assert_eq!(fragment(&json!({"k": 1})), r#"{"k":1}"#);
    }

    #[test]
    fn test_sequences_encode_recursively() {
        assert_eq!(fragment(&vec![1_i64, 2]), "[1,2]");
        assert_eq!(fragment(&vec![vec![1_i64, 2], vec![3]]), "[[1,2],[3]]");
        assert_eq!(fragment(&Vec::<i64>::new()), "[]");
    }

    #[test]
    fn test_option_encodes_null() {
        assert_eq!(fragment(&Option::<i64>::None), "null");
        assert_eq!(fragment(&Some(5_i64)), "5");
    }

    #[test]
    fn test_datetime_encodes_epoch_seconds() {
        let when = Utc.with_ymd_and_hms(2009, 2, 13, 23, 31, 30).unwrap();
        assert_eq!(fragment(&when), "1234567890");
    }

    #[test]
    fn test_datetime_fractional_seconds_discarded() {
        let when = DateTime::from_timestamp(1234567890, 500_000_000).unwrap();
        assert_eq!(fragment(&when), "1234567890");
    }

    #[test]
    fn test_naive_datetime_encodes_epoch_seconds() {
        let when = chrono::NaiveDate::from_ymd_opt(2009, 2, 13)
            .unwrap()
            .and_hms_opt(23, 31, 30)
            .unwrap();
        assert_eq!(fragment(&when), "1234567890");
    }

    #[test]
    fn test_custom_encoder_bypasses_default_serialization() {
        // No Serialize derive anywhere in sight; the fragment comes straight
        // from the implementation.
        struct Grid {
            cols: u32,
            rows: u32,
        }

        impl WireEncode for Grid {
            fn encode_wire(&self) -> Result<Box<RawValue>> {
                Ok(RawValue::from_string(format!(
                    "\"{}x{}\"",
                    self.cols, self.rows
                ))?)
            }
        }

        let grid = Grid { cols: 4, rows: 3 };
        assert_eq!(fragment(&grid), "\"4x3\"");
        assert_eq!(fragment(&vec![grid]), "[\"4x3\"]");
    }

    #[test]
    fn test_params_preserve_push_order() {
        let mut params = Params::new();
        params.push(&1_i64).unwrap();
        params.push("a").unwrap();
        params.push(&vec![2_i64, 3]).unwrap();

        let fragments: Vec<String> = params
            .into_fragments()
            .into_iter()
            .map(|f| f.get().to_string())
            .collect();
        assert_eq!(fragments, vec!["1", "\"a\"", "[2,3]"]);
    }

    #[test]
    fn test_empty_params() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
        assert!(params.into_fragments().is_empty());
    }
}
