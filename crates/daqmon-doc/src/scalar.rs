//! ---
//! daq_section: "01-hierarchical-document"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Scalar conversions between tree values and typed fields."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
use serde_json::Value;

/// Conversion from a tree scalar into a typed field.
///
/// Implementations are lenient: documents produced by stringly-typed peers
/// carry numbers and booleans as strings, while documents re-encoded from
/// this crate carry them natively. Both forms must read back equally, so
/// every implementation accepts its native JSON type and a parseable string.
/// A value that matches neither form yields `None` and the caller falls back
/// to its per-field default.
pub trait FromScalar: Sized {
    /// Attempt to read `value` as `Self`, returning `None` on mismatch.
    fn from_scalar(value: &Value) -> Option<Self>;
}

/// Conversion from a typed field into a tree scalar.
pub trait ToScalar {
    /// Render the field as a scalar tree value.
    fn to_scalar(&self) -> Value;
}

impl FromScalar for String {
    fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

impl FromScalar for bool {
    fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            Value::Number(number) => number.as_u64().map(|raw| raw != 0),
            _ => None,
        }
    }
}

impl FromScalar for f64 {
    fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.parse().ok(),
            _ => None,
        }
    }
}

macro_rules! unsigned_from_scalar {
    ($($int:ty),*) => {
        $(impl FromScalar for $int {
            fn from_scalar(value: &Value) -> Option<Self> {
                match value {
                    Value::Number(number) => {
                        number.as_u64().and_then(|raw| <$int>::try_from(raw).ok())
                    }
                    Value::String(text) => text.parse().ok(),
                    _ => None,
                }
            }
        })*
    };
}

unsigned_from_scalar!(u16, u32, u64);

impl FromScalar for i32 {
    fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().and_then(|raw| i32::try_from(raw).ok()),
            Value::String(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl ToScalar for String {
    fn to_scalar(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToScalar for &str {
    fn to_scalar(&self) -> Value {
        Value::String((*self).to_string())
    }
}

impl ToScalar for bool {
    fn to_scalar(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToScalar for f64 {
    // Non-finite rates have no JSON representation; they degrade to null and
    // read back as the field default.
    fn to_scalar(&self) -> Value {
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

macro_rules! integer_to_scalar {
    ($($int:ty),*) => {
        $(impl ToScalar for $int {
            fn to_scalar(&self) -> Value {
                Value::Number(serde_json::Number::from(*self))
            }
        })*
    };
}

integer_to_scalar!(u16, u32, u64, i32);
