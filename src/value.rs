//! Runtime values produced by expression evaluation.
//!
//! [`Value`] covers everything a filter expression can evaluate to: the null
//! value, booleans, integers, doubles, strings, lists and insertion-ordered
//! dicts. Ergonomic `From` conversions are provided for building values from
//! Rust literals in both code and tests, plus the [`val`] helper for mixed
//! collections.
//!
//! [`GenericNumber`] is the tagged scalar that typed literal extraction
//! funnels through: an argument's literal value is first widened to a
//! GenericNumber and then narrowed back to the kind the caller asked for,
//! so that "wrong numeric kind" is detectable separately from "absent".

use crate::Error;

/// Type alias for integer values in the filter language
pub type IntegerType = i64;

/// Core runtime value type
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null value (distinct from an absent argument)
    Null,
    /// Boolean values
    Bool(bool),
    /// Integer numbers
    Integer(IntegerType),
    /// Floating-point numbers
    Double(f64),
    /// String values
    String(String),
    /// Ordered sequences of values
    List(Vec<Value>),
    /// Key/value mappings; insertion order is preserved so that generated
    /// records render deterministically
    Dict(Vec<(String, Value)>),
}

impl Value {
    /// Check whether this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check whether this is a string value
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Primitive scalars are the values a GenericNumber can represent
    pub fn is_primitive(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Integer(_) | Value::Double(_))
    }

    /// Borrow the string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<IntegerType> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Element count for sized values (string length is in bytes)
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.len()),
            Value::List(items) => Some(items.len()),
            Value::Dict(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }

    /// Render this value as plain text, the way templates and generated
    /// records present it: strings unquoted, null as the empty string
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => {
                write!(f, "\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"")
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "\"{key}\":{value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

// From trait implementations for Value - enables .into() conversion

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Integer(n as IntegerType)
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(IntegerType); // Special case - no casting
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::List(arr.into_iter().map(|x| x.into()).collect())
    }
}

/// Helper function for creating Values - works great in mixed lists!
/// Accepts any type that can be converted to Value
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

// Fallible conversions from `Value` back into primitive Rust types.

impl TryFrom<Value> for IntegerType {
    type Error = Error;

    fn try_from(value: Value) -> Result<IntegerType, Error> {
        value
            .as_integer()
            .ok_or_else(|| Error::TypeError("expected integer".into()))
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<bool, Error> {
        value
            .as_bool()
            .ok_or_else(|| Error::TypeError("expected boolean".into()))
    }
}

/// Tagged numeric scalar shared by the typed literal extraction helpers.
///
/// Booleans are integer-kind: a boolean literal widens to `Integer(0|1)`,
/// which is why requesting a boolean for a floating-point literal is a kind
/// mismatch while requesting one for `true` is not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenericNumber {
    Integer(IntegerType),
    Double(f64),
    /// Not a primitive scalar at all
    NotANumber,
}

impl GenericNumber {
    /// Widen a runtime value to its numeric kind
    pub fn from_value(value: &Value) -> GenericNumber {
        match value {
            Value::Bool(b) => GenericNumber::Integer(*b as IntegerType),
            Value::Integer(i) => GenericNumber::Integer(*i),
            Value::Double(d) => GenericNumber::Double(*d),
            _ => GenericNumber::NotANumber,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, GenericNumber::NotANumber)
    }

    /// Narrow to the integer kind; None when the kind differs
    pub fn as_integer(&self) -> Option<IntegerType> {
        match self {
            GenericNumber::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Narrow to the floating-point kind; None when the kind differs
    pub fn as_double(&self) -> Option<f64> {
        match self {
            GenericNumber::Double(d) => Some(*d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_constructors_data_driven() {
        let test_cases = vec![
            (val(42), Value::Integer(42)),
            (val(-17), Value::Integer(-17)),
            (val(255u8), Value::Integer(255)),
            (val(IntegerType::MAX), Value::Integer(IntegerType::MAX)),
            (val(true), Value::Bool(true)),
            (val(3.25), Value::Double(3.25)),
            (val("hello"), Value::String("hello".to_owned())),
            (val(""), Value::String(String::new())),
            (
                val([1, 2, 3]),
                Value::List(vec![
                    Value::Integer(1),
                    Value::Integer(2),
                    Value::Integer(3),
                ]),
            ),
            (
                val(vec![val("a"), val(1)]),
                Value::List(vec![Value::String("a".to_owned()), Value::Integer(1)]),
            ),
        ];

        for (i, (actual, expected)) in test_cases.iter().enumerate() {
            assert_eq!(actual, expected, "test case {} failed", i + 1);
        }
    }

    #[test]
    fn test_display_and_text_rendering() {
        assert_eq!(val("a \"b\"").to_string(), "\"a \\\"b\\\"\"");
        assert_eq!(val("a \"b\"").to_text(), "a \"b\"");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(val([1, 2]).to_string(), "[1,2]");
        assert_eq!(
            Value::Dict(vec![("k".to_owned(), val(1))]).to_string(),
            "{\"k\":1}"
        );
    }

    #[test]
    fn test_generic_number_kinds() {
        assert_eq!(
            GenericNumber::from_value(&val(42)),
            GenericNumber::Integer(42)
        );
        assert_eq!(
            GenericNumber::from_value(&val(true)),
            GenericNumber::Integer(1)
        );
        assert_eq!(
            GenericNumber::from_value(&val(3.14)),
            GenericNumber::Double(3.14)
        );
        assert!(GenericNumber::from_value(&val("42")).is_nan());
        assert!(GenericNumber::from_value(&Value::Null).is_nan());

        // Kind narrowing is strict: no integer/double cross-conversion
        assert_eq!(GenericNumber::Integer(7).as_integer(), Some(7));
        assert_eq!(GenericNumber::Integer(7).as_double(), None);
        assert_eq!(GenericNumber::Double(0.5).as_integer(), None);
    }

    #[test]
    fn test_len_and_predicates() {
        assert_eq!(val("abc").len(), Some(3));
        assert_eq!(val([1, 2]).len(), Some(2));
        assert_eq!(val(1).len(), None);
        assert!(val(1).is_primitive());
        assert!(val(true).is_primitive());
        assert!(!val("x").is_primitive());
        assert!(Value::Null.is_null());
    }
}
