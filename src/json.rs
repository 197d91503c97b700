//! JSON bridge: converting between runtime values and JSON documents.
//!
//! Backs the `parse_json` and `format_json` built-ins. Conversion is
//! total in both directions with one exception: JSON numbers that fit
//! neither `i64` nor `f64` are rejected rather than silently truncated.

use crate::Error;
use crate::function::SimpleCall;
use crate::value::Value;

/// Convert a parsed JSON document into a runtime value
pub fn value_from_json(json: &serde_json::Value) -> Result<Value, Error> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(d) = n.as_f64() {
                Ok(Value::Double(d))
            } else {
                Err(Error::TypeError(format!("number out of range: {n}")))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(items) => {
            let converted: Result<Vec<Value>, Error> = items.iter().map(value_from_json).collect();
            Ok(Value::List(converted?))
        }
        serde_json::Value::Object(entries) => {
            let mut converted = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                converted.push((key.clone(), value_from_json(value)?));
            }
            Ok(Value::Dict(converted))
        }
    }
}

/// Convert a runtime value into a JSON document
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Double(d) => serde_json::Number::from_f64(*d)
            .map(serde_json::Value::Number)
            // Non-finite doubles have no JSON representation
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Dict(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), value_to_json(value)))
                .collect(),
        ),
    }
}

/// `parse_json(str)` - parse a JSON document into a value
pub(crate) fn builtin_parse_json(call: &SimpleCall<'_>) -> Result<Value, Error> {
    let [input] = call.positional() else {
        return Err(call.error("expected exactly one argument"));
    };
    let input = input
        .as_str()
        .ok_or_else(|| call.error("argument must be a string"))?;

    let json: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| call.error(format!("invalid JSON: {e}")))?;
    value_from_json(&json)
}

/// `format_json(value)` - serialize a value as a JSON document
pub(crate) fn builtin_format_json(call: &SimpleCall<'_>) -> Result<Value, Error> {
    let [input] = call.positional() else {
        return Err(call.error("expected exactly one argument"));
    };
    Ok(Value::String(value_to_json(input).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{FunctionArg, FunctionArgs};
    use crate::expr::{EvalContext, Expr, literal};
    use crate::function::SimpleFunction;
    use crate::value::val;

    fn call(name: &str, f: crate::function::SimpleFn, arg: Value) -> Result<Value, Error> {
        let args = FunctionArgs::new(vec![FunctionArg::positional(literal(arg))]).unwrap();
        SimpleFunction::new(name, args, f).eval(&EvalContext::new())
    }

    #[test]
    fn test_parse_json() {
        let result = call(
            "parse_json",
            builtin_parse_json,
            val(r#"{"host":"db1","pid":312,"tags":["a","b"],"extra":null}"#),
        )
        .unwrap();

        assert_eq!(
            result,
            Value::Dict(vec![
                ("extra".to_owned(), Value::Null),
                ("host".to_owned(), val("db1")),
                ("pid".to_owned(), val(312)),
                ("tags".to_owned(), val(["a", "b"])),
            ])
        );
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        assert!(call("parse_json", builtin_parse_json, val("{nope")).is_err());
        assert!(call("parse_json", builtin_parse_json, val(42)).is_err());
    }

    #[test]
    fn test_format_json_round_trip() {
        let value = Value::Dict(vec![
            ("ok".to_owned(), val(true)),
            ("n".to_owned(), val(1)),
        ]);
        let formatted = call("format_json", builtin_format_json, value).unwrap();
        assert_eq!(formatted, val(r#"{"n":1,"ok":true}"#));
    }
}
