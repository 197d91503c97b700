//! The expression contract consumed by the call-binding layer.
//!
//! The surrounding grammar, the full evaluation engine and the set of
//! expression node kinds live outside this crate; what the argument binder
//! needs from them is small and captured by the [`Expr`] trait: evaluate to
//! a [`Value`] against the current message, and report whether the node is
//! a compile-time literal. Expression nodes are shared via [`ExprRef`]
//! (reference counting), since the same sub-expression may be held both by
//! an argument container and by code that extracted it for later use.
//!
//! Two concrete node kinds are provided because callables and tests need
//! them: [`Literal`] and [`FieldRef`]. The literal extraction helpers at
//! the bottom implement the typed compile-time views used by the argument
//! container.

use std::collections::HashMap;
use std::rc::Rc;

use crate::Error;
use crate::value::{GenericNumber, Value};

/// One expression node in a compiled filter program.
///
/// Evaluation is synchronous and must not block; a failure short-circuits
/// the enclosing expression tree for the current message.
pub trait Expr {
    /// Evaluate this expression against the current message
    fn eval(&self, ctx: &EvalContext) -> Result<Value, Error>;

    /// True iff the value of this expression is independent of per-message
    /// runtime state
    fn is_literal(&self) -> bool {
        false
    }
}

/// Shared handle to an expression node.
///
/// Compiled trees are evaluated by at most one worker at a time; pipelines
/// that evaluate in parallel clone the tree per worker, which is why this is
/// an `Rc` and not an `Arc`.
pub type ExprRef = Rc<dyn Expr>;

/// Per-message evaluation state: the field map of the log record currently
/// flowing through the filter. Read-only during an evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    fields: HashMap<String, Value>,
}

impl EvalContext {
    pub fn new() -> Self {
        EvalContext::default()
    }

    /// Builder-style field insertion, mostly for tests and demos
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A compile-time constant expression
pub struct Literal {
    value: Value,
}

impl Literal {
    pub fn new(value: impl Into<Value>) -> Self {
        Literal {
            value: value.into(),
        }
    }
}

impl Expr for Literal {
    fn eval(&self, _ctx: &EvalContext) -> Result<Value, Error> {
        Ok(self.value.clone())
    }

    fn is_literal(&self) -> bool {
        true
    }
}

/// A reference to a field of the current message.
///
/// Referencing a field the message does not carry is an evaluation error;
/// filters that want a fallback wrap the reference explicitly. Templates
/// are the forgiving counterpart.
pub struct FieldRef {
    name: String,
}

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        FieldRef { name: name.into() }
    }
}

impl Expr for FieldRef {
    fn eval(&self, ctx: &EvalContext) -> Result<Value, Error> {
        ctx.field(&self.name)
            .cloned()
            .ok_or_else(|| Error::EvalError(format!("no such field: ${}", self.name)))
    }
}

/// Shorthand for a shared literal expression node
pub fn literal(value: impl Into<Value>) -> ExprRef {
    Rc::new(Literal::new(value))
}

/// Shorthand for a shared field-reference expression node
pub fn field_ref(name: impl Into<String>) -> ExprRef {
    Rc::new(FieldRef::new(name))
}

/// True iff the expression is a compile-time constant
pub fn is_literal(expr: &dyn Expr) -> bool {
    expr.is_literal()
}

/// Evaluate a literal expression. Literals never touch message state, so an
/// empty context suffices.
pub(crate) fn eval_literal(expr: &dyn Expr) -> Result<Value, Error> {
    expr.eval(&EvalContext::new())
}

/// Extract the string payload of a string literal.
///
/// Returns None without evaluating when the expression is not a literal,
/// and None when the literal is not string-typed.
pub fn extract_literal_string(expr: &dyn Expr) -> Option<String> {
    if !expr.is_literal() {
        return None;
    }

    let value = eval_literal(expr).ok()?;
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// Extract the numeric kind and payload of a primitive literal.
///
/// Non-literals, evaluation failures and non-primitive literals all come
/// back as NotANumber; the argument container layers "absent" vs "wrong
/// kind" on top of this.
pub fn extract_literal_generic_number(expr: &dyn Expr) -> GenericNumber {
    if !expr.is_literal() {
        return GenericNumber::NotANumber;
    }

    match eval_literal(expr) {
        Ok(value) => GenericNumber::from_value(&value),
        Err(_) => GenericNumber::NotANumber,
    }
}

/// True iff the expression is a literal evaluating to the null value.
/// Distinct from "absent": the caller decides which of the two signals it
/// cares about.
pub fn is_literal_null(expr: &dyn Expr) -> bool {
    if !expr.is_literal() {
        return false;
    }

    matches!(eval_literal(expr), Ok(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::val;

    #[test]
    fn test_literal_and_field_ref_eval() {
        let ctx = EvalContext::new().with_field("msg", "hello");

        assert_eq!(literal(42).eval(&ctx).unwrap(), val(42));
        assert_eq!(field_ref("msg").eval(&ctx).unwrap(), val("hello"));
        assert!(matches!(
            field_ref("nope").eval(&ctx),
            Err(Error::EvalError(_))
        ));
    }

    #[test]
    fn test_literal_flag() {
        assert!(literal("x").is_literal());
        assert!(!field_ref("msg").is_literal());
    }

    #[test]
    fn test_extract_literal_string() {
        assert_eq!(
            extract_literal_string(&Literal::new("hello")),
            Some("hello".to_owned())
        );
        // wrong type
        assert_eq!(extract_literal_string(&Literal::new(42)), None);
        // not a literal: must not evaluate at all, even though evaluation
        // would fail against the empty context
        assert_eq!(extract_literal_string(&FieldRef::new("msg")), None);
    }

    #[test]
    fn test_extract_literal_generic_number() {
        assert_eq!(
            extract_literal_generic_number(&Literal::new(42)),
            GenericNumber::Integer(42)
        );
        assert_eq!(
            extract_literal_generic_number(&Literal::new(2.5)),
            GenericNumber::Double(2.5)
        );
        assert!(extract_literal_generic_number(&Literal::new("42")).is_nan());
        assert!(extract_literal_generic_number(&FieldRef::new("n")).is_nan());
    }

    #[test]
    fn test_is_literal_null() {
        assert!(is_literal_null(&Literal::new(Value::Null)));
        assert!(!is_literal_null(&Literal::new(0)));
        assert!(!is_literal_null(&FieldRef::new("missing")));
    }
}
