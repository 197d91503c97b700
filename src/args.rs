//! The per-call-site argument container.
//!
//! The parser hands resolution a flat list of [`FunctionArg`] values; the
//! container partitions it into the positional sequence and the named map,
//! enforces the shape of the call (positionals first, named arguments
//! unique) and then serves every retrieval a callable performs. Each
//! argument remembers whether it was ever fetched, and [`FunctionArgs::check`]
//! turns that record into the two consumption contracts:
//!
//! - an unread positional argument is a bug in the callable and aborts, and
//! - an unread named argument means the user passed a keyword nobody asked
//!   for, which is an ordinary error.
//!
//! All "literal" getters are three-valued: `Ok(Some(v))` for a usable
//! literal, `Ok(None)` for an absent argument, and `Err` for an argument
//! that exists but is not the literal the caller required. Absence and
//! malformedness are deliberately never collapsed into one signal.

use std::cell::Cell;
use std::collections::HashMap;

use crate::Error;
use crate::expr::{self, EvalContext, ExprRef};
use crate::value::{GenericNumber, IntegerType, Value};

/// One argument at a call site: an optional keyword and the expression the
/// caller supplied for it
pub struct FunctionArg {
    name: Option<String>,
    value: ExprRef,
    retrieved: Cell<bool>,
}

impl FunctionArg {
    /// A positional argument
    pub fn positional(value: ExprRef) -> Self {
        FunctionArg {
            name: None,
            value,
            retrieved: Cell::new(false),
        }
    }

    /// A named (keyword) argument
    pub fn named(name: impl Into<String>, value: ExprRef) -> Self {
        FunctionArg {
            name: Some(name.into()),
            value,
            retrieved: Cell::new(false),
        }
    }

    /// Mark the argument as consumed and hand out a new shared reference to
    /// its expression
    fn retrieve(&self) -> ExprRef {
        self.retrieved.set(true);
        self.value.clone()
    }
}

/// The argument container owned by one callable expression node.
///
/// Built exactly once per call site during program construction; read-only
/// afterwards except for the per-argument consumption flags, which are
/// flipped while the call evaluates. A compiled tree therefore must not be
/// evaluated by two workers at once; clone the tree per worker instead.
pub struct FunctionArgs {
    positional: Vec<FunctionArg>,
    named: HashMap<String, FunctionArg>,
}

impl FunctionArgs {
    /// Partition a raw argument list into the container.
    ///
    /// Consumes the list unconditionally. Fails when a positional argument
    /// follows a named one, or when a named argument repeats.
    pub fn new(raw_args: Vec<FunctionArg>) -> Result<Self, Error> {
        let mut positional = Vec::with_capacity(raw_args.len());
        let mut named = HashMap::new();

        let mut has_named = false;
        for arg in raw_args {
            match &arg.name {
                None => {
                    if has_named {
                        return Err(Error::CtorError(
                            "cannot set positional argument after a named argument".into(),
                        ));
                    }
                    positional.push(arg);
                }
                Some(name) => {
                    has_named = true;
                    let name = name.clone();
                    if named.insert(name.clone(), arg).is_some() {
                        return Err(Error::CtorError(format!(
                            "named argument \"{name}\" supplied more than once"
                        )));
                    }
                }
            }
        }

        Ok(FunctionArgs { positional, named })
    }

    /// Number of positional arguments
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// True when the call site carries no arguments at all
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Fetch the expression of a positional argument. Out-of-range indexes
    /// yield None and consume nothing.
    pub fn get_expr(&self, index: usize) -> Option<ExprRef> {
        self.positional.get(index).map(FunctionArg::retrieve)
    }

    /// Fetch and evaluate a positional argument. `Ok(None)` means the index
    /// is out of range; an evaluation failure propagates.
    pub fn get_value(&self, index: usize, ctx: &EvalContext) -> Result<Option<Value>, Error> {
        match self.get_expr(index) {
            None => Ok(None),
            Some(expr) => expr.eval(ctx).map(Some),
        }
    }

    /// Fetch the expression of a named argument, if the keyword was supplied
    pub fn get_named_expr(&self, name: &str) -> Option<ExprRef> {
        self.named.get(name).map(FunctionArg::retrieve)
    }

    /// Fetch and evaluate a named argument. `Ok(None)` means the keyword was
    /// not supplied; a supplied argument evaluating to null is `Ok(Some(Null))`.
    pub fn get_named_value(&self, name: &str, ctx: &EvalContext) -> Result<Option<Value>, Error> {
        match self.get_named_expr(name) {
            None => Ok(None),
            Some(expr) => expr.eval(ctx).map(Some),
        }
    }

    /// String payload of a positional string literal. `Ok(None)` for an
    /// out-of-range index, `Err` when the argument exists but is not a
    /// string literal.
    pub fn get_literal_string(&self, index: usize) -> Result<Option<String>, Error> {
        match self.get_expr(index) {
            None => Ok(None),
            Some(expr) => match expr::extract_literal_string(expr.as_ref()) {
                Some(s) => Ok(Some(s)),
                None => Err(Error::TypeError(format!(
                    "argument {index} must be a string literal"
                ))),
            },
        }
    }

    /// Named-argument counterpart of [`FunctionArgs::get_literal_string`]
    pub fn get_named_literal_string(&self, name: &str) -> Result<Option<String>, Error> {
        match self.get_named_expr(name) {
            None => Ok(None),
            Some(expr) => match expr::extract_literal_string(expr.as_ref()) {
                Some(s) => Ok(Some(s)),
                None => Err(Error::TypeError(format!(
                    "{name} must be a string literal"
                ))),
            },
        }
    }

    /// The evaluated value of a named literal argument. `Err` when the
    /// argument exists but is not a compile-time literal.
    pub fn get_named_literal_value(&self, name: &str) -> Result<Option<Value>, Error> {
        match self.get_named_expr(name) {
            None => Ok(None),
            Some(expr) => {
                if !expr.is_literal() {
                    return Err(Error::TypeError(format!("{name} must be a literal")));
                }
                expr::eval_literal(expr.as_ref()).map(Some)
            }
        }
    }

    /// Numeric kind and payload of a named primitive literal. `Err` covers
    /// "exists but is not a primitive literal" and evaluation failure.
    pub fn get_named_literal_generic_number(
        &self,
        name: &str,
    ) -> Result<Option<GenericNumber>, Error> {
        match self.get_named_expr(name) {
            None => Ok(None),
            Some(expr) => {
                let number = expr::extract_literal_generic_number(expr.as_ref());
                if number.is_nan() {
                    return Err(Error::TypeError(format!(
                        "{name} must be a primitive literal"
                    )));
                }
                Ok(Some(number))
            }
        }
    }

    /// Boolean payload of a named literal. Booleans are integer-kind, so a
    /// floating-point literal is a kind mismatch.
    pub fn get_named_literal_boolean(&self, name: &str) -> Result<Option<bool>, Error> {
        match self.get_named_literal_generic_number(name)? {
            None => Ok(None),
            Some(number) => match number.as_integer() {
                Some(i) => Ok(Some(i != 0)),
                None => Err(Error::TypeError(format!("{name} must be a boolean literal"))),
            },
        }
    }

    /// Integer payload of a named literal
    pub fn get_named_literal_integer(&self, name: &str) -> Result<Option<IntegerType>, Error> {
        match self.get_named_literal_generic_number(name)? {
            None => Ok(None),
            Some(number) => match number.as_integer() {
                Some(i) => Ok(Some(i)),
                None => Err(Error::TypeError(format!(
                    "{name} must be an integer literal"
                ))),
            },
        }
    }

    /// Double payload of a named literal
    pub fn get_named_literal_double(&self, name: &str) -> Result<Option<f64>, Error> {
        match self.get_named_literal_generic_number(name)? {
            None => Ok(None),
            Some(number) => match number.as_double() {
                Some(d) => Ok(Some(d)),
                None => Err(Error::TypeError(format!("{name} must be a double literal"))),
            },
        }
    }

    /// True only when the positional argument exists, is a literal and
    /// evaluates to null
    pub fn is_literal_null(&self, index: usize) -> bool {
        match self.get_expr(index) {
            None => false,
            Some(expr) => expr::is_literal_null(expr.as_ref()),
        }
    }

    /// Named-argument counterpart of [`FunctionArgs::is_literal_null`].
    /// "Supplied as literal null" and "not supplied" stay distinguishable
    /// through this plus [`FunctionArgs::get_named_expr`].
    pub fn is_named_literal_null(&self, name: &str) -> bool {
        match self.get_named_expr(name) {
            None => false,
            Some(expr) => expr::is_literal_null(expr.as_ref()),
        }
    }

    /// Evaluate every positional argument in call order, marking each one
    /// consumed. Fails fast: the first evaluation error aborts and nothing
    /// is returned.
    pub fn eval_positional(&self, ctx: &EvalContext) -> Result<Vec<Value>, Error> {
        let mut values = Vec::with_capacity(self.positional.len());
        for arg in &self.positional {
            values.push(arg.retrieve().eval(ctx)?);
        }
        Ok(values)
    }

    /// Enforce the consumption contracts after a call has read its
    /// arguments.
    ///
    /// A positional argument the callable never fetched can only mean the
    /// callable's implementation is wrong, so that aborts instead of
    /// returning. An unread named argument is reported as an
    /// unexpected-argument error for the user who supplied it.
    pub fn check(&self) -> Result<(), Error> {
        for (index, arg) in self.positional.iter().enumerate() {
            assert!(
                arg.retrieved.get(),
                "positional argument {index} was never retrieved by the function implementation"
            );
        }

        for (name, arg) in &self.named {
            if !arg.retrieved.get() {
                return Err(Error::unexpected_argument(name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{field_ref, literal};
    use crate::value::val;

    fn args(raw: Vec<FunctionArg>) -> FunctionArgs {
        FunctionArgs::new(raw).expect("argument list must be well-formed")
    }

    #[test]
    fn test_positional_order_preserved() {
        let container = args(vec![
            FunctionArg::positional(literal(1)),
            FunctionArg::positional(literal(2)),
            FunctionArg::positional(literal(3)),
        ]);
        let ctx = EvalContext::new();

        assert_eq!(container.len(), 3);
        for (index, expected) in [1, 2, 3].into_iter().enumerate() {
            assert_eq!(
                container.get_value(index, &ctx).unwrap(),
                Some(val(expected))
            );
        }
        assert_eq!(container.get_value(3, &ctx).unwrap(), None);
        container.check().unwrap();
    }

    #[test]
    fn test_positional_after_named_is_ctor_error() {
        let result = FunctionArgs::new(vec![
            FunctionArg::positional(literal(1)),
            FunctionArg::named("mode", literal("strict")),
            FunctionArg::positional(literal(2)),
        ]);
        assert!(matches!(result, Err(Error::CtorError(_))));
    }

    #[test]
    fn test_duplicate_named_is_ctor_error() {
        let result = FunctionArgs::new(vec![
            FunctionArg::named("mode", literal("a")),
            FunctionArg::named("mode", literal("b")),
        ]);
        assert!(matches!(result, Err(Error::CtorError(_))));
    }

    #[test]
    #[should_panic(expected = "never retrieved")]
    fn test_unread_positional_aborts_check() {
        let container = args(vec![FunctionArg::positional(literal(1))]);
        let _ = container.check();
    }

    #[test]
    fn test_unread_named_is_unexpected_argument() {
        let container = args(vec![
            FunctionArg::positional(literal(1)),
            FunctionArg::named("bogus", literal(2)),
        ]);
        container.get_expr(0);

        match container.check() {
            Err(Error::UnexpectedArgument { name, function }) => {
                assert_eq!(name, "bogus");
                assert_eq!(function, None);
            }
            other => panic!("expected unexpected-argument error, got {other:?}"),
        }

        // Once the callable reads it, the same container validates
        container.get_named_expr("bogus");
        container.check().unwrap();
    }

    #[test]
    fn test_named_value_absent_vs_null() {
        let container = args(vec![FunctionArg::named("opt", literal(Value::Null))]);
        let ctx = EvalContext::new();

        // Absent keyword: Ok(None). Supplied literal null: Ok(Some(Null)).
        assert_eq!(container.get_named_value("missing", &ctx).unwrap(), None);
        assert_eq!(
            container.get_named_value("opt", &ctx).unwrap(),
            Some(Value::Null)
        );
        assert!(container.is_named_literal_null("opt"));
        assert!(!container.is_named_literal_null("missing"));
        container.check().unwrap();
    }

    #[test]
    fn test_literal_string_extraction() {
        let container = args(vec![
            FunctionArg::positional(literal("hello")),
            FunctionArg::positional(field_ref("msg")),
        ]);

        let extracted = container.get_literal_string(0).unwrap().unwrap();
        assert_eq!(extracted, "hello");
        assert_eq!(extracted.len(), 5);

        // Non-literal argument: present but unusable, and never evaluated
        assert!(container.get_literal_string(1).is_err());
        // Out of range: absent
        assert_eq!(container.get_literal_string(2).unwrap(), None);
        container.check().unwrap();
    }

    #[test]
    fn test_named_literal_typed_extraction() {
        let container = args(vec![
            FunctionArg::named("n", literal(42)),
            FunctionArg::named("ratio", literal(3.14)),
            FunctionArg::named("flag", literal(true)),
        ]);

        assert_eq!(container.get_named_literal_integer("n").unwrap(), Some(42));
        // wrong kind: double where an integer was requested
        assert!(container.get_named_literal_integer("ratio").is_err());
        assert_eq!(
            container.get_named_literal_double("ratio").unwrap(),
            Some(3.14)
        );
        // booleans are integer-kind
        assert_eq!(
            container.get_named_literal_boolean("flag").unwrap(),
            Some(true)
        );
        assert!(container.get_named_literal_boolean("ratio").is_err());
        // absent: no value, no error
        assert_eq!(container.get_named_literal_integer("missing").unwrap(), None);

        container.check().unwrap();
    }

    #[test]
    fn test_eval_positional_fail_fast() {
        let container = args(vec![
            FunctionArg::positional(literal(1)),
            FunctionArg::positional(field_ref("absent")),
        ]);
        let ctx = EvalContext::new();

        assert!(matches!(
            container.eval_positional(&ctx),
            Err(Error::EvalError(_))
        ));
    }

    #[test]
    fn test_retrieval_is_idempotent() {
        let container = args(vec![FunctionArg::positional(literal(1))]);

        // Repeated fetches are fine; the flag flips once
        container.get_expr(0);
        container.get_expr(0);
        let ctx = EvalContext::new();
        assert_eq!(container.get_value(0, &ctx).unwrap(), Some(val(1)));
        container.check().unwrap();
    }
}
