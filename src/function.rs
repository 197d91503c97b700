//! Callable wrappers: adapting native functions to the expression tree.
//!
//! A resolved call site becomes one of two node kinds. [`SimpleFunction`]
//! wraps a plain native function that receives its positional arguments
//! already evaluated; [`GeneratorFunction`] wraps a native function that
//! produces a lazy sequence of values instead of a single one. Both follow
//! the same protocol per evaluation: evaluate the positionals fail-fast,
//! invoke the native function, then validate argument consumption with
//! [`FunctionArgs::check`] and tag any validation failure with the call's
//! display name.
//!
//! General functions (those that want to pre-process their arguments at
//! construction time) don't go through a wrapper at all; they are built by
//! a [`FunctionCtor`] that owns its argument handling and is expected to
//! call `check()` itself before construction finishes.

use std::rc::Rc;

use crate::Error;
use crate::args::FunctionArgs;
use crate::expr::{EvalContext, Expr, ExprRef};
use crate::value::Value;

/// Render the diagnostic display name of a call, fixed at construction
fn display_name(function_name: &str) -> String {
    format!("{function_name}()")
}

/// The view a native function gets of its call site: the evaluated
/// positional array plus the container for named-argument reads.
pub struct SimpleCall<'a> {
    function_name: &'a str,
    args: &'a FunctionArgs,
    positional: &'a [Value],
    ctx: &'a EvalContext,
}

impl SimpleCall<'_> {
    /// The call's display name, e.g. `"upper()"`
    pub fn function_name(&self) -> &str {
        self.function_name
    }

    /// The evaluated positional arguments, in call order
    pub fn positional(&self) -> &[Value] {
        self.positional
    }

    /// The full retrieval API, for named-argument reads
    pub fn args(&self) -> &FunctionArgs {
        self.args
    }

    /// The per-message evaluation state
    pub fn ctx(&self) -> &EvalContext {
        self.ctx
    }

    /// Shorthand for failing the call with a message tagged with its
    /// display name
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::argument_error(self.function_name, message)
    }
}

/// A plain native function: evaluated arguments in, one value out
pub type SimpleFn = fn(&SimpleCall<'_>) -> Result<Value, Error>;

/// A lazy sequence of produced values
pub type ValueSeq = Box<dyn Iterator<Item = Result<Value, Error>>>;

/// A native generator function: evaluated arguments in, lazy sequence out
pub type GeneratorFn = fn(&SimpleCall<'_>) -> Result<ValueSeq, Error>;

/// Constructor for general functions and generator functions: consumes the
/// argument container and builds the call-site expression node
pub type FunctionCtor = fn(&str, FunctionArgs) -> Result<ExprRef, Error>;

/// A call site bound to a native simple function
pub struct SimpleFunction {
    function_name: String,
    args: FunctionArgs,
    function: SimpleFn,
}

impl SimpleFunction {
    /// Takes ownership of the argument container; it is released when this
    /// node is dropped
    pub fn new(function_name: &str, args: FunctionArgs, function: SimpleFn) -> Self {
        SimpleFunction {
            function_name: display_name(function_name),
            args,
            function,
        }
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    fn invoke(&self, ctx: &EvalContext) -> Result<Value, Error> {
        let positional = if self.args.is_empty() {
            Vec::new()
        } else {
            self.args.eval_positional(ctx)?
        };

        let call = SimpleCall {
            function_name: &self.function_name,
            args: &self.args,
            positional: &positional,
            ctx,
        };
        let result = (self.function)(&call)?;

        // Consumption is validated only on successful calls; a failed call
        // may legitimately have stopped before reading everything.
        self.args
            .check()
            .map_err(|e| e.with_function(&self.function_name))?;
        Ok(result)
    }
}

impl Expr for SimpleFunction {
    fn eval(&self, ctx: &EvalContext) -> Result<Value, Error> {
        self.invoke(ctx)
    }
}

/// The generator contract: a node that produces a sequence of values per
/// message rather than a single value
pub trait Generator {
    fn generate(&self, ctx: &EvalContext) -> Result<ValueSeq, Error>;
}

/// A call site bound to a native generator function.
///
/// Also an expression: evaluating it materializes the generated sequence
/// into a list, which is how a generator call splices into contexts that
/// expect a single value.
pub struct GeneratorFunction {
    function_name: String,
    args: FunctionArgs,
    function: GeneratorFn,
}

impl GeneratorFunction {
    pub fn new(function_name: &str, args: FunctionArgs, function: GeneratorFn) -> Self {
        GeneratorFunction {
            function_name: display_name(function_name),
            args,
            function,
        }
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }
}

impl Generator for GeneratorFunction {
    fn generate(&self, ctx: &EvalContext) -> Result<ValueSeq, Error> {
        let positional = if self.args.is_empty() {
            Vec::new()
        } else {
            self.args.eval_positional(ctx)?
        };

        let call = SimpleCall {
            function_name: &self.function_name,
            args: &self.args,
            positional: &positional,
            ctx,
        };
        let seq = (self.function)(&call)?;

        self.args
            .check()
            .map_err(|e| e.with_function(&self.function_name))?;
        Ok(seq)
    }
}

impl Expr for GeneratorFunction {
    fn eval(&self, ctx: &EvalContext) -> Result<Value, Error> {
        let mut items = Vec::new();
        for item in self.generate(ctx)? {
            items.push(item?);
        }
        Ok(Value::List(items))
    }
}

/// Convenience for ctors that wrap a generator function
pub fn generator_function_expr(
    function_name: &str,
    args: FunctionArgs,
    function: GeneratorFn,
) -> ExprRef {
    Rc::new(GeneratorFunction::new(function_name, args, function))
}
