//! logfilter - call resolution and argument binding for an embedded
//! log-filter expression language
//!
//! This crate implements the layer of a log-processing pipeline's filter
//! language that sits between the parser and the evaluator: given a call
//! site's name and raw argument list, it decides which callable the name
//! refers to (built-in simple function, built-in function constructor,
//! generator function, or a registered plugin), binds the arguments, and
//! enforces that every declared argument was actually consumed.
//!
//! ## Calling convention
//!
//! Call sites carry positional arguments followed by named (keyword)
//! arguments:
//!
//! ```text
//! parse_csv($msg, columns=["host", "program"], delimiter=";")
//! ```
//!
//! Positional arguments must precede all named ones; violating that is a
//! construction error reported while the configuration is loaded, not at
//! message-evaluation time.
//!
//! ## Consumption tracking
//!
//! Every argument records whether the callable ever fetched it. After a
//! call completes, [`args::FunctionArgs::check`] enforces two different
//! contracts:
//!
//! - a positional argument that was never fetched is a defect in the
//!   callable itself and aborts via assertion, and
//! - a named argument that was never fetched means the user supplied a
//!   keyword the callable does not know, which is an ordinary error.
//!
//! ## Modules
//!
//! - `value`: runtime values and the generic-number scalar
//! - `expr`: the expression contract, literal extraction, evaluation context
//! - `args`: the per-call-site argument container
//! - `function`: simple and generator callable wrappers
//! - `plugin`: the plugin registry and resolution scope
//! - `resolve`: the name-resolution fallback chain
//! - `builtins`: the built-in function tables and stock functions
//! - `parse_csv`: the CSV-parsing built-in function
//! - `template`: message templates (feature `template`)
//! - `json`: JSON bridge (feature `json`)
//! - `ack`: batched acknowledgment tracking for processed messages

use std::fmt;

/// Error types for call construction, resolution and evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed argument list shape, detected while the call site is built
    /// (e.g. a positional argument after a named one)
    CtorError(String),
    /// A named argument was supplied but the callable never asked for it
    UnexpectedArgument {
        name: String,
        /// Display name of the enclosing call, filled in by the callable
        /// wrapper once the failure propagates through it
        function: Option<String>,
    },
    /// No built-in table and no plugin resolved the name for the requested
    /// call flavor
    FunctionNotFound(String),
    /// A failure reported by a callable implementation, tagged with the
    /// call's display name
    ArgumentError { function: String, message: String },
    /// Runtime evaluation failure of an expression
    EvalError(String),
    /// A value of the wrong type or kind where a specific one was required
    TypeError(String),
}

impl Error {
    /// Create an UnexpectedArgument error without call-site context
    pub fn unexpected_argument(name: impl Into<String>) -> Self {
        Error::UnexpectedArgument {
            name: name.into(),
            function: None,
        }
    }

    /// Report a failure from inside a callable implementation, tagged with
    /// the call's display name
    pub fn argument_error(function: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ArgumentError {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Attach a call display name to errors that support one. Used by the
    /// callable wrappers so that consumption-check failures name the call
    /// they belong to.
    pub(crate) fn with_function(self, function_name: &str) -> Self {
        match self {
            Error::UnexpectedArgument { name, .. } => Error::UnexpectedArgument {
                name,
                function: Some(function_name.to_owned()),
            },
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CtorError(msg) => write!(f, "ConstructionError: {msg}"),
            Error::UnexpectedArgument { name, function } => match function {
                Some(func) => write!(f, "{func}: unexpected argument \"{name}\""),
                None => write!(f, "unexpected argument \"{name}\""),
            },
            Error::FunctionNotFound(name) => write!(f, "function not found: {name}"),
            Error::ArgumentError { function, message } => write!(f, "{function}: {message}"),
            Error::EvalError(msg) => write!(f, "EvaluationError: {msg}"),
            Error::TypeError(msg) => write!(f, "Type error: {msg}"),
        }
    }
}

pub mod ack;
pub mod args;
pub mod builtins;
pub mod expr;
pub mod function;
pub mod parse_csv;
pub mod plugin;
pub mod resolve;
pub mod value;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "template")]
pub mod template;
