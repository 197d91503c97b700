//! Built-in function registry.
//!
//! Every function compiled into the crate is declared here, in one
//! auditable collection, and exposed to resolution through per-flavor
//! lookup tables. The tables are process-wide, populated once at first use
//! and never mutated afterwards, so resolution can read them without
//! locking.
//!
//! ## Adding a new built-in
//!
//! 1. **Implement the function**: a [`SimpleFn`] for plain functions, a
//!    [`crate::function::GeneratorFn`] plus a small ctor for generators, or a full
//!    [`FunctionCtor`] for functions that pre-process their arguments at
//!    construction time (see the `parse_csv` module for the pattern).
//! 2. **Add it to BUILTIN_FUNCTIONS** with the flavor-appropriate
//!    [`FunctionKind`].
//! 3. **Add tests** covering its argument contract and edge cases.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::Error;
use crate::args::FunctionArgs;
use crate::expr::ExprRef;
use crate::function::{FunctionCtor, SimpleCall, SimpleFn, ValueSeq, generator_function_expr};
use crate::value::{Value, val};

/// The implementation of a built-in, determining which flavor's table it
/// lands in
#[derive(Clone, Copy)]
pub enum FunctionKind {
    /// Plain function under the ordinary-call flavor
    Simple(SimpleFn),
    /// Constructor-based function under the ordinary-call flavor
    Ctor(FunctionCtor),
    /// Constructor-based function under the generator flavor
    GeneratorCtor(FunctionCtor),
}

/// One built-in registration
pub struct Builtin {
    pub name: &'static str,
    pub kind: FunctionKind,
}

//
// Builtin Function Implementations
//

/// `upper(str)` - uppercase a string
fn builtin_upper(call: &SimpleCall<'_>) -> Result<Value, Error> {
    let [input] = call.positional() else {
        return Err(call.error("expected exactly one argument"));
    };
    let s = input
        .as_str()
        .ok_or_else(|| call.error("argument must be a string"))?;
    Ok(val(s.to_uppercase()))
}

/// `lower(str)` - lowercase a string
fn builtin_lower(call: &SimpleCall<'_>) -> Result<Value, Error> {
    let [input] = call.positional() else {
        return Err(call.error("expected exactly one argument"));
    };
    let s = input
        .as_str()
        .ok_or_else(|| call.error("argument must be a string"))?;
    Ok(val(s.to_lowercase()))
}

/// `len(value)` - element count of a string, list or dict
fn builtin_len(call: &SimpleCall<'_>) -> Result<Value, Error> {
    let [input] = call.positional() else {
        return Err(call.error("expected exactly one argument"));
    };
    let len = input
        .len()
        .ok_or_else(|| call.error("argument has no length"))?;
    Ok(val(len as i64))
}

/// The generator behind `split(msg, separator)`
fn split_generator(call: &SimpleCall<'_>) -> Result<ValueSeq, Error> {
    let [input, separator] = call.positional() else {
        return Err(call.error("expected exactly two arguments"));
    };
    let input = input
        .as_str()
        .ok_or_else(|| call.error("input must be a string"))?;
    let separator = separator
        .as_str()
        .ok_or_else(|| call.error("separator must be a string"))?;
    if separator.is_empty() {
        return Err(call.error("separator must not be empty"));
    }

    let pieces: Vec<String> = input.split(separator).map(str::to_owned).collect();
    Ok(Box::new(pieces.into_iter().map(|piece| Ok(val(piece)))))
}

/// Ctor registering `split` under the generator flavor
fn split_ctor(function_name: &str, args: FunctionArgs) -> Result<ExprRef, Error> {
    Ok(generator_function_expr(function_name, args, split_generator))
}

/// Global registry of all built-in functions, one contiguous collection for
/// ease of auditing
static BUILTIN_FUNCTIONS: LazyLock<Vec<Builtin>> = LazyLock::new(|| {
    let mut builtins = vec![
        Builtin {
            name: "upper",
            kind: FunctionKind::Simple(builtin_upper),
        },
        Builtin {
            name: "lower",
            kind: FunctionKind::Simple(builtin_lower),
        },
        Builtin {
            name: "len",
            kind: FunctionKind::Simple(builtin_len),
        },
        Builtin {
            name: "parse_csv",
            kind: FunctionKind::Ctor(crate::parse_csv::parse_csv_ctor),
        },
        Builtin {
            name: "split",
            kind: FunctionKind::GeneratorCtor(split_ctor),
        },
    ];

    #[cfg(feature = "json")]
    {
        builtins.push(Builtin {
            name: "parse_json",
            kind: FunctionKind::Simple(crate::json::builtin_parse_json),
        });
        builtins.push(Builtin {
            name: "format_json",
            kind: FunctionKind::Simple(crate::json::builtin_format_json),
        });
    }

    builtins
});

/// Simple-function table for the ordinary-call flavor
static BUILTIN_SIMPLE: LazyLock<HashMap<&'static str, SimpleFn>> = LazyLock::new(|| {
    BUILTIN_FUNCTIONS
        .iter()
        .filter_map(|b| match b.kind {
            FunctionKind::Simple(f) => Some((b.name, f)),
            _ => None,
        })
        .collect()
});

/// Constructor table for the ordinary-call flavor
static BUILTIN_CTORS: LazyLock<HashMap<&'static str, FunctionCtor>> = LazyLock::new(|| {
    BUILTIN_FUNCTIONS
        .iter()
        .filter_map(|b| match b.kind {
            FunctionKind::Ctor(ctor) => Some((b.name, ctor)),
            _ => None,
        })
        .collect()
});

/// Constructor table for the generator flavor
static BUILTIN_GENERATOR_CTORS: LazyLock<HashMap<&'static str, FunctionCtor>> =
    LazyLock::new(|| {
        BUILTIN_FUNCTIONS
            .iter()
            .filter_map(|b| match b.kind {
                FunctionKind::GeneratorCtor(ctor) => Some((b.name, ctor)),
                _ => None,
            })
            .collect()
    });

/// Look up a built-in simple function by name
pub(crate) fn builtin_simple_function_lookup(name: &str) -> Option<SimpleFn> {
    BUILTIN_SIMPLE.get(name).copied()
}

/// Look up a built-in function constructor by name
pub(crate) fn builtin_function_ctor_lookup(name: &str) -> Option<FunctionCtor> {
    BUILTIN_CTORS.get(name).copied()
}

/// Look up a built-in generator function constructor by name
pub(crate) fn builtin_generator_function_ctor_lookup(name: &str) -> Option<FunctionCtor> {
    BUILTIN_GENERATOR_CTORS.get(name).copied()
}

/// All registered built-ins, for auditing and registry tests
pub fn get_builtin_functions() -> &'static [Builtin] {
    BUILTIN_FUNCTIONS.as_slice()
}
