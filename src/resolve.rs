//! Name resolution: binding a call site to a callable.
//!
//! Resolution runs once per call site while the filter program is being
//! compiled, never per message. The raw argument list is consumed into a
//! [`FunctionArgs`] container first; if the list is malformed, resolution
//! aborts before any lookup tier runs. The tiers themselves are fixed:
//!
//! - ordinary calls: built-in simple functions, simple-function plugins,
//!   built-in function constructors, function-constructor plugins;
//! - generator calls: built-in generator constructors, generator plugins.
//!
//! The two flavors never see each other's tables. Built-ins always shadow
//! plugins of the same flavor and name. A constructor that fails reports
//! its own, more specific error; "function not found" is raised only when
//! no tier produced anything.

use std::rc::Rc;

use crate::Error;
use crate::args::{FunctionArg, FunctionArgs};
use crate::builtins::{
    builtin_function_ctor_lookup, builtin_generator_function_ctor_lookup,
    builtin_simple_function_lookup,
};
use crate::expr::ExprRef;
use crate::function::SimpleFunction;
use crate::plugin::{Config, PluginContext};

/// Ordinary-call tiers one and two: built-in simple functions, then
/// simple-function plugins
fn lookup_simple_function(cfg: &Config, function_name: &str, args: FunctionArgs) -> ResolveStep {
    let f = match builtin_simple_function_lookup(function_name) {
        Some(f) => f,
        None => {
            // fallback to plugin lookup
            match cfg
                .find_plugin(PluginContext::SimpleFunc, function_name)
                .and_then(|p| p.construct_simple())
            {
                Some(f) => f,
                None => return ResolveStep::NotFound(args),
            }
        }
    };

    ResolveStep::Resolved(Ok(Rc::new(SimpleFunction::new(function_name, args, f))))
}

/// Ordinary-call tiers three and four: built-in function constructors, then
/// function-constructor plugins
fn lookup_function(cfg: &Config, function_name: &str, args: FunctionArgs) -> ResolveStep {
    let ctor = builtin_function_ctor_lookup(function_name).or_else(|| {
        cfg.find_plugin(PluginContext::Func, function_name)
            .and_then(|p| p.construct_ctor())
    });

    match ctor {
        Some(ctor) => ResolveStep::Resolved(ctor(function_name, args)),
        None => ResolveStep::NotFound(args),
    }
}

/// Generator tiers: built-in generator constructors, then generator plugins
fn lookup_generator_function(
    cfg: &Config,
    function_name: &str,
    args: FunctionArgs,
) -> ResolveStep {
    let ctor = builtin_generator_function_ctor_lookup(function_name).or_else(|| {
        cfg.find_plugin(PluginContext::GenFunc, function_name)
            .and_then(|p| p.construct_ctor())
    });

    match ctor {
        Some(ctor) => ResolveStep::Resolved(ctor(function_name, args)),
        None => ResolveStep::NotFound(args),
    }
}

/// Outcome of probing one tier group: either a definitive answer (success
/// or a constructor's own error) or "keep going", handing the unconsumed
/// container back for the next group
enum ResolveStep {
    Resolved(Result<ExprRef, Error>),
    NotFound(FunctionArgs),
}

/// Resolve an ordinary function call.
///
/// Takes ownership of the raw argument list; it is consumed exactly once
/// regardless of outcome.
pub fn resolve_function_call(
    cfg: &Config,
    function_name: &str,
    raw_args: Vec<FunctionArg>,
) -> Result<ExprRef, Error> {
    let args = FunctionArgs::new(raw_args)?;

    let args = match lookup_simple_function(cfg, function_name, args) {
        ResolveStep::Resolved(result) => return result,
        ResolveStep::NotFound(args) => args,
    };

    match lookup_function(cfg, function_name, args) {
        ResolveStep::Resolved(result) => result,
        ResolveStep::NotFound(_) => Err(Error::FunctionNotFound(function_name.to_owned())),
    }
}

/// Resolve a generator function call. Generator names live in their own
/// namespace; ordinary functions are invisible here.
pub fn resolve_generator_call(
    cfg: &Config,
    function_name: &str,
    raw_args: Vec<FunctionArg>,
) -> Result<ExprRef, Error> {
    let args = FunctionArgs::new(raw_args)?;

    match lookup_generator_function(cfg, function_name, args) {
        ResolveStep::Resolved(result) => result,
        ResolveStep::NotFound(_) => Err(Error::FunctionNotFound(function_name.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{EvalContext, literal};
    use crate::function::SimpleCall;
    use crate::value::{Value, val};

    fn plugin_shadowed(_call: &SimpleCall<'_>) -> Result<Value, Error> {
        Ok(val("from plugin"))
    }

    fn plugin_reverse(call: &SimpleCall<'_>) -> Result<Value, Error> {
        let [input] = call.positional() else {
            return Err(call.error("expected exactly one argument"));
        };
        let s = input
            .as_str()
            .ok_or_else(|| call.error("argument must be a string"))?;
        Ok(val(s.chars().rev().collect::<String>()))
    }

    fn failing_ctor(name: &str, args: FunctionArgs) -> Result<ExprRef, Error> {
        args.check()?;
        Err(Error::CtorError(format!("{name} cannot be configured")))
    }

    #[test]
    fn test_builtin_shadows_plugin_of_same_flavor() {
        let mut cfg = Config::new();
        cfg.plugins_mut().register_simple_function("upper", plugin_shadowed);

        let expr = resolve_function_call(
            &cfg,
            "upper",
            vec![FunctionArg::positional(literal("hi"))],
        )
        .unwrap();

        // The built-in won, not the plugin registered under the same name
        assert_eq!(expr.eval(&EvalContext::new()).unwrap(), val("HI"));
    }

    #[test]
    fn test_plugin_fallback_when_no_builtin() {
        let mut cfg = Config::new();
        cfg.plugins_mut().register_simple_function("reverse", plugin_reverse);

        let expr = resolve_function_call(
            &cfg,
            "reverse",
            vec![FunctionArg::positional(literal("abc"))],
        )
        .unwrap();

        assert_eq!(expr.eval(&EvalContext::new()).unwrap(), val("cba"));
    }

    #[test]
    fn test_function_not_found() {
        let cfg = Config::new();
        match resolve_function_call(&cfg, "no_such_function", vec![]) {
            Err(Error::FunctionNotFound(name)) => assert_eq!(name, "no_such_function"),
            other => panic!("expected function-not-found, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_malformed_args_abort_before_lookup() {
        let cfg = Config::new();
        let raw = vec![
            FunctionArg::named("mode", literal("strict")),
            FunctionArg::positional(literal(1)),
        ];

        // Even a resolvable name never gets looked up
        assert!(matches!(
            resolve_function_call(&cfg, "upper", raw),
            Err(Error::CtorError(_))
        ));
    }

    #[test]
    fn test_ctor_error_is_propagated_not_masked() {
        let mut cfg = Config::new();
        cfg.plugins_mut().register_function("strict", failing_ctor);

        match resolve_function_call(&cfg, "strict", vec![]) {
            Err(Error::CtorError(msg)) => assert!(msg.contains("strict")),
            other => panic!("expected the ctor's own error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_generator_namespace_is_disjoint() {
        let cfg = Config::new();

        // "upper" exists as an ordinary builtin but not as a generator
        assert!(matches!(
            resolve_generator_call(&cfg, "upper", vec![]),
            Err(Error::FunctionNotFound(_))
        ));

        // "split" exists as a generator builtin but not as an ordinary call
        let raw = vec![
            FunctionArg::positional(literal("a b")),
            FunctionArg::positional(literal(" ")),
        ];
        let expr = resolve_generator_call(&cfg, "split", raw).unwrap();
        assert_eq!(expr.eval(&EvalContext::new()).unwrap(), val(["a", "b"]));

        assert!(matches!(
            resolve_function_call(
                &cfg,
                "split",
                vec![
                    FunctionArg::positional(literal("a b")),
                    FunctionArg::positional(literal(" ")),
                ]
            ),
            Err(Error::FunctionNotFound(_))
        ));
    }

    #[test]
    fn test_generator_plugin_fallback() {
        let mut cfg = Config::new();
        cfg.plugins_mut().register_generator_function("explode", failing_ctor);

        // The registered ctor is found and its error propagates, proving
        // the plugin tier ran
        assert!(matches!(
            resolve_generator_call(&cfg, "explode", vec![]),
            Err(Error::CtorError(_))
        ));
    }
}
