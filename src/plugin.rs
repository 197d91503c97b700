//! Dynamically registered functions and the configuration scope.
//!
//! Built-in tables cover the functions compiled into the crate; everything
//! else arrives through a [`PluginRegistry`] owned by the [`Config`] that
//! scopes a resolution. Registration happens while the configuration is
//! being assembled, strictly before any call site resolves against it; the
//! registry is read-only afterwards.
//!
//! The three call flavors live in disjoint namespaces: a name registered as
//! a generator function is invisible to ordinary call resolution and vice
//! versa.

use std::collections::HashMap;

use crate::function::{FunctionCtor, SimpleFn};

/// Which flavor of callable a lookup is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginContext {
    /// Ordinary call, plain native function
    SimpleFunc,
    /// Ordinary call, constructor-based function
    Func,
    /// Generator call
    GenFunc,
}

/// What a plugin registration provides
#[derive(Clone, Copy)]
enum PluginCandidate {
    Simple(SimpleFn),
    Ctor(FunctionCtor),
}

/// One registered plugin: a name within a flavor context plus the native
/// entry point its module provided
pub struct Plugin {
    name: String,
    candidate: PluginCandidate,
}

impl Plugin {
    /// The native simple function, if that is what this plugin provides
    pub fn construct_simple(&self) -> Option<SimpleFn> {
        match self.candidate {
            PluginCandidate::Simple(f) => Some(f),
            PluginCandidate::Ctor(_) => None,
        }
    }

    /// The function constructor, if that is what this plugin provides
    pub fn construct_ctor(&self) -> Option<FunctionCtor> {
        match self.candidate {
            PluginCandidate::Ctor(ctor) => Some(ctor),
            PluginCandidate::Simple(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Name-to-plugin mapping per flavor context
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<(PluginContext, String), Plugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    fn register(&mut self, context: PluginContext, name: &str, candidate: PluginCandidate) {
        self.plugins.insert(
            (context, name.to_owned()),
            Plugin {
                name: name.to_owned(),
                candidate,
            },
        );
    }

    /// Register a plain native function under the simple-function flavor
    pub fn register_simple_function(&mut self, name: &str, function: SimpleFn) {
        self.register(PluginContext::SimpleFunc, name, PluginCandidate::Simple(function));
    }

    /// Register a constructor-based function under the ordinary-call flavor
    pub fn register_function(&mut self, name: &str, ctor: FunctionCtor) {
        self.register(PluginContext::Func, name, PluginCandidate::Ctor(ctor));
    }

    /// Register a constructor-based function under the generator flavor
    pub fn register_generator_function(&mut self, name: &str, ctor: FunctionCtor) {
        self.register(PluginContext::GenFunc, name, PluginCandidate::Ctor(ctor));
    }

    pub fn find(&self, context: PluginContext, name: &str) -> Option<&Plugin> {
        self.plugins.get(&(context, name.to_owned()))
    }
}

/// The configuration object that scopes a resolution: call sites resolve
/// against the plugins their configuration carries
#[derive(Default)]
pub struct Config {
    plugins: PluginRegistry,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    /// Look up a plugin by flavor context and name
    pub fn find_plugin(&self, context: PluginContext, name: &str) -> Option<&Plugin> {
        self.plugins.find(context, name)
    }
}
