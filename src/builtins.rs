// # Weft Built-in Functions
//
// Function calls are resolved against an explicit `BuiltinRegistry`, a fixed
// table from name to native function. Arguments are always evaluated left to
// right before the built-in runs; a built-in only ever sees values.
//
// ## Module Structure
//
// - **`io`**: output built-ins (`puts`)

use im::HashMap;

use crate::ast::Value;
use crate::errors::WeftError;
use crate::syntax::Span;

pub mod io;

/// Native function signature shared by all built-ins.
pub type BuiltinFn = fn(args: &[Value], output: &mut dyn OutputSink) -> Result<Value, WeftError>;

// Output sink for `puts`, etc., to make I/O testable and injectable.
pub trait OutputSink {
    fn emit(&mut self, text: &str, span: Option<&Span>);
}

// A null output sink for running without output.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str, _span: Option<&Span>) {}
}

// Registry for all built-ins, inspectable at runtime.
#[derive(Default, Clone)]
pub struct BuiltinRegistry {
    pub builtins: HashMap<String, BuiltinFn>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<BuiltinFn> {
        self.builtins.get(name).copied()
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builtins.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn register(&mut self, name: &str, func: BuiltinFn) {
        self.builtins.insert(name.to_string(), func);
    }

    pub fn remove(&mut self, name: &str) -> Option<BuiltinFn> {
        self.builtins.remove(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtins.is_empty()
    }
}

/// The registry every evaluation starts from.
pub fn standard() -> BuiltinRegistry {
    let mut registry = BuiltinRegistry::new();
    io::register_io_builtins(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_holds_puts_only() {
        let registry = standard();
        assert_eq!(registry.list(), vec!["puts".to_string()]);
        assert!(registry.get("print").is_none());
    }

    #[test]
    fn registry_is_extensible() {
        fn nil(_: &[Value], _: &mut dyn OutputSink) -> Result<Value, WeftError> {
            Ok(Value::Nil)
        }
        let mut registry = standard();
        registry.register("nil", nil);
        assert!(registry.has("nil"));
        assert_eq!(registry.len(), 2);
        assert!(registry.remove("nil").is_some());
    }
}
