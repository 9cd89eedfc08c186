//! Output built-ins.
//!
//! These are the only built-ins with an observable effect: they write through
//! the evaluation's [`OutputSink`](super::OutputSink).

use super::{BuiltinFn, BuiltinRegistry};
use crate::ast::Value;

// ============================================================================
// REGISTRATION
// ============================================================================

pub fn register_io_builtins(registry: &mut BuiltinRegistry) {
    registry.register("puts", BUILTIN_PUTS);
}

// ============================================================================
// I/O OPERATIONS
// ============================================================================

/// Emits each argument on its own line.
///
/// Usage: puts(<value>, ...)
///
///   Returns: the list of evaluated arguments.
///
/// Example:
///   puts(1, 2)   emits "1" and "2", returns [1, 2]
pub const BUILTIN_PUTS: BuiltinFn = |args, output| {
    for arg in args {
        output.emit(&arg.to_string(), None);
    }
    log::trace!("puts emitted {} values", args.len());
    Ok(Value::List(args.to_vec()))
};
