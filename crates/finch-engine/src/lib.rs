//! Finch Script Engine
//!
//! This crate provides the embedded scripting language used by Finch hosts:
//! - **Parser**: logos lexer and recursive-descent parser (`parser` module)
//! - **VM**: tree-walking interpreter, slot-based embedding API and
//!   retained handles (`vm` module)
//!
//! Native code plugs in through the binding callbacks of [`VmConfig`],
//! using the types from `finch-sdk`.
//!
//! # Example
//!
//! ```rust,ignore
//! use finch_engine::{Vm, VmConfig};
//!
//! let mut vm = Vm::new(VmConfig::default());
//! vm.interpret("main", "class App {\n static greet(name) { \"hi \" + name }\n}")?;
//!
//! vm.ensure_slots(2);
//! vm.get_variable("main", "App", 0)?;
//! vm.slots().set_str(1, "finch")?;
//! let greet = vm.make_call_handle("greet(_)")?;
//! vm.call(&greet)?;
//! assert_eq!(vm.slots().get_str(0)?, "hi finch");
//! vm.release_handle(greet);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Parser module: lexer, tokens, AST and parser
pub mod parser;

/// VM module: interpreter, values, classes and the embedding API
pub mod vm;

// ============================================================================
// Re-exports
// ============================================================================

pub use parser::{parse, ParseError};
pub use vm::class::Class;
pub use vm::error::{CompileError, ErrorKind, InterpretError, ReportKind, RuntimeError, TraceFrame};
pub use vm::handle::ScriptHandle;
pub use vm::slots::Slots;
pub use vm::value::Value;
pub use vm::{
    live_vm_count, BindForeignClassFn, BindForeignMethodFn, ErrorFn, LoadModuleFn, Vm, VmConfig, WriteFn,
    DEFAULT_MAX_CALL_DEPTH,
};
