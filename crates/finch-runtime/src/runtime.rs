//! Script runtime handle
//!
//! Owns one [`Vm`] with the foreign registries installed as its binding
//! callbacks. The registries are built before the VM and are read-only
//! afterwards; the VM consults them the first time each foreign declaration
//! executes.

use std::path::PathBuf;

use finch_engine::{ErrorFn, InterpretError, Vm, VmConfig, WriteFn};
use finch_sdk::{ForeignClassRegistry, ForeignMethodRegistry};
use finch_stdlib::{GUI_MODULE, GUI_MODULE_SOURCE};

/// Extension of script modules loaded from the resource directory.
pub const MODULE_EXTENSION: &str = "finch";

/// Options for [`RuntimeHandle::create`].
pub struct RuntimeOptions {
    /// Directory searched for imported modules other than `gui`
    pub module_dir: PathBuf,
    /// Nested calls allowed before a "Stack overflow." error
    pub max_call_depth: usize,
    /// Output sink; stdout when unset
    pub write: Option<WriteFn>,
    /// Error sink; the log error channel when unset
    pub error: Option<ErrorFn>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            module_dir: PathBuf::from("."),
            max_call_depth: finch_engine::DEFAULT_MAX_CALL_DEPTH,
            write: None,
            error: None,
        }
    }
}

/// An interpreter bound to a fixed set of native functions and classes.
pub struct RuntimeHandle {
    vm: Vm,
}

impl RuntimeHandle {
    /// Create the interpreter with both registries installed.
    pub fn create(methods: ForeignMethodRegistry, classes: ForeignClassRegistry, options: RuntimeOptions) -> Self {
        log::debug!(
            "creating runtime: {} foreign methods, {} foreign classes",
            methods.len(),
            classes.len()
        );
        let module_dir = options.module_dir;
        let config = VmConfig {
            bind_foreign_method: Some(Box::new(move |module: &str, class: &str, is_static: bool, sig: &str| {
                methods.resolve(module, class, is_static, sig)
            })),
            bind_foreign_class: Some(Box::new(move |module: &str, class: &str| classes.resolve(module, class))),
            load_module: Some(Box::new(move |name: &str| load_module(&module_dir, name))),
            write: options.write,
            error: options.error,
            max_call_depth: options.max_call_depth,
        };
        Self { vm: Vm::new(config) }
    }

    /// Compile and execute `source` as `module`.
    pub fn run(&mut self, module: &str, source: &str) -> Result<(), InterpretError> {
        self.vm.interpret(module, source)
    }

    /// The interpreter, for the slot and handle API.
    pub fn vm(&mut self) -> &mut Vm {
        &mut self.vm
    }

    /// Free the interpreter and everything it still retains.
    pub fn destroy(self) {
        drop(self.vm);
    }
}

/// Source of an imported module: the built-in `gui` module, or
/// `<dir>/<name>.finch`.
fn load_module(dir: &std::path::Path, name: &str) -> Option<String> {
    if name == GUI_MODULE {
        return Some(GUI_MODULE_SOURCE.to_string());
    }
    // Module names are plain identifiers, never paths
    if name.is_empty() || name.contains(['/', '\\', '.']) {
        log::warn!("refusing to load module '{}'", name);
        return None;
    }
    let path = dir.join(name).with_extension(MODULE_EXTENSION);
    match std::fs::read_to_string(&path) {
        Ok(source) => {
            log::debug!("loaded module '{}' from {}", name, path.display());
            Some(source)
        }
        Err(e) => {
            log::debug!("module '{}' not found at {}: {}", name, path.display(), e);
            None
        }
    }
}
