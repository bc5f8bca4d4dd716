//! Virtual machine and embedding API
//!
//! A [`Vm`] owns every module it has run, the built-in classes and the
//! handle table. The host talks to it through a slot array:
//!
//! 1. put values into slots (`get_variable`, `set_slot_handle`, the
//!    [`CallFrame`](finch_sdk::CallFrame) setters on [`Vm::slots`]),
//! 2. [`Vm::call`] a call handle, which reads the receiver from slot 0 and
//!    arguments from slots `1..=arity`,
//! 3. read the result back from slot 0.
//!
//! Native code is reached only through the binding callbacks in
//! [`VmConfig`], consulted once per foreign method when its class is
//! declared.

mod builtins;
pub mod class;
pub mod error;
pub mod handle;
mod interpreter;
pub mod slots;
pub mod value;

use std::cell::Cell;
use std::io::Write;
use std::rc::Weak;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use finch_sdk::{signature, ForeignClassMethods, ForeignMethodRef};
use rustc_hash::FxHashMap;

use self::class::Class;
use self::builtins::CoreClasses;
use self::error::{InterpretError, ReportKind, RuntimeError};
use self::handle::{HandleEntry, HandleTable, ScriptHandle};
use self::interpreter::Frame;
use self::slots::Slots;
use self::value::Value;
use crate::parser;

/// Resolve a foreign method: `(module, class, is_static, signature)`.
pub type BindForeignMethodFn = Box<dyn Fn(&str, &str, bool, &str) -> Option<ForeignMethodRef>>;

/// Resolve the lifecycle of a foreign class: `(module, class)`.
pub type BindForeignClassFn = Box<dyn Fn(&str, &str) -> Option<ForeignClassMethods>>;

/// Return the source of an imported module.
pub type LoadModuleFn = Box<dyn Fn(&str) -> Option<String>>;

/// Receive text written by `System.print` / `System.write`.
pub type WriteFn = Box<dyn Fn(&str)>;

/// Receive an error report: `(kind, module, line, message)`.
pub type ErrorFn = Box<dyn Fn(ReportKind, &str, u32, &str)>;

/// Default limit on nested calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// VM configuration: host callbacks and limits.
pub struct VmConfig {
    /// Foreign method resolver
    pub bind_foreign_method: Option<BindForeignMethodFn>,
    /// Foreign class resolver
    pub bind_foreign_class: Option<BindForeignClassFn>,
    /// Module loader used by `import`
    pub load_module: Option<LoadModuleFn>,
    /// Output sink; stdout when unset
    pub write: Option<WriteFn>,
    /// Error sink; the `log` error channel when unset
    pub error: Option<ErrorFn>,
    /// Maximum nesting of method calls before "Stack overflow."
    pub max_call_depth: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            bind_foreign_method: None,
            bind_foreign_class: None,
            load_module: None,
            write: None,
            error: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

static NEXT_VM_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static LIVE_VMS: Cell<usize> = const { Cell::new(0) };
}

/// Number of VMs alive on the current thread.
pub fn live_vm_count() -> usize {
    LIVE_VMS.with(|count| count.get())
}

/// The virtual machine.
pub struct Vm {
    id: u64,
    pub(crate) config: VmConfig,
    /// Top-level variables per module
    pub(crate) modules: FxHashMap<String, FxHashMap<String, Value>>,
    pub(crate) core: CoreClasses,
    pub(crate) globals: FxHashMap<String, Value>,
    /// Executing frame
    pub(crate) frame: Frame,
    /// Suspended callers of `frame`
    pub(crate) callers: Vec<Frame>,
    /// Every class declared, for teardown
    pub(crate) classes: Vec<Weak<Class>>,
    pub(crate) started: Instant,
    api_slots: Slots,
    handles: HandleTable,
}

impl Vm {
    /// Create a VM.
    pub fn new(config: VmConfig) -> Self {
        let id = NEXT_VM_ID.fetch_add(1, Ordering::Relaxed);
        let core = CoreClasses::new();
        let globals = core.globals();
        LIVE_VMS.with(|count| count.set(count.get() + 1));
        log::debug!("vm {} created", id);
        Self {
            id,
            config,
            modules: FxHashMap::default(),
            core,
            globals,
            frame: Frame::host(),
            callers: Vec::new(),
            classes: Vec::new(),
            started: Instant::now(),
            api_slots: Slots::default(),
            handles: HandleTable::new(id),
        }
    }

    /// Compile and run `source` as module `module`.
    ///
    /// Errors are reported through the error callback and returned.
    pub fn interpret(&mut self, module: &str, source: &str) -> Result<(), InterpretError> {
        let ast = match parser::parse(source) {
            Ok(ast) => ast,
            Err(errors) => {
                for error in &errors {
                    self.report(ReportKind::Compile, module, error.line, &error.message);
                }
                return Err(InterpretError::Compile {
                    module: module.to_string(),
                    errors,
                });
            }
        };
        self.modules.entry(module.to_string()).or_default();
        self.run_module(module, &ast.statements).map_err(|error| {
            self.report_runtime(&error);
            InterpretError::Runtime(error)
        })
    }

    // ========================================================================
    // Slots
    // ========================================================================

    /// The embedding API's slot array.
    pub fn slots(&mut self) -> &mut Slots {
        &mut self.api_slots
    }

    /// Grow the slot array to at least `count` slots.
    pub fn ensure_slots(&mut self, count: usize) {
        use finch_sdk::CallFrame;
        self.api_slots.ensure_slots(count);
    }

    /// Load top-level variable `name` of `module` into `slot`.
    pub fn get_variable(&mut self, module: &str, name: &str, slot: usize) -> Result<(), RuntimeError> {
        let vars = self
            .modules
            .get(module)
            .ok_or_else(|| RuntimeError::api(format!("Module '{}' is not loaded.", module)))?;
        let value = vars.get(name).cloned().ok_or_else(|| {
            RuntimeError::api(format!("Module '{}' has no variable '{}'.", module, name))
        })?;
        self.api_slots
            .set(slot, value)
            .map_err(|e| RuntimeError::api(e.to_string()))
    }

    /// Whether `module` defines a top-level variable `name`.
    pub fn has_variable(&self, module: &str, name: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|vars| vars.contains_key(name))
    }

    // ========================================================================
    // Handles
    // ========================================================================

    /// Retain the value in `slot`.
    pub fn get_slot_handle(&mut self, slot: usize) -> Result<ScriptHandle, RuntimeError> {
        let value = self
            .api_slots
            .value(slot)
            .map_err(|e| RuntimeError::api(e.to_string()))?
            .clone();
        Ok(self.handles.acquire(HandleEntry::Value(value)))
    }

    /// Store a retained value into `slot`.
    pub fn set_slot_handle(&mut self, slot: usize, handle: &ScriptHandle) -> Result<(), RuntimeError> {
        let value = match self.handles.get(handle) {
            Some(HandleEntry::Value(value)) => value.clone(),
            Some(HandleEntry::Call { .. }) => {
                return Err(RuntimeError::api("Handle refers to a call signature, not a value."))
            }
            None => return Err(RuntimeError::api("Handle is released or belongs to another VM.")),
        };
        self.api_slots
            .set(slot, value)
            .map_err(|e| RuntimeError::api(e.to_string()))
    }

    /// Create a handle that invokes `signature` on whatever slot 0 holds.
    pub fn make_call_handle(&mut self, signature: &str) -> Result<ScriptHandle, RuntimeError> {
        let arity = signature::arity(signature)
            .ok_or_else(|| RuntimeError::api(format!("Invalid signature '{}'.", signature)))?;
        Ok(self.handles.acquire(HandleEntry::Call {
            signature: signature.to_string(),
            arity,
        }))
    }

    /// Invoke a call handle: receiver in slot 0, arguments in slots
    /// `1..=arity`. The result replaces slot 0.
    pub fn call(&mut self, method: &ScriptHandle) -> Result<(), RuntimeError> {
        let (signature, arity) = match self.handles.get(method) {
            Some(HandleEntry::Call { signature, arity }) => (signature.clone(), *arity),
            Some(HandleEntry::Value(_)) => {
                return Err(RuntimeError::api("Handle refers to a value, not a call signature."))
            }
            None => return Err(RuntimeError::api("Handle is released or belongs to another VM.")),
        };
        let receiver = self
            .api_slots
            .value(0)
            .map_err(|e| RuntimeError::api(e.to_string()))?
            .clone();
        let args = self
            .api_slots
            .range(1, arity)
            .map_err(|e| RuntimeError::api(e.to_string()))?;

        match self.invoke(receiver, &signature, args, 0) {
            Ok(result) => self
                .api_slots
                .set(0, result)
                .map_err(|e| RuntimeError::api(e.to_string())),
            Err(error) => {
                self.report_runtime(&error);
                Err(error)
            }
        }
    }

    /// Release a handle. Returns false if it was already invalid.
    pub fn release_handle(&mut self, handle: ScriptHandle) -> bool {
        self.handles.release(handle).is_some()
    }

    /// Number of handles not yet released.
    pub fn handle_count(&self) -> usize {
        self.handles.live()
    }

    /// Whether the value in `slot` has a method with `signature`.
    pub fn responds_to(&self, slot: usize, signature: &str) -> bool {
        let Ok(value) = self.api_slots.value(slot) else {
            return false;
        };
        match value {
            Value::Class(class) => class.find_static(signature).is_some(),
            other => self.core.class_of(other).find_method(signature).is_some(),
        }
    }

    // ========================================================================
    // Output and reporting
    // ========================================================================

    pub(crate) fn write(&self, text: &str) {
        match &self.config.write {
            Some(write) => write(text),
            None => {
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }
        }
    }

    pub(crate) fn report(&self, kind: ReportKind, module: &str, line: u32, message: &str) {
        match &self.config.error {
            Some(error) => error(kind, module, line, message),
            None => match kind {
                ReportKind::Compile => log::error!("[{} line {}] {}", module, line, message),
                ReportKind::Runtime => log::error!("{}", message),
                ReportKind::StackTrace => log::error!("[{} line {}] in {}", module, line, message),
            },
        }
    }

    pub(crate) fn report_runtime(&self, error: &RuntimeError) {
        let (module, line) = error.origin().unwrap_or(("", 0));
        self.report(ReportKind::Runtime, module, line, &error.message);
        for frame in &error.trace {
            self.report(ReportKind::StackTrace, &frame.module, frame.line, &frame.function);
        }
    }
}

impl Drop for Vm {
    fn drop(&mut self) {
        self.handles.clear();
        self.api_slots.clear();
        self.modules.clear();
        self.callers.clear();
        // Static fields can hold instances of their own class
        for class in self.classes.drain(..) {
            if let Some(class) = class.upgrade() {
                class.static_fields.borrow_mut().clear();
            }
        }
        LIVE_VMS.with(|count| count.set(count.get().saturating_sub(1)));
        log::debug!("vm {} dropped", self.id);
    }
}

impl std::fmt::Debug for Vm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vm")
            .field("id", &self.id)
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .field("handles", &self.handles.live())
            .finish()
    }
}
