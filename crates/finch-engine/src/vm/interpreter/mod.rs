//! Tree-walking interpreter
//!
//! Execution state is one [`Frame`] per active method plus the module
//! frame at the bottom. Statements are in `stmt`, expressions in `expr`,
//! method dispatch and class definition in `call`.

mod call;
mod expr;
mod stmt;

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::class::Class;
use super::error::RuntimeError;
use super::value::Value;
use super::Vm;
use crate::parser::ast::{MethodDecl, Stmt};

/// Function name recorded in stack traces for module-level code.
pub(crate) const SCRIPT_FUNCTION: &str = "(script)";

/// Activation record of a method or module body.
pub(crate) struct Frame {
    /// Block scopes, innermost last
    scopes: Vec<FxHashMap<String, Value>>,
    /// Receiver; `None` at module level
    pub(crate) this: Option<Value>,
    /// Class that declares the executing method
    pub(crate) class: Option<Rc<Class>>,
    pub(crate) module: Rc<str>,
    pub(crate) method: Option<Rc<MethodDecl>>,
    pub(crate) is_static: bool,
    /// Line being executed
    pub(crate) line: u32,
}

impl Frame {
    /// Frame the VM sits in between host calls.
    pub(crate) fn host() -> Self {
        Self::module(Rc::from(""))
    }

    pub(crate) fn module(module: Rc<str>) -> Self {
        Self {
            scopes: Vec::new(),
            this: None,
            class: None,
            module,
            method: None,
            is_static: false,
            line: 0,
        }
    }

    pub(crate) fn method(
        module: Rc<str>,
        this: Value,
        class: Rc<Class>,
        method: Rc<MethodDecl>,
        params: FxHashMap<String, Value>,
    ) -> Self {
        Self {
            scopes: vec![params],
            this: Some(this),
            class: Some(class),
            module,
            is_static: method.is_static,
            line: method.line,
            method: Some(method),
        }
    }

    /// Module-level code defines module variables; anything inside a block or
    /// method defines locals.
    fn at_module_level(&self) -> bool {
        self.method.is_none() && self.scopes.is_empty()
    }

    /// Trace label: `Class.signature` or `(script)`.
    pub(crate) fn function_name(&self) -> String {
        match (&self.class, &self.method) {
            (Some(class), Some(method)) => format!("{}.{}", class.name, method.signature()),
            _ => SCRIPT_FUNCTION.to_string(),
        }
    }
}

/// How a statement completed.
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

impl Vm {
    // ========================================================================
    // Frames
    // ========================================================================

    /// Make `frame` current, failing when the call depth limit is reached.
    pub(crate) fn push_frame(&mut self, frame: Frame) -> Result<(), RuntimeError> {
        if self.callers.len() >= self.config.max_call_depth {
            return Err(RuntimeError::script("Stack overflow."));
        }
        let caller = std::mem::replace(&mut self.frame, frame);
        self.callers.push(caller);
        Ok(())
    }

    /// Restore the caller of the current frame.
    pub(crate) fn pop_frame(&mut self) -> Frame {
        match self.callers.pop() {
            Some(caller) => std::mem::replace(&mut self.frame, caller),
            None => std::mem::replace(&mut self.frame, Frame::host()),
        }
    }

    /// Run a module body in a fresh module frame.
    pub(crate) fn run_module(&mut self, module: &str, statements: &[Stmt]) -> Result<(), RuntimeError> {
        self.push_frame(Frame::module(Rc::from(module)))?;
        let result = self.exec_block_in_place(statements);
        let frame = self.pop_frame();
        match result {
            Ok(_) => Ok(()),
            Err(mut error) => {
                error.push_frame(&frame.module, frame.line, frame.function_name());
                Err(error)
            }
        }
    }

    // ========================================================================
    // Variables
    // ========================================================================

    pub(crate) fn push_scope(&mut self) {
        self.frame.scopes.push(FxHashMap::default());
    }

    pub(crate) fn pop_scope(&mut self) {
        self.frame.scopes.pop();
    }

    /// Declare a variable in the innermost scope, or in the module when
    /// executing module-level code.
    pub(crate) fn define_variable(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if self.frame.at_module_level() {
            let module = self.frame.module.clone();
            let vars = self.modules.entry(module.to_string()).or_default();
            if vars.contains_key(name) {
                return Err(RuntimeError::script(format!(
                    "Module variable '{}' is already defined.",
                    name
                )));
            }
            vars.insert(name.to_string(), value);
            return Ok(());
        }
        self.define_local(name, value);
        Ok(())
    }

    pub(crate) fn define_local(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.frame.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Resolve a bare name: locals, then module variables, then core classes.
    pub(crate) fn lookup_variable(&self, name: &str) -> Option<Value> {
        for scope in self.frame.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Some(value.clone());
            }
        }
        if let Some(value) = self
            .modules
            .get(&*self.frame.module)
            .and_then(|vars| vars.get(name))
        {
            return Some(value.clone());
        }
        self.globals.get(name).cloned()
    }

    /// Assign to an existing local or module variable. Returns false when no
    /// such variable exists.
    pub(crate) fn assign_variable(&mut self, name: &str, value: Value) -> bool {
        for scope in self.frame.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        if let Some(slot) = self
            .modules
            .get_mut(&*self.frame.module)
            .and_then(|vars| vars.get_mut(name))
        {
            *slot = value;
            return true;
        }
        false
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Text of a value as `System.print` shows it. Instances with a
    /// `toString` method use it.
    pub(crate) fn stringify(&mut self, value: &Value) -> Result<String, RuntimeError> {
        use super::value::format_num;
        Ok(match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Num(n) => format_num(*n),
            Value::Str(s) => s.to_string(),
            Value::Handle(h) => format!("handle {}", h),
            Value::Range(r) => format!(
                "{}{}{}",
                format_num(r.from),
                if r.inclusive { ".." } else { "..." },
                format_num(r.to)
            ),
            Value::List(items) => {
                let items = items.borrow().clone();
                let mut parts = Vec::with_capacity(items.len());
                for item in &items {
                    parts.push(self.stringify(item)?);
                }
                format!("[{}]", parts.join(", "))
            }
            Value::Class(class) => class.name.clone(),
            Value::Instance(_) | Value::Foreign(_) => {
                let class = self.core.class_of(value);
                if class.find_method("toString").is_some() {
                    let text = self.invoke(value.clone(), "toString", Vec::new(), self.frame.line)?;
                    match text {
                        Value::Str(s) => s.to_string(),
                        other => self.stringify(&other)?,
                    }
                } else {
                    format!("instance of {}", class.name)
                }
            }
        })
    }
}
