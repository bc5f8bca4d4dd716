//! Class objects and method tables

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use finch_sdk::{ForeignClassMethods, ForeignMethodRef};
use rustc_hash::FxHashMap;

use super::error::RuntimeError;
use super::value::Value;
use super::Vm;
use crate::parser::ast::MethodDecl;

/// Built-in method implemented in Rust.
pub(crate) type Primitive = fn(&mut Vm, &Value, Vec<Value>) -> Result<Value, RuntimeError>;

/// One entry of a method table.
#[derive(Clone)]
pub(crate) enum Method {
    /// Method written in script
    Script(Rc<MethodDecl>),
    /// `construct` initializer; lives in the static table
    Constructor(Rc<MethodDecl>),
    /// Foreign method resolved at class definition
    Foreign(ForeignMethodRef),
    /// Foreign method with no native implementation; calling it raises a
    /// binding error
    Unbound,
    /// Built-in
    Primitive(Primitive),
}

/// A class.
pub struct Class {
    pub(crate) name: String,
    pub(crate) module: Rc<str>,
    pub(crate) superclass: Option<Rc<Class>>,
    pub(crate) is_foreign: bool,
    pub(crate) is_builtin: bool,
    /// Allocator/finalizer of a foreign class, when the host provided one
    pub(crate) foreign: Option<ForeignClassMethods>,
    pub(crate) methods: FxHashMap<String, Method>,
    pub(crate) static_methods: FxHashMap<String, Method>,
    pub(crate) static_fields: RefCell<FxHashMap<String, Value>>,
}

impl Class {
    /// Empty class skeleton.
    pub(crate) fn new(name: &str, module: Rc<str>, superclass: Option<Rc<Class>>) -> Self {
        Self {
            name: name.to_string(),
            module,
            superclass,
            is_foreign: false,
            is_builtin: false,
            foreign: None,
            methods: FxHashMap::default(),
            static_methods: FxHashMap::default(),
            static_fields: RefCell::new(FxHashMap::default()),
        }
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module the class was declared in.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Direct superclass.
    pub fn superclass(&self) -> Option<&Rc<Class>> {
        self.superclass.as_ref()
    }

    /// Declared with `foreign class`.
    pub fn is_foreign(&self) -> bool {
        self.is_foreign
    }

    /// Instance method lookup through the superclass chain. Returns the
    /// method and the class that defines it.
    pub(crate) fn find_method(self: &Rc<Self>, signature: &str) -> Option<(Method, Rc<Class>)> {
        let mut class = Some(self.clone());
        while let Some(c) = class {
            if let Some(method) = c.methods.get(signature) {
                return Some((method.clone(), c));
            }
            class = c.superclass.clone();
        }
        None
    }

    /// Static method lookup. Constructors are only found on the class that
    /// declares them; other static methods are inherited.
    pub(crate) fn find_static(self: &Rc<Self>, signature: &str) -> Option<(Method, Rc<Class>)> {
        if let Some(method) = self.static_methods.get(signature) {
            return Some((method.clone(), self.clone()));
        }
        let mut class = self.superclass.clone();
        while let Some(c) = class {
            match c.static_methods.get(signature) {
                Some(Method::Constructor(_)) | None => {}
                Some(method) => return Some((method.clone(), c)),
            }
            class = c.superclass.clone();
        }
        None
    }

    /// Whether `self` is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        let mut class = Some(self);
        while let Some(c) = class {
            if std::ptr::eq(c, other) {
                return true;
            }
            class = c.superclass.as_deref();
        }
        false
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("foreign", &self.is_foreign)
            .finish()
    }
}
