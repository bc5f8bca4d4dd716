//! Method dispatch, class definition and module import

use std::rc::Rc;

use finch_sdk::ForeignObject;
use rustc_hash::FxHashMap;

use super::{Flow, Frame};
use crate::parser;
use crate::parser::ast::{ClassDecl, ImportName, MethodDecl, MethodKind};
use crate::vm::class::{Class, Method};
use crate::vm::builtins;
use crate::vm::error::{ReportKind, RuntimeError};
use crate::vm::slots::Slots;
use crate::vm::value::{ForeignInstance, Instance, Value};
use crate::vm::Vm;

impl Vm {
    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Call `signature` on `receiver`.
    pub(crate) fn invoke(
        &mut self,
        receiver: Value,
        signature: &str,
        args: Vec<Value>,
        line: u32,
    ) -> Result<Value, RuntimeError> {
        if line > 0 {
            self.frame.line = line;
        }
        let found = match &receiver {
            Value::Class(class) => class.find_static(signature),
            other => self.core.class_of(other).find_method(signature),
        };
        match found {
            Some((method, owner)) => self.run_method(method, owner, receiver, signature, args, line),
            None => {
                let class = self.core.class_of(&receiver);
                self.call_primitive_or_fail(receiver, &class, signature, args)
            }
        }
    }

    pub(crate) fn call_primitive_or_fail(
        &mut self,
        receiver: Value,
        class: &Rc<Class>,
        signature: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if let Some(result) = builtins::call_primitive(self, &receiver, signature, &args) {
            return result;
        }
        let message = match &receiver {
            Value::Class(c) => format!("{} metaclass does not implement '{}'.", c.name, signature),
            _ => format!("{} does not implement '{}'.", class.name, signature),
        };
        Err(RuntimeError::script(message))
    }

    /// Run a resolved method. `owner` is the class that declares it.
    pub(crate) fn run_method(
        &mut self,
        method: Method,
        owner: Rc<Class>,
        receiver: Value,
        signature: &str,
        args: Vec<Value>,
        line: u32,
    ) -> Result<Value, RuntimeError> {
        match method {
            Method::Script(decl) => self.run_body(receiver, owner, decl, args),
            Method::Constructor(init) => self.construct(owner, init, args),
            Method::Primitive(primitive) => primitive(self, &receiver, args),
            Method::Foreign(handler) => {
                let mut slots = Slots::for_call(receiver, args);
                handler.call(&mut slots).map_err(|e| {
                    let mut error = RuntimeError::from_native(&e);
                    error.push_frame(&owner.module, line, format!("{}.{}", owner.name, signature));
                    error
                })?;
                Ok(slots.into_return())
            }
            Method::Unbound => Err(RuntimeError::binding(format!(
                "Could not find foreign method '{}' for class {} in module '{}'.",
                signature, owner.name, owner.module
            ))),
        }
    }

    /// Execute a script method body with `this` bound to `receiver`.
    pub(crate) fn run_body(
        &mut self,
        receiver: Value,
        class: Rc<Class>,
        decl: Rc<MethodDecl>,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let params: FxHashMap<String, Value> = decl.params.iter().cloned().zip(args).collect();
        let module = class.module.clone();
        self.push_frame(Frame::method(module, receiver, class, decl.clone(), params))?;
        let result = self.exec_block_in_place(&decl.body);
        let frame = self.pop_frame();
        match result {
            Ok(Flow::Return(value)) => Ok(value),
            Ok(_) => Ok(Value::Null),
            Err(mut error) => {
                error.push_frame(&frame.module, frame.line, frame.function_name());
                Err(error)
            }
        }
    }

    /// `Class.new(...)`: create the instance, then run the initializer on it.
    fn construct(&mut self, class: Rc<Class>, init: Rc<MethodDecl>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let instance = if class.is_foreign {
            self.allocate_foreign(&class, &args)?
        } else {
            Value::Instance(Rc::new(Instance::new(class.clone())))
        };
        self.run_body(instance.clone(), class, init, args)?;
        Ok(instance)
    }

    fn allocate_foreign(&mut self, class: &Rc<Class>, args: &[Value]) -> Result<Value, RuntimeError> {
        let Some(lifecycle) = class.foreign.clone() else {
            return Err(RuntimeError::binding(format!(
                "Could not find foreign class '{}' in module '{}'.",
                class.name, class.module
            )));
        };
        let mut slots = Slots::for_call(Value::Class(class.clone()), args.to_vec());
        let data = (lifecycle.allocate)(&mut slots).map_err(|e| RuntimeError::from_native(&e))?;
        let object = Rc::new(ForeignObject::new(class.name.clone(), data, lifecycle.finalize));
        Ok(Value::Foreign(Rc::new(ForeignInstance {
            class: class.clone(),
            object,
        })))
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// Build a class object, binding foreign methods as they are declared.
    pub(crate) fn define_class(&mut self, decl: &ClassDecl) -> Result<Rc<Class>, RuntimeError> {
        let module = self.frame.module.clone();
        let superclass = match &decl.superclass {
            Some(name) => match self.lookup_variable(name) {
                Some(Value::Class(class)) => class,
                Some(_) => {
                    return Err(RuntimeError::script(format!(
                        "Class '{}' cannot inherit from a non-class object.",
                        decl.name
                    )))
                }
                None => return Err(RuntimeError::script(format!("Undefined variable '{}'.", name))),
            },
            None => self.core.object.clone(),
        };
        if superclass.is_builtin && !Rc::ptr_eq(&superclass, &self.core.object) {
            return Err(RuntimeError::script(format!(
                "Class '{}' cannot inherit from built-in class '{}'.",
                decl.name, superclass.name
            )));
        }
        if superclass.is_foreign && !decl.is_foreign {
            return Err(RuntimeError::script(format!(
                "Class '{}' cannot inherit from foreign class '{}'.",
                decl.name, superclass.name
            )));
        }

        let mut class = Class::new(&decl.name, module.clone(), Some(superclass));
        class.is_foreign = decl.is_foreign;
        if decl.is_foreign {
            class.foreign = self
                .config
                .bind_foreign_class
                .as_ref()
                .and_then(|bind| bind(&module, &decl.name));
            if class.foreign.is_none() {
                log::warn!("no allocator bound for foreign class {}::{}", module, decl.name);
            }
        }

        for method in &decl.methods {
            let signature = method.signature();
            let is_constructor = method.kind == MethodKind::Constructor;
            let entry = if method.is_foreign {
                let bound = self
                    .config
                    .bind_foreign_method
                    .as_ref()
                    .and_then(|bind| bind(&module, &decl.name, method.is_static, &signature));
                match bound {
                    Some(handler) => Method::Foreign(handler),
                    None => {
                        log::warn!(
                            "no native implementation for {}::{}{}{}",
                            module,
                            decl.name,
                            if method.is_static { "." } else { "#" },
                            signature
                        );
                        Method::Unbound
                    }
                }
            } else if is_constructor {
                Method::Constructor(method.clone())
            } else {
                Method::Script(method.clone())
            };

            let table = if method.is_static || is_constructor {
                &mut class.static_methods
            } else {
                &mut class.methods
            };
            if table.insert(signature.clone(), entry).is_some() {
                return Err(RuntimeError::script(format!(
                    "Class {} already defines a method '{}'.",
                    decl.name, signature
                )));
            }
        }

        let class = Rc::new(class);
        self.classes.push(Rc::downgrade(&class));
        log::trace!("defined class {}::{}", module, decl.name);
        Ok(class)
    }

    // ========================================================================
    // Modules
    // ========================================================================

    /// Run `module` if it has not run yet, then copy `names` into the
    /// importing scope.
    pub(crate) fn import_module(&mut self, module: &str, names: &[ImportName]) -> Result<(), RuntimeError> {
        if !self.modules.contains_key(module) {
            let source = self
                .config
                .load_module
                .as_ref()
                .and_then(|load| load(module))
                .ok_or_else(|| RuntimeError::script(format!("Could not load module '{}'.", module)))?;
            let ast = parser::parse(&source).map_err(|errors| {
                for error in &errors {
                    self.report(ReportKind::Compile, module, error.line, &error.message);
                }
                RuntimeError::script(format!("Could not compile module '{}'.", module))
            })?;
            // Registered before running so cyclic imports see a module
            self.modules.insert(module.to_string(), FxHashMap::default());
            log::debug!("loading module {}", module);
            self.run_module(module, &ast.statements)?;
        }

        for ImportName { name, local } in names {
            let value = self
                .modules
                .get(module)
                .and_then(|vars| vars.get(name))
                .cloned()
                .ok_or_else(|| {
                    RuntimeError::script(format!(
                        "Could not find a variable named '{}' in module '{}'.",
                        name, module
                    ))
                })?;
            self.define_variable(local, value)?;
        }
        Ok(())
    }
}
