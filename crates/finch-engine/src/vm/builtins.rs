//! Built-in classes and primitive methods
//!
//! Core classes (`Object`, `Num`, `String`, `List`, ...) exist as class
//! objects so `is` and `type` work on every value. Their methods are
//! primitives dispatched by signature in [`call_primitive`]; script classes
//! can still override `toString` and friends because user method tables
//! are consulted first.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::class::{Class, Method, Primitive};
use super::error::RuntimeError;
use super::value::{format_num, RangeValue, Value};
use super::Vm;

/// Module name core classes report.
pub const CORE_MODULE: &str = "core";

/// The built-in classes.
pub(crate) struct CoreClasses {
    pub object: Rc<Class>,
    pub class: Rc<Class>,
    pub bool_class: Rc<Class>,
    pub null: Rc<Class>,
    pub num: Rc<Class>,
    pub string: Rc<Class>,
    pub list: Rc<Class>,
    pub range: Rc<Class>,
    pub system: Rc<Class>,
    pub fiber: Rc<Class>,
}

impl CoreClasses {
    pub(crate) fn new() -> Self {
        let module: Rc<str> = Rc::from(CORE_MODULE);
        let object = Rc::new(builtin("Object", &module, None, &[]));
        let child = |name: &str, statics: &[(&str, Primitive)]| {
            Rc::new(builtin(name, &module, Some(object.clone()), statics))
        };
        Self {
            class: child("Class", &[]),
            bool_class: child("Bool", &[]),
            null: child("Null", &[]),
            num: child(
                "Num",
                &[("fromString(_)", num_from_string), ("pi", num_pi)],
            ),
            string: child("String", &[]),
            list: child(
                "List",
                &[("new()", list_new), ("filled(_,_)", list_filled)],
            ),
            range: child("Range", &[]),
            system: child(
                "System",
                &[
                    ("print()", system_print),
                    ("print(_)", system_print),
                    ("write(_)", system_write),
                    ("clock", system_clock),
                ],
            ),
            fiber: child("Fiber", &[("abort(_)", fiber_abort)]),
            object,
        }
    }

    /// Global variables every module can see.
    pub(crate) fn globals(&self) -> FxHashMap<String, Value> {
        [
            &self.object,
            &self.class,
            &self.bool_class,
            &self.null,
            &self.num,
            &self.string,
            &self.list,
            &self.range,
            &self.system,
            &self.fiber,
        ]
        .into_iter()
        .map(|c| (c.name.clone(), Value::Class(c.clone())))
        .collect()
    }

    /// Runtime class of any value.
    pub(crate) fn class_of(&self, value: &Value) -> Rc<Class> {
        match value {
            Value::Null => self.null.clone(),
            Value::Bool(_) => self.bool_class.clone(),
            Value::Num(_) => self.num.clone(),
            Value::Str(_) => self.string.clone(),
            Value::Handle(_) => self.object.clone(),
            Value::Range(_) => self.range.clone(),
            Value::List(_) => self.list.clone(),
            Value::Class(_) => self.class.clone(),
            Value::Instance(i) => i.class.clone(),
            Value::Foreign(i) => i.class.clone(),
        }
    }
}

fn builtin(name: &str, module: &Rc<str>, superclass: Option<Rc<Class>>, statics: &[(&str, Primitive)]) -> Class {
    let mut class = Class::new(name, module.clone(), superclass);
    class.is_builtin = true;
    for (signature, primitive) in statics {
        class
            .static_methods
            .insert(signature.to_string(), Method::Primitive(*primitive));
    }
    class
}

// ============================================================================
// Static primitives
// ============================================================================

fn system_print(vm: &mut Vm, _: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let mut text = match args.first() {
        Some(value) => vm.stringify(value)?,
        None => String::new(),
    };
    text.push('\n');
    let value = args.into_iter().next().unwrap_or(Value::Null);
    vm.write(&text);
    Ok(value)
}

fn system_write(vm: &mut Vm, _: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let value = args.into_iter().next().unwrap_or(Value::Null);
    let text = vm.stringify(&value)?;
    vm.write(&text);
    Ok(value)
}

fn system_clock(vm: &mut Vm, _: &Value, _: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Num(vm.started.elapsed().as_secs_f64()))
}

fn fiber_abort(vm: &mut Vm, _: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let message = match args.first() {
        Some(Value::Str(s)) => s.to_string(),
        Some(Value::Null) | None => return Ok(Value::Null),
        Some(other) => vm.stringify(other)?,
    };
    Err(RuntimeError::script(message))
}

fn num_from_string(_: &mut Vm, _: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let text = expect_str(&args, 0, "Argument")?;
    Ok(text
        .trim()
        .parse::<f64>()
        .map(Value::Num)
        .unwrap_or(Value::Null))
}

fn num_pi(_: &mut Vm, _: &Value, _: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::Num(std::f64::consts::PI))
}

fn list_new(_: &mut Vm, _: &Value, _: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::list(Vec::new()))
}

fn list_filled(_: &mut Vm, _: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let count = expect_index(&args, 0, "Size")?;
    let fill = args.get(1).cloned().unwrap_or(Value::Null);
    Ok(Value::list(vec![fill; count]))
}

// ============================================================================
// Instance primitives
// ============================================================================

/// Built-in instance method, if `signature` names one for `receiver`.
pub(crate) fn call_primitive(
    vm: &mut Vm,
    receiver: &Value,
    signature: &str,
    args: &[Value],
) -> Option<Result<Value, RuntimeError>> {
    let typed = match receiver {
        Value::Num(n) => num_method(*n, signature, args),
        Value::Str(s) => string_method(s, signature, args),
        Value::List(_) => list_method(vm, receiver, signature, args),
        Value::Range(r) => range_method(r, signature),
        Value::Class(c) => match signature {
            "name" => Some(Ok(Value::str(&c.name))),
            "supertype" => Some(Ok(c
                .superclass
                .clone()
                .map(Value::Class)
                .unwrap_or(Value::Null))),
            _ => None,
        },
        _ => None,
    };
    if typed.is_some() {
        return typed;
    }

    // Methods every object has
    match signature {
        "toString" => Some(vm.stringify(receiver).map(|s| Value::str(&s))),
        "type" => Some(Ok(Value::Class(vm.core.class_of(receiver)))),
        "==(_)" => Some(Ok(Value::Bool(receiver.equals(&args[0])))),
        "!=(_)" => Some(Ok(Value::Bool(!receiver.equals(&args[0])))),
        _ => None,
    }
}

fn num_method(n: f64, signature: &str, args: &[Value]) -> Option<Result<Value, RuntimeError>> {
    let num = |v: f64| Some(Ok(Value::Num(v)));
    match signature {
        "abs" => num(n.abs()),
        "ceil" => num(n.ceil()),
        "floor" => num(n.floor()),
        "round" => num(n.round()),
        "truncate" => num(n.trunc()),
        "fraction" => num(n.fract()),
        "sqrt" => num(n.sqrt()),
        "sin" => num(n.sin()),
        "cos" => num(n.cos()),
        "tan" => num(n.tan()),
        "sign" => num(if n > 0.0 {
            1.0
        } else if n < 0.0 {
            -1.0
        } else {
            0.0
        }),
        "isInteger" => Some(Ok(Value::Bool(n.is_finite() && n == n.trunc()))),
        "isNan" => Some(Ok(Value::Bool(n.is_nan()))),
        "isInfinity" => Some(Ok(Value::Bool(n.is_infinite()))),
        "toString" => Some(Ok(Value::str(&format_num(n)))),
        "min(_)" => Some(expect_num(args, 0, "Other value").map(|o| Value::Num(n.min(o)))),
        "max(_)" => Some(expect_num(args, 0, "Other value").map(|o| Value::Num(n.max(o)))),
        "pow(_)" => Some(expect_num(args, 0, "Power value").map(|o| Value::Num(n.powf(o)))),
        "atan(_)" => Some(expect_num(args, 0, "x value").map(|x| Value::Num(n.atan2(x)))),
        "clamp(_,_)" => Some((|| {
            let lo = expect_num(args, 0, "Min value")?;
            let hi = expect_num(args, 1, "Max value")?;
            Ok(Value::Num(n.max(lo).min(hi)))
        })()),
        _ => None,
    }
}

fn string_method(s: &str, signature: &str, args: &[Value]) -> Option<Result<Value, RuntimeError>> {
    let result = match signature {
        "count" => Ok(Value::Num(s.chars().count() as f64)),
        "isEmpty" => Ok(Value::Bool(s.is_empty())),
        "toString" => Ok(Value::str(s)),
        "trim()" => Ok(Value::str(s.trim())),
        "contains(_)" => expect_str(args, 0, "Argument").map(|a| Value::Bool(s.contains(a))),
        "startsWith(_)" => expect_str(args, 0, "Argument").map(|a| Value::Bool(s.starts_with(a))),
        "endsWith(_)" => expect_str(args, 0, "Argument").map(|a| Value::Bool(s.ends_with(a))),
        "indexOf(_)" => expect_str(args, 0, "Argument").map(|a| {
            Value::Num(
                s.find(a)
                    .map(|byte| s[..byte].chars().count() as f64)
                    .unwrap_or(-1.0),
            )
        }),
        "split(_)" => expect_str(args, 0, "Delimiter").and_then(|d| {
            if d.is_empty() {
                return Err(RuntimeError::script("Delimiter cannot be empty."));
            }
            Ok(Value::list(s.split(d).map(Value::str).collect()))
        }),
        "replace(_,_)" => expect_str(args, 0, "From").and_then(|from| {
            let to = expect_str(args, 1, "To")?;
            if from.is_empty() {
                return Err(RuntimeError::script("From cannot be empty."));
            }
            Ok(Value::str(&s.replace(from, to)))
        }),
        "[_]" => {
            let chars: Vec<char> = s.chars().collect();
            resolve_index(&args[0], chars.len(), "Subscript")
                .map(|i| Value::Str(Rc::from(chars[i].to_string())))
        }
        _ => return None,
    };
    Some(result)
}

fn list_method(vm: &mut Vm, receiver: &Value, signature: &str, args: &[Value]) -> Option<Result<Value, RuntimeError>> {
    let Value::List(list) = receiver else {
        return None;
    };
    let result = match signature {
        "count" => Ok(Value::Num(list.borrow().len() as f64)),
        "isEmpty" => Ok(Value::Bool(list.borrow().is_empty())),
        "add(_)" => {
            list.borrow_mut().push(args[0].clone());
            Ok(args[0].clone())
        }
        "clear()" => {
            list.borrow_mut().clear();
            Ok(Value::Null)
        }
        "insert(_,_)" => {
            let len = list.borrow().len();
            // Inserting at `count` appends
            resolve_index(&args[0], len + 1, "Index").map(|i| {
                list.borrow_mut().insert(i, args[1].clone());
                args[1].clone()
            })
        }
        "removeAt(_)" => {
            let len = list.borrow().len();
            resolve_index(&args[0], len, "Index").map(|i| list.borrow_mut().remove(i))
        }
        "contains(_)" => Ok(Value::Bool(list.borrow().iter().any(|v| v.equals(&args[0])))),
        "indexOf(_)" => Ok(Value::Num(
            list.borrow()
                .iter()
                .position(|v| v.equals(&args[0]))
                .map(|i| i as f64)
                .unwrap_or(-1.0),
        )),
        "[_]" => {
            let len = list.borrow().len();
            resolve_index(&args[0], len, "Subscript").map(|i| list.borrow()[i].clone())
        }
        "[_]=(_)" => {
            let len = list.borrow().len();
            resolve_index(&args[0], len, "Subscript").map(|i| {
                list.borrow_mut()[i] = args[1].clone();
                args[1].clone()
            })
        }
        "join()" | "join(_)" => {
            let separator = match args.first() {
                Some(_) => match expect_str(args, 0, "Separator") {
                    Ok(s) => s.to_string(),
                    Err(e) => return Some(Err(e)),
                },
                None => String::new(),
            };
            let items = list.borrow().clone();
            let mut parts = Vec::with_capacity(items.len());
            for item in &items {
                match vm.stringify(item) {
                    Ok(s) => parts.push(s),
                    Err(e) => return Some(Err(e)),
                }
            }
            Ok(Value::str(&parts.join(&separator)))
        }
        _ => return None,
    };
    Some(result)
}

fn range_method(range: &RangeValue, signature: &str) -> Option<Result<Value, RuntimeError>> {
    let value = match signature {
        "from" => Value::Num(range.from),
        "to" => Value::Num(range.to),
        "min" => Value::Num(range.from.min(range.to)),
        "max" => Value::Num(range.from.max(range.to)),
        "isInclusive" => Value::Bool(range.inclusive),
        "toList" => Value::list(range.iter().map(Value::Num).collect()),
        _ => return None,
    };
    Some(Ok(value))
}

// ============================================================================
// Argument helpers
// ============================================================================

pub(crate) fn expect_num(args: &[Value], index: usize, what: &str) -> Result<f64, RuntimeError> {
    match args.get(index) {
        Some(Value::Num(n)) => Ok(*n),
        _ => Err(RuntimeError::script(format!("{} must be a number.", what))),
    }
}

pub(crate) fn expect_str<'a>(args: &'a [Value], index: usize, what: &str) -> Result<&'a str, RuntimeError> {
    match args.get(index) {
        Some(Value::Str(s)) => Ok(s),
        _ => Err(RuntimeError::script(format!("{} must be a string.", what))),
    }
}

fn expect_index(args: &[Value], index: usize, what: &str) -> Result<usize, RuntimeError> {
    let n = expect_num(args, index, what)?;
    if n < 0.0 || n != n.trunc() {
        return Err(RuntimeError::script(format!("{} must be a non-negative integer.", what)));
    }
    Ok(n as usize)
}

/// Validate an index into a sequence of `len` elements; negative indices
/// count from the end.
fn resolve_index(index: &Value, len: usize, what: &str) -> Result<usize, RuntimeError> {
    let Value::Num(n) = index else {
        return Err(RuntimeError::script(format!("{} must be a number.", what)));
    };
    if *n != n.trunc() {
        return Err(RuntimeError::script(format!("{} must be an integer.", what)));
    }
    let i = if *n < 0.0 { len as f64 + n } else { *n };
    if i < 0.0 || i >= len as f64 {
        return Err(RuntimeError::script(format!("{} out of bounds.", what)));
    }
    Ok(i as usize)
}
