//! Runtime values

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use finch_sdk::{ForeignRef, HandleId, HostValue, SlotType};
use rustc_hash::FxHashMap;

use super::class::Class;

/// A script value.
///
/// Heap values are reference counted. Foreign instances release their
/// native storage when the last reference is dropped.
#[derive(Clone, Default)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Number
    Num(f64),
    /// Immutable string
    Str(Rc<str>),
    /// Opaque native handle
    Handle(HandleId),
    /// `a..b` / `a...b`
    Range(RangeValue),
    /// Mutable list
    List(Rc<RefCell<Vec<Value>>>),
    /// A class object
    Class(Rc<Class>),
    /// Instance of a script class
    Instance(Rc<Instance>),
    /// Instance of a foreign class
    Foreign(Rc<ForeignInstance>),
}

/// Numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeValue {
    /// First value
    pub from: f64,
    /// Bound
    pub to: f64,
    /// Whether `to` itself is included
    pub inclusive: bool,
}

impl RangeValue {
    /// Values the range iterates over, stepping by one toward `to`.
    pub fn iter(&self) -> impl Iterator<Item = f64> {
        let RangeValue { from, to, inclusive } = *self;
        let step = if to >= from { 1.0 } else { -1.0 };
        let mut next = from;
        std::iter::from_fn(move || {
            let within = match (step > 0.0, inclusive) {
                (true, true) => next <= to,
                (true, false) => next < to,
                (false, true) => next >= to,
                (false, false) => next > to,
            };
            if !within {
                return None;
            }
            let current = next;
            next += step;
            Some(current)
        })
    }
}

/// Instance of a script class.
pub struct Instance {
    /// Runtime class
    pub class: Rc<Class>,
    /// Fields, created on first assignment
    pub fields: RefCell<FxHashMap<String, Value>>,
}

impl Instance {
    /// Fresh instance with no fields set.
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: RefCell::new(FxHashMap::default()),
        }
    }
}

/// Instance of a foreign class: a class plus native storage.
pub struct ForeignInstance {
    /// Runtime class
    pub class: Rc<Class>,
    /// Native storage
    pub object: ForeignRef,
}

impl Value {
    /// Build a string value.
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    /// Build a list value.
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Number payload, if any
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// String payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Slot type seen by native code.
    pub fn slot_type(&self) -> SlotType {
        match self {
            Value::Null => SlotType::Null,
            Value::Bool(_) => SlotType::Bool,
            Value::Num(_) => SlotType::Num,
            Value::Str(_) => SlotType::Str,
            Value::Handle(_) => SlotType::Handle,
            Value::List(_) => SlotType::List,
            Value::Foreign(_) => SlotType::Foreign,
            Value::Range(_) | Value::Class(_) | Value::Instance(_) => SlotType::Unknown,
        }
    }

    /// Identity/value equality as used by `==`.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Handle(a), Value::Handle(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Foreign(a), Value::Foreign(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    // ------------------------------------------------------------------------
    // Host conversion
    // ------------------------------------------------------------------------

    /// Copy out as a host value. `None` for classes, instances, foreign
    /// instances and ranges, or lists containing them.
    pub fn to_host(&self) -> Option<HostValue> {
        Some(match self {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(*b),
            Value::Num(n) => HostValue::Num(*n),
            Value::Str(s) => HostValue::Str(s.to_string()),
            Value::Handle(h) => HostValue::Handle(*h),
            Value::List(items) => HostValue::List(
                items
                    .borrow()
                    .iter()
                    .map(Value::to_host)
                    .collect::<Option<Vec<_>>>()?,
            ),
            Value::Range(_) | Value::Class(_) | Value::Instance(_) | Value::Foreign(_) => return None,
        })
    }

    /// Convert a host value into a script value.
    pub fn from_host(value: HostValue) -> Self {
        match value {
            HostValue::Null => Value::Null,
            HostValue::Bool(b) => Value::Bool(b),
            HostValue::Num(n) => Value::Num(n),
            HostValue::Str(s) => Value::Str(Rc::from(s)),
            HostValue::Handle(h) => Value::Handle(h),
            HostValue::List(items) => Value::list(items.into_iter().map(Value::from_host).collect()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Num(n) => f.write_str(&format_num(*n)),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Handle(h) => write!(f, "Handle({})", h.0),
            Value::Range(r) => write!(f, "{:?}", r),
            Value::List(items) => f.debug_list().entries(items.borrow().iter()).finish(),
            Value::Class(c) => write!(f, "class {}", c.name()),
            Value::Instance(i) => write!(f, "instance of {}", i.class.name()),
            Value::Foreign(i) => write!(f, "foreign instance of {}", i.class.name()),
        }
    }
}

/// Format a number the way scripts print it: integral values without a
/// fractional part, others with up to 14 significant digits.
pub fn format_num(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "infinity" } else { "-infinity" }.to_string();
    }
    if n == n.trunc() && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let rounded: f64 = format!("{:.13e}", n).parse().unwrap_or(n);
    format!("{}", rounded)
}
