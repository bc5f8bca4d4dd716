//! Host-side values exchanged with scripts

use std::fmt;

// ============================================================================
// Handle IDs
// ============================================================================

/// Opaque numeric handle naming a native resource (window, pane, timer, ...).
///
/// Scripts only ever see handles as opaque values and hand them back to
/// native operations; the number itself carries no meaning to the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Slot types
// ============================================================================

/// Runtime type of the value stored in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotType {
    /// Number (always `f64` on the native side)
    Num,
    /// Boolean
    Bool,
    /// String
    Str,
    /// Null
    Null,
    /// Opaque native handle
    Handle,
    /// List of values
    List,
    /// Instance of a foreign class
    Foreign,
    /// Script class, instance or anything else the host cannot marshal
    Unknown,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotType::Num => "Num",
            SlotType::Bool => "Bool",
            SlotType::Str => "String",
            SlotType::Null => "Null",
            SlotType::Handle => "Handle",
            SlotType::List => "List",
            SlotType::Foreign => "Foreign",
            SlotType::Unknown => "Object",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Host values
// ============================================================================

/// A value the host can move across the script boundary by copy.
///
/// Numbers are always `f64`. Integers above 2^53 cannot be represented
/// exactly and are rounded to the nearest representable double when they
/// are converted; this is the documented lossy boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    /// Null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Number
    Num(f64),
    /// String
    Str(String),
    /// Opaque native handle
    Handle(HandleId),
    /// List of values
    List(Vec<HostValue>),
}

impl HostValue {
    /// Runtime type of this value.
    pub fn slot_type(&self) -> SlotType {
        match self {
            HostValue::Null => SlotType::Null,
            HostValue::Bool(_) => SlotType::Bool,
            HostValue::Num(_) => SlotType::Num,
            HostValue::Str(_) => SlotType::Str,
            HostValue::Handle(_) => SlotType::Handle,
            HostValue::List(_) => SlotType::List,
        }
    }

    /// Number payload, if any
    pub fn as_num(&self) -> Option<f64> {
        match self {
            HostValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// String payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Handle payload, if any
    pub fn as_handle(&self) -> Option<HandleId> {
        match self {
            HostValue::Handle(h) => Some(*h),
            _ => None,
        }
    }

    /// List payload, if any
    pub fn as_list(&self) -> Option<&[HostValue]> {
        match self {
            HostValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Build a list of numbers, e.g. a frame rectangle.
    pub fn nums(values: &[f64]) -> Self {
        HostValue::List(values.iter().map(|n| HostValue::Num(*n)).collect())
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Num(n)
    }
}

impl From<i64> for HostValue {
    /// Lossy above 2^53 in magnitude.
    fn from(n: i64) -> Self {
        HostValue::Num(n as f64)
    }
}

impl From<u64> for HostValue {
    /// Lossy above 2^53.
    fn from(n: u64) -> Self {
        HostValue::Num(n as f64)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(s)
    }
}

impl From<HandleId> for HostValue {
    fn from(h: HandleId) -> Self {
        HostValue::Handle(h)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(HostValue::Null)
    }
}
