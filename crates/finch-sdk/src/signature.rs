//! Method signature strings
//!
//! A signature names a method together with its arity:
//!
//! | form | meaning |
//! |------|---------|
//! | `name` | getter |
//! | `name()` / `name(_,_)` | method with 0 / 2 arguments |
//! | `name=(_)` | setter |
//! | `[_]` / `[_]=(_)` | subscript getter / setter |

/// Signature of a method called with `arity` arguments.
pub fn method(name: &str, arity: usize) -> String {
    format!("{}({})", name, placeholders(arity))
}

/// Signature of a getter.
pub fn getter(name: &str) -> String {
    name.to_string()
}

/// Signature of a setter.
pub fn setter(name: &str) -> String {
    format!("{}=(_)", name)
}

/// Signature of a subscript getter with `arity` indices.
pub fn subscript(arity: usize) -> String {
    format!("[{}]", placeholders(arity))
}

/// Signature of a subscript setter with `arity` indices.
pub fn subscript_setter(arity: usize) -> String {
    format!("[{}]=(_)", placeholders(arity))
}

fn placeholders(arity: usize) -> String {
    vec!["_"; arity].join(",")
}

/// Number of arguments a signature takes, or `None` when malformed.
pub fn arity(signature: &str) -> Option<usize> {
    if let Some(rest) = signature.strip_prefix('[') {
        let (inner, tail) = rest.split_once(']')?;
        let indices = count_placeholders(inner)?;
        if indices == 0 {
            return None;
        }
        return match tail {
            "" => Some(indices),
            "=(_)" => Some(indices + 1),
            _ => None,
        };
    }

    let name_end = signature
        .find(|c: char| c == '(' || c == '=')
        .unwrap_or(signature.len());
    let (name, tail) = signature.split_at(name_end);
    if !is_name(name) {
        return None;
    }
    if tail.is_empty() {
        return Some(0);
    }
    if tail == "=(_)" {
        return Some(1);
    }
    let inner = tail.strip_prefix('(')?.strip_suffix(')')?;
    count_placeholders(inner)
}

/// True when `signature` is well formed.
pub fn is_valid(signature: &str) -> bool {
    arity(signature).is_some()
}

fn count_placeholders(inner: &str) -> Option<usize> {
    if inner.is_empty() {
        return Some(0);
    }
    let mut count = 0;
    for part in inner.split(',') {
        if part != "_" {
            return None;
        }
        count += 1;
    }
    Some(count)
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
