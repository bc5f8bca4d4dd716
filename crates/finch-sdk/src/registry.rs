//! Foreign method and foreign class registries
//!
//! Both registries are filled once during host startup and only read
//! afterwards. Registering the same key twice is rejected, so every key has
//! exactly one implementation.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{AbiResult, RegistryError};
use crate::foreign::ForeignClassMethods;
use crate::frame::CallFrame;
use crate::handler::{ForeignMethod, ForeignMethodRef};
use crate::signature;

// ============================================================================
// DispatchKey
// ============================================================================

/// Identity of one foreign method: (module, class, static flag, signature).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    /// Module the class is declared in
    pub module: String,
    /// Declaring class
    pub class_name: String,
    /// Static (class-side) method
    pub is_static: bool,
    /// Signature string, e.g. `setFrame(_,_)`
    pub signature: String,
}

impl DispatchKey {
    /// Key for an instance method.
    pub fn instance(module: &str, class_name: &str, signature: &str) -> Self {
        Self::new(module, class_name, false, signature)
    }

    /// Key for a static method.
    pub fn class_side(module: &str, class_name: &str, signature: &str) -> Self {
        Self::new(module, class_name, true, signature)
    }

    /// Build a key.
    pub fn new(module: &str, class_name: &str, is_static: bool, signature: &str) -> Self {
        Self {
            module: module.to_string(),
            class_name: class_name.to_string(),
            is_static,
            signature: signature.to_string(),
        }
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}{}{}",
            self.module,
            self.class_name,
            if self.is_static { "." } else { "#" },
            self.signature
        )
    }
}

// ============================================================================
// ForeignMethodRegistry
// ============================================================================

/// Table from [`DispatchKey`] to native implementation.
#[derive(Default)]
pub struct ForeignMethodRegistry {
    methods: FxHashMap<DispatchKey, ForeignMethodRef>,
}

impl ForeignMethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Fails on a malformed signature or a key that is
    /// already present.
    pub fn register(&mut self, key: DispatchKey, method: ForeignMethodRef) -> Result<(), RegistryError> {
        if !signature::is_valid(&key.signature) {
            return Err(RegistryError::InvalidSignature(key.signature));
        }
        if self.methods.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key.to_string()));
        }
        self.methods.insert(key, method);
        Ok(())
    }

    /// Register a closure.
    pub fn register_fn<F>(&mut self, key: DispatchKey, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut dyn CallFrame) -> AbiResult<()> + 'static,
    {
        self.register(key, Rc::new(handler))
    }

    /// Register a handler value.
    pub fn register_method<M>(&mut self, key: DispatchKey, method: M) -> Result<(), RegistryError>
    where
        M: ForeignMethod + 'static,
    {
        self.register(key, Rc::new(method))
    }

    /// Exact lookup. `None` when no entry matches all four components.
    pub fn resolve(
        &self,
        module: &str,
        class_name: &str,
        is_static: bool,
        signature: &str,
    ) -> Option<ForeignMethodRef> {
        self.methods
            .get(&DispatchKey::new(module, class_name, is_static, signature))
            .cloned()
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &DispatchKey) -> bool {
        self.methods.contains_key(key)
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// All registered keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &DispatchKey> {
        self.methods.keys()
    }
}

impl fmt::Debug for ForeignMethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignMethodRegistry")
            .field("methods", &self.methods.len())
            .finish()
    }
}

// ============================================================================
// ForeignClassRegistry
// ============================================================================

/// Table from (module, class) to allocate/finalize pair.
#[derive(Default)]
pub struct ForeignClassRegistry {
    classes: FxHashMap<(String, String), ForeignClassMethods>,
}

impl ForeignClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a foreign class. Fails if the class is already present.
    pub fn register(
        &mut self,
        module: &str,
        class_name: &str,
        methods: ForeignClassMethods,
    ) -> Result<(), RegistryError> {
        let key = (module.to_string(), class_name.to_string());
        if self.classes.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(format!("{}::{}", module, class_name)));
        }
        self.classes.insert(key, methods);
        Ok(())
    }

    /// Lifecycle pair for a class, if registered.
    pub fn resolve(&self, module: &str, class_name: &str) -> Option<ForeignClassMethods> {
        self.classes
            .get(&(module.to_string(), class_name.to_string()))
            .cloned()
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl fmt::Debug for ForeignClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignClassRegistry")
            .field("classes", &self.classes.len())
            .finish()
    }
}
