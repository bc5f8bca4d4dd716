//! Foreign-backed objects
//!
//! A foreign class is a script class whose instances carry native storage.
//! The storage is produced by the class's `allocate` function when a script
//! constructs an instance and is handed to `finalize` exactly once when the
//! last reference to the instance is dropped.

use std::any::{type_name, Any};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::{AbiResult, NativeError};
use crate::frame::CallFrame;

/// Native storage attached to one foreign instance.
pub type ForeignData = Box<dyn Any>;

/// Produces the storage for a new instance. Constructor arguments are in
/// slots 1..N of the frame; slot 0 holds the class.
pub type AllocateFn = Rc<dyn Fn(&mut dyn CallFrame) -> AbiResult<ForeignData>>;

/// Releases native resources held by an instance's storage.
pub type FinalizeFn = Rc<dyn Fn(&mut ForeignData)>;

/// Lifecycle pair registered for one foreign class.
#[derive(Clone)]
pub struct ForeignClassMethods {
    /// Storage constructor
    pub allocate: AllocateFn,
    /// Optional release hook
    pub finalize: Option<FinalizeFn>,
}

impl ForeignClassMethods {
    /// Lifecycle with only an allocator.
    pub fn new<A>(allocate: A) -> Self
    where
        A: Fn(&mut dyn CallFrame) -> AbiResult<ForeignData> + 'static,
    {
        Self {
            allocate: Rc::new(allocate),
            finalize: None,
        }
    }

    /// Attach a finalizer.
    pub fn with_finalize<F>(mut self, finalize: F) -> Self
    where
        F: Fn(&mut ForeignData) + 'static,
    {
        self.finalize = Some(Rc::new(finalize));
        self
    }
}

impl fmt::Debug for ForeignClassMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignClassMethods")
            .field("finalize", &self.finalize.is_some())
            .finish()
    }
}

// ============================================================================
// ForeignObject
// ============================================================================

/// Storage of one foreign instance plus its finalizer.
///
/// Dropping the object runs the finalizer, so it runs exactly once and never
/// before the storage exists.
pub struct ForeignObject {
    class_name: String,
    data: RefCell<ForeignData>,
    finalize: Option<FinalizeFn>,
}

/// Shared reference to a foreign instance's storage.
pub type ForeignRef = Rc<ForeignObject>;

impl ForeignObject {
    /// Wrap freshly allocated storage.
    pub fn new(class_name: impl Into<String>, data: ForeignData, finalize: Option<FinalizeFn>) -> Self {
        Self {
            class_name: class_name.into(),
            data: RefCell::new(data),
            finalize,
        }
    }

    /// Name of the script class this object belongs to.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Borrow the storage as `T`.
    pub fn borrow<T: 'static>(&self) -> AbiResult<Ref<'_, T>> {
        let data = self
            .data
            .try_borrow()
            .map_err(|_| NativeError::StorageBorrowed(self.class_name.clone()))?;
        Ref::filter_map(data, |d| d.downcast_ref::<T>()).map_err(|_| self.mismatch::<T>())
    }

    /// Mutably borrow the storage as `T`.
    pub fn borrow_mut<T: 'static>(&self) -> AbiResult<RefMut<'_, T>> {
        let data = self
            .data
            .try_borrow_mut()
            .map_err(|_| NativeError::StorageBorrowed(self.class_name.clone()))?;
        RefMut::filter_map(data, |d| d.downcast_mut::<T>()).map_err(|_| self.mismatch::<T>())
    }

    fn mismatch<T>(&self) -> NativeError {
        NativeError::StorageMismatch {
            class_name: self.class_name.clone(),
            expected: type_name::<T>(),
        }
    }
}

impl Drop for ForeignObject {
    fn drop(&mut self) {
        if let Some(finalize) = self.finalize.take() {
            finalize(self.data.get_mut());
        }
    }
}

impl fmt::Debug for ForeignObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignObject({})", self.class_name)
    }
}
