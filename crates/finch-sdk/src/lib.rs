//! Finch SDK - types shared by the interpreter and the host bindings
//!
//! This crate provides the minimal types and traits needed to write Finch
//! host bindings without depending on the interpreter:
//!
//! - [`CallFrame`]: slot-indexed argument/return access for one native call
//! - [`HostValue`]: values that cross the script boundary by copy
//! - [`ForeignMethod`] and [`ForeignMethodRegistry`]: native implementations
//!   keyed by [`DispatchKey`]
//! - [`ForeignClassRegistry`] and [`ForeignObject`]: native storage for
//!   foreign-backed script objects
//!
//! # Example
//!
//! ```ignore
//! use finch_sdk::{CallFrame, DispatchKey, ForeignMethodRegistry};
//!
//! let mut registry = ForeignMethodRegistry::new();
//! registry.register_fn(DispatchKey::class_side("gui", "Time", "now"), |frame: &mut dyn CallFrame| {
//!     frame.set_num(0, 0.0)
//! })?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod foreign;
pub mod frame;
pub mod handler;
pub mod registry;
pub mod signature;
pub mod value;

pub use error::{AbiResult, NativeError, RegistryError};
pub use foreign::{AllocateFn, FinalizeFn, ForeignClassMethods, ForeignData, ForeignObject, ForeignRef};
pub use frame::{CallFrame, HostFrame, HostSlot};
pub use handler::{ForeignMethod, ForeignMethodRef};
pub use registry::{DispatchKey, ForeignClassRegistry, ForeignMethodRegistry};
pub use value::{HandleId, HostValue, SlotType};
