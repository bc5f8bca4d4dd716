//! ForeignMethod trait: native dispatch interface
//!
//! Every native operation a script can reach implements [`ForeignMethod`].
//! Plain closures implement it, so most bindings are registered inline:
//!
//! ```ignore
//! registry.register_fn(key, |frame: &mut dyn CallFrame| {
//!     let n = frame.get_num(1)?;
//!     frame.set_num(0, n * 2.0)
//! })?;
//! ```

use std::rc::Rc;

use crate::error::AbiResult;
use crate::frame::CallFrame;

/// A native implementation bound to one dispatch key.
///
/// Handlers read arguments from slots 1..N and write the result to slot 0.
/// An `Err` becomes a runtime error scoped to the calling script statement.
pub trait ForeignMethod {
    /// Run the operation.
    fn call(&self, frame: &mut dyn CallFrame) -> AbiResult<()>;
}

impl<F> ForeignMethod for F
where
    F: Fn(&mut dyn CallFrame) -> AbiResult<()>,
{
    fn call(&self, frame: &mut dyn CallFrame) -> AbiResult<()> {
        self(frame)
    }
}

/// Shared handler reference handed to the interpreter at bind time.
pub type ForeignMethodRef = Rc<dyn ForeignMethod>;
