//! Registration of the whole `gui` catalog
//!
//! The host builds both registries once at startup:
//!
//! ```ignore
//! let mut methods = ForeignMethodRegistry::new();
//! let mut classes = ForeignClassRegistry::new();
//! register_gui(&mut methods, &mut classes, host_control, Rc::new(HeadlessGui::new()))?;
//! ```

use std::rc::Rc;

use finch_sdk::{ForeignClassRegistry, ForeignMethodRegistry, RegistryError};

use crate::app::HostControl;
use crate::gui::GuiBackend;
use crate::{app, file, fs, gui, process, time, transform};

/// Register every `gui` module binding and both foreign classes.
///
/// Fails with [`RegistryError::DuplicateKey`] if any binding is already
/// present in `methods` or `classes`.
pub fn register_gui(
    methods: &mut ForeignMethodRegistry,
    classes: &mut ForeignClassRegistry,
    host: Rc<dyn HostControl>,
    backend: Rc<dyn GuiBackend>,
) -> Result<(), RegistryError> {
    app::register(methods, host)?;
    fs::register(methods)?;
    process::register(methods)?;
    time::register(methods)?;
    file::register(methods, classes)?;
    transform::register(methods, classes)?;
    gui::register(methods, backend)?;
    log::debug!(
        "registered {} foreign methods and {} foreign classes",
        methods.len(),
        classes.len()
    );
    Ok(())
}
