//! Host bootstrap and event bridge
//!
//! A [`Host`] owns the three pieces of state an embedded script needs:
//!
//! 1. the source buffer read from disk,
//! 2. the [`RuntimeHandle`] the source runs in,
//! 3. four retained handles: the application class and the call handles
//!    for its event, notification and timer callbacks.
//!
//! They are acquired in that order and released in the reverse order, by
//! [`Host::shutdown`] or when the host is dropped.

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use finch_engine::{ErrorFn, RuntimeError, ScriptHandle, Vm, WriteFn};
use finch_sdk::{CallFrame, ForeignClassRegistry, ForeignMethodRegistry, HostValue};
use finch_stdlib::{register_gui, GuiBackend, HostControl};

use crate::config::{ApplicationConfig, HostConfig};
use crate::error::HostError;
use crate::runtime::{RuntimeHandle, RuntimeOptions};

// ============================================================================
// Events
// ============================================================================

/// Which application callback an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Input and window events
    Event,
    /// System notifications
    Notification,
    /// A timer fired; the payload is the timer's handle
    Timer,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Event => "event",
            EventKind::Notification => "notification",
            EventKind::Timer => "timer",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Services
// ============================================================================

/// Native services handed to the script catalog.
pub struct HostServices {
    /// Application control: timers, termination, launch information
    pub control: Rc<dyn HostControl>,
    /// Widget toolkit
    pub gui: Rc<dyn GuiBackend>,
    /// Output sink for `System.print`; stdout when unset
    pub write: Option<WriteFn>,
    /// Error sink; the log error channel when unset
    pub error: Option<ErrorFn>,
}

impl HostServices {
    /// Services with the default output and error sinks.
    pub fn new(control: Rc<dyn HostControl>, gui: Rc<dyn GuiBackend>) -> Self {
        Self {
            control,
            gui,
            write: None,
            error: None,
        }
    }
}

// ============================================================================
// Source buffer
// ============================================================================

/// Script text kept for the lifetime of the host.
#[derive(Debug)]
pub struct SourceBuffer {
    path: PathBuf,
    text: String,
}

impl SourceBuffer {
    /// Read the script at `path`.
    pub fn read(path: &Path) -> Result<Self, HostError> {
        let text = std::fs::read_to_string(path).map_err(|source| HostError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Where the source was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The script text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// Host
// ============================================================================

struct Callbacks {
    class: ScriptHandle,
    event: ScriptHandle,
    notification: ScriptHandle,
    timer: ScriptHandle,
}

impl Callbacks {
    fn handle(&self, kind: EventKind) -> &ScriptHandle {
        match kind {
            EventKind::Event => &self.event,
            EventKind::Notification => &self.notification,
            EventKind::Timer => &self.timer,
        }
    }

    fn release(self, vm: &mut Vm) {
        for handle in [self.class, self.event, self.notification, self.timer] {
            if !vm.release_handle(handle) {
                log::warn!("callback handle was already released");
            }
        }
    }
}

/// A running script and the references the host keeps into it.
pub struct Host {
    module: String,
    callbacks: Option<Callbacks>,
    runtime: Option<RuntimeHandle>,
    source: Option<SourceBuffer>,
}

impl Host {
    /// Read the entry script, run it and retain the application callbacks.
    ///
    /// Nothing is initialised when the script cannot be read. On any later
    /// failure the runtime is torn down before the error is returned.
    pub fn bootstrap(config: &HostConfig, services: HostServices) -> Result<Self, HostError> {
        config.validate()?;
        let source = SourceBuffer::read(&config.script_path())?;
        log::debug!("read {} bytes from {}", source.text().len(), source.path().display());

        let mut methods = ForeignMethodRegistry::new();
        let mut classes = ForeignClassRegistry::new();
        register_gui(&mut methods, &mut classes, services.control, services.gui)?;

        let options = RuntimeOptions {
            module_dir: config.resource_dir.clone(),
            max_call_depth: config.max_call_depth,
            write: services.write,
            error: services.error,
        };
        let mut host = Host {
            module: config.module.clone(),
            callbacks: None,
            runtime: Some(RuntimeHandle::create(methods, classes, options)),
            source: Some(source),
        };
        host.start(&config.application)?;
        log::info!("started {}", config.script_path().display());
        Ok(host)
    }

    fn start(&mut self, application: &ApplicationConfig) -> Result<(), HostError> {
        let (Some(runtime), Some(source)) = (self.runtime.as_mut(), self.source.as_ref()) else {
            return Err(HostError::Binding("Host is shut down".to_string()));
        };
        runtime.run(&self.module, source.text())?;
        let callbacks = retain_callbacks(runtime.vm(), &self.module, application)?;
        self.callbacks = Some(callbacks);
        Ok(())
    }

    /// Deliver `payload` to the callback for `kind`.
    ///
    /// A script error is reported through the error channel and returned;
    /// the host stays usable.
    pub fn dispatch_event(&mut self, kind: EventKind, payload: HostValue) -> Result<(), HostError> {
        let (Some(runtime), Some(callbacks)) = (self.runtime.as_mut(), self.callbacks.as_ref()) else {
            return Err(HostError::Binding("Host is shut down".to_string()));
        };
        log::debug!("dispatching {} event", kind);
        let vm = runtime.vm();
        vm.ensure_slots(2);
        vm.set_slot_handle(0, &callbacks.class)?;
        vm.slots()
            .set_value(1, payload)
            .map_err(|e| RuntimeError::from_native(&e))?;
        vm.call(callbacks.handle(kind))?;
        Ok(())
    }

    /// The module the entry script ran as.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The interpreter, while the host is running.
    pub fn vm(&mut self) -> Option<&mut Vm> {
        self.runtime.as_mut().map(RuntimeHandle::vm)
    }

    /// Release the callbacks, then the runtime, then the source.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(callbacks) = self.callbacks.take() {
            if let Some(runtime) = self.runtime.as_mut() {
                callbacks.release(runtime.vm());
                log::debug!("released application callbacks");
            }
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.destroy();
            log::debug!("destroyed runtime");
        }
        if let Some(source) = self.source.take() {
            log::debug!("released source {}", source.path().display());
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn retain_callbacks(vm: &mut Vm, module: &str, application: &ApplicationConfig) -> Result<Callbacks, HostError> {
    let class = &application.class;
    if !vm.has_variable(module, class) {
        return Err(HostError::Binding(format!(
            "Module '{}' does not define '{}'.",
            module, class
        )));
    }
    vm.ensure_slots(1);
    vm.get_variable(module, class, 0)?;

    let missing: Vec<&str> = application
        .callbacks()
        .into_iter()
        .filter(|signature| !vm.responds_to(0, signature))
        .collect();
    if !missing.is_empty() {
        return Err(HostError::Binding(format!(
            "'{}' must define or inherit {}.",
            class,
            missing.join(", ")
        )));
    }

    let callbacks = Callbacks {
        class: vm.get_slot_handle(0)?,
        event: vm.make_call_handle(&application.event)?,
        notification: vm.make_call_handle(&application.notification)?,
        timer: vm.make_call_handle(&application.timer)?,
    };
    log::debug!("retained '{}' and its callbacks", class);
    Ok(callbacks)
}
