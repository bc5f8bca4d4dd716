//! Application control bindings
//!
//! Timers, termination and launch information belong to whoever drives the
//! run loop. Bindings reach it through the [`HostControl`] service injected
//! at registration time.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use finch_sdk::{
    AbiResult, CallFrame, DispatchKey, ForeignMethodRegistry, HandleId, HostValue, NativeError,
    RegistryError,
};

use crate::fs::path_value;
use crate::GUI_MODULE;

/// Services the run loop offers to scripts.
pub trait HostControl {
    /// Schedule a timer. Each expiry delivers a timer event carrying the
    /// returned handle.
    fn start_timer(&self, interval: Duration, repeats: bool) -> HandleId;

    /// Cancel a timer. Deliveries already queued are not retracted.
    /// Returns false for an unknown or already stopped timer.
    fn stop_timer(&self, timer: HandleId) -> bool;

    /// Leave the run loop with exit code 0 once the current dispatch ends.
    fn terminate(&self);

    /// Keep the run loop alive while idle (`Application.run`).
    fn keep_alive(&self);

    /// Let the run loop finish once idle (`Application.close`).
    fn close(&self);

    /// Arguments passed to the script on the command line.
    fn command_arguments(&self) -> Vec<String>;

    /// Directory the main script and its resources were loaded from.
    fn resource_dir(&self) -> PathBuf;
}

/// Timer interval from script seconds.
pub fn timer_interval(seconds: f64) -> AbiResult<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        NativeError::ArgumentError(format!(
            "timer interval must be a non-negative number of seconds, got {}",
            seconds
        ))
    })
}

/// Register the `Application` control bindings.
pub fn register(methods: &mut ForeignMethodRegistry, host: Rc<dyn HostControl>) -> Result<(), RegistryError> {
    let h = host.clone();
    methods.register_fn(DispatchKey::instance(GUI_MODULE, "Application", "run"), move |frame: &mut dyn CallFrame| {
        h.keep_alive();
        frame.set_null(0)
    })?;
    let h = host.clone();
    methods.register_fn(DispatchKey::instance(GUI_MODULE, "Application", "close"), move |frame: &mut dyn CallFrame| {
        h.close();
        frame.set_null(0)
    })?;

    let h = host.clone();
    methods.register_fn(app_key("terminate"), move |frame: &mut dyn CallFrame| {
        log::debug!("Application.terminate requested");
        h.terminate();
        frame.set_null(0)
    })?;
    let h = host.clone();
    methods.register_fn(app_key("commandArguments"), move |frame: &mut dyn CallFrame| {
        let args = h.command_arguments().into_iter().map(HostValue::Str).collect();
        frame.ret(HostValue::List(args))
    })?;
    let h = host.clone();
    methods.register_fn(app_key("startTimer(_,_)"), move |frame: &mut dyn CallFrame| {
        let interval = timer_interval(frame.get_num(1)?)?;
        let repeats = frame.get_bool(2)?;
        let timer = h.start_timer(interval, repeats);
        log::debug!("started timer {} every {:?} (repeats: {})", timer, interval, repeats);
        frame.set_handle(0, timer)
    })?;
    let h = host.clone();
    methods.register_fn(app_key("stopTimer(_)"), move |frame: &mut dyn CallFrame| {
        let timer = frame.get_handle(1)?;
        frame.set_bool(0, h.stop_timer(timer))
    })?;
    methods.register_fn(app_key("resourcePath"), move |frame: &mut dyn CallFrame| {
        frame.ret(path_value(Some(host.resource_dir())))
    })?;
    Ok(())
}

fn app_key(signature: &str) -> DispatchKey {
    DispatchKey::class_side(GUI_MODULE, "Application", signature)
}
