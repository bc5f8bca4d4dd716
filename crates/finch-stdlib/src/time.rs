//! Time bindings (`Time` class, all static)
//!
//! - `now`: seconds since the Unix epoch
//! - `ticks`: microseconds of wall-clock time since the host process
//!   started. This is elapsed time, not processor time, so it keeps
//!   advancing while the host thread sleeps or waits for events.
//! - `dateTime(_)`: epoch seconds formatted as local `YYYY-MM-DD hh:mm:ss`
//! - `sleep(_)`: blocks the host thread for the given seconds

use std::thread;
use std::time::{Duration, Instant};

use chrono::{Datelike, Local, TimeZone, Utc};
use finch_sdk::{AbiResult, CallFrame, DispatchKey, ForeignMethodRegistry, NativeError, RegistryError};
use once_cell::sync::Lazy;

use crate::GUI_MODULE;

static PROCESS_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Local date format used by `Time.dateTime(_)`
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Seconds since the Unix epoch.
pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Microseconds elapsed since the first call into this module.
pub fn ticks() -> u64 {
    PROCESS_START.elapsed().as_micros() as u64
}

/// Format epoch seconds in local time. `None` when the value is not finite
/// or the local year leaves 0..=9999.
pub fn date_time(epoch_seconds: f64) -> Option<String> {
    if !epoch_seconds.is_finite() {
        return None;
    }
    let local = Local.timestamp_opt(epoch_seconds.trunc() as i64, 0).single()?;
    if !(0..=9999).contains(&local.year()) {
        return None;
    }
    Some(local.format(DATE_TIME_FORMAT).to_string())
}

/// Sleep duration for `seconds`; negative values sleep for zero.
pub fn sleep_duration(seconds: f64) -> AbiResult<Duration> {
    if seconds < 0.0 {
        return Ok(Duration::ZERO);
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        NativeError::ArgumentError(format!(
            "sleep expects a representable number of seconds, got {}",
            seconds
        ))
    })
}

/// Register the `Time` bindings.
pub fn register(methods: &mut ForeignMethodRegistry) -> Result<(), RegistryError> {
    Lazy::force(&PROCESS_START);

    methods.register_fn(time_key("now"), |frame: &mut dyn CallFrame| {
        frame.set_num(0, now() as f64)
    })?;
    methods.register_fn(time_key("ticks"), |frame: &mut dyn CallFrame| {
        frame.set_num(0, ticks() as f64)
    })?;
    methods.register_fn(time_key("dateTime(_)"), |frame: &mut dyn CallFrame| {
        let seconds = frame.get_num(1)?;
        match date_time(seconds) {
            Some(text) => frame.set_str(0, &text),
            None => frame.set_null(0),
        }
    })?;
    methods.register_fn(time_key("sleep(_)"), |frame: &mut dyn CallFrame| {
        let duration = sleep_duration(frame.get_num(1)?)?;
        log::debug!("Time.sleep blocking host thread for {:?}", duration);
        thread::sleep(duration);
        frame.set_null(0)
    })?;
    Ok(())
}

fn time_key(signature: &str) -> DispatchKey {
    DispatchKey::class_side(GUI_MODULE, "Time", signature)
}
