//! `Application.executeFile(_,_,_)`
//!
//! Runs a program to completion on the host thread and answers its standard
//! output, or `null` when it could not be started or exited unsuccessfully.
//! This blocks the run loop for as long as the child runs.

use std::path::Path;
use std::process::Command;

use finch_sdk::{
    AbiResult, CallFrame, DispatchKey, ForeignMethodRegistry, HostValue, NativeError, RegistryError,
};

use crate::GUI_MODULE;

/// Run `program` with `args`, optionally inside `working_dir`.
///
/// Returns the child's standard output (lossily decoded) when it exits with
/// status zero.
pub fn execute(program: &str, args: &[String], working_dir: Option<&Path>) -> Option<String> {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }
    log::debug!("executing {} {:?}", program, args);

    let output = match command.output() {
        Ok(output) => output,
        Err(e) => {
            log::debug!("executeFile({}) failed to start: {}", program, e);
            return None;
        }
    };
    if !output.status.success() {
        log::debug!("executeFile({}) exited with {}", program, output.status);
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Argument list from a script value: a list of strings, or null for none.
pub fn string_list(slot: usize, value: HostValue) -> AbiResult<Vec<String>> {
    match value {
        HostValue::Null => Ok(Vec::new()),
        HostValue::List(items) => items
            .into_iter()
            .map(|item| match item {
                HostValue::Str(s) => Ok(s),
                other => Err(NativeError::ArgumentError(format!(
                    "Slot {}: arguments must be strings, got {}",
                    slot,
                    other.slot_type()
                ))),
            })
            .collect(),
        other => Err(NativeError::ArgumentError(format!(
            "Slot {}: expected a list of arguments, got {}",
            slot,
            other.slot_type()
        ))),
    }
}

/// Register `Application.executeFile(_,_,_)`.
pub fn register(methods: &mut ForeignMethodRegistry) -> Result<(), RegistryError> {
    methods.register_fn(
        DispatchKey::class_side(GUI_MODULE, "Application", "executeFile(_,_,_)"),
        |frame: &mut dyn CallFrame| {
            let program = frame.get_str(1)?;
            let args = string_list(2, frame.get_value(2)?)?;
            let working_dir = match frame.get_value(3)? {
                HostValue::Null => None,
                _ => Some(frame.get_str(3)?),
            };
            let output = execute(&program, &args, working_dir.as_deref().map(Path::new));
            frame.ret(output.into())
        },
    )
}
