//! Filesystem bindings (`Application` statics)
//!
//! Failures are not raised into the script: operations answer `null` or
//! `false` and log the underlying I/O error at debug level.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use finch_sdk::{CallFrame, DispatchKey, ForeignMethodRegistry, HostValue, RegistryError};

use crate::GUI_MODULE;

// ============================================================================
// Operations
// ============================================================================

/// Whole file as UTF-8 text.
pub fn read_file(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Copy `from` to `to`, replacing an existing destination.
pub fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}

/// Rename or move `from` to `to`.
pub fn rename_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// Create `path` and any missing parents.
pub fn create_directory(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Remove `path` and everything below it.
pub fn delete_directory(path: &Path) -> io::Result<()> {
    fs::remove_dir_all(path)
}

/// Whether anything exists at `path`.
pub fn file_exists(path: &Path) -> bool {
    path.exists()
}

/// Path of the running executable.
pub fn executable_path() -> Option<PathBuf> {
    std::env::current_exe().ok()
}

/// The user's home directory.
pub fn home_path() -> Option<PathBuf> {
    dirs::home_dir()
}

/// The user's documents directory.
pub fn documents_path() -> Option<PathBuf> {
    dirs::document_dir()
}

/// Path as a script value.
pub fn path_value(path: Option<PathBuf>) -> HostValue {
    path.map(|p| p.to_string_lossy().into_owned()).into()
}

fn succeeded(operation: &str, result: io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Application.{} failed: {}", operation, e);
            false
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Register the filesystem and path bindings.
pub fn register(methods: &mut ForeignMethodRegistry) -> Result<(), RegistryError> {
    methods.register_fn(app_key("readFile(_)"), |frame: &mut dyn CallFrame| {
        let path = frame.get_str(1)?;
        match read_file(Path::new(&path)) {
            Ok(text) => frame.set_str(0, &text),
            Err(e) => {
                log::debug!("Application.readFile({}) failed: {}", path, e);
                frame.set_null(0)
            }
        }
    })?;
    methods.register_fn(app_key("copyFile(_,_)"), |frame: &mut dyn CallFrame| {
        let (from, to) = (frame.get_str(1)?, frame.get_str(2)?);
        let ok = succeeded("copyFile", copy_file(Path::new(&from), Path::new(&to)));
        frame.set_bool(0, ok)
    })?;
    methods.register_fn(app_key("renameFile(_,_)"), |frame: &mut dyn CallFrame| {
        let (from, to) = (frame.get_str(1)?, frame.get_str(2)?);
        let ok = succeeded("renameFile", rename_file(Path::new(&from), Path::new(&to)));
        frame.set_bool(0, ok)
    })?;
    methods.register_fn(app_key("createDirectory(_)"), |frame: &mut dyn CallFrame| {
        let path = frame.get_str(1)?;
        let ok = succeeded("createDirectory", create_directory(Path::new(&path)));
        frame.set_bool(0, ok)
    })?;
    methods.register_fn(app_key("deleteDirectory(_)"), |frame: &mut dyn CallFrame| {
        let path = frame.get_str(1)?;
        let ok = succeeded("deleteDirectory", delete_directory(Path::new(&path)));
        frame.set_bool(0, ok)
    })?;
    methods.register_fn(app_key("fileExists(_)"), |frame: &mut dyn CallFrame| {
        let path = frame.get_str(1)?;
        frame.set_bool(0, file_exists(Path::new(&path)))
    })?;
    methods.register_fn(app_key("executablePath"), |frame: &mut dyn CallFrame| {
        frame.ret(path_value(executable_path()))
    })?;
    methods.register_fn(app_key("homePath"), |frame: &mut dyn CallFrame| {
        frame.ret(path_value(home_path()))
    })?;
    methods.register_fn(app_key("documentsPath"), |frame: &mut dyn CallFrame| {
        frame.ret(path_value(documents_path()))
    })?;
    Ok(())
}

fn app_key(signature: &str) -> DispatchKey {
    DispatchKey::class_side(GUI_MODULE, "Application", signature)
}
