//! `File` foreign class
//!
//! Instances are created with `File.open(path, mode)` and own an OS file
//! descriptor. The descriptor is closed by `fileClose()` or, at the latest,
//! by the class finalizer when the script drops its last reference.
//!
//! Modes follow `fopen`: `r`, `w`, `a`, `r+`, `w+`, `a+` (a trailing `b`
//! is accepted and ignored). An instance whose open failed behaves like a
//! closed file: reads answer `null`, writes and sizes answer `-1`.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use finch_sdk::{
    AbiResult, CallFrame, DispatchKey, ForeignClassMethods, ForeignClassRegistry, ForeignData,
    ForeignMethodRegistry, RegistryError,
};

use crate::GUI_MODULE;

const CLASS: &str = "File";

/// Storage of one `File` instance.
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    file: Option<File>,
}

impl FileHandle {
    /// Open `path` with an `fopen`-style mode string.
    pub fn open(path: impl Into<PathBuf>, mode: &str) -> io::Result<Self> {
        let path = path.into();
        let file = open_options(mode)?.open(&path)?;
        Ok(Self { path, file: Some(file) })
    }

    /// Handle with no open descriptor.
    pub fn closed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    /// Path the handle was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the descriptor is still open.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Read from the current position to the end.
    pub fn read_to_end(&mut self) -> io::Result<String> {
        let file = self.file.as_mut().ok_or_else(not_open)?;
        let mut text = String::new();
        file.read_to_string(&mut text)?;
        Ok(text)
    }

    /// Write `text` at the current position. Returns the bytes written.
    pub fn write(&mut self, text: &str) -> io::Result<usize> {
        let file = self.file.as_mut().ok_or_else(not_open)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(text.len())
    }

    /// Size of the file in bytes.
    pub fn size(&self) -> io::Result<u64> {
        let file = self.file.as_ref().ok_or_else(not_open)?;
        Ok(file.metadata()?.len())
    }

    /// Close the descriptor. Returns false if it was already closed.
    pub fn close(&mut self) -> bool {
        self.file.take().is_some()
    }
}

fn not_open() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "file is not open")
}

/// `fopen` mode string to open options.
pub fn open_options(mode: &str) -> io::Result<OpenOptions> {
    let mut options = OpenOptions::new();
    match mode.replace('b', "").as_str() {
        "r" => options.read(true),
        "w" => options.write(true).create(true).truncate(true),
        "a" => options.append(true).create(true),
        "r+" => options.read(true).write(true),
        "w+" => options.read(true).write(true).create(true).truncate(true),
        "a+" => options.read(true).append(true).create(true),
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file mode '{}'", mode),
            ))
        }
    };
    Ok(options)
}

// ============================================================================
// Registration
// ============================================================================

fn allocate(frame: &mut dyn CallFrame) -> AbiResult<ForeignData> {
    let path = frame.get_str(1)?;
    let mode = frame.get_str(2)?;
    let handle = match FileHandle::open(&path, &mode) {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!("File.open({}, {}) failed: {}", path, mode, e);
            FileHandle::closed(&path)
        }
    };
    Ok(Box::new(handle))
}

fn finalize(data: &mut ForeignData) {
    if let Some(handle) = data.downcast_mut::<FileHandle>() {
        if handle.close() {
            log::debug!("closed {} on finalize", handle.path().display());
        }
    }
}

/// Register the `File` class lifecycle and its methods.
pub fn register(methods: &mut ForeignMethodRegistry, classes: &mut ForeignClassRegistry) -> Result<(), RegistryError> {
    classes.register(GUI_MODULE, CLASS, ForeignClassMethods::new(allocate).with_finalize(finalize))?;

    methods.register_fn(file_key("fileClose()"), |frame: &mut dyn CallFrame| {
        let closed = with_handle(frame, |handle| Ok(handle.close()))?;
        frame.set_bool(0, closed)
    })?;
    methods.register_fn(file_key("fileWrite(_)"), |frame: &mut dyn CallFrame| {
        let text = frame.get_str(1)?;
        let written = with_handle(frame, |handle| {
            let result = handle.write(&text);
            Ok(report(handle, "fileWrite", result))
        })?;
        frame.set_num(0, written.map_or(-1.0, |n| n as f64))
    })?;
    methods.register_fn(file_key("fileRead()"), |frame: &mut dyn CallFrame| {
        let text = with_handle(frame, |handle| {
            let result = handle.read_to_end();
            Ok(report(handle, "fileRead", result))
        })?;
        frame.ret(text.into())
    })?;
    methods.register_fn(file_key("fileSize()"), |frame: &mut dyn CallFrame| {
        let size = with_handle(frame, |handle| Ok(report(handle, "fileSize", handle.size())))?;
        frame.set_num(0, size.map_or(-1.0, |n| n as f64))
    })?;
    Ok(())
}

fn with_handle<T>(frame: &mut dyn CallFrame, f: impl FnOnce(&mut FileHandle) -> AbiResult<T>) -> AbiResult<T> {
    let object = frame.get_foreign(0)?;
    let mut handle = object.borrow_mut::<FileHandle>()?;
    f(&mut handle)
}

fn report<T>(handle: &FileHandle, operation: &str, result: io::Result<T>) -> Option<T> {
    result
        .map_err(|e| log::debug!("File.{} on {} failed: {}", operation, handle.path().display(), e))
        .ok()
}

fn file_key(signature: &str) -> DispatchKey {
    DispatchKey::instance(GUI_MODULE, CLASS, signature)
}
