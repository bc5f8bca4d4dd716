//! Host error types.

use std::path::PathBuf;

use finch_engine::{CompileError, InterpretError, RuntimeError};
use finch_sdk::RegistryError;

use crate::config::ConfigError;

/// Exit code for a clean shutdown.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code when the script does not compile.
pub const EXIT_DATA_ERROR: i32 = 65;

/// Exit code for any other startup failure.
pub const EXIT_SOFTWARE: i32 = 70;

/// Exit code when the script source cannot be read.
pub const EXIT_IO_ERROR: i32 = 74;

/// Errors raised while starting or driving a host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The script file could not be read
    #[error("Could not read script '{}': {source}", path.display())]
    SourceUnreadable {
        /// Path that was tried
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The script failed to compile
    #[error("Compile error in module '{module}': {}", first_message(.errors))]
    Compile {
        /// Module that failed
        module: String,
        /// Every error the parser found
        errors: Vec<CompileError>,
    },

    /// Script code raised an error
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// The script does not provide what the host needs
    #[error("Binding error: {0}")]
    Binding(String),

    /// The native catalog could not be installed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The host configuration is invalid
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl HostError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            HostError::SourceUnreadable { .. } => EXIT_IO_ERROR,
            HostError::Compile { .. } => EXIT_DATA_ERROR,
            HostError::Runtime(_) | HostError::Binding(_) | HostError::Registry(_) | HostError::Config(_) => {
                EXIT_SOFTWARE
            }
        }
    }
}

impl From<InterpretError> for HostError {
    fn from(error: InterpretError) -> Self {
        match error {
            InterpretError::Compile { module, errors } => HostError::Compile { module, errors },
            InterpretError::Runtime(error) => HostError::Runtime(error),
        }
    }
}

fn first_message(errors: &[CompileError]) -> String {
    errors
        .first()
        .map(|e| e.to_string())
        .unwrap_or_default()
}
