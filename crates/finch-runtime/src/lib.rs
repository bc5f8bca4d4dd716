//! Finch Runtime
//!
//! Hosts a Finch script as an application:
//!
//! - [`Host`] reads the entry script, runs it in a [`RuntimeHandle`] with the
//!   `gui` catalog installed and retains the application callbacks
//! - [`RunLoop`] fires timers, drains events posted from other threads and
//!   dispatches them to the host, all on one thread
//! - [`HostConfig`] is read from `finch.toml` in the resource directory
//!
//! # Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use finch_runtime::{run_app, HostConfig};
//! use finch_stdlib::HeadlessGui;
//!
//! let config = HostConfig::load(Path::new("app"))?;
//! let code = run_app(&config, Vec::new(), Rc::new(HeadlessGui::new()))?;
//! std::process::exit(code);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod host;
pub mod runtime;

pub use app::run_app;
pub use config::{ApplicationConfig, ConfigError, HostConfig, CONFIG_FILE};
pub use error::{HostError, EXIT_DATA_ERROR, EXIT_IO_ERROR, EXIT_SOFTWARE, EXIT_SUCCESS};
pub use event_loop::{EventSender, HostEvent, LoopControl, RunLoop};
pub use host::{EventKind, Host, HostServices, SourceBuffer};
pub use runtime::{RuntimeHandle, RuntimeOptions};
