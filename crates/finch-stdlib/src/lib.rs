//! Finch Standard Library
//!
//! Native implementations of the `gui` module catalog:
//!
//! - [`time`]: wall clock, ticks, date formatting and sleeping
//! - [`fs`]: file and directory helpers plus well-known paths
//! - [`file`] and [`transform`]: the two foreign classes
//! - [`process`]: blocking child process execution
//! - [`app`]: application control through the [`HostControl`] service
//! - [`gui`]: window, pane, menu and media operations routed to a
//!   [`GuiBackend`]
//!
//! [`register_gui`] installs every binding into a pair of registries. The
//! script side of the module ships as [`GUI_MODULE_SOURCE`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod app;
pub mod file;
pub mod fs;
pub mod gui;
pub mod process;
pub mod registry;
pub mod time;
pub mod transform;

pub use app::HostControl;
pub use gui::{GuiBackend, GuiCall, HeadlessGui};
pub use registry::register_gui;

/// Name scripts import the catalog under.
pub const GUI_MODULE: &str = "gui";

/// Script side of the `gui` module: class declarations whose foreign
/// members resolve to the bindings installed by [`register_gui`].
pub const GUI_MODULE_SOURCE: &str = include_str!("../finch/gui.finch");
