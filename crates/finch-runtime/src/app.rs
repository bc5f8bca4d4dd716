//! Application entry point

use std::rc::Rc;

use finch_stdlib::GuiBackend;

use crate::config::HostConfig;
use crate::error::HostError;
use crate::event_loop::RunLoop;
use crate::host::{Host, HostServices};

/// Bootstrap the configured script, drive it until it terminates or goes
/// idle, then shut it down.
///
/// Returns the exit code of a completed run. Startup failures are returned
/// as errors; [`HostError::exit_code`] maps them to a process exit code.
pub fn run_app(config: &HostConfig, arguments: Vec<String>, gui: Rc<dyn GuiBackend>) -> Result<i32, HostError> {
    let mut run_loop = RunLoop::new(arguments, config.resource_dir.clone());
    let services = HostServices::new(run_loop.control(), gui);
    let mut host = Host::bootstrap(config, services)?;
    let code = run_loop.run(&mut host);
    host.shutdown();
    log::debug!("exiting with code {}", code);
    Ok(code)
}
