//! Test harness: temporary resource directories and capturing hosts

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use finch_engine::ReportKind;
use finch_runtime::{Host, HostConfig, HostError, HostServices, RunLoop};
use finch_stdlib::HeadlessGui;
use tempfile::TempDir;

/// An application whose callbacks do nothing.
pub const NO_OP_APP: &str = "import \"gui\" for Application as App
class Application is App {
  static event(e) {}
  static notification(n) {}
  static timer(t) {}
}";

/// One call of the error callback.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kind: ReportKind,
    pub module: String,
    pub line: u32,
    pub message: String,
}

/// Output and reports captured from a host.
#[derive(Clone, Default)]
pub struct Capture {
    output: Rc<RefCell<String>>,
    reports: Rc<RefCell<Vec<Report>>>,
}

impl Capture {
    /// Everything printed so far.
    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }

    /// Every report so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports.borrow().clone()
    }

    /// Install capturing write/error callbacks on `services`.
    pub fn install(&self, mut services: HostServices) -> HostServices {
        let output = self.output.clone();
        services.write = Some(Box::new(move |text: &str| output.borrow_mut().push_str(text)));
        let reports = self.reports.clone();
        services.error = Some(Box::new(move |kind: ReportKind, module: &str, line: u32, message: &str| {
            reports.borrow_mut().push(Report {
                kind,
                module: module.to_string(),
                line,
                message: message.to_string(),
            })
        }));
        services
    }
}

/// A resource directory holding `main.finch`.
pub struct AppDir {
    dir: TempDir,
    pub config: HostConfig,
}

impl AppDir {
    /// Write `source` as the entry script.
    pub fn new(source: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("main.finch"), source).expect("write script");
        let config = HostConfig::load(dir.path()).expect("config");
        Self { dir, config }
    }

    /// Write another file into the resource directory.
    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.dir.path().join(name), contents).expect("write file");
    }

    /// The resource directory.
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}

/// A bootstrapped host with the run loop that serves it.
pub struct TestApp {
    pub host: Host,
    pub run_loop: RunLoop,
    pub capture: Capture,
    pub gui: Rc<HeadlessGui>,
    pub app_dir: AppDir,
}

impl TestApp {
    /// Drive the run loop to completion.
    pub fn run(&mut self) -> i32 {
        self.run_loop.run(&mut self.host)
    }
}

/// Bootstrap `config` with capturing services.
pub fn try_bootstrap(config: &HostConfig, arguments: Vec<String>) -> (Result<Host, HostError>, RunLoop, Capture) {
    let run_loop = RunLoop::new(arguments, config.resource_dir.clone());
    let capture = Capture::default();
    let services = capture.install(HostServices::new(run_loop.control(), Rc::new(HeadlessGui::new())));
    (Host::bootstrap(config, services), run_loop, capture)
}

/// Bootstrap `source`; panics if startup fails.
pub fn start_app(source: &str) -> TestApp {
    let app_dir = AppDir::new(source);
    let run_loop = RunLoop::new(Vec::new(), app_dir.path());
    let capture = Capture::default();
    let gui = Rc::new(HeadlessGui::new());
    let services = capture.install(HostServices::new(run_loop.control(), gui.clone()));
    let host = match Host::bootstrap(&app_dir.config, services) {
        Ok(host) => host,
        Err(e) => panic!("Bootstrap failed: {}\nSource:\n{}", e, source),
    };
    TestApp {
        host,
        run_loop,
        capture,
        gui,
        app_dir,
    }
}

/// Bootstrap `source`, expecting failure.
pub fn expect_bootstrap_error(source: &str) -> HostError {
    let app_dir = AppDir::new(source);
    let (result, _, _) = try_bootstrap(&app_dir.config, Vec::new());
    match result {
        Ok(_) => panic!("Expected bootstrap to fail\nSource:\n{}", source),
        Err(e) => e,
    }
}
