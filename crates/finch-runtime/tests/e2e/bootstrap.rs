//! Bootstrap: reading the script, binding the application and tearing down

use std::path::PathBuf;

use super::harness::*;
use finch_engine::live_vm_count;
use finch_runtime::{Host, HostConfig, HostError, HostServices, RunLoop};
use finch_stdlib::HeadlessGui;

#[test]
fn test_bootstrap_retains_class_and_callbacks() {
    let mut app = start_app(NO_OP_APP);
    assert_eq!(live_vm_count(), 1);
    assert_eq!(app.host.module(), "main");
    assert_eq!(app.host.vm().unwrap().handle_count(), 4);

    app.host.shutdown();
    assert_eq!(live_vm_count(), 0);
}

#[test]
fn test_dropping_host_tears_down_runtime() {
    let app = start_app(NO_OP_APP);
    assert_eq!(live_vm_count(), 1);
    drop(app);
    assert_eq!(live_vm_count(), 0);
}

#[test]
fn test_top_level_code_runs_during_bootstrap() {
    let app = start_app(&format!("{}\nSystem.print(\"ready\")", NO_OP_APP));
    assert_eq!(app.capture.output(), "ready\n");
}

#[test]
fn test_unreadable_script_exits_74_without_a_vm() {
    let config = HostConfig {
        script: Some(PathBuf::from("/nonexistent/finch/main.finch")),
        ..HostConfig::default()
    };
    let (result, _, capture) = try_bootstrap(&config, Vec::new());
    match result {
        Err(error @ HostError::SourceUnreadable { .. }) => assert_eq!(error.exit_code(), 74),
        Err(other) => panic!("Expected unreadable source, got {:?}", other),
        Ok(_) => panic!("Expected unreadable source"),
    }
    assert_eq!(live_vm_count(), 0);
    assert!(capture.reports().is_empty());
}

#[test]
fn test_missing_callback_is_a_binding_error() {
    let error = expect_bootstrap_error(
        "import \"gui\" for Application as App
class Application is App {
  static event(e) {}
  static notification(n) {}
}",
    );
    match &error {
        HostError::Binding(message) => {
            assert!(message.contains("timer(_)"), "{}", message);
            assert!(!message.contains("event(_)"), "{}", message);
        }
        other => panic!("Expected binding error, got {:?}", other),
    }
    assert_eq!(error.exit_code(), 70);
    assert_eq!(live_vm_count(), 0);
}

#[test]
fn test_every_missing_callback_is_named() {
    let error = expect_bootstrap_error("import \"gui\" for Application");
    let message = error.to_string();
    for signature in ["event(_)", "notification(_)", "timer(_)"] {
        assert!(message.contains(signature), "{}", message);
    }
}

#[test]
fn test_missing_application_class() {
    let error = expect_bootstrap_error("class Game {}");
    match error {
        HostError::Binding(message) => assert!(message.contains("Application"), "{}", message),
        other => panic!("Expected binding error, got {:?}", other),
    }
    assert_eq!(live_vm_count(), 0);
}

#[test]
fn test_callbacks_may_be_inherited() {
    let app = start_app(
        "class Base {
  static event(e) { System.print(\"base event\") }
  static notification(n) {}
  static timer(t) {}
}
class Application is Base {}",
    );
    let mut host = app.host;
    host.dispatch_event(finch_runtime::EventKind::Event, finch_sdk::HostValue::Null)
        .unwrap();
    assert_eq!(app.capture.output(), "base event\n");
}

#[test]
fn test_compile_error_exits_65() {
    let error = expect_bootstrap_error("class Application {\n  static event(e) {\n");
    assert!(matches!(error, HostError::Compile { .. }), "{:?}", error);
    assert_eq!(error.exit_code(), 65);
    assert_eq!(live_vm_count(), 0);
}

#[test]
fn test_top_level_runtime_error_exits_70() {
    let error = expect_bootstrap_error(&format!("{}\nFiber.abort(\"no config\")", NO_OP_APP));
    match &error {
        HostError::Runtime(e) => assert_eq!(e.message, "no config"),
        other => panic!("Expected runtime error, got {:?}", other),
    }
    assert_eq!(error.exit_code(), 70);
}

#[test]
fn test_configuration_renames_class_and_callbacks() {
    let app_dir = AppDir::new(
        "class Game {
  static input(e) {}
  static notice(n) {}
  static tick(t) { System.print(\"tick\") }
}",
    );
    app_dir.write(
        "finch.toml",
        "[application]
class = \"Game\"
event = \"input(_)\"
notification = \"notice(_)\"
timer = \"tick(_)\"
",
    );
    let config = HostConfig::load(&app_dir.path()).unwrap();
    let (result, _run_loop, capture) = try_bootstrap(&config, Vec::new());
    let mut host = result.expect("bootstrap");
    host.dispatch_event(finch_runtime::EventKind::Timer, finch_sdk::HostValue::Null)
        .unwrap();
    assert_eq!(capture.output(), "tick\n");
}

#[test]
fn test_entry_script_can_import_sibling_modules() {
    let app_dir = AppDir::new(
        "import \"greeting\" for Greeting
class Application {
  static event(e) { System.print(Greeting) }
  static notification(n) {}
  static timer(t) {}
}",
    );
    app_dir.write("greeting.finch", "var Greeting = \"hello\"\n");
    let (result, _run_loop, capture) = try_bootstrap(&app_dir.config, Vec::new());
    let mut host = result.expect("bootstrap");
    host.dispatch_event(finch_runtime::EventKind::Event, finch_sdk::HostValue::Null)
        .unwrap();
    assert_eq!(capture.output(), "hello\n");
}

#[test]
fn test_launch_information_reaches_the_script() {
    let app_dir = AppDir::new(&format!(
        "{}\nSystem.print(App.commandArguments)\nSystem.print(App.resourcePath)",
        NO_OP_APP
    ));
    let run_loop = RunLoop::new(vec!["--fast".to_string()], PathBuf::from("/opt/game"));
    let capture = Capture::default();
    let services = capture.install(HostServices::new(run_loop.control(), std::rc::Rc::new(HeadlessGui::new())));
    let host = Host::bootstrap(&app_dir.config, services).expect("bootstrap");
    assert_eq!(capture.output(), "[--fast]\n/opt/game\n");
    host.shutdown();
}
