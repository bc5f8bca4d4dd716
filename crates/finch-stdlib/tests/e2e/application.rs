//! Application and Time scripts

use std::path::PathBuf;
use std::time::Duration;

use super::harness::*;
use finch_sdk::HandleId;

#[test]
fn test_timers_are_scheduled_on_the_host() {
    let vm = expect_gui_output(
        "import \"gui\" for Application
var timer = Application.startTimer(0.25, true)
System.print(Application.stopTimer(timer))
System.print(Application.stopTimer(timer))",
        "true\nfalse\n",
    );
    let timers = vm.host.timers.borrow();
    assert_eq!(timers.as_slice(), &[(HandleId(100), Duration::from_millis(250), true)]);
}

#[test]
fn test_run_close_and_terminate() {
    let vm = run_gui(
        "import \"gui\" for Application
var app = Application.new()
app.run
Application.terminate",
    );
    assert!(vm.host.kept_alive.get());
    assert!(vm.host.terminated.get());
}

#[test]
fn test_launch_information() {
    let host = TestHost {
        arguments: vec!["alpha".to_string(), "beta".to_string()],
        resources: PathBuf::from("/srv/finch"),
        ..TestHost::default()
    };
    let mut vm = gui_vm_with(host);
    vm.run(
        "import \"gui\" for Application
System.print(Application.commandArguments)
System.print(Application.resourcePath)
System.print(Application.commandArguments.count)",
    )
    .unwrap();
    assert_eq!(vm.output(), "[alpha, beta]\n/srv/finch\n2\n");
}

#[test]
fn test_main_screen_and_window() {
    let vm = expect_gui_output(
        "import \"gui\" for Application, Window
var app = Application.new()
System.print(app.mainScreenFrame)
var main = Window.main()
main.title = \"Main\"",
        "[0, 0, 1280, 800]\n",
    );
    assert_eq!(vm.gui.widget(HandleId(1)).unwrap().kind, "Window");
}

#[test]
fn test_time() {
    expect_gui_output(
        "import \"gui\" for Time
var start = Time.ticks
var now = Time.now
System.print(now > 1600000000)
System.print(Time.dateTime(now).count)
Time.sleep(0.01)
System.print(Time.ticks - start >= 10000)",
        "true\n19\ntrue\n",
    );
}

#[test]
fn test_filesystem_statics() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("greeting.txt");
    std::fs::write(&path, "hi there").unwrap();
    let copy = dir.path().join("copy.txt");

    let source = format!(
        "import \"gui\" for Application
System.print(Application.readFile(\"{path}\"))
System.print(Application.copyFile(\"{path}\", \"{copy}\"))
System.print(Application.fileExists(\"{copy}\"))
System.print(Application.readFile(\"{missing}\"))",
        path = path.display(),
        copy = copy.display(),
        missing = dir.path().join("missing").display(),
    );
    expect_gui_output(&source, "hi there\ntrue\ntrue\nnull\n");
}

#[test]
fn test_alert_and_panels() {
    let mut vm = gui_vm();
    vm.gui.set_alert_response(1.0);
    vm.run(
        "import \"gui\" for Application
System.print(Application.alert(\"Quit?\", \"Unsaved changes\", \"Save\", \"Discard\", null))
System.print(Application.openPanel(\"Open\", [\"txt\"], false))
Application.playSound(\"ping.wav\")",
    )
    .unwrap();
    assert_eq!(vm.output(), "1\nnull\n");
    assert_eq!(vm.gui.call_count("Application", "playSound(_)"), 1);
}
