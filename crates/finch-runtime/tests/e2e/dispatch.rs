//! Event dispatch: payload marshaling and contained script errors

use super::harness::*;
use finch_engine::{ErrorKind, ReportKind};
use finch_runtime::{EventKind, HostError};
use finch_sdk::{HandleId, HostValue};

const ECHO_APP: &str = "class Application {
  static event(e) { System.print(\"event \" + e.toString) }
  static notification(n) { System.print(\"notification \" + n.toString) }
  static timer(t) { System.print(\"timer \" + t.toString) }
}";

#[test]
fn test_no_op_handlers_survive_timer_dispatch() {
    let mut app = start_app(NO_OP_APP);
    app.host
        .dispatch_event(EventKind::Timer, HostValue::Handle(HandleId(1)))
        .unwrap();
    app.host.dispatch_event(EventKind::Event, HostValue::Null).unwrap();
    app.host.dispatch_event(EventKind::Notification, HostValue::Null).unwrap();
    assert_eq!(app.host.vm().unwrap().handle_count(), 4);
}

#[test]
fn test_each_kind_reaches_its_callback() {
    let mut app = start_app(ECHO_APP);
    app.host.dispatch_event(EventKind::Event, HostValue::from("click")).unwrap();
    app.host
        .dispatch_event(EventKind::Notification, HostValue::from("wake"))
        .unwrap();
    app.host.dispatch_event(EventKind::Timer, HostValue::Num(3.0)).unwrap();
    assert_eq!(app.capture.output(), "event click\nnotification wake\ntimer 3\n");
}

#[test]
fn test_list_payloads_are_marshaled() {
    let mut app = start_app(
        "class Application {
  static event(e) { System.print(e[0] + e[1]) }
  static notification(n) { System.print(n.count) }
  static timer(t) {}
}",
    );
    app.host
        .dispatch_event(EventKind::Event, HostValue::nums(&[40.0, 2.0]))
        .unwrap();
    app.host
        .dispatch_event(
            EventKind::Notification,
            HostValue::List(vec![HostValue::from("a"), HostValue::Null, HostValue::Bool(true)]),
        )
        .unwrap();
    assert_eq!(app.capture.output(), "42\n3\n");
}

#[test]
fn test_script_error_is_contained() {
    let mut app = start_app(
        "class Application {
  static event(e) {
    if (e == \"bad\") Fiber.abort(\"cannot handle \" + e)
    System.print(\"handled \" + e)
  }
  static notification(n) {}
  static timer(t) {}
}",
    );

    let result = app.host.dispatch_event(EventKind::Event, HostValue::from("bad"));
    match result {
        Err(HostError::Runtime(error)) => {
            assert_eq!(error.kind, ErrorKind::Script);
            assert_eq!(error.message, "cannot handle bad");
        }
        other => panic!("Expected runtime error, got {:?}", other),
    }
    let reports = app.capture.reports();
    assert_eq!(reports[0].kind, ReportKind::Runtime);
    assert_eq!(reports[0].message, "cannot handle bad");

    app.host.dispatch_event(EventKind::Event, HostValue::from("good")).unwrap();
    assert_eq!(app.capture.output(), "handled good\n");
}

#[test]
fn test_native_errors_inside_callbacks_are_contained() {
    let mut app = start_app(
        "import \"gui\" for Application as App
class Application is App {
  static event(e) { App.startTimer(e, false) }
  static notification(n) {}
  static timer(t) {}
}",
    );
    let result = app.host.dispatch_event(EventKind::Event, HostValue::from("soon"));
    match result {
        Err(HostError::Runtime(error)) => assert_eq!(error.kind, ErrorKind::Marshal),
        other => panic!("Expected marshal error, got {:?}", other),
    }
    app.host.dispatch_event(EventKind::Event, HostValue::Num(1.0)).unwrap();
    assert_eq!(app.run_loop.control().active_timers(), 1);
}

#[test]
fn test_callbacks_drive_widgets() {
    let mut app = start_app(
        "import \"gui\" for Window
class Application {
  static event(e) {
    __window = Window.new()
    __window.title = e
  }
  static notification(n) {}
  static timer(t) {}
}",
    );
    app.host.dispatch_event(EventKind::Event, HostValue::from("Opened")).unwrap();
    assert_eq!(
        app.gui.property(HandleId(1), "title"),
        Some(HostValue::from("Opened"))
    );
}
