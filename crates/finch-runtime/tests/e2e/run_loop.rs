//! The run loop: timers, posted events, other threads and termination

use std::thread;
use std::time::{Duration, Instant};

use super::harness::*;
use finch_runtime::{run_app, EventKind, EXIT_SUCCESS};
use finch_sdk::HostValue;
use finch_stdlib::HeadlessGui;

#[test]
fn test_idle_script_exits_immediately() {
    let mut app = start_app(NO_OP_APP);
    assert_eq!(app.run(), EXIT_SUCCESS);
    assert_eq!(app.capture.output(), "");
}

#[test]
fn test_posted_events_dispatch_in_order() {
    let mut app = start_app(
        "class Application {
  static event(e) { System.print(e) }
  static notification(n) { System.print(\"n:\" + n) }
  static timer(t) {}
}",
    );
    app.run_loop.post(EventKind::Event, HostValue::from("first"));
    app.run_loop.post(EventKind::Notification, HostValue::from("second"));
    app.run_loop.post(EventKind::Event, HostValue::from("third"));
    assert_eq!(app.run(), 0);
    assert_eq!(app.capture.output(), "first\nn:second\nthird\n");
}

#[test]
fn test_repeating_timer_until_terminate() {
    let mut app = start_app(
        "import \"gui\" for Application as App
class Application is App {
  static start() {
    __ticks = 0
    __timer = App.startTimer(0.005, true)
  }
  static timer(t) {
    if (t != __timer) Fiber.abort(\"unexpected timer\")
    __ticks = __ticks + 1
    System.print(\"tick \" + __ticks.toString)
    if (__ticks == 3) App.terminate
  }
  static event(e) {}
  static notification(n) {}
}
Application.start()",
    );
    let started = Instant::now();
    assert_eq!(app.run(), 0);
    assert_eq!(app.capture.output(), "tick 1\ntick 2\ntick 3\n");
    assert!(started.elapsed() >= Duration::from_millis(15));
    assert!(app.capture.reports().is_empty());
}

#[test]
fn test_one_shot_timer_then_idle() {
    let mut app = start_app(
        "import \"gui\" for Application as App
class Application is App {
  static timer(t) { System.print(\"fired\") }
  static event(e) {}
  static notification(n) {}
}
App.startTimer(0.001, false)",
    );
    assert_eq!(app.run(), 0);
    assert_eq!(app.capture.output(), "fired\n");
    assert_eq!(app.run_loop.control().active_timers(), 0);
}

#[test]
fn test_stopping_a_timer_does_not_retract_queued_event() {
    let mut app = start_app(
        "import \"gui\" for Application as App
class Application is App {
  static start() {
    __a = App.startTimer(0, true)
    __b = App.startTimer(0, true)
  }
  static timer(t) {
    if (t == __a) {
      System.print(\"a\")
      System.print(App.stopTimer(__b))
      App.stopTimer(__a)
    } else {
      System.print(\"b\")
    }
  }
  static event(e) {}
  static notification(n) {}
}
Application.start()",
    );
    assert_eq!(app.run(), 0);
    assert_eq!(app.capture.output(), "a\ntrue\nb\n");
}

#[test]
fn test_errors_do_not_stop_the_loop() {
    let mut app = start_app(
        "class Application {
  static event(e) {
    if (e == 1) Fiber.abort(\"first fails\")
    System.print(e)
  }
  static notification(n) {}
  static timer(t) {}
}",
    );
    app.run_loop.post(EventKind::Event, HostValue::Num(1.0));
    app.run_loop.post(EventKind::Event, HostValue::Num(2.0));
    assert_eq!(app.run(), 0);
    assert_eq!(app.capture.output(), "2\n");
    assert_eq!(app.capture.reports()[0].message, "first fails");
}

#[test]
fn test_events_from_another_thread_are_marshaled_to_the_host() {
    let mut app = start_app(
        "import \"gui\" for Application as App
class Application is App {
  static event(e) {
    System.print(e)
    if (e == \"quit\") App.terminate
  }
  static notification(n) {}
  static timer(t) {}
}
App.new().run",
    );
    let sender = app.run_loop.sender();
    let worker = thread::spawn(move || {
        for word in ["load", "save", "quit"] {
            thread::sleep(Duration::from_millis(2));
            assert!(sender.send(EventKind::Event, HostValue::from(word)));
        }
    });
    assert_eq!(app.run(), 0);
    worker.join().unwrap();
    assert_eq!(app.capture.output(), "load\nsave\nquit\n");
    assert!(app.run_loop.control().is_kept_alive());
}

#[test]
fn test_loop_waits_for_live_senders() {
    let mut app = start_app(
        "class Application {
  static event(e) { System.print(e) }
  static notification(n) {}
  static timer(t) {}
}",
    );
    let sender = app.run_loop.sender();
    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        sender.send(EventKind::Event, HostValue::from("late"));
    });
    assert_eq!(app.run(), 0);
    worker.join().unwrap();
    assert_eq!(app.capture.output(), "late\n");
}

#[test]
fn test_terminate_from_another_thread() {
    let mut app = start_app(&format!("{}\nApp.new().run", NO_OP_APP));
    let sender = app.run_loop.sender();
    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(5));
        sender.terminate()
    });
    assert_eq!(app.run(), 0);
    assert!(worker.join().unwrap());
    assert!(app.run_loop.control().is_terminated());
}

#[test]
fn test_close_releases_keep_alive() {
    let mut app = start_app(
        "import \"gui\" for Application as App
class Application is App {
  static timer(t) {
    System.print(\"closing\")
    __app.close
  }
  static event(e) {}
  static notification(n) {}
  static open() {
    __app = App.new()
    __app.run
    App.startTimer(0, false)
  }
}
Application.open()",
    );
    assert_eq!(app.run(), 0);
    assert_eq!(app.capture.output(), "closing\n");
    assert!(!app.run_loop.control().is_kept_alive());
}

#[test]
fn test_run_app_end_to_end() {
    let app_dir = AppDir::new(
        "import \"gui\" for Application as App
class Application is App {
  static timer(t) { App.terminate }
  static event(e) {}
  static notification(n) {}
}
App.startTimer(0, false)",
    );
    let code = run_app(&app_dir.config, Vec::new(), std::rc::Rc::new(HeadlessGui::new())).unwrap();
    assert_eq!(code, 0);
    assert_eq!(finch_engine::live_vm_count(), 0);
}

#[test]
fn test_run_app_reports_startup_failure() {
    let app_dir = AppDir::new("class Application {}");
    let error = run_app(&app_dir.config, Vec::new(), std::rc::Rc::new(HeadlessGui::new())).unwrap_err();
    assert_eq!(error.exit_code(), 70);
}
