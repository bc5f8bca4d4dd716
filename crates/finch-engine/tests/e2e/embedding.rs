//! Embedding API tests: slots, variables, handles and host calls

use super::harness::*;
use finch_engine::{live_vm_count, ErrorKind, ReportKind, Vm, VmConfig};
use finch_sdk::{CallFrame, HostValue, SlotType};

const APP: &str = "class App {
  static greet(name) { \"hello \" + name }
  static add(a, b) { a + b }
  static fail() { Fiber.abort(\"handler failed\") }
  static make(start) { Tally.new(start) }
}
class Tally {
  construct new(start) { _total = start }
  add(n) {
    _total = _total + n
    return _total
  }
}
";

#[test]
fn test_call_handle_with_arguments() {
    let (mut vm, _capture) = new_vm();
    vm.interpret("main", APP).unwrap();

    vm.ensure_slots(3);
    vm.get_variable("main", "App", 0).unwrap();
    vm.slots().set_num(1, 2.0).unwrap();
    vm.slots().set_num(2, 40.0).unwrap();
    let add = vm.make_call_handle("add(_,_)").unwrap();
    vm.call(&add).unwrap();
    assert_eq!(vm.slots().get_num(0).unwrap(), 42.0);

    vm.get_variable("main", "App", 0).unwrap();
    vm.slots().set_str(1, "finch").unwrap();
    let greet = vm.make_call_handle("greet(_)").unwrap();
    vm.call(&greet).unwrap();
    assert_eq!(vm.slots().get_str(0).unwrap(), "hello finch");

    assert!(vm.release_handle(add));
    assert!(vm.release_handle(greet));
    assert_eq!(vm.handle_count(), 0);
}

#[test]
fn test_retained_instance_keeps_state() {
    let (mut vm, _capture) = new_vm();
    vm.interpret("main", APP).unwrap();

    vm.ensure_slots(2);
    vm.get_variable("main", "App", 0).unwrap();
    vm.slots().set_num(1, 10.0).unwrap();
    let make = vm.make_call_handle("make(_)").unwrap();
    vm.call(&make).unwrap();
    assert_eq!(vm.slots().slot_type(0).unwrap(), SlotType::Unknown);
    let tally = vm.get_slot_handle(0).unwrap();

    let add = vm.make_call_handle("add(_)").unwrap();
    for n in [1.0, 2.0, 3.0] {
        vm.set_slot_handle(0, &tally).unwrap();
        vm.slots().set_num(1, n).unwrap();
        vm.call(&add).unwrap();
    }
    assert_eq!(vm.slots().get_num(0).unwrap(), 16.0);
    assert_eq!(vm.handle_count(), 3);

    vm.release_handle(make);
    vm.release_handle(add);
    vm.release_handle(tally);
    assert_eq!(vm.handle_count(), 0);
}

#[test]
fn test_call_error_is_returned_and_reported() {
    let (mut vm, capture) = new_vm();
    vm.interpret("main", APP).unwrap();

    vm.ensure_slots(1);
    vm.get_variable("main", "App", 0).unwrap();
    let fail = vm.make_call_handle("fail()").unwrap();
    let error = vm.call(&fail).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Script);
    assert_eq!(error.message, "handler failed");

    let reports = capture.reports();
    assert_eq!(reports[0].kind, ReportKind::Runtime);
    assert_eq!(reports[0].message, "handler failed");
    assert_eq!(reports[1].message, "App.fail()");

    // The VM keeps working after a failed call
    vm.get_variable("main", "App", 0).unwrap();
    let greet = vm.make_call_handle("greet(_)").unwrap();
    vm.ensure_slots(2);
    vm.slots().set_str(1, "again").unwrap();
    vm.call(&greet).unwrap();
    assert_eq!(vm.slots().get_str(0).unwrap(), "hello again");
    vm.release_handle(fail);
    vm.release_handle(greet);
}

#[test]
fn test_missing_variable_is_api_error() {
    let (mut vm, _capture) = new_vm();
    vm.interpret("main", APP).unwrap();
    vm.ensure_slots(1);
    let error = vm.get_variable("main", "Nope", 0).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Api);
    let error = vm.get_variable("other", "App", 0).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Api);
    assert!(vm.has_variable("main", "App"));
    assert!(!vm.has_variable("main", "Nope"));
}

#[test]
fn test_call_without_enough_slots() {
    let (mut vm, _capture) = new_vm();
    vm.interpret("main", APP).unwrap();
    vm.ensure_slots(1);
    vm.get_variable("main", "App", 0).unwrap();
    let add = vm.make_call_handle("add(_,_)").unwrap();
    let error = vm.call(&add).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Api);
    vm.release_handle(add);
}

#[test]
fn test_invalid_call_signature() {
    let (mut vm, _capture) = new_vm();
    let error = vm.make_call_handle("broken(").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Api);
}

#[test]
fn test_responds_to() {
    let (mut vm, _capture) = new_vm();
    vm.interpret("main", APP).unwrap();
    vm.ensure_slots(1);
    vm.get_variable("main", "App", 0).unwrap();
    assert!(vm.responds_to(0, "greet(_)"));
    assert!(!vm.responds_to(0, "greet()"));
    assert!(!vm.responds_to(0, "missing(_)"));
    assert!(!vm.responds_to(5, "greet(_)"));
}

#[test]
fn test_handle_from_other_vm_is_rejected() {
    let (mut a, _ca) = new_vm();
    let (mut b, _cb) = new_vm();
    a.interpret("main", APP).unwrap();
    a.ensure_slots(1);
    b.ensure_slots(1);
    a.get_variable("main", "App", 0).unwrap();
    let app = a.get_slot_handle(0).unwrap();

    let error = b.set_slot_handle(0, &app).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Api);
    assert!(a.release_handle(app));
}

#[test]
fn test_value_handle_is_not_callable() {
    let (mut vm, _capture) = new_vm();
    vm.interpret("main", APP).unwrap();
    vm.ensure_slots(1);
    vm.get_variable("main", "App", 0).unwrap();
    let app = vm.get_slot_handle(0).unwrap();
    assert_eq!(vm.call(&app).unwrap_err().kind, ErrorKind::Api);
    vm.release_handle(app);
}

#[test]
fn test_numbers_cross_as_doubles() {
    let (mut vm, _capture) = new_vm();
    vm.ensure_slots(2);
    vm.slots().set_value(0, HostValue::from(9_007_199_254_740_993u64)).unwrap();
    assert_eq!(vm.slots().get_num(0).unwrap(), 9_007_199_254_740_992.0);
    vm.slots().set_value(1, HostValue::from(-12i64)).unwrap();
    assert_eq!(vm.slots().get_num(1).unwrap(), -12.0);
}

#[test]
fn test_lists_cross_by_copy() {
    let (mut vm, _capture) = new_vm();
    vm.interpret("main", "var items = [1, \"two\", null, [true]]").unwrap();
    vm.ensure_slots(1);
    vm.get_variable("main", "items", 0).unwrap();
    let list = vm.slots().get_list(0).unwrap();
    assert_eq!(
        list,
        vec![
            HostValue::Num(1.0),
            HostValue::from("two"),
            HostValue::Null,
            HostValue::List(vec![HostValue::Bool(true)]),
        ]
    );
}

#[test]
fn test_live_vm_count_tracks_drop() {
    let before = live_vm_count();
    let vm = Vm::new(VmConfig::default());
    assert_eq!(live_vm_count(), before + 1);
    drop(vm);
    assert_eq!(live_vm_count(), before);
}

#[test]
fn test_numbers_survive_slots_and_script_calls() {
    let (mut vm, _capture) = new_vm();
    vm.interpret(
        "main",
        "class Echo {
  static echo(n) { n }
  static same(a, b) { a == b }
}
",
    )
    .unwrap();
    let numbers = [-0.0, f64::MIN_POSITIVE, 4.9e-324, f64::MAX, 9_007_199_254_740_992.0];

    vm.ensure_slots(numbers.len());
    for (slot, n) in numbers.iter().enumerate() {
        vm.slots().set_num(slot, *n).unwrap();
    }
    for (slot, n) in numbers.iter().enumerate() {
        assert_eq!(vm.slots().get_num(slot).unwrap().to_bits(), n.to_bits());
    }

    let echo = vm.make_call_handle("echo(_)").unwrap();
    for n in numbers {
        vm.ensure_slots(2);
        vm.get_variable("main", "Echo", 0).unwrap();
        vm.slots().set_num(1, n).unwrap();
        vm.call(&echo).unwrap();
        assert_eq!(vm.slots().get_num(0).unwrap().to_bits(), n.to_bits());
    }

    let same = vm.make_call_handle("same(_,_)").unwrap();
    vm.ensure_slots(3);
    vm.get_variable("main", "Echo", 0).unwrap();
    vm.slots().set_num(1, f64::MAX).unwrap();
    vm.slots().set_num(2, f64::MAX).unwrap();
    vm.call(&same).unwrap();
    assert!(vm.slots().get_bool(0).unwrap());

    assert!(vm.release_handle(echo));
    assert!(vm.release_handle(same));
}
