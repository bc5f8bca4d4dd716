//! Error tests: compile errors, runtime errors, traces and reports

use super::harness::*;
use finch_engine::{ErrorKind, InterpretError, ReportKind, VmConfig};

#[test]
fn test_undefined_variable() {
    expect_error_message("System.print(missing)", "Undefined variable 'missing'.");
}

#[test]
fn test_operand_type_errors() {
    expect_error_message("1 + \"a\"", "Right operand must be a number.");
    expect_error_message("\"a\" + 1", "Right operand must be a string.");
    expect_error_message("1..\"x\"", "Right hand side of range must be a number.");
    expect_error_message("null + 1", "Null does not implement '+(_)'.");
}

#[test]
fn test_missing_method() {
    expect_error_message("\"text\".shout()", "String does not implement 'shout()'.");
    expect_error_message("System.shout()", "System metaclass does not implement 'shout()'.");
}

#[test]
fn test_subscript_out_of_bounds() {
    expect_error_message("[1, 2][5]", "Subscript out of bounds.");
    expect_error_message("[1, 2][0.5]", "Subscript must be an integer.");
}

#[test]
fn test_fiber_abort_raises_script_error() {
    let error = expect_runtime_error("Fiber.abort(\"boom\")");
    assert_eq!(error.kind, ErrorKind::Script);
    assert_eq!(error.message, "boom");
}

#[test]
fn test_module_variable_redefinition() {
    expect_error_message("var a = 1\nvar a = 2", "Module variable 'a' is already defined.");
}

#[test]
fn test_field_outside_method() {
    expect_error_message("_x = 1", "Cannot use field '_x' outside of a method.");
}

#[test]
fn test_compile_error_is_reported_per_error() {
    let (mut vm, capture) = new_vm();
    let result = vm.interpret("main", "var = 3");
    match result {
        Err(InterpretError::Compile { module, errors }) => {
            assert_eq!(module, "main");
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].line, 1);
        }
        other => panic!("Expected compile error, got {:?}", other),
    }
    let reports = capture.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, ReportKind::Compile);
    assert_eq!(reports[0].module, "main");
}

#[test]
fn test_unterminated_string_is_compile_error() {
    assert!(matches!(run("var s = \"open"), Err(InterpretError::Compile { .. })));
}

#[test]
fn test_runtime_error_trace() {
    let (mut vm, capture) = new_vm();
    let source = "class Worker {
  static run() {
    step()
  }
  static step() {
    Fiber.abort(\"failed\")
  }
}
Worker.run()";
    let error = match vm.interpret("main", source) {
        Err(InterpretError::Runtime(error)) => error,
        other => panic!("Expected runtime error, got {:?}", other),
    };

    let functions: Vec<_> = error.trace.iter().map(|f| f.function.as_str()).collect();
    assert_eq!(functions, vec!["Worker.step()", "Worker.run()", "(script)"]);
    let lines: Vec<_> = error.trace.iter().map(|f| f.line).collect();
    assert_eq!(lines, vec![6, 3, 9]);
    assert_eq!(error.origin(), Some(("main", 6)));

    let reports = capture.reports();
    assert_eq!(reports.len(), 4);
    assert_eq!(reports[0].kind, ReportKind::Runtime);
    assert_eq!(reports[0].message, "failed");
    assert_eq!(reports[0].line, 6);
    assert!(reports[1..].iter().all(|r| r.kind == ReportKind::StackTrace));
    assert_eq!(reports[3].message, "(script)");
}

#[test]
fn test_output_before_error_is_kept() {
    let (mut vm, capture) = new_vm();
    let result = vm.interpret("main", "System.print(\"before\")\nFiber.abort(\"stop\")\nSystem.print(\"after\")");
    assert!(result.is_err());
    assert_eq!(capture.output(), "before\n");
}

#[test]
fn test_stack_overflow() {
    let config = VmConfig {
        max_call_depth: 32,
        ..VmConfig::default()
    };
    let (mut vm, _capture) = new_vm_with(config);
    let result = vm.interpret(
        "main",
        "class Loop {
  static forever(n) { forever(n + 1) }
}
Loop.forever(0)",
    );
    match result {
        Err(InterpretError::Runtime(error)) => assert_eq!(error.message, "Stack overflow."),
        other => panic!("Expected stack overflow, got {:?}", other),
    }
}

#[test]
fn test_vm_usable_after_runtime_error() {
    let (mut vm, capture) = new_vm();
    assert!(vm.interpret("main", "var x = 1\nFiber.abort(\"first\")").is_err());
    vm.interpret("other", "System.print(\"still running\")")
        .expect("second module should run");
    assert_eq!(capture.output(), "still running\n");
    assert!(vm.has_variable("main", "x"));
}
