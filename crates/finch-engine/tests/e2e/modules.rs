//! Module import tests

use std::cell::Cell;
use std::rc::Rc;

use super::harness::*;
use finch_engine::{InterpretError, VmConfig};

fn loader_config(loads: Rc<Cell<usize>>) -> VmConfig {
    VmConfig {
        load_module: Some(Box::new(move |name: &str| {
            loads.set(loads.get() + 1);
            match name {
                "util" => Some(
                    "System.print(\"util loaded\")
class Util {
  static double(n) { n * 2 }
}
var VERSION = 3"
                        .to_string(),
                ),
                "broken" => Some("class {".to_string()),
                _ => None,
            }
        })),
        ..VmConfig::default()
    }
}

#[test]
fn test_import_copies_named_variables() {
    let loads = Rc::new(Cell::new(0));
    let (mut vm, capture) = new_vm_with(loader_config(loads.clone()));
    vm.interpret(
        "main",
        "import \"util\" for Util, VERSION
System.print(Util.double(VERSION))",
    )
    .unwrap();
    assert_eq!(capture.output(), "util loaded\n6\n");
    assert!(vm.has_variable("util", "Util"));
    assert!(vm.has_variable("main", "Util"));
}

#[test]
fn test_module_runs_once() {
    let loads = Rc::new(Cell::new(0));
    let (mut vm, capture) = new_vm_with(loader_config(loads.clone()));
    vm.interpret("main", "import \"util\" for Util\nimport \"util\" for VERSION").unwrap();
    vm.interpret("second", "import \"util\" for Util").unwrap();
    assert_eq!(loads.get(), 1);
    assert_eq!(capture.output(), "util loaded\n");
}

#[test]
fn test_missing_module() {
    let loads = Rc::new(Cell::new(0));
    let (mut vm, _capture) = new_vm_with(loader_config(loads));
    match vm.interpret("main", "import \"nowhere\" for Thing") {
        Err(InterpretError::Runtime(error)) => assert_eq!(error.message, "Could not load module 'nowhere'."),
        other => panic!("Expected load error, got {:?}", other),
    }
}

#[test]
fn test_missing_imported_variable() {
    let loads = Rc::new(Cell::new(0));
    let (mut vm, _capture) = new_vm_with(loader_config(loads));
    match vm.interpret("main", "import \"util\" for Missing") {
        Err(InterpretError::Runtime(error)) => assert_eq!(
            error.message,
            "Could not find a variable named 'Missing' in module 'util'."
        ),
        other => panic!("Expected import error, got {:?}", other),
    }
}

#[test]
fn test_imported_module_compile_error() {
    let loads = Rc::new(Cell::new(0));
    let (mut vm, capture) = new_vm_with(loader_config(loads));
    let result = vm.interpret("main", "import \"broken\"");
    assert!(matches!(result, Err(InterpretError::Runtime(_))));
    let reports = capture.reports();
    assert_eq!(reports[0].kind, finch_engine::ReportKind::Compile);
    assert_eq!(reports[0].module, "broken");
}

#[test]
fn test_import_alias_allows_subclassing() {
    let loads = Rc::new(Cell::new(0));
    let (mut vm, capture) = new_vm_with(loader_config(loads));
    vm.interpret(
        "main",
        "import \"util\" for Util as Base
class Util is Base {
  static triple(n) { n * 3 }
}
System.print(Util.double(2))
System.print(Util.triple(2))",
    )
    .unwrap();
    assert_eq!(capture.output(), "util loaded\n4\n6\n");
    assert!(vm.has_variable("main", "Base"));
}
