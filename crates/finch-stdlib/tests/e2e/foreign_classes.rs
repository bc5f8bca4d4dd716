//! File and Transform foreign classes driven from scripts

use super::harness::*;

#[test]
fn test_transform_matrix() {
    expect_gui_output(
        "import \"gui\" for Transform
var t = Transform.new()
System.print(t.matrix)
t.setScale(2, 3)
System.print(t.matrix)
var move = Transform.new()
move.setTranslation(10, 20)
t.concat(move)
System.print(t.matrix)
t.concat(t)
System.print(t.matrix)",
        "[1, 0, 0, 1, 0, 0]\n[2, 0, 0, 3, 0, 0]\n[2, 0, 0, 3, 10, 20]\n[4, 0, 0, 9, 30, 80]\n",
    );
}

#[test]
fn test_file_write_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let source = format!(
        "import \"gui\" for File
var out = File.open(\"{path}\", \"w\")
System.print(out.write(\"line one\"))
System.print(out.size)
System.print(out.close())
var input = File.open(\"{path}\", \"r\")
System.print(input.read())
input.close()",
        path = path.display()
    );
    expect_gui_output(&source, "8\n8\ntrue\nline one\n");
}

#[test]
fn test_unopened_file_answers_sentinels() {
    let dir = tempfile::tempdir().unwrap();
    let source = format!(
        "import \"gui\" for File
var f = File.open(\"{path}\", \"r\")
System.print(f.read())
System.print(f.size)
System.print(f.write(\"x\"))",
        path = dir.path().join("absent.txt").display()
    );
    expect_gui_output(&source, "null\n-1\n-1\n");
}

#[test]
fn test_dropped_file_is_closed_by_finalizer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kept.txt");
    let source = format!(
        "import \"gui\" for File
var f = File.open(\"{path}\", \"w\")
f.write(\"unclosed\")",
        path = path.display()
    );
    let vm = run_gui(&source);
    drop(vm);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "unclosed");
}

#[test]
fn test_file_needs_string_arguments() {
    let mut vm = gui_vm();
    let result = vm.run("import \"gui\" for File\nFile.open(1, \"r\")");
    match result {
        Err(finch_engine::InterpretError::Runtime(error)) => {
            assert_eq!(error.kind, finch_engine::ErrorKind::Marshal);
        }
        other => panic!("Expected marshal error, got {:?}", other),
    }
}
