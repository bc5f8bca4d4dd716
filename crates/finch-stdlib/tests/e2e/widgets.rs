//! Widget scripts: windows, panes, controls and menus

use super::harness::*;
use finch_engine::{ErrorKind, InterpretError};
use finch_sdk::{HandleId, HostValue};

#[test]
fn test_gui_module_compiles_and_binds() {
    let vm = run_gui("import \"gui\" for Application, Window, Pane, Button, Menu, MenuItem, Time, File, Transform");
    assert_eq!(vm.gui.widget_count(), 0);
}

#[test]
fn test_window_with_sub_panes() {
    let vm = run_gui(
        "import \"gui\" for Window, Pane
var window = Window.new()
window.title = \"Finch\"
window.frame = [0, 0, 640, 480]
var pane = Pane.new()
pane.colour = \"blue\"
window.add(pane)
window.centre()
window.show()",
    );

    let window = HandleId(1);
    let pane = HandleId(2);
    assert_eq!(vm.gui.property(window, "title"), Some(HostValue::from("Finch")));
    assert_eq!(vm.gui.property(window, "frame"), Some(HostValue::nums(&[0.0, 0.0, 640.0, 480.0])));
    assert_eq!(vm.gui.property(window, "visible"), Some(HostValue::Bool(true)));
    assert_eq!(vm.gui.property(pane, "colour"), Some(HostValue::from("blue")));
    assert_eq!(vm.gui.widget(window).unwrap().children, vec![pane]);
}

#[test]
fn test_getters_round_trip_through_backend() {
    expect_gui_output(
        "import \"gui\" for Button, Pane
var button = Button.new()
button.text = \"Go\"
button.state = 1
System.print(button.text)
System.print(button.state)
System.print(button.visible)
button.visible = false
System.print(button.visible)
var pane = Pane.new()
pane.frame = [1, 2, 3, 4]
System.print(pane.frame)",
        "Go\n1\ntrue\nfalse\n[1, 2, 3, 4]\n",
    );
}

#[test]
fn test_subclass_widgets_use_their_own_constructors() {
    let vm = run_gui(
        "import \"gui\" for PolygonPane, ScrollPane, Label, TextField, PlayerPane
var poly = PolygonPane.new()
poly.points = [0, 0, 10, 0, 5, 8]
poly.strokeWidth = 2
var scroll = ScrollPane.new()
scroll.add(poly)
Label.new()
TextField.new()
var player = PlayerPane.new()
player.play(\"clip.mov\")
player.volume = 0.5",
    );

    let kinds: Vec<_> = (1..=5).map(|n| vm.gui.widget(HandleId(n)).unwrap().kind).collect();
    assert_eq!(kinds, vec!["PolygonPane", "ScrollPane", "Label", "TextField", "PlayerPane"]);
    assert_eq!(vm.gui.property(HandleId(1), "strokeWidth"), Some(HostValue::Num(2.0)));
    assert_eq!(vm.gui.call_count("ScrollPane", "addSubPane(_,_)"), 1);
    assert_eq!(vm.gui.call_count("Pane", "addSubPane(_,_)"), 0);
    assert_eq!(vm.gui.property(HandleId(5), "playing"), Some(HostValue::Bool(true)));
}

#[test]
fn test_menus() {
    let vm = run_gui(
        "import \"gui\" for Menu, MenuItem
var bar = Menu.menubar()
var file = Menu.new(\"File\")
var quit = MenuItem.new(\"Quit\", \"q\")
quit.enabled = false
file.add(MenuItem.separator())
file.add(quit)
bar.submenu(MenuItem.new(\"File\", \"\"))",
    );
    let file = HandleId(2);
    let quit = HandleId(3);
    assert_eq!(vm.gui.widget(file).unwrap().children, vec![HandleId(4), quit]);
    assert_eq!(vm.gui.property(quit, "enable"), Some(HostValue::Bool(false)));
    assert_eq!(vm.gui.widget(HandleId(4)).unwrap().kind, "Separator");
}

#[test]
fn test_transform_reaches_backend_as_matrix() {
    let vm = run_gui(
        "import \"gui\" for Pane, Transform
var pane = Pane.new()
var t = Transform.new()
t.setTranslation(5, 6)
pane.transform = t",
    );
    assert_eq!(
        vm.gui.property(HandleId(1), "transform"),
        Some(HostValue::nums(&[1.0, 0.0, 0.0, 1.0, 5.0, 6.0]))
    );
}

#[test]
fn test_font_is_passed_by_handle() {
    let vm = run_gui(
        "import \"gui\" for Label, Font
var label = Label.new()
label.font = Font.new(\"Menlo\", 12, false, true)",
    );
    assert_eq!(vm.gui.property(HandleId(2), "size"), Some(HostValue::Num(12.0)));
    assert_eq!(vm.gui.property(HandleId(1), "font"), Some(HostValue::Handle(HandleId(2))));
}

#[test]
fn test_backend_errors_are_scoped_to_the_call() {
    let mut vm = gui_vm();
    let result = vm.run(
        "import \"gui\" for Window
class Fake {
  construct new() {}
  handle { 42 }
}
Window.new().add(Fake.new())",
    );
    match result {
        Err(InterpretError::Runtime(error)) => {
            assert_eq!(error.kind, ErrorKind::Native);
            assert!(error.message.contains("widget handle"), "{}", error.message);
        }
        other => panic!("Expected native error, got {:?}", other),
    }

    vm.vm
        .interpret("second", "import \"gui\" for Window\nWindow.new()")
        .expect("VM keeps working");
    assert_eq!(vm.gui.widget_count(), 2);
}
