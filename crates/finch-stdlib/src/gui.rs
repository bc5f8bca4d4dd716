//! GUI and media operations
//!
//! Windows, panes, menus, controls and media playback are native services
//! outside the host. Every such binding marshals its arguments and forwards
//! them to a [`GuiBackend`]; the backend answers with the call's result.
//!
//! Instance operations take the native widget handle as their first
//! argument, e.g. `Window.setTitle(handle, title)`. Constructors such as
//! `Window.createWindow` answer a fresh handle.
//!
//! [`HeadlessGui`] is the backend shipped with the host: it allocates
//! handles, stores properties, answers getters and records every call.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use finch_sdk::{
    signature, AbiResult, CallFrame, DispatchKey, ForeignMethodRegistry, HandleId, HostValue,
    NativeError, RegistryError,
};
use rustc_hash::FxHashMap;

use crate::transform::read_transform;
use crate::GUI_MODULE;

// ============================================================================
// Operation table
// ============================================================================

/// One GUI operation a script can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiOperation {
    /// Declaring class in the `gui` module
    pub class_name: &'static str,
    /// Static (class-side) operation
    pub is_static: bool,
    /// Method signature
    pub signature: &'static str,
}

impl GuiOperation {
    const fn new(class_name: &'static str, is_static: bool, signature: &'static str) -> Self {
        Self {
            class_name,
            is_static,
            signature,
        }
    }

    /// Dispatch key the operation is registered under.
    pub fn key(&self) -> DispatchKey {
        DispatchKey::new(GUI_MODULE, self.class_name, self.is_static, self.signature)
    }
}

const fn instance(class_name: &'static str, signature: &'static str) -> GuiOperation {
    GuiOperation::new(class_name, false, signature)
}

const fn class_side(class_name: &'static str, signature: &'static str) -> GuiOperation {
    GuiOperation::new(class_name, true, signature)
}

/// Every operation forwarded to the backend.
pub const GUI_OPERATIONS: &[GuiOperation] = &[
    instance("Application", "mainScreenFrame"),
    instance("Application", "mainWindow"),
    class_side("Application", "playSound(_)"),
    class_side("Application", "playSoundVolume(_,_)"),
    class_side("Application", "alert(_,_,_,_,_)"),
    class_side("Application", "openPanel(_,_,_)"),
    class_side("Application", "savePanel(_,_)"),
    instance("Menu", "getMenubar"),
    instance("Menu", "createMenu(_)"),
    instance("Menu", "addItem(_,_)"),
    instance("Menu", "menuAsSubmenu(_,_)"),
    instance("MenuItem", "createMenuItem(_,_)"),
    instance("MenuItem", "separator"),
    instance("MenuItem", "setText(_,_)"),
    instance("MenuItem", "setEnable(_,_)"),
    class_side("Pointer", "location"),
    instance("Font", "createFont(_,_,_,_)"),
    instance("Window", "enableMouseMoveEvents(_,_)"),
    instance("Window", "createWindow"),
    instance("Window", "setTitle(_,_)"),
    instance("Window", "setFrame(_,_)"),
    instance("Window", "getFrame(_)"),
    instance("Window", "centreWindow(_)"),
    instance("Window", "showWindow(_)"),
    instance("Window", "closeWindow(_)"),
    instance("Window", "addSubPane(_,_)"),
    instance("Window", "setColour(_,_)"),
    instance("Pane", "createPane"),
    instance("Pane", "removePane(_)"),
    instance("Pane", "setFrame(_,_)"),
    instance("Pane", "getFrame(_)"),
    instance("Pane", "addSubPane(_,_)"),
    instance("Pane", "setColour(_,_)"),
    instance("Pane", "setBorder(_,_)"),
    instance("Pane", "setBorderColour(_,_)"),
    instance("Pane", "setShow(_,_)"),
    instance("Pane", "setFlip(_,_)"),
    instance("Pane", "setCorner(_,_)"),
    instance("Pane", "setShadow(_,_,_)"),
    instance("Pane", "setTopMost(_)"),
    instance("Pane", "setOpacity(_,_)"),
    instance("Pane", "setRotation(_,_)"),
    instance("Pane", "setTranslation(_,_,_)"),
    instance("Pane", "setScale(_,_,_)"),
    instance("Pane", "setShear(_,_,_)"),
    instance("Pane", "createAnimation(_,_,_,_,_,_)"),
    instance("Pane", "mouseLocation(_)"),
    instance("Pane", "getVisibility(_)"),
    instance("PolygonPane", "createPoly"),
    instance("PolygonPane", "points(_,_)"),
    instance("PolygonPane", "setFillColour(_,_)"),
    instance("PolygonPane", "setStrokeColour(_,_)"),
    instance("PolygonPane", "setStrokeWidth(_,_)"),
    instance("ImagePane", "createImage"),
    instance("ImagePane", "setImage(_,_,_,_)"),
    instance("ImagePane", "setImageFromFile(_,_,_)"),
    instance("ImagePane", "setTintImage(_,_)"),
    instance("ScrollPane", "createScrollPane"),
    instance("ScrollPane", "addSubPane(_,_)"),
    instance("ScrollPane", "getScrollFrame(_)"),
    instance("PlayerPane", "createPlayerPane"),
    instance("PlayerPane", "playMedia(_,_)"),
    instance("PlayerPane", "stopPlay(_)"),
    instance("PlayerPane", "volumePlay(_,_)"),
    instance("PlayerPane", "ratePlay(_,_)"),
    instance("Button", "createButton"),
    instance("Button", "setTitle(_,_)"),
    instance("Button", "setKey(_,_)"),
    instance("Button", "setType(_,_)"),
    instance("Button", "setStyle(_,_)"),
    instance("Button", "setState(_,_)"),
    instance("Button", "getState(_)"),
    instance("Label", "createLabel"),
    instance("Control", "setText(_,_)"),
    instance("Control", "getText(_)"),
    instance("Control", "setTextColour(_,_)"),
    instance("Control", "setFont(_,_)"),
    instance("TextField", "createTextField"),
];

/// `Pane.applyTransform(pane, transform)`: the transform is a foreign
/// `Transform` instance and reaches the backend as its six-number matrix.
pub const APPLY_TRANSFORM: GuiOperation = instance("Pane", "applyTransform(_,_)");

// ============================================================================
// Backend trait
// ============================================================================

/// Native GUI service behind the `gui` module.
pub trait GuiBackend {
    /// Perform `operation` (a signature from [`GUI_OPERATIONS`]) of
    /// `class_name` with the marshaled arguments.
    fn perform(&self, class_name: &str, operation: &str, args: &[HostValue]) -> AbiResult<HostValue>;
}

/// Register every GUI operation, forwarding to `backend`.
pub fn register(methods: &mut ForeignMethodRegistry, backend: Rc<dyn GuiBackend>) -> Result<(), RegistryError> {
    for op in GUI_OPERATIONS {
        let op = *op;
        let arity = signature::arity(op.signature).ok_or_else(|| RegistryError::InvalidSignature(op.signature.to_string()))?;
        let backend = backend.clone();
        methods.register_fn(op.key(), move |frame: &mut dyn CallFrame| {
            let args = (1..=arity)
                .map(|slot| frame.get_value(slot))
                .collect::<AbiResult<Vec<_>>>()?;
            let result = backend.perform(op.class_name, op.signature, &args)?;
            frame.ret(result)
        })?;
    }

    methods.register_fn(APPLY_TRANSFORM.key(), move |frame: &mut dyn CallFrame| {
        let pane = frame.get_value(1)?;
        let matrix = read_transform(frame, 2)?.to_value();
        let result = backend.perform(APPLY_TRANSFORM.class_name, APPLY_TRANSFORM.signature, &[pane, matrix])?;
        frame.ret(result)
    })?;
    Ok(())
}

// ============================================================================
// Headless backend
// ============================================================================

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct GuiCall {
    /// Declaring class
    pub class_name: String,
    /// Operation signature
    pub operation: String,
    /// Marshaled arguments
    pub args: Vec<HostValue>,
}

impl fmt::Display for GuiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.operation)
    }
}

/// A widget known to the headless backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Widget {
    /// Kind of widget, e.g. `Window` or `Button`
    pub kind: String,
    /// Properties set through `set*` operations
    pub properties: FxHashMap<String, HostValue>,
    /// Attached sub-panes or menu items, in attach order
    pub children: Vec<HandleId>,
    /// Widget this one is attached to
    pub parent: Option<HandleId>,
}

#[derive(Debug)]
struct HeadlessState {
    next_handle: u64,
    widgets: FxHashMap<HandleId, Widget>,
    calls: Vec<GuiCall>,
    menubar: Option<HandleId>,
    main_window: Option<HandleId>,
    screen_frame: [f64; 4],
    pointer: [f64; 2],
    alert_response: f64,
}

/// GUI backend without a display.
#[derive(Debug)]
pub struct HeadlessGui {
    state: RefCell<HeadlessState>,
}

impl Default for HeadlessGui {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessGui {
    /// Backend with a 1280x800 screen and no widgets.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(HeadlessState {
                next_handle: 1,
                widgets: FxHashMap::default(),
                calls: Vec::new(),
                menubar: None,
                main_window: None,
                screen_frame: [0.0, 0.0, 1280.0, 800.0],
                pointer: [0.0, 0.0],
                alert_response: 0.0,
            }),
        }
    }

    /// Frame answered by `mainScreenFrame`.
    pub fn set_screen_frame(&self, frame: [f64; 4]) {
        self.state.borrow_mut().screen_frame = frame;
    }

    /// Pointer position answered by `location` and `mouseLocation(_)`.
    pub fn set_pointer(&self, x: f64, y: f64) {
        self.state.borrow_mut().pointer = [x, y];
    }

    /// Button index answered by `alert(_,_,_,_,_)`.
    pub fn set_alert_response(&self, button: f64) {
        self.state.borrow_mut().alert_response = button;
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<GuiCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of calls to `operation` of `class_name`.
    pub fn call_count(&self, class_name: &str, operation: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.class_name == class_name && c.operation == operation)
            .count()
    }

    /// Snapshot of a live widget.
    pub fn widget(&self, handle: HandleId) -> Option<Widget> {
        self.state.borrow().widgets.get(&handle).cloned()
    }

    /// A widget property, if set.
    pub fn property(&self, handle: HandleId, name: &str) -> Option<HostValue> {
        self.state
            .borrow()
            .widgets
            .get(&handle)
            .and_then(|w| w.properties.get(name).cloned())
    }

    /// Number of live widgets.
    pub fn widget_count(&self) -> usize {
        self.state.borrow().widgets.len()
    }
}

impl GuiBackend for HeadlessGui {
    fn perform(&self, class_name: &str, operation: &str, args: &[HostValue]) -> AbiResult<HostValue> {
        let mut state = self.state.borrow_mut();
        state.calls.push(GuiCall {
            class_name: class_name.to_string(),
            operation: operation.to_string(),
            args: args.to_vec(),
        });
        log::debug!("gui {}.{} {:?}", class_name, operation, args);

        let name = operation.split(['(', '=']).next().unwrap_or(operation);
        state.perform(class_name, name, args)
    }
}

impl HeadlessState {
    fn perform(&mut self, class_name: &str, name: &str, args: &[HostValue]) -> AbiResult<HostValue> {
        match (class_name, name) {
            ("Application", "mainScreenFrame") => Ok(HostValue::nums(&self.screen_frame)),
            ("Application", "mainWindow") => {
                let window = match self.main_window {
                    Some(window) => window,
                    None => {
                        let window = self.create("Window");
                        self.main_window = Some(window);
                        window
                    }
                };
                Ok(window.into())
            }
            ("Application", "alert") => Ok(HostValue::Num(self.alert_response)),
            // No file was chosen
            ("Application", "openPanel") | ("Application", "savePanel") => Ok(HostValue::Null),
            ("Application", "playSound") | ("Application", "playSoundVolume") => Ok(HostValue::Bool(true)),

            ("Menu", "getMenubar") => {
                let menubar = match self.menubar {
                    Some(menubar) => menubar,
                    None => {
                        let menubar = self.create("Menubar");
                        self.menubar = Some(menubar);
                        menubar
                    }
                };
                Ok(menubar.into())
            }
            ("Menu", "createMenu") => {
                let menu = self.create("Menu");
                self.set(menu, "title", arg(args, 0))?;
                Ok(menu.into())
            }
            ("MenuItem", "createMenuItem") => {
                let item = self.create("MenuItem");
                self.set(item, "title", arg(args, 0))?;
                self.set(item, "key", arg(args, 1))?;
                Ok(item.into())
            }
            ("MenuItem", "separator") => Ok(self.create("Separator").into()),
            ("Menu", "addItem") | ("Menu", "menuAsSubmenu") => {
                self.attach(handle_arg(args, 0)?, handle_arg(args, 1)?)?;
                Ok(HostValue::Null)
            }

            ("Pointer", "location") => Ok(HostValue::nums(&self.pointer)),
            ("Font", "createFont") => {
                let font = self.create("Font");
                for (key, value) in ["name", "size", "bold", "italic"].iter().zip(args) {
                    self.set(font, key, value.clone())?;
                }
                Ok(font.into())
            }
            ("Pane", "createAnimation") => {
                let pane = handle_arg(args, 0)?;
                self.widget(pane)?;
                let animation = self.create("Animation");
                self.set(animation, "pane", pane.into())?;
                self.set(animation, "parameters", HostValue::List(args[1..].to_vec()))?;
                Ok(animation.into())
            }

            (_, "addSubPane") => {
                self.attach(handle_arg(args, 0)?, handle_arg(args, 1)?)?;
                Ok(HostValue::Null)
            }
            (_, "removePane") => {
                self.remove(handle_arg(args, 0)?)?;
                Ok(HostValue::Null)
            }
            (_, "showWindow") => self.flag(args, "visible", true),
            (_, "closeWindow") => self.flag(args, "visible", false),
            (_, "centreWindow") => self.flag(args, "centred", true),
            (_, "setTopMost") => self.flag(args, "topMost", true),
            (_, "mouseLocation") => {
                self.widget(handle_arg(args, 0)?)?;
                Ok(HostValue::nums(&self.pointer))
            }
            (_, "playMedia") => {
                let player = handle_arg(args, 0)?;
                self.set(player, "media", arg(args, 1))?;
                self.set(player, "playing", HostValue::Bool(true))?;
                Ok(HostValue::Null)
            }
            (_, "stopPlay") => self.flag(args, "playing", false),
            (_, "volumePlay") => self.store(args, "volume"),
            (_, "ratePlay") => self.store(args, "rate"),
            (_, "points") => self.store(args, "points"),
            (_, "enableMouseMoveEvents") => self.store(args, "mouseMoveEvents"),
            (_, "applyTransform") => self.store(args, "transform"),
            (_, "getScrollFrame") => self.read(args, "scrollFrame", HostValue::nums(&[0.0; 4])),
            (_, "getFrame") => self.read(args, "frame", HostValue::nums(&[0.0; 4])),
            (_, "getVisibility") => self.read(args, "show", HostValue::Bool(true)),
            (_, "getText") => self.read(args, "text", HostValue::from("")),
            (_, "getState") => self.read(args, "state", HostValue::Num(0.0)),

            (kind, name) if name.starts_with("create") && args.is_empty() => Ok(self.create(kind).into()),
            (_, name) if name.starts_with("set") && name.len() > 3 => self.store(args, &property_name(&name[3..])),

            _ => Err(NativeError::Failed(format!(
                "{}.{} is not supported by the headless GUI",
                class_name, name
            ))),
        }
    }

    fn create(&mut self, kind: &str) -> HandleId {
        let handle = HandleId(self.next_handle);
        self.next_handle += 1;
        self.widgets.insert(
            handle,
            Widget {
                kind: kind.to_string(),
                ..Widget::default()
            },
        );
        handle
    }

    fn widget(&mut self, handle: HandleId) -> AbiResult<&mut Widget> {
        self.widgets
            .get_mut(&handle)
            .ok_or_else(|| NativeError::ArgumentError(format!("unknown widget handle {}", handle)))
    }

    fn set(&mut self, handle: HandleId, name: &str, value: HostValue) -> AbiResult<()> {
        self.widget(handle)?.properties.insert(name.to_string(), value);
        Ok(())
    }

    /// `op(handle, value)` or `op(handle, v1, v2, ...)`; several values are
    /// stored as a list.
    fn store(&mut self, args: &[HostValue], name: &str) -> AbiResult<HostValue> {
        let handle = handle_arg(args, 0)?;
        let value = match &args[1..] {
            [] => HostValue::Bool(true),
            [single] => single.clone(),
            many => HostValue::List(many.to_vec()),
        };
        self.set(handle, name, value)?;
        Ok(HostValue::Null)
    }

    fn flag(&mut self, args: &[HostValue], name: &str, value: bool) -> AbiResult<HostValue> {
        self.set(handle_arg(args, 0)?, name, HostValue::Bool(value))?;
        Ok(HostValue::Null)
    }

    fn read(&mut self, args: &[HostValue], name: &str, default: HostValue) -> AbiResult<HostValue> {
        let widget = self.widget(handle_arg(args, 0)?)?;
        Ok(widget.properties.get(name).cloned().unwrap_or(default))
    }

    fn attach(&mut self, parent: HandleId, child: HandleId) -> AbiResult<()> {
        self.widget(parent)?;
        let previous = self.widget(child)?.parent.replace(parent);
        if let Some(previous) = previous {
            if let Some(old) = self.widgets.get_mut(&previous) {
                old.children.retain(|c| *c != child);
            }
        }
        self.widget(parent)?.children.push(child);
        Ok(())
    }

    fn remove(&mut self, handle: HandleId) -> AbiResult<()> {
        let widget = self
            .widgets
            .remove(&handle)
            .ok_or_else(|| NativeError::ArgumentError(format!("unknown widget handle {}", handle)))?;
        if let Some(parent) = widget.parent.and_then(|p| self.widgets.get_mut(&p)) {
            parent.children.retain(|c| *c != handle);
        }
        for child in widget.children {
            if let Some(child) = self.widgets.get_mut(&child) {
                child.parent = None;
            }
        }
        Ok(())
    }
}

fn arg(args: &[HostValue], index: usize) -> HostValue {
    args.get(index).cloned().unwrap_or_default()
}

fn handle_arg(args: &[HostValue], index: usize) -> AbiResult<HandleId> {
    match args.get(index) {
        Some(HostValue::Handle(handle)) => Ok(*handle),
        Some(other) => Err(NativeError::ArgumentError(format!(
            "argument {} must be a widget handle, got {}",
            index + 1,
            other.slot_type()
        ))),
        None => Err(NativeError::ArgumentError(format!("missing widget handle argument {}", index + 1))),
    }
}

/// `BorderColour` -> `borderColour`
fn property_name(suffix: &str) -> String {
    let mut chars = suffix.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
