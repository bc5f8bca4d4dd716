//! Abstract syntax tree for Finch modules.

use std::rc::Rc;

use finch_sdk::signature;

/// A parsed module: a list of top-level statements.
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// Statements in source order
    pub statements: Vec<Stmt>,
}

// ============================================================================
// Statements
// ============================================================================

/// A statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `import "module" for A, B as C`
    Import {
        /// Imported module name
        module: String,
        /// Variables copied into the importing module
        names: Vec<ImportName>,
        /// Source line
        line: u32,
    },
    /// `var name = init`
    Var {
        /// Variable name
        name: String,
        /// Initializer (null when absent)
        init: Option<Expr>,
        /// Source line
        line: u32,
    },
    /// Class declaration
    Class(Rc<ClassDecl>),
    /// `if (cond) then else otherwise`
    If {
        /// Condition
        cond: Expr,
        /// Taken branch
        then_branch: Box<Stmt>,
        /// Optional else branch
        else_branch: Option<Box<Stmt>>,
    },
    /// `while (cond) body`
    While {
        /// Condition
        cond: Expr,
        /// Loop body
        body: Box<Stmt>,
    },
    /// `for (var in sequence) body`
    For {
        /// Loop variable
        var: String,
        /// Iterated expression
        sequence: Expr,
        /// Loop body
        body: Box<Stmt>,
        /// Source line
        line: u32,
    },
    /// `return value`
    Return {
        /// Returned expression (null when absent)
        value: Option<Expr>,
        /// Source line
        line: u32,
    },
    /// `break`
    Break(u32),
    /// `continue`
    Continue(u32),
    /// `{ ... }`
    Block(Vec<Stmt>),
    /// Expression evaluated for effect
    Expr(Expr),
}

// ============================================================================
// Classes
// ============================================================================

/// A class declaration.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    /// Class name
    pub name: String,
    /// Name of the superclass, if any
    pub superclass: Option<String>,
    /// Declared with `foreign class`
    pub is_foreign: bool,
    /// Methods, constructors, getters and setters
    pub methods: Vec<Rc<MethodDecl>>,
    /// Source line of the `class` keyword
    pub line: u32,
}

/// Kind of class member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// `name(a, b)` or `name()`
    Method,
    /// `name`
    Getter,
    /// `name=(value)`
    Setter,
    /// `construct name(a)`
    Constructor,
}

/// A method declaration.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    /// Method name
    pub name: String,
    /// Member kind
    pub kind: MethodKind,
    /// Declared `static`
    pub is_static: bool,
    /// Declared `foreign`; such methods have no body
    pub is_foreign: bool,
    /// Parameter names
    pub params: Vec<String>,
    /// Body statements (empty for foreign methods)
    pub body: Vec<Stmt>,
    /// Source line
    pub line: u32,
}

impl MethodDecl {
    /// Dispatch signature, e.g. `setFrame(_,_)`.
    pub fn signature(&self) -> String {
        match self.kind {
            MethodKind::Getter => signature::getter(&self.name),
            MethodKind::Setter => signature::setter(&self.name),
            MethodKind::Method | MethodKind::Constructor => {
                signature::method(&self.name, self.params.len())
            }
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `..`
    RangeInclusive,
    /// `...`
    RangeExclusive,
}

impl BinaryOp {
    /// Operator spelling for error messages.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::RangeInclusive => "..",
            BinaryOp::RangeExclusive => "...",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `!x`
    Not,
}

/// Short-circuit operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
}

/// An expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Number literal
    Num(f64),
    /// String literal
    Str(Rc<str>),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
    /// `this`
    This(u32),
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// Bare name: local, module variable, or implicit `this` getter
    Name {
        /// Referenced name
        name: String,
        /// Source line
        line: u32,
    },
    /// `_field`
    Field {
        /// Field name including the underscore
        name: String,
        /// Source line
        line: u32,
    },
    /// `__field`
    StaticField {
        /// Field name including the underscores
        name: String,
        /// Source line
        line: u32,
    },
    /// `target = value`
    Assign {
        /// Assigned place
        target: Box<Expr>,
        /// New value
        value: Box<Expr>,
        /// Source line
        line: u32,
    },
    /// `-x`, `!x`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expr>,
        /// Source line
        line: u32,
    },
    /// Arithmetic, comparison and range operators
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Box<Expr>,
        /// Right operand
        right: Box<Expr>,
        /// Source line
        line: u32,
    },
    /// `&&`, `||`
    Logical {
        /// Operator
        op: LogicalOp,
        /// Left operand
        left: Box<Expr>,
        /// Right operand
        right: Box<Expr>,
    },
    /// `cond ? a : b`
    Conditional {
        /// Condition
        cond: Box<Expr>,
        /// Value when truthy
        then_value: Box<Expr>,
        /// Value when falsy
        else_value: Box<Expr>,
    },
    /// `value is Class`
    Is {
        /// Tested value
        value: Box<Expr>,
        /// Class expression
        class: Box<Expr>,
        /// Source line
        line: u32,
    },
    /// Method call or getter. `receiver == None` is an implicit `this` call.
    Call {
        /// Receiver, if explicit
        receiver: Option<Box<Expr>>,
        /// Method name
        name: String,
        /// Arguments; `None` for a getter
        args: Option<Vec<Expr>>,
        /// Source line
        line: u32,
    },
    /// `super.name(args)` or `super(args)`
    Super {
        /// Method name; `None` reuses the enclosing method's name
        name: Option<String>,
        /// Arguments; `None` for a getter
        args: Option<Vec<Expr>>,
        /// Source line
        line: u32,
    },
    /// `receiver[index]`
    Subscript {
        /// Subscripted value
        receiver: Box<Expr>,
        /// Index arguments
        args: Vec<Expr>,
        /// Source line
        line: u32,
    },
}

impl Expr {
    /// Call signature of a call expression.
    pub fn call_signature(name: &str, args: &Option<Vec<Expr>>) -> String {
        match args {
            Some(args) => signature::method(name, args.len()),
            None => signature::getter(name),
        }
    }
}

/// One variable named by an import, optionally renamed with `as`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportName {
    /// Variable name in the imported module
    pub name: String,
    /// Name bound in the importing module
    pub local: String,
}
