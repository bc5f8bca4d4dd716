//! Expression evaluation

use std::rc::Rc;

use finch_sdk::signature;

use crate::parser::ast::{BinaryOp, Expr, LogicalOp, MethodKind, UnaryOp};
use crate::vm::class::Method;
use crate::vm::error::RuntimeError;
use crate::vm::value::{RangeValue, Value};
use crate::vm::Vm;

impl Vm {
    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Num(n) => Ok(Value::Num(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::This(line) => {
                self.frame.line = *line;
                self.this("this")
            }
            Expr::List(items) => Ok(Value::list(self.eval_args(items)?)),

            Expr::Name { name, line } => {
                self.frame.line = *line;
                if let Some(value) = self.lookup_variable(name) {
                    return Ok(value);
                }
                match self.implicit_receiver(name) {
                    Some(this) => self.invoke(this, name, Vec::new(), *line),
                    None => Err(RuntimeError::script(format!("Undefined variable '{}'.", name))),
                }
            }

            Expr::Field { name, line } => {
                self.frame.line = *line;
                let instance = self.field_owner(name)?;
                let value = instance.fields.borrow().get(name).cloned();
                Ok(value.unwrap_or(Value::Null))
            }

            Expr::StaticField { name, line } => {
                self.frame.line = *line;
                let class = self.static_field_owner(name)?;
                let value = class.static_fields.borrow().get(name).cloned();
                Ok(value.unwrap_or(Value::Null))
            }

            Expr::Assign { target, value, line } => self.eval_assign(target, value, *line),

            Expr::Unary { op, operand, line } => {
                let value = self.eval(operand)?;
                self.frame.line = *line;
                match (op, value) {
                    (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
                    (UnaryOp::Negate, Value::Num(n)) => Ok(Value::Num(-n)),
                    (UnaryOp::Negate, value) => self.invoke(value, "-", Vec::new(), *line),
                }
            }

            Expr::Binary { op, left, right, line } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.frame.line = *line;
                self.binary(*op, left, right, *line)
            }

            Expr::Logical { op, left, right } => {
                let left = self.eval(left)?;
                match (op, left.is_truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                    _ => self.eval(right),
                }
            }

            Expr::Conditional {
                cond,
                then_value,
                else_value,
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.eval(then_value)
                } else {
                    self.eval(else_value)
                }
            }

            Expr::Is { value, class, line } => {
                let value = self.eval(value)?;
                let class = self.eval(class)?;
                self.frame.line = *line;
                let Value::Class(class) = class else {
                    return Err(RuntimeError::script("Right operand must be a class."));
                };
                Ok(Value::Bool(self.core.class_of(&value).is_subclass_of(&class)))
            }

            Expr::Call {
                receiver,
                name,
                args,
                line,
            } => {
                let receiver = match receiver {
                    Some(receiver) => self.eval(receiver)?,
                    None => self.this(name)?,
                };
                let signature = Expr::call_signature(name, args);
                let args = match args {
                    Some(args) => self.eval_args(args)?,
                    None => Vec::new(),
                };
                self.frame.line = *line;
                self.invoke(receiver, &signature, args, *line)
            }

            Expr::Super { name, args, line } => {
                let args_values = match args {
                    Some(args) => self.eval_args(args)?,
                    None => Vec::new(),
                };
                self.frame.line = *line;
                self.call_super(name.as_deref(), args.is_some(), args_values, *line)
            }

            Expr::Subscript { receiver, args, line } => {
                let receiver = self.eval(receiver)?;
                let args = self.eval_args(args)?;
                self.frame.line = *line;
                let signature = signature::subscript(args.len());
                self.invoke(receiver, &signature, args, *line)
            }
        }
    }

    // ========================================================================
    // Receivers and fields
    // ========================================================================

    /// The current receiver. `what` names the construct for the error.
    fn this(&self, what: &str) -> Result<Value, RuntimeError> {
        self.frame.this.clone().ok_or_else(|| {
            RuntimeError::script(format!("Cannot use '{}' outside of a method.", what))
        })
    }

    /// `this`, when it has a getter named `name`.
    fn implicit_receiver(&self, name: &str) -> Option<Value> {
        let this = self.frame.this.clone()?;
        let found = match &this {
            Value::Class(class) => class.find_static(name).is_some(),
            other => self.core.class_of(other).find_method(name).is_some(),
        };
        found.then_some(this)
    }

    fn field_owner(&self, name: &str) -> Result<Rc<crate::vm::value::Instance>, RuntimeError> {
        if self.frame.is_static {
            return Err(RuntimeError::script(format!(
                "Cannot use instance field '{}' in a static method.",
                name
            )));
        }
        match &self.frame.this {
            Some(Value::Instance(instance)) => Ok(instance.clone()),
            Some(Value::Foreign(_)) => Err(RuntimeError::script(format!(
                "Foreign class instances have no field '{}'.",
                name
            ))),
            _ => Err(RuntimeError::script(format!(
                "Cannot use field '{}' outside of a method.",
                name
            ))),
        }
    }

    fn static_field_owner(&self, name: &str) -> Result<Rc<crate::vm::class::Class>, RuntimeError> {
        self.frame.class.clone().ok_or_else(|| {
            RuntimeError::script(format!("Cannot use static field '{}' outside of a class.", name))
        })
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    fn eval_assign(&mut self, target: &Expr, value: &Expr, line: u32) -> Result<Value, RuntimeError> {
        match target {
            Expr::Name { name, .. } => {
                let value = self.eval(value)?;
                self.frame.line = line;
                if self.assign_variable(name, value.clone()) {
                    return Ok(value);
                }
                let setter = signature::setter(name);
                match self.implicit_receiver(&setter) {
                    Some(this) => self.invoke(this, &setter, vec![value], line),
                    None => Err(RuntimeError::script(format!("Undefined variable '{}'.", name))),
                }
            }

            Expr::Field { name, .. } => {
                let value = self.eval(value)?;
                self.frame.line = line;
                let instance = self.field_owner(name)?;
                instance.fields.borrow_mut().insert(name.clone(), value.clone());
                Ok(value)
            }

            Expr::StaticField { name, .. } => {
                let value = self.eval(value)?;
                self.frame.line = line;
                let class = self.static_field_owner(name)?;
                class.static_fields.borrow_mut().insert(name.clone(), value.clone());
                Ok(value)
            }

            Expr::Subscript { receiver, args, .. } => {
                let receiver = self.eval(receiver)?;
                let mut args = self.eval_args(args)?;
                let signature = signature::subscript_setter(args.len());
                args.push(self.eval(value)?);
                self.frame.line = line;
                self.invoke(receiver, &signature, args, line)
            }

            Expr::Call {
                receiver,
                name,
                args: None,
                ..
            } => {
                let receiver = match receiver {
                    Some(receiver) => self.eval(receiver)?,
                    None => self.this(name)?,
                };
                let value = self.eval(value)?;
                self.frame.line = line;
                self.invoke(receiver, &signature::setter(name), vec![value], line)
            }

            _ => Err(RuntimeError::script("Invalid assignment target.")),
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn binary(&mut self, op: BinaryOp, left: Value, right: Value, line: u32) -> Result<Value, RuntimeError> {
        use BinaryOp::*;

        if let (Value::Num(a), Value::Num(b)) = (&left, &right) {
            let (a, b) = (*a, *b);
            return Ok(match op {
                Add => Value::Num(a + b),
                Sub => Value::Num(a - b),
                Mul => Value::Num(a * b),
                Div => Value::Num(a / b),
                Mod => Value::Num(a % b),
                Less => Value::Bool(a < b),
                LessEqual => Value::Bool(a <= b),
                Greater => Value::Bool(a > b),
                GreaterEqual => Value::Bool(a >= b),
                Equal => Value::Bool(a == b),
                NotEqual => Value::Bool(a != b),
                RangeInclusive | RangeExclusive => Value::Range(RangeValue {
                    from: a,
                    to: b,
                    inclusive: op == RangeInclusive,
                }),
            });
        }

        // User classes may overload any operator
        let operator = format!("{}(_)", op.symbol());
        if matches!(left, Value::Instance(_) | Value::Foreign(_))
            && self.core.class_of(&left).find_method(&operator).is_some()
        {
            return self.invoke(left, &operator, vec![right], line);
        }

        match (op, &left, &right) {
            (Equal, _, _) => Ok(Value::Bool(left.equals(&right))),
            (NotEqual, _, _) => Ok(Value::Bool(!left.equals(&right))),
            (Add, Value::Str(a), Value::Str(b)) => {
                let mut text = String::with_capacity(a.len() + b.len());
                text.push_str(a);
                text.push_str(b);
                Ok(Value::Str(Rc::from(text)))
            }
            (Add, Value::Str(_), _) => Err(RuntimeError::script("Right operand must be a string.")),
            (RangeInclusive | RangeExclusive, Value::Num(_), _) => {
                Err(RuntimeError::script("Right hand side of range must be a number."))
            }
            (_, Value::Num(_), _) => Err(RuntimeError::script("Right operand must be a number.")),
            _ => self.invoke(left, &operator, vec![right], line),
        }
    }

    // ========================================================================
    // super
    // ========================================================================

    fn call_super(
        &mut self,
        name: Option<&str>,
        has_args: bool,
        args: Vec<Value>,
        line: u32,
    ) -> Result<Value, RuntimeError> {
        let this = self.this("super")?;
        let (Some(class), Some(method)) = (self.frame.class.clone(), self.frame.method.clone()) else {
            return Err(RuntimeError::script("Cannot use 'super' outside of a method."));
        };
        let name = name.unwrap_or(method.name.as_str());
        let signature = if has_args || method.kind == MethodKind::Constructor {
            signature::method(name, args.len())
        } else {
            signature::getter(name)
        };
        let Some(superclass) = class.superclass.clone() else {
            return Err(RuntimeError::script(format!("{} has no superclass.", class.name)));
        };

        if method.kind == MethodKind::Constructor {
            // Superclass initializer runs on the instance being built
            return match superclass.static_methods.get(&signature) {
                Some(Method::Constructor(init)) => {
                    let init = init.clone();
                    self.run_body(this.clone(), superclass, init, args)?;
                    Ok(this)
                }
                _ if superclass.is_builtin && args.is_empty() => Ok(this),
                _ => Err(RuntimeError::script(format!(
                    "{} does not have a constructor '{}'.",
                    superclass.name, signature
                ))),
            };
        }

        let found = if method.is_static {
            superclass.find_static(&signature)
        } else {
            superclass.find_method(&signature)
        };
        match found {
            Some((method, owner)) => self.run_method(method, owner, this, &signature, args, line),
            None => {
                let receiver = self.core.class_of(&this);
                self.call_primitive_or_fail(this, &receiver, &signature, args)
            }
        }
    }
}
