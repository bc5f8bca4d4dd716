//! Statement execution

use super::Flow;
use crate::parser::ast::{Expr, Stmt};
use crate::vm::error::RuntimeError;
use crate::vm::value::Value;
use crate::vm::Vm;

impl Vm {
    /// Execute statements in the current scope.
    pub(crate) fn exec_block_in_place(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in statements {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    /// Execute statements in a new scope.
    fn exec_block(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        self.push_scope();
        let result = self.exec_block_in_place(statements);
        self.pop_scope();
        result
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Import { module, names, line } => {
                self.frame.line = *line;
                self.import_module(module, names)?;
                Ok(Flow::Normal)
            }

            Stmt::Var { name, init, line } => {
                self.frame.line = *line;
                let value = match init {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                self.define_variable(name, value)?;
                Ok(Flow::Normal)
            }

            Stmt::Class(decl) => {
                self.frame.line = decl.line;
                let class = self.define_class(decl)?;
                self.define_variable(&decl.name, Value::Class(class))?;
                Ok(Flow::Normal)
            }

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.exec_branch(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_branch(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { cond, body } => {
                while self.eval(cond)?.is_truthy() {
                    match self.exec_branch(body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::For {
                var,
                sequence,
                body,
                line,
            } => {
                self.frame.line = *line;
                let sequence = self.eval(sequence)?;
                self.exec_for(var, sequence, body, *line)
            }

            Stmt::Return { value, line } => {
                self.frame.line = *line;
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }

            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Continue(_) => Ok(Flow::Continue),
            Stmt::Block(statements) => self.exec_block(statements),

            Stmt::Expr(expr) => {
                self.eval(expr)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Branches and loop bodies get their own scope.
    fn exec_branch(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Block(statements) => self.exec_block(statements),
            other => {
                self.push_scope();
                let result = self.exec_stmt(other);
                self.pop_scope();
                result
            }
        }
    }

    // ========================================================================
    // Loops
    // ========================================================================

    fn exec_for(&mut self, var: &str, sequence: Value, body: &Stmt, line: u32) -> Result<Flow, RuntimeError> {
        match &sequence {
            Value::List(items) => {
                // Iterate a snapshot so the body may modify the list
                let items = items.borrow().clone();
                for item in items {
                    if let Some(flow) = self.exec_iteration(var, item, body)? {
                        return Ok(flow);
                    }
                }
            }
            Value::Range(range) => {
                for n in range.iter() {
                    if let Some(flow) = self.exec_iteration(var, Value::Num(n), body)? {
                        return Ok(flow);
                    }
                }
            }
            Value::Str(text) => {
                for c in text.chars() {
                    if let Some(flow) = self.exec_iteration(var, Value::str(c.encode_utf8(&mut [0; 4])), body)? {
                        return Ok(flow);
                    }
                }
            }
            _ => {
                // Iterator protocol: iterate(_) yields the next iterator or a
                // falsy value, iteratorValue(_) maps it to the element
                let mut iterator = self.invoke(sequence.clone(), "iterate(_)", vec![Value::Null], line)?;
                while iterator.is_truthy() {
                    let item = self.invoke(sequence.clone(), "iteratorValue(_)", vec![iterator.clone()], line)?;
                    if let Some(flow) = self.exec_iteration(var, item, body)? {
                        return Ok(flow);
                    }
                    iterator = self.invoke(sequence.clone(), "iterate(_)", vec![iterator], line)?;
                }
            }
        }
        Ok(Flow::Normal)
    }

    /// Run one loop iteration. Returns the flow that ends the loop, if any.
    fn exec_iteration(&mut self, var: &str, item: Value, body: &Stmt) -> Result<Option<Flow>, RuntimeError> {
        self.push_scope();
        self.define_local(var, item);
        let result = self.exec_branch(body);
        self.pop_scope();
        match result? {
            Flow::Break => Ok(Some(Flow::Normal)),
            Flow::Return(value) => Ok(Some(Flow::Return(value))),
            Flow::Normal | Flow::Continue => Ok(None),
        }
    }

    pub(crate) fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }
}
