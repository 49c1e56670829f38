//! Tree-walking interpreter for parsed expression blocks.

use std::collections::HashMap;
use std::fmt;

use super::parser::{CONTEXT_NAME, CompareOp, Expr, Stmt};
use crate::context::Context;

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "str",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::List(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

/// Evaluation failure with its line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

fn fail<T>(line: usize, message: impl Into<String>) -> Result<T, EvalError> {
    Err(EvalError {
        line,
        message: message.into(),
    })
}

/// Executes statements against a read-only context.
pub struct Interpreter<'a> {
    context: &'a Context,
    scope: HashMap<String, Value>,
}

impl<'a> Interpreter<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            scope: HashMap::new(),
        }
    }

    /// Runs `body`, returning the final bindings.
    pub fn run(mut self, body: &[Stmt]) -> Result<HashMap<String, Value>, EvalError> {
        self.exec_block(body)?;
        Ok(self.scope)
    }

    fn exec_block(&mut self, body: &[Stmt]) -> Result<(), EvalError> {
        for stmt in body {
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), EvalError> {
        match stmt {
            Stmt::Assign {
                target,
                value,
                ..
            } => {
                let value = self.eval(value)?;
                self.scope.insert(target.clone(), value);
            }
            Stmt::If {
                branches,
                orelse,
            } => {
                for (condition, body) in branches {
                    if self.eval(condition)?.truthy() {
                        return self.exec_block(body);
                    }
                }
                self.exec_block(orelse)?;
            }
            Stmt::Pass => {}
        }
        Ok(())
    }

    fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::None => Ok(Value::None),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::List(items) => {
                items.iter().map(|item| self.eval(item)).collect::<Result<_, _>>().map(Value::List)
            }
            Expr::Name {
                name,
                line,
            } => {
                if name == CONTEXT_NAME {
                    return fail(
                        *line,
                        format!("'{CONTEXT_NAME}' can only be used with get(), [] or 'in'"),
                    );
                }
                match self.scope.get(name) {
                    Some(value) => Ok(value.clone()),
                    None => fail(*line, format!("name '{name}' is not defined")),
                }
            }
            Expr::ContextGet {
                key,
                default,
                line,
            } => {
                let key = self.context_key(key, *line)?;
                match self.context.get(&key) {
                    Some(value) => Ok(Value::Str(value.to_string())),
                    None => match default {
                        Some(default) => self.eval(default),
                        None => Ok(Value::None),
                    },
                }
            }
            Expr::ContextIndex {
                key,
                line,
            } => {
                let key = self.context_key(key, *line)?;
                match self.context.get(&key) {
                    Some(value) => Ok(Value::Str(value.to_string())),
                    None => fail(*line, format!("KeyError: '{key}'")),
                }
            }
            Expr::Add {
                left,
                right,
                line,
            } => match (self.eval(left)?, self.eval(right)?) {
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (Value::List(mut a), Value::List(b)) => {
                    a.extend(b);
                    Ok(Value::List(a))
                }
                (Value::Int(a), Value::Int(b)) => match a.checked_add(b) {
                    Some(sum) => Ok(Value::Int(sum)),
                    None => fail(*line, "integer overflow"),
                },
                (a, b) => fail(
                    *line,
                    format!(
                        "unsupported operand types for +: '{}' and '{}'",
                        a.type_name(),
                        b.type_name()
                    ),
                ),
            },
            Expr::Compare {
                op,
                left,
                right,
                line,
            } => {
                let result = match op {
                    CompareOp::Eq => self.eval(left)? == self.eval(right)?,
                    CompareOp::NotEq => self.eval(left)? != self.eval(right)?,
                    CompareOp::In => self.contains(left, right, *line)?,
                    CompareOp::NotIn => !self.contains(left, right, *line)?,
                };
                Ok(Value::Bool(result))
            }
            Expr::And(left, right) => {
                let left = self.eval(left)?;
                if left.truthy() { self.eval(right) } else { Ok(left) }
            }
            Expr::Or(left, right) => {
                let left = self.eval(left)?;
                if left.truthy() { Ok(left) } else { self.eval(right) }
            }
            Expr::Not(inner) => Ok(Value::Bool(!self.eval(inner)?.truthy())),
        }
    }

    fn context_key(&self, key: &Expr, line: usize) -> Result<String, EvalError> {
        match self.eval(key)? {
            Value::Str(key) => Ok(key),
            other => fail(line, format!("context keys must be strings, got {}", other.type_name())),
        }
    }

    /// Membership: a key in `context`, an item in a list or a substring in a string.
    fn contains(&self, needle: &Expr, haystack: &Expr, line: usize) -> Result<bool, EvalError> {
        let needle = self.eval(needle)?;
        if matches!(haystack, Expr::Name { name, .. } if name == CONTEXT_NAME) {
            return match needle {
                Value::Str(key) => Ok(self.context.contains(&key)),
                other => {
                    fail(line, format!("context keys must be strings, got {}", other.type_name()))
                }
            };
        }

        match (needle, self.eval(haystack)?) {
            (needle, Value::List(items)) => Ok(items.contains(&needle)),
            (Value::Str(needle), Value::Str(haystack)) => Ok(haystack.contains(&needle)),
            (needle, haystack) => fail(
                line,
                format!(
                    "'in' is not supported between '{}' and '{}'",
                    needle.type_name(),
                    haystack.type_name()
                ),
            ),
        }
    }
}
