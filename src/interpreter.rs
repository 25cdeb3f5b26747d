//! Tree‑walking evaluator.
//!
//! Statements execute for effect and report how control left them through
//! [`Flow`]; `return` and `break` travel up as ordinary values instead of
//! errors, so a [`LoxError`] always means a real failure. Variable access uses
//! the resolver's hop counts for locals and a by‑name lookup in the global
//! scope for everything else.

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Instant;

use log::{debug, info};

use crate::callable::{Callable, LoxClass, LoxFunction, LoxInstance, NativeFunction, INITIALIZER};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId, ExprVisitor, LiteralValue};
use crate::resolver::Locals;
use crate::stmt::{FunctionDecl, Stmt, StmtVisitor};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Fell off the end; continue with the next statement.
    Normal,

    /// `return` ran; absorbed by the enclosing function call.
    Return(Value),

    /// `break` ran; absorbed by the enclosing loop.
    Break,
}

/// Deepest chain of nested Lox calls; one more fails with `Stack overflow.`
/// Sized to fit a 2 MiB thread stack in debug builds.
pub const MAX_CALL_DEPTH: usize = 100;

pub struct Interpreter {
    environment: EnvRef,
    globals: EnvRef,
    locals: HashMap<ExprId, usize>,
    call_depth: usize,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// Interpreter whose `print` output goes to `out`.
    pub fn with_output<W: Write + 'static>(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Environment::new().into_ref();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Callable(Callable::Native(NativeFunction {
                name: "clock",
                arity: 0,
                func: clock,
            })),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            call_depth: 0,
            out: Box::new(out),
        }
    }

    /// The global scope.
    pub fn globals(&self) -> EnvRef {
        Rc::clone(&self.globals)
    }

    /// Run a resolved program. `locals` is merged into the bindings from
    /// earlier runs, so one interpreter can serve a whole REPL session.
    pub fn interpret(&mut self, statements: &[Stmt], locals: Locals) -> Result<()> {
        info!(
            "Interpreting {} statement(s) with {} resolved local(s)",
            statements.len(),
            locals.len()
        );

        self.locals.extend(locals);

        for stmt in statements {
            self.execute(stmt)?;
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        stmt.accept(self)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        expr.accept(self)
    }

    /// Run `statements` inside `environment`, restoring the current scope
    /// afterwards even when a statement fails.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<Flow> {
        let previous: EnvRef = std::mem::replace(&mut self.environment, environment);
        let result = self.run_statements(statements);
        self.environment = previous;
        result
    }

    fn run_statements(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                exit => return Ok(exit),
            }
        }

        Ok(Flow::Normal)
    }

    fn lookup_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme, name.line),
            None => self.globals.borrow().get(&name.lexeme, name.line),
        }
    }

    fn number_operand(operator: &Token, operand: &Value) -> Result<f64> {
        match operand {
            Value::Number(n) => Ok(*n),
            _ => Err(LoxError::runtime(operator.line, "Operand must be a number.")),
        }
    }

    fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
            _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.")),
        }
    }
}

/// Seconds since the Unix epoch. The epoch offset is sampled once and
/// advanced with a monotonic clock, so successive readings never decrease.
fn clock(_args: &[Value]) -> std::result::Result<Value, String> {
    static START: OnceLock<(Instant, f64)> = OnceLock::new();

    let (started, epoch_seconds) = START.get_or_init(|| {
        let now = chrono::Utc::now();
        (Instant::now(), now.timestamp_micros() as f64 / 1_000_000.0)
    });

    Ok(Value::Number(epoch_seconds + started.elapsed().as_secs_f64()))
}

// ───────────────────────────── expressions ─────────────────────────────

impl ExprVisitor<Result<Value>> for Interpreter {
    fn visit_literal(&mut self, value: &LiteralValue) -> Result<Value> {
        Ok(Value::from(value))
    }

    fn visit_grouping(&mut self, inner: &Expr) -> Result<Value> {
        self.evaluate(inner)
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => Ok(Value::Number(-Self::number_operand(operator, &right)?)),
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            _ => Err(LoxError::runtime(
                operator.line,
                format!("Invalid unary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left: Value = self.evaluate(left)?;
        let right: Value = self.evaluate(right)?;

        debug!("Binary '{}' on {} and {}", operator.lexeme, left, right);

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(LoxError::runtime(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = Self::number_operands(operator, &left, &right)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = Self::number_operands(operator, &left, &right)?;
                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = Self::number_operands(operator, &left, &right)?;
                if b == 0.0 {
                    return Err(LoxError::runtime(operator.line, "Division by zero."));
                }
                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = Self::number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = Self::number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = Self::number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = Self::number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            _ => Err(LoxError::runtime(
                operator.line,
                format!("Invalid binary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left: Value = self.evaluate(left)?;

        let short_circuits = match operator.token_type {
            TokenType::OR => left.is_truthy(),
            _ => !left.is_truthy(),
        };

        if short_circuits {
            return Ok(left);
        }

        self.evaluate(right)
    }

    fn visit_variable(&mut self, id: ExprId, name: &Token) -> Result<Value> {
        self.lookup_variable(id, name)
    }

    fn visit_assign(&mut self, id: ExprId, name: &Token, value: &Expr) -> Result<Value> {
        let value: Value = self.evaluate(value)?;

        match self.locals.get(&id) {
            Some(&distance) => Environment::assign_at(
                &self.environment,
                distance,
                &name.lexeme,
                value.clone(),
                name.line,
            )?,
            None => self
                .globals
                .borrow_mut()
                .assign(&name.lexeme, value.clone(), name.line)?,
        }

        Ok(value)
    }

    fn visit_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Value> {
        let callee: Value = self.evaluate(callee)?;

        let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }

        let Value::Callable(callable) = callee else {
            return Err(LoxError::runtime(
                paren.line,
                "Can only call functions and classes.",
            ));
        };

        if values.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren.line,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    values.len()
                ),
            ));
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(LoxError::runtime(paren.line, "Stack overflow."));
        }

        debug!("Calling {} with {} argument(s)", callable, values.len());

        self.call_depth += 1;
        let result = callable.call(self, values, paren.line);
        self.call_depth -= 1;

        result
    }

    fn visit_get(&mut self, object: &Expr, name: &Token) -> Result<Value> {
        match self.evaluate(object)? {
            Value::Instance(instance) => LoxInstance::get(&instance, name),
            _ => Err(LoxError::runtime(
                name.line,
                "Only instances have properties.",
            )),
        }
    }

    fn visit_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> Result<Value> {
        let Value::Instance(instance) = self.evaluate(object)? else {
            return Err(LoxError::runtime(name.line, "Only instances have fields."));
        };

        let value: Value = self.evaluate(value)?;
        instance.borrow_mut().set(name, value.clone());

        Ok(value)
    }

    fn visit_this(&mut self, id: ExprId, keyword: &Token) -> Result<Value> {
        self.lookup_variable(id, keyword)
    }
}

// ───────────────────────────── statements ──────────────────────────────

impl StmtVisitor<Result<Flow>> for Interpreter {
    fn visit_expression(&mut self, expr: &Expr) -> Result<Flow> {
        self.evaluate(expr)?;
        Ok(Flow::Normal)
    }

    fn visit_print(&mut self, expr: &Expr) -> Result<Flow> {
        let value: Value = self.evaluate(expr)?;
        writeln!(self.out, "{}", value)?;
        Ok(Flow::Normal)
    }

    fn visit_var(&mut self, name: &Token, initializer: Option<&Expr>) -> Result<Flow> {
        let value: Value = match initializer {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Nil,
        };

        debug!("Defining variable '{}' = {}", name.lexeme, value);

        self.environment.borrow_mut().define(&name.lexeme, value);
        Ok(Flow::Normal)
    }

    fn visit_block(&mut self, statements: &[Stmt]) -> Result<Flow> {
        let environment: EnvRef = Environment::with_enclosing(Rc::clone(&self.environment)).into_ref();
        self.execute_block(statements, environment)
    }

    fn visit_if(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> Result<Flow> {
        if self.evaluate(condition)?.is_truthy() {
            self.execute(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute(else_branch)
        } else {
            Ok(Flow::Normal)
        }
    }

    fn visit_while(&mut self, condition: &Expr, body: &Stmt) -> Result<Flow> {
        while self.evaluate(condition)?.is_truthy() {
            match self.execute(body)? {
                Flow::Normal => {}
                Flow::Break => break,
                exit @ Flow::Return(_) => return Ok(exit),
            }
        }

        Ok(Flow::Normal)
    }

    fn visit_function(&mut self, declaration: &Rc<FunctionDecl>) -> Result<Flow> {
        debug!("Defining function '{}'", declaration.name.lexeme);

        let function = LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment), false);

        self.environment.borrow_mut().define(
            &declaration.name.lexeme,
            Value::Callable(Callable::Function(Rc::new(function))),
        );

        Ok(Flow::Normal)
    }

    fn visit_return(&mut self, _keyword: &Token, value: Option<&Expr>) -> Result<Flow> {
        let value: Value = match value {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Nil,
        };

        Ok(Flow::Return(value))
    }

    fn visit_break(&mut self, _keyword: &Token) -> Result<Flow> {
        Ok(Flow::Break)
    }

    fn visit_class(&mut self, name: &Token, methods: &[Rc<FunctionDecl>]) -> Result<Flow> {
        debug!("Defining class '{}'", name.lexeme);

        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        let methods: HashMap<String, Rc<LoxFunction>> = methods
            .iter()
            .map(|method| {
                let function = LoxFunction::new(
                    Rc::clone(method),
                    Rc::clone(&self.environment),
                    method.name.lexeme == INITIALIZER,
                );
                (method.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = LoxClass::new(name.lexeme.clone(), methods);

        self.environment.borrow_mut().assign(
            &name.lexeme,
            Value::Callable(Callable::Class(Rc::new(class))),
            name.line,
        )?;

        Ok(Flow::Normal)
    }
}
