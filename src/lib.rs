//! A tree‑walking interpreter for Lox.
//!
//! The pipeline is `scan → parse → resolve → interpret`; each stage is exposed
//! as a free function, and [`Lox`] chains them for drivers that just want to
//! run source text.

pub mod ast_printer;
pub mod callable;
pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use std::io::Write;

use log::info;

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::{Locals, Resolver};
use crate::scanner::Scanner;
use crate::stmt::Stmt;
use crate::token::Token;

/// Source text → tokens (always `EOF`‑terminated) and lexical errors.
pub fn scan(source: &str) -> (Vec<Token>, Vec<LoxError>) {
    Scanner::new(source).scan_tokens()
}

/// Tokens → statements and parse errors.
pub fn parse(tokens: &[Token]) -> (Vec<Stmt>, Vec<LoxError>) {
    Parser::new(tokens).parse()
}

/// Statements → hop‑count side table and resolution errors.
pub fn resolve(statements: &[Stmt]) -> (Locals, Vec<LoxError>) {
    Resolver::new().resolve(statements)
}

/// Run a resolved program on a fresh interpreter printing to stdout.
pub fn interpret(statements: &[Stmt], locals: Locals) -> error::Result<()> {
    Interpreter::new().interpret(statements, locals)
}

/// A running session: one interpreter whose globals persist across
/// [`Lox::run`] calls, plus the node‑id counter that keeps ids unique.
///
/// The interpreter's side table only grows: entries from earlier runs are
/// kept, since closures created by those runs may still execute them.
pub struct Lox {
    interpreter: Interpreter,
    next_id: usize,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Self {
        Self::from_interpreter(Interpreter::new())
    }

    /// Session whose `print` output goes to `out`.
    pub fn with_output<W: Write + 'static>(out: W) -> Self {
        Self::from_interpreter(Interpreter::with_output(out))
    }

    fn from_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            next_id: 0,
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Run `source` through the whole pipeline.
    ///
    /// Lexical and parse errors are all collected before stopping; resolution
    /// errors stop the run before anything executes; a runtime error aborts
    /// the rest of the program.
    pub fn run(&mut self, source: &str) -> Result<(), Vec<LoxError>> {
        let (tokens, mut errors) = scan(source);

        let mut parser = Parser::starting_at(&tokens, self.next_id);
        let (statements, parse_errors) = parser.parse();
        self.next_id = parser.next_id();
        errors.extend(parse_errors);

        if !errors.is_empty() {
            info!("Not resolving: {} static error(s)", errors.len());
            return Err(errors);
        }

        let (locals, resolve_errors) = resolve(&statements);
        if !resolve_errors.is_empty() {
            return Err(resolve_errors);
        }

        self.interpreter
            .interpret(&statements, locals)
            .map_err(|e| vec![e])
    }
}
